//! Boundary geometry and named city sample points.
//!
//! A `Region` is the administrative boundary used both to clip rasters and
//! as the spatial extent for aggregation. It wraps a MultiPolygon in
//! geographic (lon, lat) coordinates and is never mutated after load.

use geo::{Area, BoundingRect, Contains, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::grid::METRES_PER_DEGREE;

/// A polygon/multipolygon boundary in geographic coordinates.
#[derive(Debug, Clone)]
pub struct Region {
    geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Self { geometry }
    }

    /// Build a single-polygon region from exterior + hole rings of
    /// `[lon, lat]` pairs (the JSON encoding used by the report tool).
    /// The first ring is the exterior; the rest are holes.
    pub fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> Self {
        let mut iter = rings.into_iter();
        let exterior = ring_to_linestring(iter.next().unwrap_or_default());
        let holes: Vec<LineString<f64>> = iter.map(ring_to_linestring).collect();
        Self::new(MultiPolygon::new(vec![Polygon::new(exterior, holes)]))
    }

    /// Point-in-polygon test at (lon, lat).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.geometry.contains(&Point::new(lon, lat))
    }

    /// Axis-aligned bounding box, or None for an empty geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    /// Approximate area in m²: planar degree² area scaled by the metre
    /// conversion at the boundary's mid-latitude. Good to a few percent for
    /// regional extents, which is all the aggregation budget check needs.
    pub fn area_m2(&self) -> f64 {
        let deg2 = self.geometry.unsigned_area();
        let mid_lat = match self.bounding_rect() {
            Some(r) => (r.min().y + r.max().y) / 2.0,
            None => return 0.0,
        };
        deg2 * METRES_PER_DEGREE * METRES_PER_DEGREE * mid_lat.to_radians().cos()
    }
}

fn ring_to_linestring(ring: Vec<[f64; 2]>) -> LineString<f64> {
    LineString::from(ring.into_iter().map(|[lon, lat]| (lon, lat)).collect::<Vec<_>>())
}

/// A named point with a fixed-radius buffer, used to request mean statistics
/// at city locations. Independent of the urban/rural classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitySample {
    pub name: String,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Buffer radius in metres.
    pub radius_m: f64,
}

/// Segments used to approximate a circular buffer.
const BUFFER_SEGMENTS: usize = 64;

impl CitySample {
    pub fn new(name: impl Into<String>, lon: f64, lat: f64, radius_m: f64) -> Self {
        Self { name: name.into(), lon, lat, radius_m }
    }

    /// Circular buffer polygon around the city point.
    ///
    /// The radius is converted from metres to degrees separately per axis
    /// (longitude shrinks by cos(lat)), so the buffer stays circular on the
    /// ground rather than on the graticule.
    pub fn buffer(&self) -> Region {
        let r_lat = self.radius_m / METRES_PER_DEGREE;
        let r_lon = self.radius_m / (METRES_PER_DEGREE * self.lat.to_radians().cos());
        let ring: Vec<(f64, f64)> = (0..=BUFFER_SEGMENTS)
            .map(|i| {
                let theta = i as f64 / BUFFER_SEGMENTS as f64 * std::f64::consts::TAU;
                (self.lon + r_lon * theta.cos(), self.lat + r_lat * theta.sin())
            })
            .collect();
        Region::new(MultiPolygon::new(vec![Polygon::new(LineString::from(ring), vec![])]))
    }
}
