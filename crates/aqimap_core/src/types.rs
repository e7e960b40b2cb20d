//! # Core Type Definitions
//!
//! Fundamental types shared across the engine: sensor identity, closed
//! geographic rectangles, and the map viewport region.
//!
//! ## Key Types
//!
//! - [`SensorId`] - Stable identifier for a physical sensor
//! - [`GeoRect`] - Closed axis-aligned rectangle in (latitude, longitude)
//! - [`CoordinateRegion`] - Map viewport expressed as center + span
//!
//! ## Design Principles
//!
//! - **Type Safety**: the id wrapper prevents mixing sensor ids with other
//!   numeric values flowing through the system
//! - **Serialization**: all types support serde for network transmission
//!   and persistence by embedding applications

use serde::{Deserialize, Serialize};

/// Stable identifier for a physical sensor.
///
/// Assigned by the upstream data provider and carried verbatim through the
/// wire format. Two readings with the same `SensorId` describe the same
/// device across snapshot refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(pub u32);

impl std::fmt::Display for SensorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed axis-aligned rectangle in (latitude, longitude) space.
///
/// Both boundaries are inclusive: a point sitting exactly on an edge is
/// inside. A zero-area rectangle is valid and matches only points at the
/// exact coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub min_latitude: f32,
    pub min_longitude: f32,
    pub max_latitude: f32,
    pub max_longitude: f32,
}

impl GeoRect {
    /// Creates a rectangle from its corner coordinates.
    pub fn new(min: (f32, f32), max: (f32, f32)) -> Self {
        Self {
            min_latitude: min.0,
            min_longitude: min.1,
            max_latitude: max.0,
            max_longitude: max.1,
        }
    }

    /// Whether the point lies within the closed rectangle.
    pub fn contains(&self, latitude: f32, longitude: f32) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }

    /// Whether the two rectangles share at least one point.
    pub fn intersects(&self, other: &GeoRect) -> bool {
        !(other.max_latitude < self.min_latitude
            || other.min_latitude > self.max_latitude
            || other.max_longitude < self.min_longitude
            || other.min_longitude > self.max_longitude)
    }

    /// Whether this rectangle lies entirely within `other`.
    pub fn within(&self, other: &GeoRect) -> bool {
        self.min_latitude >= other.min_latitude
            && self.min_longitude >= other.min_longitude
            && self.max_latitude <= other.max_latitude
            && self.max_longitude <= other.max_longitude
    }
}

/// Map viewport expressed as a center coordinate plus the span visible
/// along each axis, mirroring how map surfaces report their region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRegion {
    pub center_latitude: f32,
    pub center_longitude: f32,
    pub latitude_span: f32,
    pub longitude_span: f32,
}

impl CoordinateRegion {
    /// Creates a region from a center coordinate and per-axis spans.
    pub fn new(center: (f32, f32), span: (f32, f32)) -> Self {
        Self {
            center_latitude: center.0,
            center_longitude: center.1,
            latitude_span: span.0,
            longitude_span: span.1,
        }
    }

    /// The axis-aligned rectangle covered by this region, `center ± span/2`
    /// along each axis.
    ///
    /// Known limitation: regions spanning the antimeridian produce a
    /// rectangle whose minimum longitude exceeds its maximum, and queries
    /// over it return incomplete or empty results. Longitude wraparound is
    /// not handled.
    pub fn bounding_rect(&self) -> GeoRect {
        GeoRect {
            min_latitude: self.center_latitude - self.latitude_span / 2.0,
            min_longitude: self.center_longitude - self.longitude_span / 2.0,
            max_latitude: self.center_latitude + self.latitude_span / 2.0,
            max_longitude: self.center_longitude + self.longitude_span / 2.0,
        }
    }
}
