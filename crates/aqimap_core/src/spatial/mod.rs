//! # Spatial Indexing
//!
//! Bulk-loaded bounding-box tree over sensor readings, keyed by
//! (latitude, longitude), supporting closed-rectangle range queries over
//! tens of thousands of points.

mod tree;

pub use tree::SensorIndex;
