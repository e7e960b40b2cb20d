//! Immutable bounding-box tree, bulk-loaded once per snapshot.
//!
//! Construction recursively partitions the readings at the median of the
//! axis with the widest spread, which keeps sibling bounding boxes from
//! overlapping and lets range queries prune whole subtrees. Leaves hold
//! small runs of the backing arena, so a query that fully contains a node's
//! box collects its run without per-point tests.

use crate::reading::Reading;
use crate::types::GeoRect;

/// Maximum readings per leaf before a node splits during construction.
const LEAF_CAPACITY: usize = 16;

enum Node {
    Branch {
        bbox: GeoRect,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        bbox: GeoRect,
        start: usize,
        len: usize,
    },
}

impl Node {
    fn bbox(&self) -> &GeoRect {
        match self {
            Node::Branch { bbox, .. } => bbox,
            Node::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Spatial index over all readings from one decoded snapshot.
///
/// Immutable after [`SensorIndex::bulk_load`] and safe to query from any
/// number of threads concurrently. A new snapshot produces a new index that
/// the owner swaps in wholesale; this type is never mutated incrementally.
pub struct SensorIndex {
    readings: Vec<Reading>,
    root: Option<Node>,
}

impl SensorIndex {
    /// Builds the index from one snapshot's readings.
    ///
    /// The readings are reordered during construction as each level
    /// partitions around the median of its widest axis.
    pub fn bulk_load(mut readings: Vec<Reading>) -> Self {
        let root = if readings.is_empty() {
            None
        } else {
            Some(build(&mut readings, 0))
        };
        Self { readings, root }
    }

    /// Number of readings in the index.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Every reading whose point falls within the closed rectangle
    /// `[min, max]`, where each bound is a `(latitude, longitude)` pair.
    /// No ordering guarantee on the result.
    ///
    /// A zero-area rectangle returns matches at the exact point. Rectangles
    /// spanning the antimeridian (min longitude greater than max) are not
    /// handled and return incomplete or empty results.
    pub fn query(&self, min: (f32, f32), max: (f32, f32)) -> Vec<Reading> {
        self.query_rect(&GeoRect::new(min, max))
    }

    /// Range query over a [`GeoRect`]. Same contract as [`SensorIndex::query`].
    pub fn query_rect(&self, rect: &GeoRect) -> Vec<Reading> {
        let mut results = Vec::new();
        if let Some(root) = &self.root {
            self.collect(root, rect, &mut results);
        }
        results
    }

    fn collect(&self, node: &Node, query: &GeoRect, results: &mut Vec<Reading>) {
        if !node.bbox().intersects(query) {
            return;
        }
        if node.bbox().within(query) {
            self.collect_all(node, results);
            return;
        }
        match node {
            Node::Leaf { start, len, .. } => {
                for reading in &self.readings[*start..*start + *len] {
                    if query.contains(reading.latitude(), reading.longitude()) {
                        results.push(reading.clone());
                    }
                }
            }
            Node::Branch { left, right, .. } => {
                self.collect(left, query, results);
                self.collect(right, query, results);
            }
        }
    }

    fn collect_all(&self, node: &Node, results: &mut Vec<Reading>) {
        match node {
            Node::Leaf { start, len, .. } => {
                results.extend_from_slice(&self.readings[*start..*start + *len]);
            }
            Node::Branch { left, right, .. } => {
                self.collect_all(left, results);
                self.collect_all(right, results);
            }
        }
    }
}

fn survey_bbox(readings: &[Reading]) -> GeoRect {
    let mut bbox = GeoRect {
        min_latitude: f32::MAX,
        min_longitude: f32::MAX,
        max_latitude: f32::MIN,
        max_longitude: f32::MIN,
    };
    for reading in readings {
        bbox.min_latitude = bbox.min_latitude.min(reading.latitude());
        bbox.min_longitude = bbox.min_longitude.min(reading.longitude());
        bbox.max_latitude = bbox.max_latitude.max(reading.latitude());
        bbox.max_longitude = bbox.max_longitude.max(reading.longitude());
    }
    bbox
}

fn build(readings: &mut [Reading], offset: usize) -> Node {
    let bbox = survey_bbox(readings);
    if readings.len() <= LEAF_CAPACITY {
        return Node::Leaf {
            bbox,
            start: offset,
            len: readings.len(),
        };
    }

    // Split on the axis with the widest spread to keep sibling boxes tight.
    let latitude_spread = bbox.max_latitude - bbox.min_latitude;
    let longitude_spread = bbox.max_longitude - bbox.min_longitude;
    let mid = readings.len() / 2;
    if latitude_spread >= longitude_spread {
        readings.select_nth_unstable_by(mid, |a, b| a.latitude().total_cmp(&b.latitude()));
    } else {
        readings.select_nth_unstable_by(mid, |a, b| a.longitude().total_cmp(&b.longitude()));
    }

    let (left, right) = readings.split_at_mut(mid);
    Node::Branch {
        bbox,
        left: Box::new(build(left, offset)),
        right: Box::new(build(right, offset + mid)),
    }
}
