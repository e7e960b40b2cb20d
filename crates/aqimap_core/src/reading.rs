//! # Sensor Readings
//!
//! The [`Reading`] value type: one sensor's current and historical AQI
//! measurements, keyed by a stable sensor id.
//!
//! Identity, equality, hashing, and ordering are all by id. The coordinate
//! is fixed at construction and serves only as the indexing key; the AQI
//! windows and timestamp are refreshed in place via [`Reading::update`] so
//! that annotation objects keyed by identity survive snapshot refreshes
//! without being torn down and rebuilt.

use crate::types::SensorId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// AQI values at the rolling windows published with each sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiWindows {
    /// 10-minute window; the headline value shown on the map.
    pub aqi_10m: u32,
    /// 30-minute window.
    pub aqi_30m: u32,
    /// 1-hour window.
    pub aqi_1h: u32,
    /// 6-hour window.
    pub aqi_6h: u32,
    /// 24-hour window.
    pub aqi_24h: u32,
}

impl AqiWindows {
    /// All windows set to the same value. Handy for fixtures and for
    /// sensors that have not accumulated history yet.
    pub fn uniform(aqi: u32) -> Self {
        Self {
            aqi_10m: aqi,
            aqi_30m: aqi,
            aqi_1h: aqi,
            aqi_6h: aqi,
            aqi_24h: aqi,
        }
    }
}

/// An air-quality reading from a single sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    id: SensorId,
    latitude: f32,
    longitude: f32,
    windows: AqiWindows,
    last_updated: u64,
}

impl Reading {
    /// Creates a reading from a decoded snapshot record.
    pub fn new(
        id: SensorId,
        latitude: f32,
        longitude: f32,
        windows: AqiWindows,
        last_updated: u64,
    ) -> Self {
        Self {
            id,
            latitude,
            longitude,
            windows,
            last_updated,
        }
    }

    /// The stable sensor identifier. Sole determinant of identity.
    pub fn id(&self) -> SensorId {
        self.id
    }

    pub fn latitude(&self) -> f32 {
        self.latitude
    }

    pub fn longitude(&self) -> f32 {
        self.longitude
    }

    /// The headline AQI value displayed on the map pin (10-minute window).
    pub fn aqi(&self) -> u32 {
        self.windows.aqi_10m
    }

    /// AQI values across all rolling windows.
    pub fn windows(&self) -> AqiWindows {
        self.windows
    }

    /// Seconds since epoch at which the sensor last reported.
    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    /// Overwrites the mutable fields (AQI windows and timestamp) with the
    /// values from `from`, preserving identity and coordinates.
    ///
    /// Annotation views hold readings by identity; refreshing the displayed
    /// values in place keeps those views valid across snapshot refreshes.
    pub fn update(&mut self, from: &Reading) {
        debug_assert_eq!(self.id, from.id);
        self.windows = from.windows;
        self.last_updated = from.last_updated;
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reading {}

impl Hash for Reading {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn reading(id: u32, aqi: u32) -> Reading {
        Reading::new(SensorId(id), 37.0, -122.0, AqiWindows::uniform(aqi), 1_600_000_000)
    }

    #[test]
    fn equality_and_hash_are_by_id_only() {
        let a = reading(42, 10);
        let b = reading(42, 200);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ordering_is_by_id() {
        let mut readings = vec![reading(3, 0), reading(1, 0), reading(2, 0)];
        readings.sort();
        let ids: Vec<u32> = readings.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn update_overwrites_values_and_keeps_identity() {
        let mut existing = reading(7, 55);
        let replacement = Reading::new(
            SensorId(7),
            37.0,
            -122.0,
            AqiWindows {
                aqi_10m: 80,
                aqi_30m: 75,
                aqi_1h: 70,
                aqi_6h: 60,
                aqi_24h: 58,
            },
            1_600_000_900,
        );

        existing.update(&replacement);
        assert_eq!(existing.id(), SensorId(7));
        assert_eq!(existing.aqi(), 80);
        assert_eq!(existing.windows().aqi_24h, 58);
        assert_eq!(existing.last_updated(), 1_600_000_900);
    }
}
