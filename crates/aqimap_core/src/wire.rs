//! # Snapshot Wire Format
//!
//! Little-endian binary codec for the downloaded sensor snapshot: a small
//! header followed by a dense array of fixed-size records, one per sensor.
//!
//! Layout:
//!
//! ```text
//! header   magic "AQIS" (4) | version u16 (2) | record count u32 (4)
//! record   id u32 | latitude f32 | longitude f32
//!          | aqi_10m u32 | aqi_30m u32 | aqi_1h u32 | aqi_6h u32 | aqi_24h u32
//!          | last_updated u64                                    = 40 bytes
//! ```
//!
//! Decoding is strict: a short header, wrong magic, unknown version, a body
//! shorter than the declared record count, or trailing bytes after the last
//! record all fail. A snapshot either decodes completely or not at all.

use crate::reading::{AqiWindows, Reading};
use crate::types::SensorId;

/// First four bytes of every snapshot payload.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"AQIS";

/// Wire format version this build reads and writes.
pub const WIRE_VERSION: u16 = 1;

const HEADER_LEN: usize = 10;
const RECORD_LEN: usize = 40;

/// Errors produced while decoding a snapshot payload.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("snapshot header truncated: {0} bytes")]
    TruncatedHeader(usize),

    #[error("bad snapshot magic")]
    BadMagic,

    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u16),

    #[error("snapshot body truncated: expected {expected} bytes, got {actual}")]
    TruncatedBody { expected: usize, actual: usize },

    #[error("{0} trailing bytes after final record")]
    TrailingBytes(usize),
}

/// Serializes readings into a snapshot payload.
///
/// Used by the fixture builders in tests and by tooling that serves
/// snapshots; the client path only decodes.
pub fn encode_snapshot(readings: &[Reading]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + readings.len() * RECORD_LEN);
    buffer.extend_from_slice(&SNAPSHOT_MAGIC);
    buffer.extend_from_slice(&WIRE_VERSION.to_le_bytes());
    buffer.extend_from_slice(&(readings.len() as u32).to_le_bytes());

    for reading in readings {
        let windows = reading.windows();
        buffer.extend_from_slice(&reading.id().0.to_le_bytes());
        buffer.extend_from_slice(&reading.latitude().to_le_bytes());
        buffer.extend_from_slice(&reading.longitude().to_le_bytes());
        buffer.extend_from_slice(&windows.aqi_10m.to_le_bytes());
        buffer.extend_from_slice(&windows.aqi_30m.to_le_bytes());
        buffer.extend_from_slice(&windows.aqi_1h.to_le_bytes());
        buffer.extend_from_slice(&windows.aqi_6h.to_le_bytes());
        buffer.extend_from_slice(&windows.aqi_24h.to_le_bytes());
        buffer.extend_from_slice(&reading.last_updated().to_le_bytes());
    }

    buffer
}

/// Parses a snapshot payload into its sensor readings.
pub fn decode_snapshot(data: &[u8]) -> Result<Vec<Reading>, WireError> {
    if data.len() < HEADER_LEN {
        return Err(WireError::TruncatedHeader(data.len()));
    }
    if data[0..4] != SNAPSHOT_MAGIC {
        return Err(WireError::BadMagic);
    }
    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != WIRE_VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    let count = u32::from_le_bytes([data[6], data[7], data[8], data[9]]) as usize;

    let body = &data[HEADER_LEN..];
    let expected = count * RECORD_LEN;
    if body.len() < expected {
        return Err(WireError::TruncatedBody {
            expected,
            actual: body.len(),
        });
    }
    if body.len() > expected {
        return Err(WireError::TrailingBytes(body.len() - expected));
    }

    let mut readings = Vec::with_capacity(count);
    for record in body.chunks_exact(RECORD_LEN) {
        readings.push(decode_record(record));
    }
    Ok(readings)
}

fn decode_record(record: &[u8]) -> Reading {
    let read_u32 =
        |at: usize| u32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]]);
    let read_f32 =
        |at: usize| f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]]);

    let id = SensorId(read_u32(0));
    let latitude = read_f32(4);
    let longitude = read_f32(8);
    let windows = AqiWindows {
        aqi_10m: read_u32(12),
        aqi_30m: read_u32(16),
        aqi_1h: read_u32(20),
        aqi_6h: read_u32(24),
        aqi_24h: read_u32(28),
    };
    let last_updated = u64::from_le_bytes([
        record[32], record[33], record[34], record[35], record[36], record[37], record[38],
        record[39],
    ]);

    Reading::new(id, latitude, longitude, windows, last_updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: u32, lat: f32, lon: f32, aqi: u32) -> Reading {
        Reading::new(SensorId(id), lat, lon, AqiWindows::uniform(aqi), 1_600_000_000)
    }

    #[test]
    fn decodes_what_it_encodes() {
        let readings = vec![
            fixture(1, 37.77, -122.42, 42),
            fixture(2, -33.86, 151.21, 180),
        ];
        let payload = encode_snapshot(&readings);
        let decoded = decode_snapshot(&payload).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id(), SensorId(1));
        assert_eq!(decoded[0].latitude(), 37.77);
        assert_eq!(decoded[0].aqi(), 42);
        assert_eq!(decoded[1].id(), SensorId(2));
        assert_eq!(decoded[1].longitude(), 151.21);
        assert_eq!(decoded[1].last_updated(), 1_600_000_000);
    }

    #[test]
    fn empty_snapshot_is_valid() {
        let payload = encode_snapshot(&[]);
        assert!(decode_snapshot(&payload).unwrap().is_empty());
    }

    #[test]
    fn rejects_short_header() {
        assert!(matches!(
            decode_snapshot(b"AQI"),
            Err(WireError::TruncatedHeader(3))
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut payload = encode_snapshot(&[fixture(1, 0.0, 0.0, 5)]);
        payload[0] = b'X';
        assert!(matches!(decode_snapshot(&payload), Err(WireError::BadMagic)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut payload = encode_snapshot(&[]);
        payload[4] = 9;
        assert!(matches!(
            decode_snapshot(&payload),
            Err(WireError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn rejects_truncated_body() {
        let mut payload = encode_snapshot(&[fixture(1, 0.0, 0.0, 5)]);
        payload.truncate(payload.len() - 8);
        assert!(matches!(
            decode_snapshot(&payload),
            Err(WireError::TruncatedBody { .. })
        ));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut payload = encode_snapshot(&[fixture(1, 0.0, 0.0, 5)]);
        payload.extend_from_slice(&[0u8; 3]);
        assert!(matches!(
            decode_snapshot(&payload),
            Err(WireError::TrailingBytes(3))
        ));
    }
}
