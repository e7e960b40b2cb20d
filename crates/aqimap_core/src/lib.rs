//! # AQImap Core
//!
//! The sensor-data ingestion and viewport-rendering engine behind a live
//! air-quality map. The presentation layer (map view, menus, permission
//! dialogs) is a thin consumer of this crate's outputs.
//!
//! ## Core Features
//!
//! - **Snapshot decoding**: a downloaded binary payload of tens of
//!   thousands of geolocated sensor readings becomes a fresh spatial index,
//!   atomically replacing the previous one
//! - **Spatial indexing**: a bulk-loaded bounding-box tree supports
//!   closed-rectangle range queries over the full sensor population
//! - **Viewport diffing**: every viewport change yields the minimal set of
//!   annotations to add, remove, or update in place
//! - **Stability-aware sampling**: when the visible population exceeds the
//!   display cap, readings already on screen are preferred so panning and
//!   zooming stay calm
//! - **Redraw coalescing**: viewport changes arriving mid-computation
//!   collapse into a single follow-up run with the latest region
//!
//! ## Architecture Overview
//!
//! An external transport (behind [`SnapshotTransport`]) downloads snapshot
//! bytes. [`snapshot`] decodes them off the interactive context and bulk
//! loads a [`SensorIndex`]. The [`MapDataEngine`] swaps the new index in
//! atomically; on every viewport change it runs the [`viewport`] differ
//! against the current index and pushes a [`RenderDiff`] to the registered
//! render sink, which the map surface applies.
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use aqimap_core::{CoordinateRegion, MapDataEngine};
//!
//! # async fn example(transport: &dyn aqimap_core::SnapshotTransport) {
//! let engine = MapDataEngine::new(Box::new(|diff| {
//!     // apply diff.to_add / diff.to_remove / diff.updated to the map view
//!     let _ = diff;
//! }));
//!
//! engine.refresh(transport, |fraction| println!("{:.0}%", fraction * 100.0))
//!     .await
//!     .expect("refresh failed");
//!
//! // On every map region change:
//! engine
//!     .request_redraw(CoordinateRegion::new((37.77, -122.42), (0.2, 0.2)))
//!     .await;
//! # }
//! ```

pub mod color;
pub mod engine;
pub mod reading;
pub mod snapshot;
pub mod spatial;
pub mod types;
pub mod viewport;
pub mod wire;

pub use color::{color_for_aqi, text_color_for_aqi, Rgb};
pub use engine::{MapDataEngine, RenderSink, DEFAULT_MAX_ANNOTATIONS, DEFAULT_STALE_AFTER};
pub use reading::{AqiWindows, Reading};
pub use snapshot::{
    build_index, decode_snapshot, download_readings, DownloadError, SnapshotResponse,
    SnapshotTransport, TRANSFER_PROGRESS_CEILING,
};
pub use spatial::SensorIndex;
pub use types::{CoordinateRegion, GeoRect, SensorId};
pub use viewport::{compute_render_diff, RenderDiff};
pub use wire::{encode_snapshot, WireError, SNAPSHOT_MAGIC, WIRE_VERSION};
