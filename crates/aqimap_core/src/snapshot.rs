//! # Snapshot Download & Decode
//!
//! Turns a downloaded snapshot payload into a fresh [`SensorIndex`].
//!
//! The network transfer itself belongs to an external collaborator behind
//! the [`SnapshotTransport`] trait; this module owns everything after the
//! bytes arrive: the HTTP-status gate, the wire decode, and the bulk load
//! of the spatial index. Decoding and index construction are CPU-bound and
//! run on a blocking worker thread, never on the caller's task.
//!
//! Either a fully-built index is returned or none is; a failure never
//! yields a half-loaded index, and a previously returned index is never
//! mutated, so the caller can swap indexes atomically.

use crate::spatial::SensorIndex;
use crate::wire::{self, WireError};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Transfer progress reported to [`download_readings`]' progress callback
/// is scaled by this ceiling, so the fraction stays below 1.0 until the
/// payload has also been parsed. 1.0 is reported only on success.
pub const TRANSFER_PROGRESS_CEILING: f32 = 0.9;

/// Errors in the snapshot download and decode pipeline.
///
/// Callers treat every variant as "refresh failed" and decide themselves
/// whether to retry; the variants exist for logging and diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The transfer itself failed (network, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The server answered with a non-success status and no usable body.
    #[error("server returned HTTP status {0}")]
    ServerError(u16),

    /// The body could not be decoded as a well-formed sensor list.
    #[error("invalid server response: {0}")]
    InvalidResponse(#[from] WireError),
}

/// A completed snapshot transfer: the HTTP-style status and the raw body.
#[derive(Debug, Clone)]
pub struct SnapshotResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// External collaborator that fetches snapshot bytes from the server.
///
/// Implementations report transfer progress as a fraction in `[0, 1]`;
/// the fraction is informational and never drives control flow.
#[async_trait]
pub trait SnapshotTransport: Send + Sync {
    async fn fetch(
        &self,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> std::io::Result<SnapshotResponse>;
}

/// Decodes a snapshot body into a populated spatial index.
///
/// Synchronous and CPU-bound; use [`build_index`] to run it off the
/// interactive context.
pub fn decode_snapshot(status: u16, body: &[u8]) -> Result<SensorIndex, DownloadError> {
    if !(200..300).contains(&status) {
        return Err(DownloadError::ServerError(status));
    }
    let readings = wire::decode_snapshot(body)?;
    debug!(sensors = readings.len(), "decoded snapshot payload");
    Ok(SensorIndex::bulk_load(readings))
}

/// Runs [`decode_snapshot`] on a blocking worker thread.
pub async fn build_index(status: u16, body: Vec<u8>) -> Result<SensorIndex, DownloadError> {
    tokio::task::spawn_blocking(move || decode_snapshot(status, &body))
        .await
        .map_err(std::io::Error::other)?
}

/// Fetches the latest snapshot through `transport` and builds its index.
///
/// Progress reported by the transport is scaled by
/// [`TRANSFER_PROGRESS_CEILING`]; the callback receives 1.0 exactly once,
/// after the payload has decoded successfully.
pub async fn download_readings<T>(
    transport: &T,
    on_progress: impl Fn(f32) + Send + Sync,
) -> Result<SensorIndex, DownloadError>
where
    T: SnapshotTransport + ?Sized,
{
    let scaled = |fraction: f32| {
        on_progress(fraction.clamp(0.0, 1.0) * TRANSFER_PROGRESS_CEILING);
    };
    let result = match transport.fetch(&scaled).await {
        Ok(response) => build_index(response.status, response.body).await,
        Err(err) => Err(DownloadError::Transport(err)),
    };

    match result {
        Ok(index) => {
            on_progress(1.0);
            info!(sensors = index.len(), "🟢 updated readings from server");
            Ok(index)
        }
        Err(err) => {
            warn!(error = %err, "🔴 failed to update readings");
            Err(err)
        }
    }
}
