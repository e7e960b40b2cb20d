//! # Map Data Engine
//!
//! The stateful coordinator the thin presentation layer talks to. It owns
//! the current spatial index, the set of readings on screen, and the redraw
//! coalescing state, and it pushes render diffs to the map surface through
//! a registered sink.
//!
//! ## Concurrency model
//!
//! - The index is immutable once built and shared as an `Arc`; installing a
//!   new snapshot swaps the handle atomically while in-flight diff
//!   computations keep querying the old one.
//! - Diff computation runs on a blocking worker thread; it is a pure
//!   function of the index, region, and visible-set snapshot it captured.
//! - Redraws are not reentrant. A viewport change that arrives while a diff
//!   is in flight is coalesced into a single pending slot holding the
//!   latest region; when the in-flight run finishes, exactly one follow-up
//!   run starts with that region. At most one run is executing and one is
//!   pending, and the visible set always converges to the most recently
//!   requested viewport.

use crate::reading::Reading;
use crate::snapshot::{self, DownloadError, SnapshotTransport};
use crate::spatial::SensorIndex;
use crate::types::{CoordinateRegion, SensorId};
use crate::viewport::{compute_render_diff, RenderDiff};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// Display cap used when none is configured, matching what a phone-sized
/// map can render without stuttering.
pub const DEFAULT_MAX_ANNOTATIONS: usize = 750;

/// Snapshot age past which [`MapDataEngine::is_stale`] reports true by
/// convention (15 minutes).
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(900);

/// Callback through which the engine delivers render diffs to the map
/// surface.
pub type RenderSink = Box<dyn Fn(RenderDiff) + Send + Sync>;

/// Redraw coalescing state. One run executing, at most one pending; the
/// pending slot always holds the latest requested region.
#[derive(Debug, Clone, Copy)]
enum RedrawState {
    Idle,
    Running,
    RunningWithPending(CoordinateRegion),
}

/// Coordinator for snapshot ingestion and viewport-driven rendering.
pub struct MapDataEngine {
    index: RwLock<Option<Arc<SensorIndex>>>,
    visible: RwLock<HashMap<SensorId, Reading>>,
    redraw_state: Mutex<RedrawState>,
    last_region: Mutex<Option<CoordinateRegion>>,
    installed_at: Mutex<Option<Instant>>,
    max_display: usize,
    render_sink: RenderSink,
}

impl MapDataEngine {
    /// Creates an engine that delivers diffs to `render_sink`, capped at
    /// [`DEFAULT_MAX_ANNOTATIONS`] readings on screen.
    pub fn new(render_sink: RenderSink) -> Self {
        Self::with_max_display(render_sink, DEFAULT_MAX_ANNOTATIONS)
    }

    /// Creates an engine with an explicit display cap.
    pub fn with_max_display(render_sink: RenderSink, max_display: usize) -> Self {
        Self {
            index: RwLock::new(None),
            visible: RwLock::new(HashMap::new()),
            redraw_state: Mutex::new(RedrawState::Idle),
            last_region: Mutex::new(None),
            installed_at: Mutex::new(None),
            max_display,
            render_sink,
        }
    }

    /// Number of sensors in the current snapshot, zero before the first
    /// successful refresh.
    pub async fn sensor_count(&self) -> usize {
        self.index.read().await.as_ref().map_or(0, |i| i.len())
    }

    /// Readings currently on screen.
    pub async fn visible_readings(&self) -> Vec<Reading> {
        self.visible.read().await.values().cloned().collect()
    }

    /// Whether the current snapshot is older than `max_age` (or missing).
    /// The caller decides whether that warrants a refresh.
    pub async fn is_stale(&self, max_age: Duration) -> bool {
        match *self.installed_at.lock().await {
            Some(at) => at.elapsed() > max_age,
            None => true,
        }
    }

    /// Atomically replaces the current index with a freshly decoded
    /// snapshot, then redraws the last requested viewport against it.
    pub async fn install_snapshot(&self, index: SensorIndex) {
        let sensors = index.len();
        *self.index.write().await = Some(Arc::new(index));
        *self.installed_at.lock().await = Some(Instant::now());
        info!(sensors, "🟢 installed sensor snapshot");

        let last_region = *self.last_region.lock().await;
        if let Some(region) = last_region {
            self.request_redraw(region).await;
        }
    }

    /// Downloads a snapshot through `transport` and installs it.
    ///
    /// Failures are surfaced as-is; the engine never retries on its own.
    pub async fn refresh<T>(
        &self,
        transport: &T,
        on_progress: impl Fn(f32) + Send + Sync,
    ) -> Result<(), DownloadError>
    where
        T: SnapshotTransport + ?Sized,
    {
        let index = snapshot::download_readings(transport, on_progress).await?;
        self.install_snapshot(index).await;
        Ok(())
    }

    /// Recomputes what the viewport should display and pushes the diff to
    /// the render sink.
    ///
    /// If a redraw is already in flight the request is coalesced: the
    /// region is parked in the pending slot (overwriting any previously
    /// parked region) and the in-flight owner runs one follow-up when it
    /// finishes.
    pub async fn request_redraw(&self, region: CoordinateRegion) {
        *self.last_region.lock().await = Some(region);
        {
            let mut state = self.redraw_state.lock().await;
            match *state {
                RedrawState::Idle => *state = RedrawState::Running,
                RedrawState::Running | RedrawState::RunningWithPending(_) => {
                    debug!("redraw in flight, coalescing viewport change");
                    *state = RedrawState::RunningWithPending(region);
                    return;
                }
            }
        }

        let mut region = region;
        loop {
            self.redraw_once(region).await;

            let mut state = self.redraw_state.lock().await;
            match *state {
                RedrawState::RunningWithPending(next) => {
                    *state = RedrawState::Running;
                    region = next;
                }
                _ => {
                    *state = RedrawState::Idle;
                    return;
                }
            }
        }
    }

    async fn redraw_once(&self, region: CoordinateRegion) {
        let Some(index) = self.index.read().await.clone() else {
            return;
        };
        let current = self.visible.read().await.clone();
        let max_display = self.max_display;

        let computed = tokio::task::spawn_blocking(move || {
            let mut rng = rand::thread_rng();
            compute_render_diff(&index, region, &current, max_display, &mut rng)
        })
        .await;

        let diff = match computed {
            Ok(diff) => diff,
            Err(err) => {
                error!(error = %err, "render diff computation panicked");
                return;
            }
        };

        let mut visible = self.visible.write().await;
        for reading in &diff.to_remove {
            visible.remove(&reading.id());
        }
        for reading in &diff.to_add {
            visible.insert(reading.id(), reading.clone());
        }
        for (_, replacement) in &diff.updated {
            if let Some(existing) = visible.get_mut(&replacement.id()) {
                existing.update(replacement);
            }
        }
        drop(visible);

        (self.render_sink)(diff);
    }
}
