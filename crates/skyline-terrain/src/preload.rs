//! Background tile loading with a readiness signal.
//!
//! A preload runs on its own thread. While any preload is outstanding the
//! grid's [`Readiness`] reports not-ready; when the last one finishes,
//! waiters are woken and each preload's [`PreloadReport`] is delivered over
//! its channel.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::grid::ElevationGrid;
use crate::projection::TileCode;

/// Outcome of loading a batch of tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Tiles read successfully.
    pub loaded: usize,
    /// Tiles that failed to load and were cached as sea level.
    pub degraded: usize,
    /// Tiles that were already in the cache.
    pub cached: usize,
}

#[derive(Debug, Default)]
struct ReadinessState {
    outstanding: Mutex<usize>,
    changed: Condvar,
}

/// Shared flag counting outstanding preloads. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    state: Arc<ReadinessState>,
}

impl Readiness {
    /// True when no preload is outstanding.
    pub fn is_ready(&self) -> bool {
        *self.lock() == 0
    }

    /// Block until no preload is outstanding.
    pub fn wait(&self) {
        let mut outstanding = self.lock();
        while *outstanding > 0 {
            outstanding = self
                .state
                .changed
                .wait(outstanding)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until ready or until `timeout` elapses. Returns readiness.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let outstanding = self.lock();
        let (outstanding, _) = self
            .state
            .changed
            .wait_timeout_while(outstanding, timeout, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
        *outstanding == 0
    }

    /// Mark one preload outstanding until the returned guard drops.
    pub(crate) fn begin(&self) -> PendingGuard {
        *self.lock() += 1;
        PendingGuard {
            readiness: self.clone(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.state
            .outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one outstanding preload on drop, including on unwind.
pub(crate) struct PendingGuard {
    readiness: Readiness,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut outstanding = self.readiness.lock();
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.readiness.state.changed.notify_all();
        }
    }
}

/// Handle to a running preload.
pub struct Preload {
    report_rx: mpsc::Receiver<PreloadReport>,
    report: Option<PreloadReport>,
}

impl Preload {
    /// Load `codes` into `grid` on a background thread.
    pub(crate) fn spawn(grid: Arc<ElevationGrid>, codes: Vec<TileCode>) -> io::Result<Self> {
        let (report_tx, report_rx) = mpsc::channel();
        let pending = grid.readiness().begin();

        thread::Builder::new()
            .name("skyline-tile-preload".into())
            .spawn(move || {
                let report = grid.load_tiles(&codes);
                info!(
                    loaded = report.loaded,
                    degraded = report.degraded,
                    cached = report.cached,
                    "tile preload complete"
                );
                drop(pending);
                let _ = report_tx.send(report);
            })?;

        Ok(Self {
            report_rx,
            report: None,
        })
    }

    /// The report, if the preload has finished.
    pub fn try_report(&mut self) -> Option<PreloadReport> {
        if self.report.is_none() {
            self.report = self.report_rx.try_recv().ok();
        }
        self.report
    }

    /// Block until the preload finishes. None if the loader thread died.
    pub fn wait(mut self) -> Option<PreloadReport> {
        if let Some(report) = self.report {
            return Some(report);
        }
        self.report = self.report_rx.recv().ok();
        self.report
    }
}
