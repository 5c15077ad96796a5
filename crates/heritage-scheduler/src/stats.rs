//! Tick counters for the sleep daemon.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time copy of [`TickStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonStats {
    /// Passes that completed (with or without failed entries)
    pub ticks_run: u64,
    /// Ticks skipped because a pass was still running
    pub ticks_skipped: u64,
    /// Passes that failed as a whole (e.g. unreadable staging directory)
    pub ticks_failed: u64,
    /// Staged entries handled across all passes
    pub entries_processed: u64,
    /// Start time of the most recent pass
    pub last_tick: Option<DateTime<Utc>>,
}

/// Thread-safe counters updated by tick tasks.
#[derive(Debug, Default)]
pub struct TickStats {
    ticks_run: AtomicU64,
    ticks_skipped: AtomicU64,
    ticks_failed: AtomicU64,
    entries_processed: AtomicU64,
    last_tick: RwLock<Option<DateTime<Utc>>>,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of a pass.
    pub fn record_start(&self) {
        if let Ok(mut last) = self.last_tick.write() {
            *last = Some(Utc::now());
        }
    }

    /// Record a completed pass.
    pub fn record_run(&self, entries: usize) {
        self.ticks_run.fetch_add(1, Ordering::SeqCst);
        self.entries_processed
            .fetch_add(entries as u64, Ordering::SeqCst);
    }

    /// Record a tick skipped by the run-lock.
    pub fn record_skip(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a pass that failed as a whole.
    pub fn record_failure(&self) {
        self.ticks_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> DaemonStats {
        DaemonStats {
            ticks_run: self.ticks_run.load(Ordering::SeqCst),
            ticks_skipped: self.ticks_skipped.load(Ordering::SeqCst),
            ticks_failed: self.ticks_failed.load(Ordering::SeqCst),
            entries_processed: self.entries_processed.load(Ordering::SeqCst),
            last_tick: self.last_tick.read().ok().and_then(|t| *t),
        }
    }
}
