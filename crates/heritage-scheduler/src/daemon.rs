//! Sleep daemon: periodic staging passes with start/stop/status lifecycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

use serde::Serialize;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use heritage_embeddings::Embedder;
use heritage_indexing::{ProcessOptions, StagingProcessor};
use heritage_types::{DaemonSettings, OverlapMode};

use crate::error::SchedulerError;
use crate::stats::{DaemonStats, TickStats};

/// Interval used when the caller passes zero
pub const DEFAULT_INTERVAL_MS: u64 = 60_000;

/// Options for [`SleepDaemon::start`]
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Tick interval; zero selects [`DEFAULT_INTERVAL_MS`]
    pub interval_ms: u64,
    pub model: Option<String>,
    pub force_fallback: bool,
    pub overlap: OverlapMode,
}

impl Default for DaemonOptions {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            model: None,
            force_fallback: false,
            overlap: OverlapMode::default(),
        }
    }
}

impl From<&DaemonSettings> for DaemonOptions {
    fn from(settings: &DaemonSettings) -> Self {
        Self {
            interval_ms: settings.interval_ms,
            model: settings.model.clone(),
            force_fallback: settings.force_fallback,
            overlap: settings.overlap,
        }
    }
}

/// Configuration of the active daemon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonConfig {
    pub base_dir: PathBuf,
    pub interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub force_fallback: bool,
    pub overlap: OverlapMode,
}

/// Result of [`SleepDaemon::status`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonStatus {
    pub running: bool,
    pub config: Option<DaemonConfig>,
    pub stats: DaemonStats,
}

struct ActiveDaemon {
    config: DaemonConfig,
    shutdown_token: CancellationToken,
    stats: Arc<TickStats>,
}

/// At-most-one periodic staging processor.
///
/// Each tick spawns its pass as a separate task, so a slow pass never
/// delays the timer. Whether a tick that fires mid-pass runs or is skipped
/// depends on [`OverlapMode`].
#[derive(Default)]
pub struct SleepDaemon {
    active: Mutex<Option<ActiveDaemon>>,
}

static GLOBAL_DAEMON: OnceLock<SleepDaemon> = OnceLock::new();

impl SleepDaemon {
    /// A standalone daemon. Most callers want [`SleepDaemon::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide daemon.
    pub fn global() -> &'static SleepDaemon {
        GLOBAL_DAEMON.get_or_init(SleepDaemon::new)
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveDaemon>> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start ticking, replacing any daemon that is already running.
    ///
    /// Must be called from within a Tokio runtime. The first tick fires
    /// one interval after start. `model` is recorded in the configuration
    /// only; every pass processes all staged entries.
    pub fn start(
        &self,
        base_dir: impl Into<PathBuf>,
        options: DaemonOptions,
        embedder: Arc<dyn Embedder>,
    ) -> Result<DaemonConfig, SchedulerError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| SchedulerError::NoRuntime(e.to_string()))?;

        let interval_ms = match options.interval_ms {
            0 => DEFAULT_INTERVAL_MS,
            ms => ms,
        };
        let config = DaemonConfig {
            base_dir: base_dir.into(),
            interval_ms,
            model: options.model.filter(|m| !m.is_empty()),
            force_fallback: options.force_fallback,
            overlap: options.overlap,
        };

        let mut active = self.lock();
        if let Some(previous) = active.take() {
            previous.shutdown_token.cancel();
            info!(base_dir = ?previous.config.base_dir, "Replacing running sleep daemon");
        }

        let shutdown_token = CancellationToken::new();
        let stats = Arc::new(TickStats::new());
        let tick = TickContext {
            processor: Arc::new(StagingProcessor::new(&config.base_dir, embedder)),
            options: ProcessOptions::new().with_force_fallback(config.force_fallback),
            overlap: config.overlap,
            running: Arc::new(AtomicBool::new(false)),
            stats: stats.clone(),
        };

        handle.spawn(run_loop(
            Duration::from_millis(config.interval_ms),
            shutdown_token.clone(),
            tick,
        ));

        info!(
            base_dir = ?config.base_dir,
            interval_ms = config.interval_ms,
            model = ?config.model,
            force_fallback = config.force_fallback,
            overlap = ?config.overlap,
            "Sleep daemon started"
        );

        *active = Some(ActiveDaemon {
            config: config.clone(),
            shutdown_token,
            stats,
        });
        Ok(config)
    }

    /// Cancel the timer and clear the configuration. No-op when stopped.
    ///
    /// A pass already in flight runs to completion.
    pub fn stop(&self) {
        if let Some(previous) = self.lock().take() {
            previous.shutdown_token.cancel();
            info!(base_dir = ?previous.config.base_dir, "Sleep daemon stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    pub fn status(&self) -> DaemonStatus {
        match self.lock().as_ref() {
            Some(active) => DaemonStatus {
                running: true,
                config: Some(active.config.clone()),
                stats: active.stats.snapshot(),
            },
            None => DaemonStatus {
                running: false,
                config: None,
                stats: DaemonStats::default(),
            },
        }
    }
}

/// Everything a tick needs, shared across spawned passes.
struct TickContext {
    processor: Arc<StagingProcessor>,
    options: ProcessOptions,
    overlap: OverlapMode,
    /// Set while a pass started in skip mode is in flight
    running: Arc<AtomicBool>,
    stats: Arc<TickStats>,
}

impl TickContext {
    /// Claim a slot for a new pass. `None` means the tick must be skipped.
    fn begin_pass(&self) -> Option<PassSlot> {
        match self.overlap {
            OverlapMode::Concurrent => Some(PassSlot { running: None }),
            OverlapMode::Skip => self
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .ok()
                .map(|_| PassSlot {
                    running: Some(self.running.clone()),
                }),
        }
    }
}

/// Held by a spawned pass; clears the run flag when the pass ends,
/// including by panic.
struct PassSlot {
    running: Option<Arc<AtomicBool>>,
}

impl Drop for PassSlot {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.store(false, Ordering::Release);
        }
    }
}

async fn run_loop(period: Duration, shutdown_token: CancellationToken, tick: TickContext) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                debug!("Sleep daemon timer cancelled");
                break;
            }
            _ = interval.tick() => {
                let Some(slot) = tick.begin_pass() else {
                    debug!("Previous staging pass still running, skipping tick");
                    tick.stats.record_skip();
                    continue;
                };

                let processor = tick.processor.clone();
                let options = tick.options.clone();
                let stats = tick.stats.clone();
                tokio::spawn(async move {
                    let _slot = slot;
                    stats.record_start();
                    match processor.process(&options).await {
                        Ok(results) => stats.record_run(results.len()),
                        Err(e) => {
                            warn!(error = %e, "Sleep daemon tick failed");
                            stats.record_failure();
                        }
                    }
                });
            }
        }
    }
}
