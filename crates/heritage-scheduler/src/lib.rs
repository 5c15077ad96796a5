//! Background sleep daemon for the artifact heritage library.
//!
//! At most one daemon is active per process. It wakes every `interval_ms`
//! and runs a staging pass (see `heritage_indexing::StagingProcessor`).
//!
//! # Features
//!
//! - Replace-on-start: starting while running cancels the old timer first
//! - Idempotent stop; stopping only prevents future ticks
//! - Overlap policy (skip/concurrent) for ticks that fire mid-pass
//! - Tick statistics via [`DaemonStatus`]
//!
//! # Example
//!
//! ```ignore
//! use heritage_scheduler::{DaemonOptions, SleepDaemon};
//!
//! let daemon = SleepDaemon::global();
//! daemon.start("/tmp/mcp-creative-memory", DaemonOptions::default(), embedder)?;
//! println!("{:?}", daemon.status());
//! daemon.stop();
//! ```

mod daemon;
mod error;
mod stats;

pub use daemon::{DaemonConfig, DaemonOptions, DaemonStatus, SleepDaemon, DEFAULT_INTERVAL_MS};
pub use error::SchedulerError;
pub use stats::{DaemonStats, TickStats};
