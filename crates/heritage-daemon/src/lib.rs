//! Heritage command-line library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations over a shared [`App`]
//! - `generator`: Model-backed artifact generation with a vignette fallback

pub mod cli;
pub mod commands;
pub mod generator;

pub use cli::{Cli, Commands, StagingCommands};
pub use commands::{init_logging, load_settings, App};
pub use generator::{fallback_vignette, ArtifactGenerator, GenerateOptions};
