//! CLI argument parsing for the heritage binary.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Artifact heritage
///
/// Record and generate short text artifacts, embed them, and search them
/// by semantic similarity.
#[derive(Parser, Debug)]
#[command(name = "heritage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/artifact-heritage/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override base directory holding heritage/ and staging-embeddings/
    #[arg(long, global = true)]
    pub base_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute missing embeddings (no --model: fallback vectors)
    Index {
        /// Embedding model; repeat for several
        #[arg(short, long = "model")]
        models: Vec<String>,
    },

    /// Semantic search over stored artifacts
    Search {
        /// Query text
        query: String,

        /// Maximum results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Single embedding model
        #[arg(short, long)]
        model: Option<String>,

        /// Comma-separated models for ensemble search
        #[arg(long, value_delimiter = ',')]
        models: Vec<String>,

        /// Ensemble weight as MODEL=WEIGHT; repeatable
        #[arg(short, long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
    },

    /// List stored artifacts
    List {
        /// Only artifacts with this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Only artifacts generated by this model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Record a text artifact
    Record {
        /// Artifact text
        #[arg(long)]
        text: String,

        /// Tag; repeatable
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Generate an artifact from a model, or a random vignette
    Generate {
        /// Generation model (default from config)
        #[arg(short, long)]
        model: Option<String>,

        /// Prompt sent to the model
        #[arg(short, long)]
        prompt: Option<String>,

        /// System prompt sent to the model
        #[arg(long)]
        system_prompt: Option<String>,
    },

    /// Inspect and drain the embedding staging queue
    #[command(subcommand)]
    Staging(StagingCommands),

    /// Run the sleep daemon in the foreground until Ctrl-C
    Run {
        /// Tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Default embedding model, reported in the daemon status
        #[arg(short, long)]
        model: Option<String>,

        /// Use fallback vectors instead of calling staged models
        #[arg(long)]
        force_fallback: bool,
    },
}

/// Staging subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StagingCommands {
    /// List staged entries
    List,

    /// Stage an (artifact, model) pair
    Add { artifact_id: String, model: String },

    /// Remove a staged pair
    Remove { artifact_id: String, model: String },

    /// Run one staging pass now
    Process {
        /// Use fallback vectors instead of calling staged models
        #[arg(long)]
        force_fallback: bool,
    },
}

/// Parse `MODEL=WEIGHT`.
fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (model, weight) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected MODEL=WEIGHT, got '{raw}'"))?;
    if model.is_empty() {
        return Err(format!("missing model in '{raw}'"));
    }
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight in '{raw}'"))?;
    if !weight.is_finite() {
        return Err(format!("invalid weight in '{raw}'"));
    }
    Ok((model.to_string(), weight))
}
