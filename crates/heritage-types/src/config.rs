//! Configuration loading for the heritage library.
//!
//! Layered config: defaults -> config file -> HERITAGE__* env vars ->
//! legacy env names -> CLI flags (applied by the caller).
//! Default config file lives at ~/.config/artifact-heritage/config.toml.

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::HeritageError;

/// How the sleep daemon treats a tick that fires while the previous
/// pass is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapMode {
    /// Skip the tick while a pass holds the run-lock.
    #[default]
    Skip,
    /// Start another pass regardless; overlapping passes rely on
    /// remove-by-key being a no-op for entries already consumed.
    Concurrent,
}

/// External embedding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Base URL of the Ollama-compatible server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Length of fallback vectors
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Degrade to the fallback vector when a model is unavailable.
    /// When false the provider error reaches the caller and the
    /// indexer stages the pair instead.
    #[serde(default = "default_true")]
    pub fallback_on_error: bool,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_dimension() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            dimension: default_dimension(),
            fallback_on_error: true,
        }
    }
}

/// Sleep daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSettings {
    /// Start the daemon when a long-lived host boots
    #[serde(default)]
    pub start_on_boot: bool,

    /// Tick interval in milliseconds; 0 selects the default
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Default embedding model, recorded in the daemon configuration.
    /// Passes still process every staged entry with its own model.
    #[serde(default)]
    pub model: Option<String>,

    /// Use fallback vectors instead of calling the staged model
    #[serde(default)]
    pub force_fallback: bool,

    /// Overlapping tick policy
    #[serde(default)]
    pub overlap: OverlapMode,
}

fn default_interval_ms() -> u64 {
    60_000
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            start_on_boot: false,
            interval_ms: default_interval_ms(),
            model: None,
            force_fallback: false,
            overlap: OverlapMode::default(),
        }
    }
}

/// Artifact generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Default generation model
    #[serde(default)]
    pub model: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base directory holding `heritage/` and `staging-embeddings/`
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub daemon: DaemonSettings,

    #[serde(default)]
    pub generator: GeneratorSettings,
}

fn default_base_dir() -> String {
    "/tmp/mcp-creative-memory".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            log_level: default_log_level(),
            embedding: EmbeddingSettings::default(),
            daemon: DaemonSettings::default(),
            generator: GeneratorSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/artifact-heritage/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (HERITAGE__*)
    /// 5. Legacy environment names (MEMORY_DIR, OLLAMA_BASE_URL, ...)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, HeritageError> {
        Self::load_with(cli_config_path, |name| std::env::var(name).ok())
    }

    /// Like [`Settings::load`] but reads legacy variables through `lookup`.
    pub fn load_with<F>(cli_config_path: Option<&str>, lookup: F) -> Result<Self, HeritageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = ProjectDirs::from("", "", "artifact-heritage")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // HERITAGE__BASE_DIR, HERITAGE__EMBEDDING__TIMEOUT_SECS, ...
        builder = builder.add_source(
            Environment::with_prefix("HERITAGE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder = apply_legacy_env(builder, &lookup).map_err(cfg_err)?;

        let settings: Settings = builder
            .build()
            .map_err(cfg_err)?
            .try_deserialize()
            .map_err(cfg_err)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), HeritageError> {
        if self.embedding.dimension == 0 {
            return Err(HeritageError::Config(
                "embedding.dimension must be > 0".to_string(),
            ));
        }
        if self.embedding.timeout_secs == 0 || self.generator.timeout_secs == 0 {
            return Err(HeritageError::Config("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    /// Base directory with a leading `~/` expanded
    pub fn expanded_base_dir(&self) -> PathBuf {
        if let Some(rest) = self.base_dir.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.base_dir)
    }
}

fn cfg_err(e: config::ConfigError) -> HeritageError {
    HeritageError::Config(e.to_string())
}

/// Environment names used by earlier deployments of the heritage server.
fn apply_legacy_env<F>(
    builder: ConfigBuilder<DefaultState>,
    lookup: &F,
) -> Result<ConfigBuilder<DefaultState>, config::ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let flag = |name: &str| lookup(name).map(|v| v.eq_ignore_ascii_case("true"));
    let interval = lookup("SLEEP_INTERVAL_MS").and_then(|v| v.trim().parse::<i64>().ok());

    builder
        .set_override_option("base_dir", lookup("MEMORY_DIR"))?
        .set_override_option("embedding.base_url", lookup("OLLAMA_BASE_URL"))?
        .set_override_option("daemon.start_on_boot", flag("START_SLEEP_ON_BOOT"))?
        .set_override_option("daemon.interval_ms", interval)?
        .set_override_option(
            "daemon.model",
            lookup("DEFAULT_EMBEDDING_MODEL").filter(|m| !m.is_empty()),
        )?
        .set_override_option("daemon.force_fallback", flag("SLEEP_FORCE_FALLBACK"))
}
