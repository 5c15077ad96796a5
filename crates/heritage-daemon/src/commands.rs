//! Command implementations.
//!
//! Every command runs against an [`App`] built from layered settings and
//! returns a JSON value for the binary to print.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tokio::signal;
use tracing::info;

use heritage_embeddings::{Embedder, HeritageEmbedder, OllamaClient};
use heritage_indexing::{Indexer, ModelSelection, ProcessOptions, StagingProcessor};
use heritage_scheduler::{DaemonOptions, SleepDaemon};
use heritage_search::{SearchRequest, SemanticSearcher};
use heritage_storage::{ArtifactQuery, ArtifactStore, StagingQueue};
use heritage_types::{Artifact, Settings};

use crate::cli::{Cli, Commands, StagingCommands};
use crate::generator::{ArtifactGenerator, GenerateOptions};

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(base_dir) = &cli.base_dir {
        settings.base_dir = base_dir.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    settings.validate().context("Invalid configuration")?;
    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level. Logs go to stderr; stdout carries command output.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Shared state for command execution.
pub struct App {
    settings: Settings,
    base_dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    generator: ArtifactGenerator,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let embedder = HeritageEmbedder::from_settings(&settings.embedding)
            .context("Failed to build embedding client")?;
        Self::with_embedder(settings, Arc::new(embedder))
    }

    /// Build with a caller-supplied embedder.
    pub fn with_embedder(settings: Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let client = OllamaClient::new(
            settings.embedding.base_url.clone(),
            Duration::from_secs(settings.generator.timeout_secs),
        )
        .context("Failed to build generation client")?;

        Ok(Self {
            base_dir: settings.expanded_base_dir(),
            generator: ArtifactGenerator::new(client),
            settings,
            embedder,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start the process-wide sleep daemon when configured to run on boot.
    ///
    /// For hosts that keep the runtime alive after booting. The CLI's
    /// `run` command starts the daemon itself.
    pub fn boot(&self) -> Result<()> {
        if self.settings.daemon.start_on_boot {
            let config = self.start_daemon(DaemonOptions::from(&self.settings.daemon))?;
            info!(interval_ms = config.interval_ms, "Sleep daemon started on boot");
        }
        Ok(())
    }

    /// Run one command and return its JSON output.
    pub async fn execute(&self, command: Commands) -> Result<Value> {
        let output = match command {
            Commands::Index { models } => {
                let report = Indexer::new(&self.base_dir, self.embedder.clone())
                    .index(&ModelSelection::from(models))
                    .await
                    .context("Index pass failed")?;
                serde_json::to_value(report)?
            }
            Commands::Search {
                query,
                top_k,
                model,
                models,
                weights,
            } => {
                let mut request = SearchRequest::new(query)
                    .with_top_k(top_k)
                    .with_models(models);
                if let Some(model) = model {
                    request = request.with_model(model);
                }
                for (model, weight) in weights {
                    request = request.with_weight(model, weight);
                }
                let hits = SemanticSearcher::new(&self.base_dir, self.embedder.clone())
                    .search(&request)
                    .await;
                serde_json::to_value(hits)?
            }
            Commands::List { tag, model } => {
                let query = ArtifactQuery { tag, model };
                serde_json::to_value(self.store().query(&query)?)?
            }
            Commands::Record { text, tags } => {
                if text.trim().is_empty() {
                    bail!("artifact text must not be empty");
                }
                let artifact = Artifact::record(text, tags);
                self.store().save(&artifact)?;
                serde_json::to_value(artifact)?
            }
            Commands::Generate {
                model,
                prompt,
                system_prompt,
            } => {
                let options = GenerateOptions {
                    model: model.or_else(|| self.settings.generator.model.clone()),
                    prompt,
                    system_prompt,
                };
                let artifact = self.generator.generate(&options).await;
                self.store().save(&artifact)?;
                serde_json::to_value(artifact)?
            }
            Commands::Staging(command) => self.execute_staging(command).await?,
            Commands::Run {
                interval_ms,
                model,
                force_fallback,
            } => {
                let mut options = DaemonOptions::from(&self.settings.daemon);
                if let Some(interval_ms) = interval_ms {
                    options.interval_ms = interval_ms;
                }
                if model.is_some() {
                    options.model = model;
                }
                options.force_fallback |= force_fallback;
                self.run_daemon(options).await?
            }
        };
        Ok(output)
    }

    async fn execute_staging(&self, command: StagingCommands) -> Result<Value> {
        let staging = StagingQueue::new(&self.base_dir);
        let output = match command {
            StagingCommands::List => serde_json::to_value(staging.list()?)?,
            StagingCommands::Add { artifact_id, model } => {
                serde_json::to_value(staging.add(&artifact_id, &model)?)?
            }
            StagingCommands::Remove { artifact_id, model } => {
                json!({ "removed": staging.remove(&artifact_id, &model)? })
            }
            StagingCommands::Process { force_fallback } => {
                let options = ProcessOptions::new().with_force_fallback(force_fallback);
                let results = StagingProcessor::new(&self.base_dir, self.embedder.clone())
                    .process(&options)
                    .await
                    .context("Staging pass failed")?;
                serde_json::to_value(results)?
            }
        };
        Ok(output)
    }

    fn start_daemon(&self, options: DaemonOptions) -> Result<heritage_scheduler::DaemonConfig> {
        SleepDaemon::global()
            .start(&self.base_dir, options, self.embedder.clone())
            .context("Failed to start sleep daemon")
    }

    /// Start the daemon, wait for Ctrl-C, stop it and report final status.
    async fn run_daemon(&self, options: DaemonOptions) -> Result<Value> {
        self.start_daemon(options)?;
        info!("Sleep daemon running, press Ctrl-C to stop");

        signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;

        let daemon = SleepDaemon::global();
        let status = daemon.status();
        daemon.stop();
        Ok(serde_json::to_value(status)?)
    }

    fn store(&self) -> ArtifactStore {
        ArtifactStore::new(&self.base_dir)
    }
}
