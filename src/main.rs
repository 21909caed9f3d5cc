// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use event_relay::config::{
    ConfigStore, EnvConfigStore, RuntimeBuilder, Settings, YamlConfigStore,
};
use event_relay::engine::QueueConsumer;
use event_relay::ingest::{self, IngestState};
use event_relay::observability::messages::ingest::IngestServerStarted;
use event_relay::observability::messages::StructuredLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConfigBackend {
    /// Environment variables (`consumer.wait_seconds` -> `CONSUMER_WAIT_SECONDS`)
    Env,
    /// A YAML file given with `--config-file`
    Yaml,
}

/// Accepts events over HTTP, queues them, and routes them to output handlers.
#[derive(Debug, Parser)]
#[command(name = "event-relay", version, about)]
struct Cli {
    /// Where configuration values come from
    #[arg(long, value_enum, default_value_t = ConfigBackend::Env)]
    config_backend: ConfigBackend,

    /// YAML configuration file
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// HTTP listen address; a leading ':' binds all interfaces [default: :3000]
    #[arg(long)]
    listen: Option<String>,

    /// SQS queue URL; without one a process-local queue is used
    #[arg(long, env = "SQS_QUEUE_URL")]
    sqs_queue_url: Option<String>,
}

impl Cli {
    fn config_store(&self) -> anyhow::Result<Box<dyn ConfigStore>> {
        match (self.config_backend, &self.config_file) {
            (ConfigBackend::Env, _) => Ok(Box::new(EnvConfigStore::from_env())),
            (ConfigBackend::Yaml, Some(path)) => Ok(Box::new(YamlConfigStore::load(path)?)),
            (ConfigBackend::Yaml, None) => bail!("--config-backend yaml requires --config-file"),
        }
    }

    fn settings(&self) -> anyhow::Result<Settings> {
        let store = self.config_store()?;
        tracing::info!(backend = store.name(), "Loading configuration");

        let mut settings = Settings::from_store(store.as_ref())?;
        if let Some(listen) = &self.listen {
            settings.listen = Some(listen.clone());
        }
        if let Some(url) = &self.sqs_queue_url {
            settings.queue.url = Some(url.clone());
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings().context("Invalid configuration")?;

    let queue = RuntimeBuilder::queue_client(&settings.queue).context("Unable to set up queue")?;
    let registry = Arc::new(
        RuntimeBuilder::registry(&settings).context("Unable to register handlers")?,
    );

    let shutdown = CancellationToken::new();

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;
    let app = ingest::router(&registry, IngestState::new(Arc::clone(&queue)));

    let prefixes: Vec<&str> = registry.input_handlers().map(|(prefix, _)| prefix).collect();
    IngestServerStarted {
        addr: &addr,
        prefixes: &prefixes,
    }
    .log();

    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        })
    };

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown requested, draining in-flight messages"),
                Err(error) => tracing::error!(error = %error, "Unable to listen for shutdown signal"),
            }
            shutdown.cancel();
        });
    }

    let consumer = QueueConsumer::new(queue, registry, settings.consumer.clone());
    let consumed = consumer.run(shutdown.clone()).await;

    // Stop the HTTP side too when the consumer gave up
    shutdown.cancel();
    server
        .await
        .context("HTTP server task failed")?
        .context("HTTP server failed")?;

    consumed.context("Queue consumer stopped")?;
    Ok(())
}
