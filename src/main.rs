//! Spendweb main entry point

use anyhow::Context;
use clap::Parser;
use spendweb_api::start_server;
use spendweb_config::{Config, ConfigError};
use spendweb_core::ViewCoordinator;
use spendweb_provider::InMemoryProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "spendweb")]
#[command(author = "Spendweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Browse and approve employee transactions page by page", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (config, missing) = match Config::load(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            eprintln!("{}", e.report());
            return Err(e).context("Failed to load configuration");
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    if missing {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
    }

    let rt = Runtime::new()?;

    rt.block_on(async {
        let data_path = config.mock_data_path();
        log::info!("Loading mock data from {}", data_path.display());

        let provider = InMemoryProvider::load(&data_path)
            .await
            .with_context(|| format!("Failed to load mock data from {}", data_path.display()))?
            .with_latency(Duration::from_millis(config.data.latency_ms));

        let view = Arc::new(ViewCoordinator::new(
            Arc::new(provider),
            config.pagination.default_page_size,
        ));

        if let Err(e) = view.mount().await {
            log::error!("Initial load failed: {}", e);
        }

        start_server(config, view).await?;
        Ok::<(), anyhow::Error>(())
    })
}
