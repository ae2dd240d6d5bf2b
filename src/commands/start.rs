use anyhow::{Context, Result};
use colored::Colorize;
use salary_predictor::{artifacts::Artifacts, config, init_tracing, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// This will:
/// 1. Load configuration
/// 2. Initialize tracing from it
/// 3. Load the model and encoders (fatal on failure)
/// 4. Start the server
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting salary predictor...".green());

    let cfg = config::load_config(config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    init_tracing(&cfg.server.log_level, &cfg.server.log_format);
    info!(config = %config_path.display(), "Configuration loaded");

    let artifacts = Artifacts::load(&cfg.artifacts)
        .context("cannot start without the model and encoder artifacts")?;

    server::start_server(cfg, artifacts).await?;

    Ok(())
}
