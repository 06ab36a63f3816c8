use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use ro_tax_cli::app::{App, Cli, resolve_db_config};
use ro_tax_cli::config::AppConfig;
use ro_tax_cli::logging;

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    let log_level = cli.log_level.as_deref().or(config.logging.level.as_deref());
    let log_file = cli.log_file.as_deref().or(config.logging.file.as_deref());
    logging::init_logging(log_level, log_file)?;

    let db_config = resolve_db_config(&cli, &config);
    debug!(backend = %db_config.backend, db = %db_config.connection_string, "resolved database");

    let app = App::from_config(&config, db_config)?;
    let output = app.run(cli.command).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
