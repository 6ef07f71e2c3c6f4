use anyhow::Result;
use clap::Parser;

use engify::cli::Cli;
use engify::config::Config;
use engify::observability::init_tracing_with_level;
use engify::utils::error::report_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        Config::load_custom(config_path)?
    } else {
        Config::ensure_config_exists()?;
        Config::load()?
    };

    let level = if cli.debug { "debug" } else { config.logging.level.as_str() };
    init_tracing_with_level(level);

    if let Err(e) = cli.command.execute(config).await {
        report_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
