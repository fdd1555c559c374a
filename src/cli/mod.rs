mod forecast;
mod prompt;

pub use forecast::*;

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "weather")]
#[command(
    about = "Lists the daily temperature forecast of the given latitude and longitude",
    long_about = None
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(allow_negative_numbers = true)]
struct Cli {
    #[command(flatten)]
    args: ForecastArgs,
    /// Read settings from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log request details to stderr
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app_config = match cli.config {
        Some(path) => AppConfig::from_path(path),
        None => AppConfig::new()?,
    };
    debug!(path = %app_config.config_file_path().display(), "resolving settings");
    let settings = app_config.load()?;

    forecast(cli.args, &settings).await
}
