use crate::api::{ForecastProvider, OpenMeteoClient};
use crate::cli::prompt::ask_temperature_unit;
use crate::config::Settings;
use crate::models::{ForecastQuery, TemperatureUnit, DEFAULT_FORECAST_DAYS};
use crate::output::{print_forecast, OutputFormat};
use anyhow::{Context, Result};
use atty::Stream;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
    /// Number of days to forecast
    #[arg(short, long, default_value_t = DEFAULT_FORECAST_DAYS)]
    pub days: u32,
    /// Temperature unit; asked interactively when omitted
    #[arg(short, long, value_enum)]
    pub unit: Option<TemperatureUnit>,
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,
}

fn progress_bar() -> ProgressBar {
    if !atty::is(Stream::Stderr) {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:28} {percent:>3}%") {
        bar.set_style(style);
    }
    bar
}

pub async fn forecast(args: ForecastArgs, settings: &Settings) -> Result<()> {
    let client = OpenMeteoClient::new(settings)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut prompt_out = io::stderr();
    let mut out = io::stdout();

    execute(
        &args,
        &client,
        &mut input,
        &mut prompt_out,
        &mut out,
        &progress_bar(),
    )
    .await
}

/// Prompt, fetch, render. Nothing reaches `out` unless the fetch succeeds.
pub async fn execute<P, R, E, W>(
    args: &ForecastArgs,
    provider: &P,
    input: &mut R,
    prompt_out: &mut E,
    out: &mut W,
    progress: &ProgressBar,
) -> Result<()>
where
    P: ForecastProvider,
    R: BufRead,
    E: Write,
    W: Write,
{
    let unit = match args.unit {
        Some(unit) => unit,
        None => ask_temperature_unit(input, prompt_out)?,
    };

    let query = ForecastQuery::new(args.lat, args.lng, args.days, unit);
    info!(
        latitude = query.latitude,
        longitude = query.longitude,
        days = query.forecast_days,
        unit = %query.temperature_unit,
        "fetching forecast"
    );

    progress.set_position(50);
    let rows = match provider.daily_forecast(&query).await {
        Ok(rows) => rows,
        Err(err) => {
            progress.abandon();
            warn!(error = %err, "forecast request failed");
            let message = err.user_message();
            return Err(err).context(message);
        }
    };
    progress.set_position(100);
    progress.finish_and_clear();

    print_forecast(&rows, args.output, out)
}
