use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use trmnl_core::Config;
use trmnl_quotes::{DisabledGenerator, GeminiClient, QuoteGenerator, QuotePolicy, QuoteService};
use trmnl_services::{Scheduler, WeatherPipeline};

/// Days of forecast fetched for one-off and scheduled pushes.
const FORECAST_DAYS: u32 = 1;

#[derive(Debug, Parser)]
#[command(name = "trmnl-plugin", version, about = "Weather and literary quotes for TRMNL displays")]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Location to report instead of the configured default
    #[arg(long, value_name = "NAME")]
    location: Option<String>,

    /// Push one update and exit
    #[arg(long)]
    once: bool,

    /// Print the view as JSON without sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    trmnl_core::init()?;

    let (config, _validation) = Config::load_validated(cli.config.as_deref())?;
    let location = cli
        .location
        .clone()
        .unwrap_or_else(|| config.weather.default_location.clone());

    let quotes = Arc::new(quote_service(&config)?);
    let pipeline = Arc::new(WeatherPipeline::from_config(&config, Some(quotes))?);

    if cli.dry_run {
        let view = pipeline.build_view(&location, FORECAST_DAYS).await?;
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if cli.once {
        match pipeline.push(&location, FORECAST_DAYS).await {
            Ok(view) => {
                tracing::info!("Pushed weather for {}", view.location_name);
                return Ok(());
            }
            Err(e) => {
                eprintln!("{}", e.user_message());
                return Err(e.into());
            }
        }
    }

    let handle = Scheduler::new(pipeline, &config.scheduler, &location).start();
    tracing::info!("TRMNL weather plugin running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    handle.shutdown().await;

    Ok(())
}

fn quote_service(config: &Config) -> Result<QuoteService> {
    let generator: Arc<dyn QuoteGenerator> = if config.gemini.is_configured() {
        Arc::new(GeminiClient::from_config(&config.gemini)?)
    } else {
        tracing::info!("Gemini API key not set; quotes limited to cache and fallbacks");
        Arc::new(DisabledGenerator)
    };

    Ok(QuoteService::new(
        generator,
        QuotePolicy::from_config(&config.quotes, &config.gemini),
    ))
}
