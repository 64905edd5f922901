use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use skycast_core::{
    Config, Coordinate, LoadState, LocationEvent, Orchestrator, ProviderError, Units,
    WeatherProvider, WeatherReport, location, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and 7-day outlook")]
pub struct Cli {
    /// Unit system for this run, overriding the configured one.
    #[arg(long, global = true, value_parser = parse_units)]
    pub units: Option<Units>,

    #[command(subcommand)]
    pub command: Command,
}

fn parse_units(value: &str) -> Result<Units> {
    Units::try_from(value)
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred units.
    Configure,

    /// Look up places by name.
    Search {
        /// City name, optionally with state and country code ("Paris,FR").
        query: String,

        #[arg(long, default_value_t = 5)]
        limit: u32,
    },

    /// Show current conditions and the daily outlook.
    Show {
        #[command(flatten)]
        place: PlaceArgs,

        /// Remember this place as the default.
        #[arg(long)]
        save: bool,
    },

    /// Show the hourly breakdown for one day of the outlook (0 = first day).
    Day {
        index: usize,

        #[command(flatten)]
        place: PlaceArgs,
    },
}

/// Where to load weather for. Falls back to the configured default.
#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Place name, resolved through geocoding (first match wins).
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        let mut stored = config.clone();
        if let Some(units) = self.units {
            config.units = units;
        }
        tracing::debug!(units = %config.units, has_key = config.resolve_api_key().is_some(), "config loaded");

        match self.command {
            Command::Configure => configure(&mut stored),
            Command::Search { query, limit } => {
                let provider = provider_from_config(&config);
                let found = provider
                    .search_locations(&query, limit)
                    .await
                    .map_err(provider_failure)?;
                print!("{}", render::search_results(&found));
                Ok(())
            }
            Command::Show { place, save } => {
                let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config));
                let event = resolve_place(provider.as_ref(), &place, &config).await?;
                let report = load(provider, event.clone()).await?;
                print!("{}", render::report(&report, config.units));

                if save {
                    if let Some((name, coord)) = event.target() {
                        stored.set_default_location(name, coord);
                        stored.save()?;
                        println!("Saved as default location.");
                    }
                }
                Ok(())
            }
            Command::Day { index, place } => {
                let provider: Arc<dyn WeatherProvider> = Arc::from(provider_from_config(&config));
                let event = resolve_place(provider.as_ref(), &place, &config).await?;
                let report = load(provider, event).await?;
                let day = report.days.get(index).ok_or_else(|| {
                    anyhow!(
                        "Day {index} is out of range; the outlook has {} day(s).",
                        report.days.len()
                    )
                })?;
                print!("{}", render::day_detail(day, &report.current, config.units));
                Ok(())
            }
        }
    }
}

fn configure(config: &mut Config) -> Result<()> {
    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let units = Select::new("Units:", Units::all().to_vec())
        .prompt()
        .context("Failed to read units")?;

    config.set_api_key(key);
    config.units = units;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Wrap a provider failure so the user-facing text is shown first.
fn provider_failure(e: ProviderError) -> anyhow::Error {
    let message = e.user_message();
    anyhow::Error::new(e).context(message)
}

/// Turn CLI arguments into a location event.
async fn resolve_place(
    provider: &dyn WeatherProvider,
    args: &PlaceArgs,
    config: &Config,
) -> Result<LocationEvent> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        return Ok(LocationEvent::DeviceFix {
            coord: Coordinate::new(lat, lon),
            name: None,
        });
    }

    if let Some(city) = &args.city {
        let found = provider
            .search_locations(city, 1)
            .await
            .map_err(provider_failure)?;
        let first = found
            .first()
            .ok_or_else(|| anyhow!("No place found matching '{city}'."))?;
        return Ok(LocationEvent::from(first));
    }

    let saved = config.default_location.as_ref().ok_or_else(|| {
        anyhow!(
            "No location given.\n\
             Hint: pass --city <name> or --lat/--lon, or run `skycast show --city <name> --save`."
        )
    })?;
    Ok(LocationEvent::Selected {
        name: saved.name.clone(),
        coord: saved.coordinate(),
    })
}

/// Feed one location event through the orchestrator and wait for its result.
async fn load(provider: Arc<dyn WeatherProvider>, event: LocationEvent) -> Result<WeatherReport> {
    let orchestrator = Arc::new(Orchestrator::new(provider));
    let (tx, rx) = location::channel(1);
    tx.send(event)
        .await
        .context("Location channel closed unexpectedly")?;
    drop(tx);

    Arc::clone(&orchestrator).run(rx).await;

    let state = orchestrator.snapshot();
    match state.status {
        LoadState::Loaded(report) => Ok(*report),
        LoadState::Failed { message } => Err(anyhow!("{message} Run the command again to retry.")),
        LoadState::Idle | LoadState::Loading => Err(anyhow!("Weather did not finish loading.")),
    }
}
