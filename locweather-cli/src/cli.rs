use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Select, Text, validator::Validation};
use locweather_core::{
    Config, Coordinates, FetchOrchestrator, SnapshotStore, UnitSystem,
    network::{AssumeOnline, ConnectivityProbe, SystemConnectivity},
    provider::client_from_config,
};

use crate::{
    host::{ConfiguredLocation, TerminalProgress},
    render,
};

const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "locweather", version, about = "Current weather for your location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, unit system and location.
    Configure,

    /// Fetch fresh weather for the current location, then show it.
    Refresh {
        /// Latitude of the fix; overrides the configured location.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the fix; overrides the configured location.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Unit system to request: "metric" or "imperial".
        #[arg(long)]
        units: Option<String>,

        /// Skip the connectivity check.
        #[arg(long)]
        assume_online: bool,
    },

    /// Show the last stored weather without fetching.
    Show,

    /// Forget the stored weather.
    Clear,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Refresh {
                lat,
                lon,
                units,
                assume_online,
            } => {
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                refresh(coords, units.as_deref(), assume_online).await
            }
            Command::Show => show(),
            Command::Clear => {
                SnapshotStore::default_location()?.clear()?;
                println!("Stored weather cleared.");
                Ok(())
            }
        }
    }
}

fn load_config() -> Result<Config> {
    let mut config = Config::load()?;

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.api_key = Some(key);
    }

    Ok(config)
}

async fn refresh(
    coords: Option<Coordinates>,
    units: Option<&str>,
    assume_online: bool,
) -> Result<()> {
    let config = load_config()?;
    let units = match units {
        Some(s) => UnitSystem::try_from(s)?,
        None => config.units,
    };

    let api = client_from_config(&config)?;
    let store = SnapshotStore::default_location()?;
    let connectivity: Box<dyn ConnectivityProbe> = if assume_online {
        Box::new(AssumeOnline)
    } else {
        Box::new(SystemConnectivity)
    };

    let location = ConfiguredLocation::new(coords.or_else(|| config.coordinates()));

    let orchestrator = FetchOrchestrator::new(Box::new(location), connectivity, api, store)
        .with_units(units)
        .with_progress(Box::new(TerminalProgress))
        .with_fix_timeout(config.fix_timeout());

    let outcome = orchestrator.run().await;
    if !outcome.is_success() {
        eprintln!("{}", outcome.notice());
    }

    // The previous snapshot stays on screen when this attempt failed.
    render::print_stored(orchestrator.store(), &render::region(&config), Some(units));
    Ok(())
}

fn show() -> Result<()> {
    let config = load_config()?;
    let store = SnapshotStore::default_location()?;

    render::print_stored(&store, &render::region(&config), None);
    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_default(config.api_key.as_deref().unwrap_or_default())
        .with_validator(|s: &str| {
            Ok(if s.trim().is_empty() {
                Validation::Invalid("API key must not be empty".into())
            } else {
                Validation::Valid
            })
        })
        .prompt()
        .context("Failed to read API key")?;
    config.api_key = Some(api_key.trim().to_string());

    let options = vec![UnitSystem::Imperial, UnitSystem::Metric];
    let start = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Unit system:", options)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read unit system")?;

    let latitude = prompt_coordinate("Latitude:", config.location.latitude, 90.0)?;
    let longitude = prompt_coordinate("Longitude:", config.location.longitude, 180.0)?;
    config.set_coordinates(Coordinates::new(latitude, longitude));

    let region = Text::new("Region code for the unit label (blank = from locale):")
        .with_default(config.region.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read region")?;
    config.region = Some(region.trim().to_ascii_uppercase()).filter(|r| !r.is_empty());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn prompt_coordinate(label: &str, current: Option<f64>, limit: f64) -> Result<f64> {
    let default = current.map(|v| v.to_string()).unwrap_or_default();

    let answer = Text::new(label)
        .with_default(&default)
        .with_validator(move |s: &str| {
            Ok(match s.trim().parse::<f64>() {
                Ok(v) if v.abs() <= limit => Validation::Valid,
                _ => Validation::Invalid(
                    format!("Enter a number between -{limit} and {limit}").into(),
                ),
            })
        })
        .prompt()
        .with_context(|| format!("Failed to read {label}"))?;

    answer
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {label}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn refresh_parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "locweather",
            "refresh",
            "--lat",
            "47.61",
            "--lon",
            "-122.33",
            "--units",
            "metric",
        ])
        .unwrap();

        match cli.command {
            Command::Refresh {
                lat,
                lon,
                units,
                assume_online,
            } => {
                assert_eq!(lat, Some(47.61));
                assert_eq!(lon, Some(-122.33));
                assert_eq!(units.as_deref(), Some("metric"));
                assert!(!assume_online);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn refresh_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["locweather", "refresh", "--lat", "1.0"]).is_err());
    }
}
