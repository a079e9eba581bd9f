use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::{Coordinates, UnitSystem};

/// Where the fix comes from when no platform location service is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Give up waiting for a fix after this many seconds.
    pub fix_timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// region = "GB"
///
/// [location]
/// latitude = 51.5
/// longitude = -0.12
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather `appid`.
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: UnitSystem,

    /// Override for the API base, e.g. `https://api.openweathermap.org/data/2.5`.
    pub base_url: Option<String>,

    /// Region code used for the unit label, e.g. "US".
    pub region: Option<String>,

    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `locweather configure` and enter your OpenWeather API key."
            )
        })
    }

    /// Configured coordinates, if both halves are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    pub fn set_coordinates(&mut self, coords: Coordinates) {
        self.location.latitude = Some(coords.latitude);
        self.location.longitude = Some(coords.longitude);
    }

    pub fn fix_timeout(&self) -> Option<Duration> {
        self.location.fix_timeout_secs.map(Duration::from_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "locweather", "locweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `locweather configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = Config {
            api_key: Some("   ".into()),
            ..Config::default()
        };
        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn parses_full_toml() {
        let cfg = Config::from_toml(
            r#"
            api_key = "OPEN_KEY"
            units = "metric"
            region = "CA"
            request_timeout_secs = 10

            [location]
            latitude = 43.65
            longitude = -79.38
            fix_timeout_secs = 30
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.api_key().unwrap(), "OPEN_KEY");
        assert_eq!(cfg.units, UnitSystem::Metric);
        assert_eq!(cfg.region.as_deref(), Some("CA"));
        assert_eq!(cfg.coordinates(), Some(Coordinates::new(43.65, -79.38)));
        assert_eq!(cfg.fix_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = Config::from_toml("").expect("empty config is valid");

        assert_eq!(cfg.units, UnitSystem::Imperial);
        assert!(cfg.coordinates().is_none());
        assert!(cfg.fix_timeout().is_none());
    }

    #[test]
    fn half_configured_location_has_no_coordinates() {
        let cfg = Config::from_toml("[location]\nlatitude = 10.0\n").unwrap();
        assert!(cfg.coordinates().is_none());
    }

    #[test]
    fn set_coordinates_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_coordinates(Coordinates::new(47.61, -122.33));

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml(&text).unwrap();

        assert_eq!(parsed.coordinates(), Some(Coordinates::new(47.61, -122.33)));
    }

    #[test]
    fn unknown_units_fail_to_parse() {
        assert!(Config::from_toml("units = \"kelvin\"").is_err());
    }
}
