use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::model::WeatherSnapshot;

/// Key the latest snapshot is stored under.
pub const WEATHER_RESPONSE_KEY: &str = "weather_response_data";

const PREFERENCES_FILE: &str = "preferences.json";

type Preferences = BTreeMap<String, String>;

/// Holds the single most recent weather snapshot inside a private
/// key-value preferences file. Every save overwrites the previous value.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "locweather", "locweather")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self::open(dirs.data_dir().join(PREFERENCES_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &WeatherSnapshot) -> Result<()> {
        let blob =
            serde_json::to_string(snapshot).context("Failed to serialize weather snapshot")?;

        let mut prefs = self.existing_preferences()?;
        prefs.insert(WEATHER_RESPONSE_KEY.to_string(), blob);
        self.write_preferences(&prefs)?;

        tracing::info!(
            path = %self.path.display(),
            location = %snapshot.location_name,
            "saved weather snapshot"
        );
        Ok(())
    }

    /// Latest snapshot, or `None` if nothing was saved or the stored value
    /// cannot be read back.
    pub fn load(&self) -> Option<WeatherSnapshot> {
        let prefs = match self.read_preferences() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences file: {e:#}");
                return None;
            }
        };

        let blob = prefs.get(WEATHER_RESPONSE_KEY).filter(|s| !s.is_empty())?;

        match serde_json::from_str(blob) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Ignoring malformed stored weather snapshot: {e}");
                None
            }
        }
    }

    /// Remove the stored snapshot, keeping any other preferences.
    pub fn clear(&self) -> Result<()> {
        let Some(mut prefs) = self.read_preferences().ok().flatten() else {
            return Ok(());
        };

        if prefs.remove(WEATHER_RESPONSE_KEY).is_some() {
            self.write_preferences(&prefs)?;
        }
        Ok(())
    }

    /// Current preferences for a read-modify-write. An unreadable file is
    /// moved aside to `<name>.bak` so its other keys are not lost silently.
    fn existing_preferences(&self) -> Result<Preferences> {
        match self.read_preferences() {
            Ok(prefs) => Ok(prefs.unwrap_or_default()),
            Err(e) => {
                let backup = self.backup_path();
                tracing::warn!(
                    backup = %backup.display(),
                    "Replacing unreadable preferences file: {e:#}"
                );
                fs::rename(&self.path, &backup).with_context(|| {
                    format!("Failed to move aside preferences file: {}", self.path.display())
                })?;
                Ok(Preferences::new())
            }
        }
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn read_preferences(&self) -> Result<Option<Preferences>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences file: {}", self.path.display()))?;

        let prefs = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences file: {}", self.path.display()))?;

        Ok(Some(prefs))
    }

    fn write_preferences(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json =
            serde_json::to_string_pretty(prefs).context("Failed to serialize preferences")?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write preferences file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("Failed to replace preferences file: {}", self.path.display())
        })?;

        Ok(())
    }
}
