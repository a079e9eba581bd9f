//! Terminal implementations of the pipeline's platform seams.

use std::io::Write;

use async_trait::async_trait;
use locweather_core::{
    Coordinates, FixedLocation, LocationError, LocationSource, Permission, ProgressIndicator,
};

/// Location from `--lat/--lon` or the config file.
#[derive(Debug)]
pub struct ConfiguredLocation(FixedLocation);

impl ConfiguredLocation {
    pub fn new(coords: Option<Coordinates>) -> Self {
        Self(FixedLocation::new(coords))
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocation {
    fn is_enabled(&self) -> bool {
        self.0.is_enabled()
    }

    fn prompt_enable(&self) {
        eprintln!(
            "Hint: pass --lat/--lon, or run `locweather configure` to store a default location."
        );
    }

    async fn request_permission(&self) -> Permission {
        self.0.request_permission().await
    }

    async fn request_fix(&self) -> Result<Coordinates, LocationError> {
        self.0.request_fix().await
    }
}

/// One-line "working" indicator on stderr.
#[derive(Debug)]
pub struct TerminalProgress;

impl ProgressIndicator for TerminalProgress {
    fn show(&self) {
        let mut err = std::io::stderr();
        let _ = write!(err, "Fetching weather...");
        let _ = err.flush();
    }

    fn hide(&self) {
        // Carriage return plus erase-line.
        let mut err = std::io::stderr();
        let _ = write!(err, "\r\x1b[K");
        let _ = err.flush();
    }
}
