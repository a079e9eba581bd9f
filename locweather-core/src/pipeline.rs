//! Single-shot fetch pipeline: location fix, connectivity check, API call,
//! snapshot write.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::{
    error::{LocationError, PipelineError},
    location::LocationSource,
    model::{UnitSystem, WeatherSnapshot},
    network::{ConnectivityProbe, is_network_available},
    provider::WeatherApi,
    store::SnapshotStore,
};

/// Busy indicator shown while the weather request is outstanding.
pub trait ProgressIndicator: Send + Sync + Debug {
    fn show(&self);
    fn hide(&self);
}

#[derive(Debug, Clone, Default)]
pub struct NoProgress;

impl ProgressIndicator for NoProgress {
    fn show(&self) {}
    fn hide(&self) {}
}

/// How a fetch attempt ended. Every run ends in exactly one of these.
#[derive(Debug)]
pub enum Terminal {
    Success(WeatherSnapshot),
    LocationDisabled,
    PermissionDenied,
    LocationUnavailable(LocationError),
    NoNetwork,
    Failed(PipelineError),
    /// Another run was still in flight; this trigger was ignored.
    AlreadyInFlight,
}

impl Terminal {
    pub fn is_success(&self) -> bool {
        matches!(self, Terminal::Success(_))
    }

    /// Short user-facing message for the outcome.
    pub fn notice(&self) -> String {
        match self {
            Terminal::Success(s) => format!("Weather updated for {}.", s.location_name),
            Terminal::LocationDisabled => {
                "Your location is turned off. Please turn it on.".to_string()
            }
            Terminal::PermissionDenied => {
                "You have denied location permission. Please allow it, it is mandatory.".to_string()
            }
            Terminal::LocationUnavailable(e) => format!("Could not determine your location: {e}"),
            Terminal::NoNetwork => "No internet connection available.".to_string(),
            Terminal::Failed(e) => format!("Could not update weather: {e}"),
            Terminal::AlreadyInFlight => "A weather update is already in progress.".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct FetchOrchestrator {
    location: Box<dyn LocationSource>,
    connectivity: Box<dyn ConnectivityProbe>,
    api: Box<dyn WeatherApi>,
    progress: Box<dyn ProgressIndicator>,
    store: SnapshotStore,
    units: UnitSystem,
    fix_timeout: Option<Duration>,
    in_flight: AtomicBool,
}

impl FetchOrchestrator {
    pub fn new(
        location: Box<dyn LocationSource>,
        connectivity: Box<dyn ConnectivityProbe>,
        api: Box<dyn WeatherApi>,
        store: SnapshotStore,
    ) -> Self {
        Self {
            location,
            connectivity,
            api,
            progress: Box::new(NoProgress),
            store,
            units: UnitSystem::default(),
            fix_timeout: None,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressIndicator>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_fix_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fix_timeout = timeout;
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one fetch attempt. Never retries; the stored snapshot is written
    /// only on success.
    pub async fn run(&self) -> Terminal {
        let Some(_flight) = FlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("fetch already in flight, ignoring trigger");
            return Terminal::AlreadyInFlight;
        };

        let outcome = self.run_inner().await;
        match &outcome {
            Terminal::Success(_) => {}
            Terminal::Failed(e) => tracing::error!("weather fetch failed: {e}"),
            other => tracing::warn!("weather fetch stopped: {}", other.notice()),
        }
        outcome
    }

    async fn run_inner(&self) -> Terminal {
        if !self.location.is_enabled() {
            self.location.prompt_enable();
            return Terminal::LocationDisabled;
        }

        if !self.location.request_permission().await.is_granted() {
            return Terminal::PermissionDenied;
        }

        let fix = match self.fix_timeout {
            Some(limit) => tokio::time::timeout(limit, self.location.request_fix())
                .await
                .unwrap_or(Err(LocationError::Timeout)),
            None => self.location.request_fix().await,
        };

        let coords = match fix {
            Ok(coords) => coords,
            Err(e) => return Terminal::LocationUnavailable(e),
        };
        tracing::info!(lat = coords.latitude, lon = coords.longitude, "received location fix");

        if !is_network_available(self.connectivity.as_ref()) {
            return Terminal::NoNetwork;
        }

        let result = {
            let _progress = ProgressGuard::show(self.progress.as_ref());
            self.api.fetch_weather(coords, self.units).await
        };

        match result {
            Ok(snapshot) => match self.store.save(&snapshot) {
                Ok(()) => Terminal::Success(snapshot),
                Err(e) => Terminal::Failed(PipelineError::Store(e)),
            },
            Err(e) => Terminal::Failed(e.into()),
        }
    }
}

struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Hides the indicator when dropped, including when the run is cancelled.
struct ProgressGuard<'a>(&'a dyn ProgressIndicator);

impl<'a> ProgressGuard<'a> {
    fn show(indicator: &'a dyn ProgressIndicator) -> Self {
        indicator.show();
        Self(indicator)
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.hide();
    }
}
