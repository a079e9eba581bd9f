//! Core library for the `locweather` tool.
//!
//! This crate defines:
//! - Configuration handling
//! - The current-weather API client and the seam it sits behind
//! - The single-snapshot store
//! - The fetch pipeline that ties location, connectivity, API and store together
//! - Mapping a stored snapshot to display strings
//!
//! Platform concerns (location fix, connectivity, progress) are traits so
//! hosts other than `locweather-cli` can plug in their own.

pub mod config;
pub mod display;
pub mod error;
pub mod location;
pub mod model;
pub mod network;
pub mod pipeline;
pub mod provider;
pub mod store;

pub use config::Config;
pub use display::{DisplayFields, Icon, to_display_fields};
pub use error::{FetchError, LocationError, PipelineError};
pub use location::{FixedLocation, LocationSource, Permission};
pub use model::{Coordinates, UnitSystem, WeatherSnapshot};
pub use network::{ConnectivityProbe, is_network_available};
pub use pipeline::{FetchOrchestrator, ProgressIndicator, Terminal};
pub use provider::{WeatherApi, openweather::OpenWeatherClient};
pub use store::SnapshotStore;
