use crate::{
    Config,
    error::FetchError,
    model::{Coordinates, UnitSystem, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

/// One-shot current-weather lookup. Implementations make exactly one request
/// per call and never retry.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        coords: Coordinates,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the weather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherApi>> {
    let api_key = config.api_key()?;

    let mut client = match config.base_url.as_deref() {
        Some(base) => OpenWeatherClient::with_base_url(api_key.to_owned(), base),
        None => OpenWeatherClient::new(api_key.to_owned()),
    };

    if let Some(secs) = config.request_timeout_secs {
        client = client.with_timeout(Duration::from_secs(secs))?;
    }

    Ok(Box::new(client))
}
