use crate::{
    Config,
    model::{Coordinate, CurrentConditions, Forecast, LocationResult},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Failure kinds surfaced by a [`WeatherProvider`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Fixed text suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ProviderError::MissingCredential => "Missing API key.",
            _ => "Failed to load weather.",
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Decode(e.to_string())
    }
}

/// Source of current conditions, forecasts and geocoding matches.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions, ProviderError>;

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<Forecast, ProviderError>;

    /// Places matching `query`, best match first. A blank query returns an
    /// empty list without touching the network.
    async fn search_locations(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<LocationResult>, ProviderError>;
}

/// Construct the OpenWeather provider from config.
///
/// A missing key is not an error here; every call on the returned provider
/// then fails with [`ProviderError::MissingCredential`].
pub fn provider_from_config(config: &Config) -> Box<dyn WeatherProvider> {
    let api_key = config.resolve_api_key().unwrap_or_default();
    Box::new(OpenWeatherProvider::new(api_key, config.units))
}
