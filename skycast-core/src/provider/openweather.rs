use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    config::Units,
    model::{Coordinate, CurrentConditions, Forecast, LocationResult},
};

use super::{ProviderError, WeatherProvider};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    units: Units,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, units: Units) -> Self {
        Self::with_base_url(api_key, units, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: String, units: Units, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            units,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// GET `path` with `query` plus the credential and unit parameters, and
    /// decode a successful body as `T`.
    async fn request<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential);
        }

        let url = format!("{}{}", self.base_url, path);
        let req = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", self.units.as_str())])
            .build()
            .map_err(|e| ProviderError::InvalidRequest(format!("{what}: {e}")))?;

        tracing::debug!(%url, ?query, units = %self.units, "OpenWeather {what} request");

        let res = self.http.execute(req).await.map_err(|e| {
            tracing::warn!(error = %e, "OpenWeather {what} request could not be sent");
            ProviderError::Transport(format!("{what}: {e}"))
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ProviderError::Transport(format!("{what}: failed to read body: {e}")))?;

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "OpenWeather {what} request failed");
            return Err(ProviderError::Transport(format!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: T = serde_json::from_str(&body).inspect_err(|e| {
            tracing::warn!(error = %e, "OpenWeather {what} response did not decode");
        })?;
        Ok(parsed)
    }
}

fn coord_query(coord: Coordinate) -> Vec<(&'static str, String)> {
    vec![("lat", coord.lat.to_string()), ("lon", coord.lon.to_string())]
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, coord: Coordinate) -> Result<CurrentConditions, ProviderError> {
        self.request("current weather", "/data/2.5/weather", &coord_query(coord))
            .await
    }

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<Forecast, ProviderError> {
        let forecast: Forecast = self
            .request("5-day forecast", "/data/2.5/forecast", &coord_query(coord))
            .await?;
        tracing::debug!(entries = forecast.list.len(), city = %forecast.city.name, "forecast received");
        Ok(forecast)
    }

    async fn search_locations(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<LocationResult>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.request(
            "city search",
            "/geo/1.0/direct",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
