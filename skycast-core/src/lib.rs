//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Forecast aggregation: 3-hour entries rolled up into day summaries
//! - The weather provider abstraction and its OpenWeather implementation
//! - Application state with concurrent loading and stale-response guarding
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod aggregate;
pub mod config;
pub mod format;
pub mod icon;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;

pub use aggregate::{build_daily_summaries, build_daily_summaries_local};
pub use config::{Config, SavedLocation, Units};
pub use icon::WeatherIcon;
pub use location::LocationEvent;
pub use model::{
    City, Condition, Coordinate, CurrentConditions, DailySummary, Forecast, ForecastEntry,
    LocationResult,
};
pub use orchestrator::{AppState, LoadOutcome, LoadState, Orchestrator, WeatherReport};
pub use provider::{ProviderError, WeatherProvider, provider_from_config};
