//! Application state: which place is selected, whether its weather is
//! loading, and the last result.
//!
//! State is published on a [`tokio::sync::watch`] channel. Each load trigger
//! takes a new generation number; a completion whose generation is no longer
//! current is dropped instead of overwriting newer state.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{Local, TimeZone};
use tokio::sync::watch;

use crate::{
    aggregate::build_daily_summaries,
    location::{CURRENT_LOCATION, LocationEvent, LocationReceiver},
    model::{City, Coordinate, CurrentConditions, DailySummary, ForecastEntry},
    provider::{ProviderError, WeatherProvider},
};

pub const PERMISSION_DENIED_MESSAGE: &str = "Location permission denied.";

/// Everything needed to render a loaded location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub city: City,
    pub days: Vec<DailySummary>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Box<WeatherReport>),
    Failed {
        message: String,
    },
}

impl LoadState {
    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            LoadState::Loaded(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed { message } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Snapshot published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub place: String,
    pub coordinate: Option<Coordinate>,
    pub status: LoadState,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            place: CURRENT_LOCATION.to_string(),
            coordinate: None,
            status: LoadState::Idle,
        }
    }
}

/// How a single load trigger ended.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded,
    Failed(ProviderError),
    /// A newer trigger arrived first; the result was discarded.
    Superseded,
}

pub struct Orchestrator<Tz: TimeZone = Local> {
    provider: Arc<dyn WeatherProvider>,
    tz: Tz,
    generation: AtomicU64,
    state: watch::Sender<AppState>,
}

impl Orchestrator<Local> {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_time_zone(provider, Local)
    }
}

impl<Tz> Orchestrator<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
{
    /// Orchestrator that buckets forecast days in `tz`.
    pub fn with_time_zone(provider: Arc<dyn WeatherProvider>, tz: Tz) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            provider,
            tz,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Record `place` as the selection and load its weather.
    pub async fn select(&self, place: impl Into<String>, coord: Coordinate) -> LoadOutcome {
        self.load_for(Some(place.into()), coord).await
    }

    /// Load weather for `coord`, keeping the current place name.
    pub async fn load(&self, coord: Coordinate) -> LoadOutcome {
        self.load_for(None, coord).await
    }

    /// Re-run the last load. Returns `None` when nothing was requested yet.
    pub async fn retry(&self) -> Option<LoadOutcome> {
        let coord = self.state.borrow().coordinate?;
        Some(self.load(coord).await)
    }

    /// Hourly entries for a day, ascending by time.
    pub fn hours_for<'a>(&self, day: &'a DailySummary) -> &'a [ForecastEntry] {
        &day.entries
    }

    async fn load_for(&self, place: Option<String>, coord: Coordinate) -> LoadOutcome {
        let generation = self.begin(place, coord);
        self.finish(generation, coord).await
    }

    /// Take a new generation and publish `Loading`. Runs before any await so
    /// triggers are numbered in the order they arrive.
    fn begin(&self, place: Option<String>, coord: Coordinate) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.next_generation();
            if let Some(place) = place {
                s.place = place;
            }
            s.coordinate = Some(coord);
            s.status = LoadState::Loading;
        });
        tracing::debug!(generation, %coord, "loading weather");
        generation
    }

    /// Fetch both payloads and publish the result if `generation` is still
    /// the latest trigger.
    async fn finish(&self, generation: u64, coord: Coordinate) -> LoadOutcome {
        let (current, forecast) = tokio::join!(
            self.provider.fetch_current(coord),
            self.provider.fetch_forecast(coord),
        );

        if !self.is_current(generation) {
            tracing::debug!(generation, %coord, "discarding superseded weather response");
            return LoadOutcome::Superseded;
        }

        let (status, outcome) = match (current, forecast) {
            (Ok(current), Ok(forecast)) => {
                let days = build_daily_summaries(&forecast.list, &self.tz);
                tracing::info!(city = %forecast.city.name, days = days.len(), "weather loaded");
                let report = WeatherReport {
                    current,
                    city: forecast.city,
                    days,
                };
                (LoadState::Loaded(Box::new(report)), LoadOutcome::Loaded)
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, %coord, "weather load failed");
                let message = e.user_message().to_string();
                (LoadState::Failed { message }, LoadOutcome::Failed(e))
            }
        };

        // Generations only advance under the same lock, so a newer trigger
        // cannot slip in between the check and the write.
        let published = self.state.send_if_modified(|s| {
            if !self.is_current(generation) {
                return false;
            }
            s.status = status;
            true
        });

        if published {
            outcome
        } else {
            tracing::debug!(generation, %coord, "discarding superseded weather response");
            LoadOutcome::Superseded
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn deny_location(&self) {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.next_generation();
            s.status = LoadState::Failed {
                message: PERMISSION_DENIED_MESSAGE.to_string(),
            }
        });
        tracing::info!(generation, "location permission denied");
    }

    /// Consume location events until the channel closes.
    ///
    /// Each selection is numbered and marked `Loading` as it is received,
    /// then fetched on its own task, so a newer event supersedes a load that
    /// is still in flight whatever order the tasks get scheduled in. Loads still running when
    /// the channel closes are awaited before returning.
    pub async fn run(self: Arc<Self>, mut events: LocationReceiver) {
        let mut tasks = tokio::task::JoinSet::new();

        while let Some(event) = events.recv().await {
            if event == LocationEvent::PermissionDenied {
                self.deny_location();
            } else if let Some((place, coord)) = event.target() {
                let generation = self.begin(Some(place), coord);
                let this = Arc::clone(&self);
                tasks.spawn(async move {
                    this.finish(generation, coord).await;
                });
            }
        }

        while tasks.join_next().await.is_some() {}
    }
}
