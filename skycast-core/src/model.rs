use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// One weather-condition record as reported upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Numeric condition code, e.g. 500 for light rain or 800 for clear sky.
    pub id: i32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainBlock {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default)]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Clouds {
    pub all: i64,
}

/// Current conditions at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub weather: Vec<Condition>,
    pub main: MainBlock,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Clouds,
    #[serde(default)]
    pub visibility: Option<f64>,
    pub name: String,
}

impl CurrentConditions {
    /// Description of the first condition record, if any.
    pub fn summary(&self) -> &str {
        self.weather
            .first()
            .map(|w| w.description.as_str())
            .unwrap_or("Unknown")
    }
}

/// A single 3-hour forecast observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix seconds, UTC.
    pub dt: i64,
    pub main: MainBlock,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    #[serde(default)]
    pub visibility: Option<f64>,
    /// Probability of precipitation, 0.0 to 1.0.
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

impl ForecastEntry {
    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.dt, 0).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    /// Offset from UTC in seconds.
    #[serde(default)]
    pub timezone: i32,
}

impl City {
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Decoded 5-day/3-hour forecast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub list: Vec<ForecastEntry>,
    pub city: City,
}

/// A geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl LocationResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }

    pub fn display_name(&self) -> String {
        match self.state.as_deref() {
            Some(state) if !state.is_empty() => {
                format!("{}, {}, {}", self.name, state, self.country)
            }
            _ => format!("{}, {}", self.name, self.country),
        }
    }
}

/// Day-level rollup of forecast entries. Only built by
/// [`crate::aggregate::build_daily_summaries`].
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
    /// Dominant condition code for the day.
    pub icon_id: i32,
    pub pop_avg: f64,
    /// Source entries, ascending by `dt`.
    pub entries: Vec<ForecastEntry>,
}
