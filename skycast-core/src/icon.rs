/// Display category for an OpenWeather condition code.
///
/// See: https://openweathermap.org/weather-conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherIcon {
    Thunderstorm,
    Drizzle,
    Rain,
    FreezingRain,
    HeavyRain,
    Snow,
    Fog,
    #[default]
    Clear,
    FewClouds,
    Cloudy,
    Overcast,
}

impl WeatherIcon {
    pub fn from_code(code: i32) -> Self {
        match code {
            200..=232 => Self::Thunderstorm,
            300..=321 => Self::Drizzle,
            500..=504 => Self::Rain,
            511 => Self::FreezingRain,
            520..=531 => Self::HeavyRain,
            600..=622 => Self::Snow,
            701..=781 => Self::Fog,
            800 => Self::Clear,
            801 => Self::FewClouds,
            802 => Self::Cloudy,
            803 | 804 => Self::Overcast,
            // Unknown codes render as plain cloud
            _ => Self::Cloudy,
        }
    }

    /// Terminal glyph.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "⛈",
            Self::Drizzle => "🌦",
            Self::Rain => "🌧",
            Self::FreezingRain => "🌨",
            Self::HeavyRain => "🌧",
            Self::Snow => "❄",
            Self::Fog => "🌫",
            Self::Clear => "☀",
            Self::FewClouds => "🌤",
            Self::Cloudy => "☁",
            Self::Overcast => "☁",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::HeavyRain => "Heavy rain",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Clear => "Clear",
            Self::FewClouds => "Few clouds",
            Self::Cloudy => "Cloudy",
            Self::Overcast => "Overcast",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_boundaries() {
        assert_eq!(WeatherIcon::from_code(200), WeatherIcon::Thunderstorm);
        assert_eq!(WeatherIcon::from_code(232), WeatherIcon::Thunderstorm);
        assert_eq!(WeatherIcon::from_code(321), WeatherIcon::Drizzle);
        assert_eq!(WeatherIcon::from_code(504), WeatherIcon::Rain);
        assert_eq!(WeatherIcon::from_code(511), WeatherIcon::FreezingRain);
        assert_eq!(WeatherIcon::from_code(520), WeatherIcon::HeavyRain);
        assert_eq!(WeatherIcon::from_code(622), WeatherIcon::Snow);
        assert_eq!(WeatherIcon::from_code(741), WeatherIcon::Fog);
    }

    #[test]
    fn cloud_codes() {
        assert_eq!(WeatherIcon::from_code(800), WeatherIcon::Clear);
        assert_eq!(WeatherIcon::from_code(801), WeatherIcon::FewClouds);
        assert_eq!(WeatherIcon::from_code(802), WeatherIcon::Cloudy);
        assert_eq!(WeatherIcon::from_code(804), WeatherIcon::Overcast);
    }

    #[test]
    fn unknown_codes_fall_back_to_cloud() {
        assert_eq!(WeatherIcon::from_code(999), WeatherIcon::Cloudy);
        assert_eq!(WeatherIcon::from_code(505), WeatherIcon::Cloudy);
        assert_eq!(WeatherIcon::from_code(-1).label(), "Cloudy");
    }
}
