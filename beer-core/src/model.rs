use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// Where the event takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub country: String,
    pub state: String,
    pub city: String,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.city, self.state, self.country)
    }
}

/// Validated query parameters of a beer forecast request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub country: String,
    pub city: String,
    pub state: String,
    pub attendees: u64,
    pub pack_units: u64,
    pub forecast_days: u64,
}

impl RequestParams {
    pub fn location(&self) -> Location {
        Location {
            country: self.country.clone(),
            state: self.state.clone(),
            city: self.city.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureUnit::Kelvin => value - 273.15,
        }
    }
}

/// One day as reported by a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDay {
    /// Provider date string, `YYYY-MM-DD`.
    pub date: String,
    /// Daily maximum, in `unit`.
    pub temperature: f64,
    pub unit: TemperatureUnit,
    /// Free-text description such as "Light rain".
    pub condition: String,
}

/// What a provider returned for one forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    pub provider: ProviderId,
    pub requested_days: u32,
    /// Horizon actually asked of the external API, capped by the provider limit.
    pub fetched_days: u32,
    pub days: Vec<RawDay>,
}

impl RawForecast {
    pub fn truncated(&self) -> bool {
        self.fetched_days < self.requested_days
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
    Unknown,
}

impl Condition {
    /// Classifies a provider's free-text description. Severe weather wins over mild words
    /// appearing in the same description ("thunderstorm with light rain" is a storm).
    pub fn classify(description: &str) -> Self {
        let text = description.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| text.contains(w));

        if has(&["thunder", "storm", "tornado", "squall"]) {
            Condition::Storm
        } else if has(&["snow", "sleet", "hail", "blizzard", "ice", "flurries"]) {
            Condition::Snow
        } else if has(&["rain", "drizzle", "shower"]) {
            Condition::Rain
        } else if has(&["cloud", "overcast", "fog", "mist", "haze", "smoke", "dust"]) {
            Condition::Cloudy
        } else if has(&["clear", "sun"]) {
            Condition::Clear
        } else {
            Condition::Unknown
        }
    }

    pub fn is_wet(self) -> bool {
        matches!(self, Condition::Rain | Condition::Snow | Condition::Storm)
    }
}

/// Normalized forecast for a single day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    /// Daily maximum.
    pub temperature_c: f64,
    pub condition: Condition,
}

/// Beer recommendation for a single day, in whole packs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeerForecast {
    pub date: NaiveDate,
    pub units: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_common_descriptions() {
        assert_eq!(Condition::classify("Clear sky"), Condition::Clear);
        assert_eq!(Condition::classify("Sunny"), Condition::Clear);
        assert_eq!(Condition::classify("Broken clouds"), Condition::Cloudy);
        assert_eq!(Condition::classify("Patchy light drizzle"), Condition::Rain);
        assert_eq!(Condition::classify("Heavy snow"), Condition::Snow);
        assert_eq!(Condition::classify("Thunderstorm with light rain"), Condition::Storm);
        assert_eq!(Condition::classify("???"), Condition::Unknown);
    }

    #[test]
    fn temperature_units_convert_to_celsius() {
        assert_eq!(TemperatureUnit::Celsius.to_celsius(21.5), 21.5);
        assert!((TemperatureUnit::Fahrenheit.to_celsius(212.0) - 100.0).abs() < 1e-9);
        assert!((TemperatureUnit::Kelvin.to_celsius(273.15)).abs() < 1e-9);
    }

    #[test]
    fn beer_forecast_serializes_without_empty_notes() {
        let bf = BeerForecast {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            units: 4,
            notes: None,
        };
        let json = serde_json::to_value(&bf).unwrap();
        assert_eq!(json, serde_json::json!({ "date": "2024-01-15", "units": 4 }));
    }

    #[test]
    fn truncated_when_fewer_days_fetched_than_requested() {
        let raw = RawForecast {
            provider: ProviderId::OpenWeather,
            requested_days: 7,
            fetched_days: 5,
            days: Vec::new(),
        };
        assert!(raw.truncated());
    }
}
