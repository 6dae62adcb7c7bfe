use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    BeerResult, Location, RawDay, RawForecast, TemperatureUnit,
    provider::{ProviderId, WeatherProvider, capped_days, parse_json, send},
};

const FORECAST_URL: &str = "https://api.weatherapi.com/v1/forecast.json";
/// Paid plans; the free plan silently stops at 3 days.
const MAX_DAYS: u32 = 14;

/// WeatherAPI.com forecast endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

fn parse_forecast(body: &str) -> BeerResult<Vec<RawDay>> {
    let parsed: WaForecastResponse = parse_json(body, ProviderId::WeatherApi)?;

    Ok(parsed
        .forecast
        .forecastday
        .into_iter()
        .map(|d| RawDay {
            date: d.date,
            temperature: d.day.maxtemp_c,
            unit: TemperatureUnit::Celsius,
            condition: d.day.condition.text,
        })
        .collect())
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    fn max_days(&self) -> u32 {
        MAX_DAYS
    }

    async fn fetch_forecast(&self, location: &Location, days: u32) -> BeerResult<RawForecast> {
        let fetched_days = capped_days(self.id(), days, MAX_DAYS);
        let mut forecast = RawForecast {
            provider: self.id(),
            requested_days: days,
            fetched_days,
            days: Vec::new(),
        };
        if fetched_days == 0 {
            return Ok(forecast);
        }

        let address = format!("{}, {}, {}", location.city, location.state, location.country);
        let request = self.http.get(FORECAST_URL).query(&[
            ("key", self.api_key.as_str()),
            ("q", address.as_str()),
            ("days", &fetched_days.to_string()),
            ("aqi", "no"),
            ("alerts", "no"),
        ]);

        let body = send(request, self.id()).await?;
        forecast.days = parse_forecast(&body)?;
        forecast.days.truncate(fetched_days as usize);

        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forecast_days_using_daily_maximum() {
        let body = r#"{
            "location": {"name": "Buenos Aires", "country": "Argentina"},
            "forecast": {"forecastday": [
                {"date": "2024-01-15", "day": {"maxtemp_c": 31.0, "avgtemp_c": 26.2,
                    "condition": {"text": "Sunny", "code": 1000}}, "hour": []},
                {"date": "2024-01-16", "day": {"maxtemp_c": 20.0, "avgtemp_c": 17.5,
                    "condition": {"text": "Patchy rain possible", "code": 1063}}, "hour": []}
            ]}
        }"#;

        let days = parse_forecast(body).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temperature, 31.0);
        assert_eq!(days[1].temperature, 20.0);
        assert_eq!(days[1].date, "2024-01-16");
        assert_eq!(days[1].condition, "Patchy rain possible");
    }

    #[test]
    fn forecast_url_is_https() {
        assert!(FORECAST_URL.starts_with("https://"));
    }

    #[test]
    fn wrong_shape_is_an_invalid_response() {
        let err = parse_forecast(r#"{"forecast": {"forecastday": [{"date": 1}]}}"#).unwrap_err();
        assert!(matches!(err, crate::BeerError::ProviderResponseInvalid(_)));
    }
}
