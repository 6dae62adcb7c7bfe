use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    BeerResult, Location, RawDay, RawForecast, TemperatureUnit,
    provider::{ProviderId, WeatherProvider, capped_days, parse_json, send},
};

const FORECAST_URL: &str = "https://api.weatherbit.io/v2.0/forecast/daily";
const MAX_DAYS: u32 = 16;

/// Weatherbit.io daily forecast API.
#[derive(Debug, Clone)]
pub struct WeatherBitProvider {
    api_key: String,
    http: Client,
}

impl WeatherBitProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }
}

#[derive(Debug, Deserialize)]
struct WbWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct WbDay {
    valid_date: String,
    /// Daily maximum, Celsius with metric units.
    max_temp: f64,
    weather: WbWeather,
}

#[derive(Debug, Deserialize)]
struct WbForecastResponse {
    data: Vec<WbDay>,
}

fn parse_forecast(body: &str) -> BeerResult<Vec<RawDay>> {
    let parsed: WbForecastResponse = parse_json(body, ProviderId::WeatherBit)?;

    Ok(parsed
        .data
        .into_iter()
        .map(|d| RawDay {
            date: d.valid_date,
            temperature: d.max_temp,
            unit: TemperatureUnit::Celsius,
            condition: d.weather.description,
        })
        .collect())
}

#[async_trait]
impl WeatherProvider for WeatherBitProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherBit
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

        let request = self.http.get(FORECAST_URL).query(&[
            ("city", location.city.as_str()),
            ("state", location.state.as_str()),
            ("country", location.country.as_str()),
            ("days", &fetched_days.to_string()),
            ("units", "M"),
            ("key", self.api_key.as_str()),
        ]);

        let body = send(request, self.id()).await?;
        forecast.days = parse_forecast(&body)?;
        forecast.days.truncate(fetched_days as usize);

        Ok(forecast)
    }
}
