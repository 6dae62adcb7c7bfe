use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    BeerError, BeerResult, Location, RawDay, RawForecast, TemperatureUnit,
    provider::{ProviderId, WeatherProvider, capped_days, parse_json, send},
};

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const MAX_DAYS: u32 = 5;

/// OpenWeather 5 day / 3 hour forecast, folded into one record per calendar day.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwMain,
    weather: Vec<OwWeather>,
    /// "YYYY-MM-DD hh:mm:ss", UTC.
    dt_txt: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Default)]
struct DayAccumulator {
    max_temp: Option<f64>,
    // (description, count) in first-seen order so ties keep the earliest slot.
    descriptions: Vec<(String, usize)>,
}

impl DayAccumulator {
    fn add(&mut self, entry: OwForecastEntry) {
        let temp = entry.main.temp;
        self.max_temp = Some(self.max_temp.map_or(temp, |m| m.max(temp)));

        let description = entry
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "Unknown".to_string());

        match self.descriptions.iter_mut().find(|(d, _)| *d == description) {
            Some((_, count)) => *count += 1,
            None => self.descriptions.push((description, 1)),
        }
    }

    fn dominant_description(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for candidate in &self.descriptions {
            if best.is_none_or(|b| candidate.1 > b.1) {
                best = Some(candidate);
            }
        }
        best.map(|(d, _)| d.clone()).unwrap_or_else(|| "Unknown".to_string())
    }
}

fn parse_forecast(body: &str) -> BeerResult<Vec<RawDay>> {
    let parsed: OwForecastResponse = parse_json(body, ProviderId::OpenWeather)?;

    let mut by_date: BTreeMap<String, DayAccumulator> = BTreeMap::new();
    for entry in parsed.list {
        let date = entry
            .dt_txt
            .split_whitespace()
            .next()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                BeerError::ProviderResponseInvalid(format!(
                    "OpenWeather entry has no date: '{}'",
                    entry.dt_txt
                ))
            })?
            .to_string();

        by_date.entry(date).or_default().add(entry);
    }

    Ok(by_date
        .into_iter()
        .filter_map(|(date, acc)| {
            let temperature = acc.max_temp?;
            Some(RawDay {
                date,
                temperature,
                unit: TemperatureUnit::Kelvin,
                condition: acc.dominant_description(),
            })
        })
        .collect())
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
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

        // Standard units (Kelvin); q is "{city},{state},{country}".
        let address = format!("{},{},{}", location.city, location.state, location.country);
        let request = self
            .http
            .get(FORECAST_URL)
            .query(&[("q", address.as_str()), ("appid", self.api_key.as_str())]);

        let body = send(request, self.id()).await?;
        forecast.days = parse_forecast(&body)?;
        forecast.days.truncate(fetched_days as usize);

        Ok(forecast)
    }
}
