use chrono::NaiveDate;
use std::sync::Arc;

use crate::{BeerError, BeerResult, Condition, DayForecast, Location, RawDay, WeatherProvider};

/// Provider-agnostic forecast access: fetches through the bound provider and normalizes
/// its day records into [`DayForecast`]s.
#[derive(Debug, Clone)]
pub struct ForecastService {
    provider: Arc<dyn WeatherProvider>,
}

impl ForecastService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Forecast for up to `days` days, sorted by ascending date.
    ///
    /// The result may be shorter than `days` when the provider caps its horizon.
    pub async fn get_forecast(&self, location: &Location, days: u32) -> BeerResult<Vec<DayForecast>> {
        let raw = self
            .provider
            .fetch_forecast(location, days)
            .await
            .inspect_err(|e| {
                tracing::warn!(provider = %self.provider.id(), %location, error = %e, "forecast fetch failed");
            })?;

        if raw.truncated() {
            tracing::info!(
                provider = %raw.provider,
                requested = raw.requested_days,
                fetched = raw.fetched_days,
                "provider returned a shorter horizon than requested"
            );
        }

        let mut forecasts = raw
            .days
            .into_iter()
            .map(normalize)
            .collect::<BeerResult<Vec<_>>>()?;

        // Stable: records sharing a date keep provider order.
        forecasts.sort_by_key(|f| f.date);

        tracing::debug!(%location, days = forecasts.len(), "forecast normalized");
        Ok(forecasts)
    }
}

fn normalize(raw: RawDay) -> BeerResult<DayForecast> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|e| {
        BeerError::ProviderResponseInvalid(format!("unparseable forecast date '{}': {e}", raw.date))
    })?;

    if !raw.temperature.is_finite() {
        return Err(BeerError::ProviderResponseInvalid(format!(
            "non-finite temperature for {date}"
        )));
    }

    Ok(DayForecast {
        date,
        temperature_c: raw.unit.to_celsius(raw.temperature),
        condition: Condition::classify(&raw.condition),
    })
}
