//! Forecast-to-beer calculation.
//!
//! Consumption policy: every attendee drinks one unit a day at baseline, scaled by a
//! temperature factor and a condition factor. Both factors are expressed in per-mille so
//! the whole computation stays in integers.
//!
//! | temperature      | factor          |
//! |------------------|-----------------|
//! | <= 10 °C         | 750‰            |
//! | 10 °C .. 30 °C   | linear          |
//! | >= 30 °C         | 1500‰           |
//!
//! | condition        | factor |
//! |------------------|--------|
//! | clear            | 1000‰  |
//! | cloudy, unknown  | 900‰   |
//! | rain             | 700‰   |
//! | snow             | 600‰   |
//! | storm            | 500‰   |

use crate::{BeerError, BeerForecast, BeerResult, Condition, DayForecast, ForecastService, RequestParams};

const PER_MILLE: u64 = 1000;
const BASE_UNITS_PER_ATTENDEE: u64 = 1;

const COLD_C: f64 = 10.0;
const HOT_C: f64 = 30.0;
const COLD_FACTOR: u64 = 750;
const HOT_FACTOR: u64 = 1500;

fn temperature_factor(temperature_c: f64) -> u64 {
    let t = temperature_c.clamp(COLD_C, HOT_C);
    let span = (HOT_FACTOR - COLD_FACTOR) as f64;
    COLD_FACTOR + ((t - COLD_C) / (HOT_C - COLD_C) * span).round() as u64
}

fn condition_factor(condition: Condition) -> u64 {
    match condition {
        Condition::Clear => 1000,
        Condition::Cloudy | Condition::Unknown => 900,
        Condition::Rain => 700,
        Condition::Snow => 600,
        Condition::Storm => 500,
    }
}

/// Units one attendee drinks on a day with this weather, in thousandths of a unit.
/// Non-decreasing in temperature; clear > cloudy > rain > snow > storm.
pub fn consumption_per_mille(temperature_c: f64, condition: Condition) -> u64 {
    BASE_UNITS_PER_ATTENDEE * temperature_factor(temperature_c) * condition_factor(condition) / PER_MILLE
}

/// Whole packs needed for `attendees` people on one day. `pack_units` must be non-zero.
pub fn packs_needed(attendees: u64, pack_units: u64, day: &DayForecast) -> u64 {
    let total = u128::from(attendees) * u128::from(consumption_per_mille(day.temperature_c, day.condition));
    let per_pack = u128::from(pack_units) * u128::from(PER_MILLE);
    u64::try_from(total.div_ceil(per_pack)).unwrap_or(u64::MAX)
}

/// Wet weather takes precedence: a hot storm still gets the wet note.
fn notes_for(day: &DayForecast) -> Option<String> {
    if day.condition.is_wet() {
        Some("wet weather, expect lower consumption".to_string())
    } else if day.temperature_c >= HOT_C {
        Some("hot day, expect higher consumption".to_string())
    } else {
        None
    }
}

/// Turns event parameters plus a weather forecast into per-day pack recommendations.
#[derive(Debug, Clone)]
pub struct BeerForecastCalculator {
    forecasts: ForecastService,
}

impl BeerForecastCalculator {
    pub fn new(forecasts: ForecastService) -> Self {
        Self { forecasts }
    }

    pub async fn get(&self, params: &RequestParams) -> BeerResult<Vec<BeerForecast>> {
        if params.pack_units == 0 {
            return Err(BeerError::bad_request("param pack_units must be greater than zero"));
        }
        if params.forecast_days == 0 {
            return Err(BeerError::bad_request("param forecast_days must be greater than zero"));
        }

        let days = u32::try_from(params.forecast_days).unwrap_or(u32::MAX);
        let forecast = self.forecasts.get_forecast(&params.location(), days).await?;

        Ok(forecast
            .iter()
            .map(|day| BeerForecast {
                date: day.date,
                units: packs_needed(params.attendees, params.pack_units, day),
                notes: notes_for(day),
            })
            .collect())
    }
}
