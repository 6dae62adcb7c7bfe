//! HTTP surface: one read route that runs the beer forecast pipeline.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use beer_core::{
    BeerError, BeerForecast, BeerForecastCalculator, ForecastService, RequestParams, WeatherProvider,
    request::UNREADABLE_QUERY,
};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<BeerForecastCalculator>,
}

impl AppState {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let calculator = BeerForecastCalculator::new(ForecastService::new(provider));
        Self {
            calculator: Arc::new(calculator),
        }
    }
}

/// Error response format.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: i64,
}

/// Maps core errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub BeerError);

impl From<BeerError> for ApiError {
    fn from(err: BeerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Callers see the same status for both provider failures.
        let (status, code) = match &self.0 {
            BeerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            err if err.is_provider_failure() => (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = if status.is_server_error() {
            error!(error = %self.0, "beer forecast request failed");
            "could not compute the beer forecast, try again later".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: code.to_string(),
            message,
            timestamp: chrono::Utc::now().timestamp(),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// GET /beer-packs?country=&city=&state=&attendees=&pack_units=&forecast_days=
pub async fn beer_packs(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<BeerForecast>>, ApiError> {
    let Query(pairs) = query.map_err(|rejection| {
        debug!(%rejection, "query string rejected");
        BeerError::bad_request(UNREADABLE_QUERY)
    })?;

    // Repeated keys: the first occurrence wins.
    let mut query = HashMap::with_capacity(pairs.len());
    for (key, value) in pairs {
        query.entry(key).or_insert(value);
    }

    let params = RequestParams::try_from(&query)?;
    debug!(?params, "beer forecast requested");

    let forecast = state.calculator.get(&params).await?;
    Ok(Json(forecast))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/beer-packs", get(beer_packs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
