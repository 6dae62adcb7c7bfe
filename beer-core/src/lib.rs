//! Core library for the beer forecast service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers and the startup-time provider registry
//! - Forecast normalization and the forecast-to-beer calculation
//! - Validation of incoming request parameters
//!
//! It is used by `beer-cli`, but can also be reused by other binaries or services.

pub mod beer;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod request;

pub use beer::BeerForecastCalculator;
pub use config::{Config, ProviderConfig};
pub use error::{BeerError, BeerResult};
pub use forecast::ForecastService;
pub use model::{
    BeerForecast, Condition, DayForecast, Location, RawDay, RawForecast, RequestParams,
    TemperatureUnit,
};
pub use provider::{ProviderId, WeatherProvider};
