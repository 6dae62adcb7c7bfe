use anyhow::{Context, Result, bail};
use beer_core::{
    BeerForecastCalculator, Config, ForecastService, ProviderId, RequestParams, WeatherProvider,
    provider,
};
use clap::{Parser, Subcommand};
use inquire::Password;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

use crate::{
    app::{AppState, build_router},
    logging,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "beer", version, about = "How much beer to buy for an outdoor event")]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the beer forecast HTTP API.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3001)]
        port: u16,

        /// Weather provider name; overrides the config file and WEATHER_PROVIDER.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "weather-bit" or "openweather".
        provider: String,
    },

    /// Print a one-off beer forecast.
    Forecast {
        #[arg(long)]
        country: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        attendees: u64,
        #[arg(long, default_value_t = 6)]
        pack_units: u64,
        #[arg(long = "days", default_value_t = 3)]
        forecast_days: u64,

        #[arg(long)]
        provider: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        logging::init(self.log_json);

        match self.command {
            Command::Serve { port, provider } => serve(port, provider).await,
            Command::Configure { provider } => configure(&provider),
            Command::Forecast {
                country,
                city,
                state,
                attendees,
                pack_units,
                forecast_days,
                provider,
            } => {
                let params = RequestParams {
                    country,
                    city,
                    state,
                    attendees,
                    pack_units,
                    forecast_days,
                };
                forecast(params, provider).await
            }
        }
    }
}

/// Resolves the weather provider once. Failure here must stop the process.
fn bind_provider(name: Option<String>) -> Result<Arc<dyn WeatherProvider>> {
    let config = Config::load()?;

    let provider = match &name {
        Some(name) => provider::resolve(name, &config),
        None => provider::provider_from_default(&config),
    }
    .with_context(|| {
        let name = name.as_deref().unwrap_or(config.provider_name());
        format!("Cannot start with weather provider '{name}'")
    })?;
    info!(
        provider = %provider.id(),
        max_days = provider.max_days(),
        timeout_secs = config.timeout_secs,
        "weather provider bound"
    );

    Ok(provider)
}

async fn serve(port: u16, provider: Option<String>) -> Result<()> {
    let provider = bind_provider(provider)?;
    let app = build_router(AppState::new(provider));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}

fn configure(provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let mut config = Config::load_file()?;
    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!(
        "Saved credentials for {id} to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn forecast(params: RequestParams, provider: Option<String>) -> Result<()> {
    let provider = bind_provider(provider)?;
    let calculator = BeerForecastCalculator::new(ForecastService::new(provider));

    let location = params.location();
    let forecast = calculator.get(&params).await?;

    println!(
        "{} attendees in {location}, packs of {}:",
        params.attendees, params.pack_units
    );
    for day in forecast {
        match day.notes {
            Some(notes) => println!("  {}  {:>5} packs  ({notes})", day.date, day.units),
            None => println!("  {}  {:>5} packs", day.date, day.units),
        }
    }

    Ok(())
}
