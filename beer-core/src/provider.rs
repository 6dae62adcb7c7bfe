use crate::{
    BeerError, BeerResult, Config, Location, RawForecast,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider, weatherbit::WeatherBitProvider},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::{convert::TryFrom, fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;
pub mod weatherapi;
pub mod weatherbit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherBit,
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherBit => "weather-bit",
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::WeatherBit => "WEATHERBIT_API_KEY",
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherBit, ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = BeerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        ProviderId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == lower)
            .ok_or_else(|| {
                let supported: Vec<&str> = ProviderId::all().iter().map(|id| id.as_str()).collect();
                BeerError::Configuration(format!(
                    "Unknown provider '{value}'. Supported providers: {}.",
                    supported.join(", ")
                ))
            })
    }
}

/// A source of multi-day forecasts.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Longest horizon the external API serves. Longer requests are truncated to it.
    fn max_days(&self) -> u32;

    async fn fetch_forecast(&self, location: &Location, days: u32) -> BeerResult<RawForecast>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(id: ProviderId, config: &Config) -> BeerResult<Arc<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        BeerError::Configuration(format!(
            "No API key configured for provider '{id}'.\n\
             Hint: set {} or run `beer configure {id}`.",
            id.api_key_env()
        ))
    })?;

    let http = http_client(config.timeout())?;

    let provider: Arc<dyn WeatherProvider> = match id {
        ProviderId::WeatherBit => Arc::new(WeatherBitProvider::new(api_key.to_owned(), http)),
        ProviderId::OpenWeather => Arc::new(OpenWeatherProvider::new(api_key.to_owned(), http)),
        ProviderId::WeatherApi => Arc::new(WeatherApiProvider::new(api_key.to_owned(), http)),
    };

    Ok(provider)
}

/// Resolve a provider name to a bound provider. Called once at startup; any error is fatal.
pub fn resolve(name: &str, config: &Config) -> BeerResult<Arc<dyn WeatherProvider>> {
    let id = ProviderId::try_from(name)?;
    provider_from_config(id, config)
}

/// Resolve the provider named by the configuration itself.
pub fn provider_from_default(config: &Config) -> BeerResult<Arc<dyn WeatherProvider>> {
    resolve(config.provider_name(), config)
}

fn http_client(timeout: Duration) -> BeerResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BeerError::Configuration(format!("Failed to build HTTP client: {e}")))
}

/// Sends a request and returns the body of a successful response.
pub(crate) async fn send(request: RequestBuilder, provider: ProviderId) -> BeerResult<String> {
    let res = request.send().await.map_err(|e| {
        if e.is_timeout() {
            BeerError::ProviderUnavailable(format!("{provider} request timed out"))
        } else {
            BeerError::ProviderUnavailable(format!("Failed to reach {provider}: {e}"))
        }
    })?;

    let status = res.status();
    let body = res.text().await.map_err(|e| {
        BeerError::ProviderUnavailable(format!("Failed to read {provider} response body: {e}"))
    })?;

    if !status.is_success() {
        return Err(BeerError::ProviderUnavailable(format!(
            "{provider} request failed with status {status}: {}",
            truncate_body(&body)
        )));
    }

    Ok(body)
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &str, provider: ProviderId) -> BeerResult<T> {
    serde_json::from_str(body).map_err(|e| {
        BeerError::ProviderResponseInvalid(format!("Failed to parse {provider} forecast JSON: {e}"))
    })
}

/// Caps a requested horizon at the provider limit, logging when it had to.
pub(crate) fn capped_days(provider: ProviderId, requested: u32, max: u32) -> u32 {
    if requested > max {
        tracing::warn!(%provider, requested, max, "forecast horizon truncated to provider limit");
        max
    } else {
        requested
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let parsed = ProviderId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_names_are_case_insensitive() {
        assert_eq!(ProviderId::try_from("Weather-Bit").unwrap(), ProviderId::WeatherBit);
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(matches!(err, BeerError::Configuration(_)));
        assert!(err.to_string().contains("Unknown provider"));
        assert!(err.to_string().contains("weather-bit, openweather, weatherapi"));
    }

    #[test]
    fn resolve_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = resolve("openweather", &cfg).unwrap_err();
        assert!(matches!(err, BeerError::Configuration(_)));
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn resolve_binds_every_known_provider() {
        let mut cfg = Config::default();
        for id in ProviderId::all() {
            cfg.upsert_provider_api_key(*id, "KEY".to_string());
        }

        for id in ProviderId::all() {
            let provider = resolve(id.as_str(), &cfg).expect("provider should resolve");
            assert_eq!(provider.id(), *id);
        }
    }

    #[test]
    fn default_resolution_uses_configured_name() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());

        let provider = provider_from_default(&cfg).unwrap();
        assert_eq!(provider.id(), ProviderId::WeatherApi);
    }

    #[test]
    fn capped_days_truncates_only_above_limit() {
        assert_eq!(capped_days(ProviderId::OpenWeather, 3, 5), 3);
        assert_eq!(capped_days(ProviderId::OpenWeather, 9, 5), 5);
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        assert_eq!(truncate_body(&body).len(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    /// Shape with a required field, like every provider's forecast body.
    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct DailyShape {
        data: Vec<serde_json::Value>,
    }

    /// Accepts one connection, reads the request head and writes `response` verbatim.
    /// With `None` the connection is held open without ever answering.
    async fn serve_once(response: Option<&'static str>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }

            match response {
                Some(raw) => {
                    let _ = socket.write_all(raw.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                None => std::future::pending::<()>().await,
            }
        });

        format!("http://{addr}/forecast")
    }

    #[tokio::test]
    async fn failure_status_is_provider_unavailable() {
        let url = serve_once(Some(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops",
        ))
        .await;
        let http = http_client(Duration::from_secs(5)).unwrap();

        let err = send(http.get(&url), ProviderId::WeatherBit).await.unwrap_err();
        assert!(matches!(&err, BeerError::ProviderUnavailable(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_an_invalid_response() {
        let url = serve_once(Some(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
        ))
        .await;
        let http = http_client(Duration::from_secs(5)).unwrap();

        let body = send(http.get(&url), ProviderId::WeatherBit).await.unwrap();
        assert_eq!(body, "{}");

        let err = parse_json::<DailyShape>(&body, ProviderId::WeatherBit).unwrap_err();
        assert!(matches!(&err, BeerError::ProviderResponseInvalid(msg) if msg.contains("data")));
    }

    #[tokio::test]
    async fn silent_upstream_times_out_as_unavailable() {
        let url = serve_once(None).await;
        let http = http_client(Duration::from_millis(200)).unwrap();

        let err = send(http.get(&url), ProviderId::WeatherBit).await.unwrap_err();
        assert_eq!(
            err,
            BeerError::ProviderUnavailable("weather-bit request timed out".to_string())
        );
    }
}
