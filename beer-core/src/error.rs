use thiserror::Error;

/// Error kinds surfaced by the beer forecast pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BeerError {
    /// Malformed or missing request parameters. The message is meant for the caller.
    #[error("{0}")]
    BadRequest(String),

    /// The weather source could not be reached, timed out or answered with a failure status.
    #[error("weather provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The weather source answered with data we could not make sense of.
    #[error("invalid weather provider response: {0}")]
    ProviderResponseInvalid(String),

    /// Startup-time misconfiguration, e.g. an unknown provider name or a missing API key.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type BeerResult<T> = Result<T, BeerError>;

impl BeerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        BeerError::BadRequest(message.into())
    }

    /// True for failures caused by the external weather source.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            BeerError::ProviderUnavailable(_) | BeerError::ProviderResponseInvalid(_)
        )
    }
}
