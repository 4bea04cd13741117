//! Error types.
//!
//! - [`ProviderError`]: failures talking to (or parsing from) an external data source
//! - [`TransformError`]: problems raised by the appreciation transform itself
//! - [`AppError`]: the exit-coded error every CLI path returns
//!
//! Exit codes: 2 = usage/config/output, 3 = transform, 4 = provider.

use thiserror::Error;

/// Errors from the time-series or geometry providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout, TLS error, etc.
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: &'static str, message: String },

    /// The provider answered with a non-success status (auth, rate limit, unknown code).
    #[error("{provider} request failed with status {status}")]
    Status { provider: &'static str, status: u16 },

    /// The payload did not have the expected shape.
    #[error("{provider} returned malformed data: {message}")]
    Malformed { provider: &'static str, message: String },

    /// Reading a local source failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProviderError {
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            provider,
            message: message.into(),
        }
    }
}

/// Errors from the appreciation transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Current date {current} must be after baseline date {baseline}.")]
    DateOrder {
        baseline: chrono::NaiveDate,
        current: chrono::NaiveDate,
    },

    /// Baseline value is zero, so percent change is undefined.
    #[error("Baseline value is zero for region '{region}' (division by zero).")]
    DivisionByZero { region: String },

    #[error("Invalid series: {0}")]
    InvalidSeries(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::new(4, err.to_string())
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        AppError::new(3, err.to_string())
    }
}
