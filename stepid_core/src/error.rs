use thiserror::Error;

/// Problems with the captured data itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("sample time not increasing at index {index}: {prev} -> {next}")]
    NonIncreasingTime { index: usize, prev: i64, next: i64 },
    #[error("sample time span overflows at index {index}: {prev} -> {next}")]
    TimeOverflow { index: usize, prev: i64, next: i64 },
    #[error("position change overflows at index {index}: {prev} -> {next}")]
    PositionOverflow { index: usize, prev: i64, next: i64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StepIdError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("no rising-edge crossing of {threshold}")]
    CrossingNotFound { threshold: f64 },
    #[error("no samples within trailing window of {window} ticks")]
    EmptyWindow { window: i64 },
    #[error("channel error: {0}")]
    Channel(String),
    #[error("timeout waiting for telemetry")]
    Timeout,
    #[error("capture cancelled")]
    Cancelled,
    #[error("capture limit exceeded: {0}")]
    CaptureLimit(String),
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing channel")]
    MissingChannel,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
