use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("link disconnected")]
    Disconnected,
    #[error("link read timeout")]
    Timeout,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
