use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreegpError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid RPN expression: {0}")]
    InvalidRpn(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreegpError>;
