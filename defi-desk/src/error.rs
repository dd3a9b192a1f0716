//! Error types for the defi-desk library

use thiserror::Error;

/// Custom error type for defi-desk operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("DeFi error: {0}")]
    DeFi(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type for defi-desk operations
pub type Result<T> = std::result::Result<T, Error>;
