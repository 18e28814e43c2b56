//! Errors for the account store.
//!
//! Covers the failures the caller is expected to see:
//! - Backend I/O failures while persisting ([`Error::Storage`])
//! - Serialization of the collection ([`Error::Serialize`])
//! - Rejected storage keys and bad configuration
//!
//! Corrupt or missing persisted data is not an error: `load` recovers from
//! it locally.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
