use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr, VariantNames};

/// Classification stored in a snapshot after a failed refresh.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, IntoStaticStr, VariantNames, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    TransientFetch,
    Decode,
    Unavailable,
    InvalidKey,
    ConsumerMisuse,
}

/// Failure of a single fetch. Absorbed into the cache entry, never thrown at subscribers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("fetch timed out after {0}ms")]
    Timeout(u64),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport(_) | FetchError::Rpc(_) | FetchError::Timeout(_) => ErrorKind::TransientFetch,
            FetchError::Decode(_) => ErrorKind::Decode,
            FetchError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() { Self::Decode(error.to_string()) } else { Self::Transport(error.to_string()) }
    }
}

impl From<alloy_sol_types::Error> for FetchError {
    fn from(error: alloy_sol_types::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<hex::FromHexError> for FetchError {
    fn from(error: hex::FromHexError) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Errors raised synchronously at the synchronizer boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("invalid fetch key {key}: {reason}")]
    InvalidKey { key: String, reason: String },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::InvalidKey { .. } => ErrorKind::InvalidKey,
        }
    }
}
