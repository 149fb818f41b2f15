use crate::sync_error::{ErrorKind, FetchError};
use std::time::SystemTime;

/// Point-in-time view of one cache entry, as seen by consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<V> {
    /// Last successfully fetched value. Survives later failures.
    pub value: Option<V>,
    /// A fetch is in flight and there is no value yet.
    pub is_loading: bool,
    /// A fetch is in flight, with or without a value.
    pub is_validating: bool,
    /// Outcome of the most recent completed fetch, cleared by the next success.
    pub error: Option<FetchError>,
    pub last_fetched_at: Option<SystemTime>,
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self { value: None, is_loading: false, is_validating: false, error: None, last_fetched_at: None }
    }
}

impl<V> Snapshot<V> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(FetchError::kind)
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Snapshot<U> {
        Snapshot {
            value: self.value.map(f),
            is_loading: self.is_loading,
            is_validating: self.is_validating,
            error: self.error,
            last_fetched_at: self.last_fetched_at,
        }
    }
}
