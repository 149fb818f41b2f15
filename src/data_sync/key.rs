use crate::sync_error::SyncError;
use alloy_primitives::{Address, U256};
use std::fmt::{Display, Formatter};

/// One component of a [`FetchKey`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Str(String),
    Address(Address),
    Uint(U256),
    Int(i64),
    Bool(bool),
    /// A required argument that is not available yet, e.g. no connected account.
    Absent,
}

impl Display for KeyPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Str(s) => write!(f, "{s}"),
            KeyPart::Address(address) => write!(f, "{address:#x}"),
            KeyPart::Uint(value) => write!(f, "{value}"),
            KeyPart::Int(value) => write!(f, "{value}"),
            KeyPart::Bool(value) => write!(f, "{value}"),
            KeyPart::Absent => write!(f, "<absent>"),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<Address> for KeyPart {
    fn from(value: Address) -> Self {
        KeyPart::Address(value)
    }
}

impl From<U256> for KeyPart {
    fn from(value: U256) -> Self {
        KeyPart::Uint(value)
    }
}

impl From<u64> for KeyPart {
    fn from(value: u64) -> Self {
        KeyPart::Uint(U256::from(value))
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        KeyPart::Bool(value)
    }
}

impl<T: Into<KeyPart>> From<Option<T>> for KeyPart {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyPart::Absent, Into::into)
    }
}

/// Structural identifier of one remote data source.
///
/// Two keys built from equal parts in the same order refer to the same cache entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchKey {
    parts: Vec<KeyPart>,
}

impl FetchKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(parts: Vec<KeyPart>) -> Self {
        Self { parts }
    }

    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// A key is usable when it has at least one part and none of them is absent.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.parts.is_empty() {
            return Err(SyncError::InvalidKey { key: self.to_string(), reason: "key has no parts".to_string() });
        }
        if let Some(position) = self.parts.iter().position(|part| *part == KeyPart::Absent) {
            return Err(SyncError::InvalidKey {
                key: self.to_string(),
                reason: format!("missing required argument at position {position}"),
            });
        }
        Ok(())
    }
}

impl Display for FetchKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, "]")
    }
}
