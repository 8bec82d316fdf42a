//! Stored value representation
//!
//! A present entry either carries bytes (possibly zero-length) or is nil.
//! Absence of the key itself is expressed by the store as `None`.

use serde::{Deserialize, Serialize};

/// Payload held under a key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Present, but the writer supplied no data
    Nil,
    /// Present with the given bytes
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Borrow the bytes, `None` for nil
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Nil => None,
            Value::Bytes(bytes) => Some(bytes),
        }
    }

    /// Consume the value, `None` for nil
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Nil => None,
            Value::Bytes(bytes) => Some(bytes),
        }
    }

    /// Number of bytes held; nil counts as zero
    pub fn len(&self) -> usize {
        self.as_bytes().map_or(0, <[u8]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<&Vec<u8>> for Value {
    fn from(bytes: &Vec<u8>) -> Self {
        Value::Bytes(bytes.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bytes(s.as_bytes().to_vec())
    }
}

impl From<Option<Vec<u8>>> for Value {
    fn from(bytes: Option<Vec<u8>>) -> Self {
        bytes.map_or(Value::Nil, Value::Bytes)
    }
}

impl From<Option<&[u8]>> for Value {
    fn from(bytes: Option<&[u8]>) -> Self {
        bytes.map_or(Value::Nil, |b| Value::Bytes(b.to_vec()))
    }
}
