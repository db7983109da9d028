//! Change event payloads
//!
//! A [`ChangeEvent`] is what the hub fans out. It is immutable once created
//! and cheap to clone: every dispatch worker shares the same `Bytes`
//! allocation, only the reference count is bumped.

use bytes::Bytes;
use serde::Serialize;

/// An opaque payload broadcast to every registered subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    data: Bytes,
}

impl ChangeEvent {
    /// Create an event from raw bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Create an event from text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(text.into()),
        }
    }

    /// Serialize a value as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        let data = serde_json::to_vec(value)?;
        Ok(Self {
            data: Bytes::from(data),
        })
    }

    /// Payload bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Payload as UTF-8, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Bytes> for ChangeEvent {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<String> for ChangeEvent {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&'static str> for ChangeEvent {
    fn from(text: &'static str) -> Self {
        Self::new(Bytes::from_static(text.as_bytes()))
    }
}
