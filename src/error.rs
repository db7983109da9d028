//! Error types
//!
//! The crate-level [`Error`] wraps the per-module error enums so callers
//! can use a single `Result` alias across the hub, the server and the feed.

use std::fmt;
use std::io;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug)]
pub enum Error {
    /// Socket or stream I/O failure
    Io(io::Error),
    /// Hub channel failure
    Hub(HubError),
    /// Item feed rejected an operation
    Feed(FeedError),
    /// Payload could not be serialized
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Hub(e) => write!(f, "Hub error: {}", e),
            Error::Feed(e) => write!(f, "Feed error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Hub(e) => Some(e),
            Error::Feed(e) => Some(e),
            Error::Json(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HubError> for Error {
    fn from(e: HubError) -> Self {
        Error::Hub(e)
    }
}

impl From<FeedError> for Error {
    fn from(e: FeedError) -> Self {
        Error::Feed(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

/// Errors returned by [`HubHandle`](crate::hub::HubHandle) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubError {
    /// The router task is no longer running
    Closed,
    /// The broadcast queue is full (only from `try_broadcast`)
    Full,
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HubError::Closed => write!(f, "hub router is not running"),
            HubError::Full => write!(f, "broadcast queue is full"),
        }
    }
}

impl std::error::Error for HubError {}

/// Errors returned by the item feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Item name is empty after trimming
    EmptyName,
    /// Item name exceeds the maximum length
    NameTooLong { len: usize, max: usize },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::EmptyName => write!(f, "item name must not be empty"),
            FeedError::NameTooLong { len, max } => {
                write!(f, "item name is {} characters, maximum is {}", len, max)
            }
        }
    }
}

impl std::error::Error for FeedError {}
