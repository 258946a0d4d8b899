use std::fmt::{Debug, Display, Formatter};

/// Failures reported by the request stores.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing connection is not configured or cannot be reached.
    Unavailable,
    /// The operation reached the store but failed.
    Store(String),
    /// The caller supplied malformed input.
    Validation(String),
    /// Stored or received data is not valid structured data.
    Parse(String),
}

impl StoreError {
    pub fn store(msg: impl Into<String>) -> StoreError {
        StoreError::Store(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> StoreError {
        StoreError::Validation(msg.into())
    }

    /// A hard failure means the store could not be talked to at all, as opposed to
    /// an operation that reached it and was refused.
    pub fn is_hard(&self) -> bool {
        matches!(self, StoreError::Unavailable)
    }

    /// Running without a database is a normal setup, so it only shows up in debug output.
    pub fn log_level(&self) -> log::Level {
        match self {
            StoreError::Unavailable => log::Level::Debug,
            _ => log::Level::Warn,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "Database not configured"),
            StoreError::Store(details) => write!(f, "{}", details),
            StoreError::Validation(details) => write!(f, "{}", details),
            StoreError::Parse(details) => write!(f, "invalid data: {}", details),
        }
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "StoreUnavailable"),
            StoreError::Store(details) => write!(f, "StoreError({})", details),
            StoreError::Validation(details) => write!(f, "ValidationError({})", details),
            StoreError::Parse(details) => write!(f, "ParseError({})", details),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;
