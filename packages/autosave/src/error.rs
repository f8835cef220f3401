use thiserror::Error;

/// Error reported by a save target.
///
/// The coordinator never interprets the failure; it relays the message
/// through [`crate::SaveStatus::error`] and keeps the unsaved value for a
/// later attempt, so a plain message is all a target needs to provide.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SaveError(pub String);

impl SaveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<String> for SaveError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for SaveError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
