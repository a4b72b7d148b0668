//! Errors reported to the caller of the service.

use thiserror::Error;

/// Category attached to every failure the service reports.
pub const SERVICE_NAME: &str = "smap-l2-gridder";

/// A failed request, flattened to a message and a category.
///
/// The full cause chain is folded into `message` so callers that only see
/// the text still learn which step failed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
    pub category: &'static str,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: SERVICE_NAME,
        }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}
