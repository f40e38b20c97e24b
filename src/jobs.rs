pub mod cleanup;
pub mod recurring;
pub mod registration;
pub mod requests;
pub mod service;

use std::sync::Arc;

use thiserror::Error;

use crate::invoker::InvokeError;

/// How a failed job execution should be treated by the scheduler's retry
/// policy.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    FailPermanently(String),
    #[error("{0}")]
    TryAgainLater(String),
}

impl From<InvokeError> for JobError {
    fn from(err: InvokeError) -> Self {
        match &err {
            // Client errors will not heal on retry; everything else might.
            InvokeError::Status { status, .. } if (400..500).contains(status) => {
                Self::FailPermanently(err.to_string())
            }
            InvokeError::InvalidMethod(_) | InvokeError::Cancelled => {
                Self::FailPermanently(err.to_string())
            }
            _ => Self::TryAgainLater(err.to_string()),
        }
    }
}

/// The compiled-in set of recurring jobs registered at startup.
#[must_use]
pub fn default_registry() -> recurring::JobRegistry {
    vec![Arc::new(cleanup::TodoItemsCleanupJob::new())]
}
