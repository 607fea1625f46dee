//! Trait abstraction for form submission to enable mocking in tests

use crate::state::FormSubmission;
use async_trait::async_trait;
use thiserror::Error;

/// Why a submission did not go through
#[derive(Debug, Error)]
pub enum SubmitError {
    // Only raised by networked transports; the simulated one always succeeds
    #[allow(dead_code)]
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[allow(dead_code)]
    #[error("submission endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode submission: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Delivers a serialised form to wherever it needs to go
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), SubmitError>;
}
