//! Stand-in transport that fakes network latency

use super::traits::{SubmitError, SubmitTransport};
use crate::state::FormSubmission;
use async_trait::async_trait;
use std::time::Duration;

/// Waits for a fixed latency and always succeeds
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    latency: Duration,
}

impl SimulatedTransport {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl SubmitTransport for SimulatedTransport {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), SubmitError> {
        let payload = serde_json::to_string(submission)?;
        tracing::debug!("Simulating submission {} ({} bytes)", submission.id, payload.len());
        tokio::time::sleep(self.latency).await;
        tracing::info!(
            "Submission {} delivered with {} fields",
            submission.id,
            submission.fields.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FormEntry;
    use chrono::Utc;
    use uuid::Uuid;

    fn submission() -> FormSubmission {
        FormSubmission {
            id: Uuid::new_v4(),
            form_id: Some("contact".to_string()),
            action: None,
            submitted_at: Utc::now(),
            fields: vec![FormEntry {
                name: "email".to_string(),
                value: "anna@example.nl".to_string(),
            }],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_latency() {
        let transport = SimulatedTransport::default();
        let start = tokio::time::Instant::now();
        transport.submit(&submission()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[test]
    fn test_blocking_submit_succeeds() {
        let transport = SimulatedTransport::new(Duration::from_millis(1));
        tokio_test::assert_ok!(tokio_test::block_on(transport.submit(&submission())));
    }
}
