//! Shared fixtures for unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::LaunchError;
use crate::jobs::{JobDescription, Scheduler};

/// Scheduler that records successful launches and can be told to fail.
#[derive(Default)]
pub(crate) struct RecordingScheduler {
    launched: Mutex<Vec<String>>,
    fail_next: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl RecordingScheduler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Scheduler whose every launch takes `delay`.
    pub(crate) fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub(crate) async fn launched(&self) -> Vec<String> {
        self.launched.lock().await.clone()
    }

    pub(crate) async fn fail_next(&self, error: &str) {
        *self.fail_next.lock().await = Some(error.to_owned());
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    fn name(&self) -> &str {
        "recording"
    }

    async fn create(&self, _ctx: &CancellationToken, job: &JobDescription) -> Result<(), LaunchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.fail_next.lock().await.take() {
            return Err(LaunchError::Rejected { error });
        }
        self.launched.lock().await.push(job.id.to_string());
        Ok(())
    }
}
