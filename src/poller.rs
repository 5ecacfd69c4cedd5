use crate::{
    Error, Result,
    config::PollingConfig,
    service::{Diagnosis, InferenceClient, JobHandle, JobStatus},
};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bounded fixed-interval polling. A policy with `max_attempts == 1` is a
/// single delayed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollingPolicy {
    pub fn single_check(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            interval: delay,
            max_attempts: 1,
        }
    }

    fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 1 {
            self.initial_delay
        } else {
            self.interval
        }
    }
}

impl From<&PollingConfig> for PollingPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
        }
    }
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

pub struct StatusPoller<'a> {
    client: &'a dyn InferenceClient,
    policy: PollingPolicy,
}

impl<'a> StatusPoller<'a> {
    pub fn new(client: &'a dyn InferenceClient, policy: PollingPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &PollingPolicy {
        &self.policy
    }

    /// Polls until the job leaves `processing`, one request at a time.
    pub async fn poll(&self, handle: &JobHandle, cancel: &CancellationToken) -> Result<Diagnosis> {
        info!(
            "Polling {} (max {} attempts, every {:?})",
            handle, self.policy.max_attempts, self.policy.interval
        );

        for attempt in 1..=self.policy.max_attempts {
            cancellable(cancel, tokio::time::sleep(self.policy.delay_before(attempt))).await?;

            let status = cancellable(cancel, self.client.status(handle)).await??;
            debug!("Status attempt {}/{}: {:?}", attempt, self.policy.max_attempts, status);

            match status {
                JobStatus::Processing => continue,
                JobStatus::Completed(diagnosis) => {
                    info!(
                        "Analysis completed after {} attempts: {} ({:.2})",
                        attempt,
                        diagnosis.condition(),
                        diagnosis.confidence()
                    );
                    return Ok(diagnosis);
                }
                JobStatus::Failed(message) => {
                    warn!("Analysis failed on the service: {}", message);
                    return Err(Error::JobFailed(message));
                }
                JobStatus::NotFound => {
                    warn!("Service does not know job {}", handle);
                    return Err(Error::JobNotFound(handle.to_string()));
                }
            }
        }

        warn!(
            "Analysis still processing after {} attempts",
            self.policy.max_attempts
        );
        Err(Error::Timeout {
            attempts: self.policy.max_attempts,
        })
    }
}

/// Runs `fut` unless the token fires first.
pub(crate) async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        output = fut => Ok(output),
    }
}
