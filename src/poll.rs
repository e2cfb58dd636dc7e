// ABOUTME: Bounded fixed-interval polling of a remote job until it is terminal
// ABOUTME: Classifies each status into continue, success with artifact, or failure

use std::time::Duration;
use tracing::{info, warn};

use crate::config::PollConfig;
use crate::error::ConversionError;
use crate::remote::{JobHandle, JobState, JobStatus, RemoteJobClient};

/// How a poll run ended when no fault interrupted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Succeeded { result_url: String },
    /// Remote FAILED, or SUCCEEDED without the mesh artifact.
    Failed { reason: String },
    /// No terminal state within the attempt budget.
    Exhausted { attempts: u32 },
}

enum Decision {
    Continue,
    Stop(TerminalStatus),
}

fn classify(status: &JobStatus) -> Decision {
    match status.state {
        JobState::Succeeded => match &status.result_url {
            Some(url) => Decision::Stop(TerminalStatus::Succeeded {
                result_url: url.clone(),
            }),
            // A finished job never grows an artifact later.
            None => Decision::Stop(TerminalStatus::Failed {
                reason: "job succeeded but produced no glb artifact".to_string(),
            }),
        },
        JobState::Failed => Decision::Stop(TerminalStatus::Failed {
            reason: status
                .failure_reason
                .clone()
                .unwrap_or_else(|| "remote service reported FAILED".to_string()),
        }),
        JobState::Pending | JobState::Running | JobState::Unknown => Decision::Continue,
    }
}

#[derive(Debug, Clone)]
pub struct PollLoop {
    max_attempts: u32,
    interval: Duration,
    tolerate_transport_faults: bool,
}

impl Default for PollLoop {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollLoop {
    fn from(config: &PollConfig) -> Self {
        Self::new(config.max_attempts, config.interval())
            .tolerate_transport_faults(config.tolerate_transport_faults)
    }
}

impl PollLoop {
    /// `max_attempts` is raised to 1 so every job is checked at least once.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            tolerate_transport_faults: false,
        }
    }

    /// Count a transport failure as a spent attempt instead of aborting.
    pub fn tolerate_transport_faults(mut self, tolerate: bool) -> Self {
        self.tolerate_transport_faults = tolerate;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls `handle` until it is terminal or the attempt budget runs out.
    ///
    /// Sleeps one interval before every status query, so a job is never
    /// queried more than `max_attempts` times. `on_status` sees every status
    /// the remote service returns, in order.
    pub async fn await_terminal<C>(
        &self,
        client: &C,
        handle: &JobHandle,
        on_status: impl Fn(&JobStatus),
    ) -> Result<TerminalStatus, ConversionError>
    where
        C: RemoteJobClient + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;

            let status = match client.get_status(handle).await {
                Ok(status) => status,
                Err(ConversionError::Transport(msg)) if self.tolerate_transport_faults => {
                    warn!(
                        "Status check {}/{} for job {} failed, will retry: {}",
                        attempt, self.max_attempts, handle.job_id, msg
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };

            info!(
                "Job {} status: {:?} (check {}/{}, progress {})",
                handle.job_id,
                status.state,
                attempt,
                self.max_attempts,
                status
                    .progress
                    .map(|p| format!("{}%", p))
                    .unwrap_or_else(|| "n/a".to_string())
            );
            on_status(&status);

            if let Decision::Stop(terminal) = classify(&status) {
                return Ok(terminal);
            }
        }

        warn!(
            "Job {} not finished after {} status checks",
            handle.job_id, self.max_attempts
        );
        Ok(TerminalStatus::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
