// ABOUTME: End-to-end workflow for one image-to-3D conversion
// ABOUTME: Submit, poll to a terminal state, then record the mesh URL on the owner

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::persistence::PersistenceGateway;
use crate::poll::{PollLoop, TerminalStatus};
use crate::remote::{ConversionRequest, JobStatus, RemoteJobClient};

/// Either the mesh URL, now recorded on the owner, or the reason there is none.
pub type ConversionOutcome = Result<String, ConversionError>;

pub struct Orchestrator<C: ?Sized, P: ?Sized> {
    client: Arc<C>,
    gateway: Arc<P>,
    poll: PollLoop,
}

impl<C, P> Orchestrator<C, P>
where
    C: RemoteJobClient + ?Sized,
    P: PersistenceGateway + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, gateway: Arc<P>, poll: PollLoop) -> Self {
        Self {
            client,
            gateway,
            poll,
        }
    }

    pub async fn run(
        &self,
        owner_id: Uuid,
        image_url: impl Into<String>,
        prompt: impl Into<String>,
    ) -> ConversionOutcome {
        self.run_request(ConversionRequest::new(owner_id, image_url, prompt))
            .await
    }

    pub async fn run_request(&self, request: ConversionRequest) -> ConversionOutcome {
        self.run_request_with(request, |_| {}).await
    }

    /// Like [`Self::run_request`], reporting every polled status to `on_status`.
    pub async fn run_request_with(
        &self,
        request: ConversionRequest,
        on_status: impl Fn(&JobStatus),
    ) -> ConversionOutcome {
        let owner_id = request.owner_id;
        info!("Submitting 3D task for asset {}", owner_id);

        let handle = self.client.submit(&request).await.map_err(|e| {
            warn!("Submission for asset {} failed: {}", owner_id, e);
            e
        })?;
        info!("Asset {} is generating as job {}", owner_id, handle.job_id);

        let result_url = match self
            .poll
            .await_terminal(self.client.as_ref(), &handle, on_status)
            .await?
        {
            TerminalStatus::Succeeded { result_url } => result_url,
            TerminalStatus::Failed { reason } => {
                warn!("Job {} for asset {} failed: {}", handle.job_id, owner_id, reason);
                return Err(ConversionError::RemoteJobFailed(reason));
            }
            TerminalStatus::Exhausted { attempts } => {
                return Err(ConversionError::PollTimeout { attempts });
            }
        };

        self.persist(owner_id, result_url).await
    }

    /// Runs the write on its own task so dropping the caller's future cannot
    /// interrupt it halfway.
    async fn persist(&self, owner_id: Uuid, result_url: String) -> ConversionOutcome {
        let gateway = Arc::clone(&self.gateway);
        let url = result_url.clone();
        let write = tokio::spawn(async move { gateway.update(owner_id, &url).await });

        let message = match write.await {
            Ok(Ok(())) => {
                info!("Asset {} synchronized with model {}", owner_id, result_url);
                return Ok(result_url);
            }
            Ok(Err(e)) => format!("{:#}", e),
            Err(join_err) => format!("write task did not complete: {}", join_err),
        };

        warn!(
            "Model {} generated but asset {} was not updated: {}",
            result_url, owner_id, message
        );
        Err(ConversionError::Persistence {
            result_url,
            message,
        })
    }
}
