// ABOUTME: HTTP client for the remote image-to-3D generation API
// ABOUTME: Handles job submission and single-shot status queries, no retries

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::models::{
    ConversionRequest, ImageTo3dTask, JobHandle, JobStatus, SubmitResponse, TaskResponse,
};
use crate::config::RemoteConfig;
use crate::error::ConversionError;

/// The two requests the workflow needs from a generation service.
///
/// Each call performs exactly one request and reports the outcome of that
/// attempt. Retry policy lives in [`crate::poll::PollLoop`].
#[async_trait]
pub trait RemoteJobClient: Send + Sync {
    async fn submit(&self, request: &ConversionRequest) -> Result<JobHandle, ConversionError>;

    async fn get_status(&self, handle: &JobHandle) -> Result<JobStatus, ConversionError>;
}

pub struct RemoteClient {
    client: Client,
    api_base_url: String,
    api_key: String,
    art_style: String,
    enable_pbr: bool,
}

impl RemoteClient {
    pub fn new(api_base_url: String, api_key: String) -> Result<Self> {
        Self::from_config(&RemoteConfig {
            base_url: api_base_url,
            api_key: Some(api_key),
            ..RemoteConfig::default()
        })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .context("No API key configured. Set remote.api_key in the config file or the MESHY_API_KEY environment variable")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            art_style: config.art_style.clone(),
            enable_pbr: config.enable_pbr,
        })
    }

    fn tasks_url(&self) -> String {
        format!("{}/image-to-3d", self.api_base_url)
    }
}

#[async_trait]
impl RemoteJobClient for RemoteClient {
    async fn submit(&self, request: &ConversionRequest) -> Result<JobHandle, ConversionError> {
        let task = ImageTo3dTask {
            image_url: &request.image_url,
            enable_pbr: self.enable_pbr,
            art_style: &self.art_style,
            prompt: &request.prompt,
        };

        let response = self
            .client
            .post(self.tasks_url())
            .bearer_auth(&self.api_key)
            .json(&task)
            .send()
            .await?;

        let submitted: SubmitResponse = read_json(response, "job submission").await?;

        match submitted.result.filter(|id| !id.is_empty()) {
            Some(job_id) => {
                debug!("Remote service accepted job {}", job_id);
                Ok(JobHandle { job_id })
            }
            None => Err(ConversionError::MalformedResponse(
                "job submission response has no job identifier in `result`".to_string(),
            )),
        }
    }

    async fn get_status(&self, handle: &JobHandle) -> Result<JobStatus, ConversionError> {
        let url = format!("{}/{}", self.tasks_url(), handle.job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let task: TaskResponse = read_json(response, "job status").await?;

        task.into_status().ok_or_else(|| {
            ConversionError::MalformedResponse(format!(
                "status response for job {} has no `status` field",
                handle.job_id
            ))
        })
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T, ConversionError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ConversionError::RemoteRejected {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ConversionError::MalformedResponse(format!("Failed to parse {}: {}", what, e)))
}
