// ABOUTME: Data structures for image-to-3D job submission and status
// ABOUTME: Wire types are serialized to JSON for the remote generation API

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mesh format extracted from the artifact map of a finished job.
pub const MESH_FORMAT: &str = "glb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub owner_id: Uuid,
    pub image_url: String,
    pub prompt: String,
}

impl ConversionRequest {
    pub fn new(owner_id: Uuid, image_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            owner_id,
            image_url: image_url.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub job_id: String,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    #[serde(alias = "IN_PROGRESS")]
    Running,
    Succeeded,
    #[serde(alias = "CANCELED", alias = "EXPIRED")]
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub state: JobState,
    /// Mesh URL; only set when the job succeeded and the artifact exists.
    pub result_url: Option<String>,
    /// Completion percentage, 0 to 100.
    pub progress: Option<u8>,
    pub failure_reason: Option<String>,
}

impl JobStatus {
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            result_url: None,
            progress: None,
            failure_reason: None,
        }
    }

    pub fn succeeded(result_url: impl Into<String>) -> Self {
        Self {
            result_url: Some(result_url.into()),
            ..Self::new(JobState::Succeeded)
        }
    }
}

/// Body of `POST /image-to-3d`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ImageTo3dTask<'a> {
    pub image_url: &'a str,
    pub enable_pbr: bool,
    pub art_style: &'a str,
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitResponse {
    pub result: Option<String>,
}

/// Only `status` is strict; the other fields are read leniently so a
/// variation in them never aborts polling of a live job.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TaskResponse {
    pub status: Option<JobState>,
    #[serde(default)]
    pub model_urls: Option<serde_json::Value>,
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
    #[serde(default)]
    pub task_error: Option<serde_json::Value>,
}

fn narrow_progress(value: &serde_json::Value) -> Option<u8> {
    let pct = value.as_f64()?;
    if !pct.is_finite() {
        return None;
    }
    Some(pct.round().clamp(0.0, 100.0) as u8)
}

impl TaskResponse {
    /// Converts the wire shape into a status, or `None` when `status` is missing.
    pub fn into_status(self) -> Option<JobStatus> {
        let state = self.status?;

        let result_url = match state {
            JobState::Succeeded => self
                .model_urls
                .as_ref()
                .and_then(|urls| urls.get(MESH_FORMAT))
                .and_then(|v| v.as_str())
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            _ => None,
        };

        let failure_reason = self
            .task_error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .filter(|msg| !msg.is_empty())
            .map(str::to_string);

        Some(JobStatus {
            state,
            result_url,
            progress: self.progress.as_ref().and_then(narrow_progress),
            failure_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Option<JobStatus> {
        serde_json::from_value::<TaskResponse>(value)
            .expect("valid task response")
            .into_status()
    }

    #[test]
    fn test_succeeded_extracts_glb() {
        let status = parse(serde_json::json!({
            "id": "T1",
            "status": "SUCCEEDED",
            "progress": 100,
            "model_urls": { "glb": "https://x/a.glb", "fbx": "https://x/a.fbx" },
            "task_error": { "message": "" }
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.result_url.as_deref(), Some("https://x/a.glb"));
        assert_eq!(status.progress, Some(100));
        assert_eq!(status.failure_reason, None);
    }

    #[test]
    fn test_succeeded_without_glb_has_no_url() {
        let status = parse(serde_json::json!({
            "status": "SUCCEEDED",
            "model_urls": { "fbx": "https://x/a.fbx", "glb": "" }
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.result_url, None);
    }

    #[test]
    fn test_url_ignored_while_running() {
        let status = parse(serde_json::json!({
            "status": "IN_PROGRESS",
            "model_urls": { "glb": "https://x/partial.glb" }
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.result_url, None);
    }

    #[test]
    fn test_unrecognized_state_is_unknown() {
        let status = parse(serde_json::json!({ "status": "QUEUED_FOR_GPU" })).unwrap();
        assert_eq!(status.state, JobState::Unknown);
        assert!(!status.state.is_terminal());
    }

    #[test]
    fn test_canceled_is_failed_with_reason() {
        let status = parse(serde_json::json!({
            "status": "CANCELED",
            "task_error": { "message": "cancelled by user" }
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Failed);
        assert_eq!(status.failure_reason.as_deref(), Some("cancelled by user"));
    }

    #[test]
    fn test_pending_with_null_fields_still_parses() {
        let status = parse(serde_json::json!({
            "status": "PENDING",
            "model_urls": null,
            "progress": 0,
            "task_error": null
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Pending);
        assert_eq!(status.result_url, None);
        assert_eq!(status.progress, Some(0));
    }

    #[test]
    fn test_succeeded_with_null_glb_has_no_url() {
        let status = parse(serde_json::json!({
            "status": "SUCCEEDED",
            "model_urls": { "glb": null, "fbx": "https://x/a.fbx" }
        }))
        .unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.result_url, None);
    }

    #[test]
    fn test_odd_progress_values_are_narrowed() {
        let fractional = parse(serde_json::json!({ "status": "RUNNING", "progress": 42.6 })).unwrap();
        assert_eq!(fractional.progress, Some(43));

        let negative = parse(serde_json::json!({ "status": "RUNNING", "progress": -5 })).unwrap();
        assert_eq!(negative.progress, Some(0));

        let text = parse(serde_json::json!({
            "status": "RUNNING",
            "progress": "unknown",
            "task_error": "oops"
        }))
        .unwrap();
        assert_eq!(text.progress, None);
        assert_eq!(text.failure_reason, None);
    }

    #[test]
    fn test_missing_status_is_none() {
        assert!(parse(serde_json::json!({ "progress": 10 })).is_none());
    }

    #[test]
    fn test_task_body_shape() {
        let body = ImageTo3dTask {
            image_url: "https://img/1.png",
            enable_pbr: true,
            art_style: "realistic",
            prompt: "a spiral",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "image_url": "https://img/1.png",
                "enable_pbr": true,
                "art_style": "realistic",
                "prompt": "a spiral"
            })
        );
    }
}
