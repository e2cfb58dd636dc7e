// ABOUTME: Error taxonomy for the image-to-3D conversion workflow
// ABOUTME: Each variant names one failure cause so callers can act on it

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Network failure or request timeout at the HTTP layer.
    Transport(String),
    /// The remote service answered with a non-success status code.
    RemoteRejected { status: u16, body: String },
    /// The response body does not have the expected shape.
    MalformedResponse(String),
    /// The job reached FAILED, or SUCCEEDED without the mesh artifact.
    RemoteJobFailed(String),
    /// Every poll attempt finished without a terminal state.
    PollTimeout { attempts: u32 },
    /// Generation succeeded but recording the result failed. The URL is kept
    /// so the write can be retried without generating again.
    Persistence { result_url: String, message: String },
}

impl ConversionError {
    /// The already generated artifact URL, if this failure happened after generation.
    pub fn result_url(&self) -> Option<&str> {
        match self {
            ConversionError::Persistence { result_url, .. } => Some(result_url),
            _ => None,
        }
    }

    /// True when only the write needs repeating, not the generation.
    pub fn is_retryable_write(&self) -> bool {
        matches!(self, ConversionError::Persistence { .. })
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConversionError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ConversionError::RemoteRejected { status, body } => {
                write!(f, "Remote service rejected the request with status {}: {}", status, body)
            }
            ConversionError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            ConversionError::RemoteJobFailed(msg) => write!(f, "Remote job failed: {}", msg),
            ConversionError::PollTimeout { attempts } => {
                write!(f, "Timed out after {} status checks without a terminal state", attempts)
            }
            ConversionError::Persistence {
                result_url,
                message,
            } => write!(
                f,
                "Generation succeeded but saving the result failed: {}. The model is available at {}",
                message, result_url
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<reqwest::Error> for ConversionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConversionError::Transport(format!("request timed out: {}", err))
        } else {
            ConversionError::Transport(err.to_string())
        }
    }
}
