use thiserror::Error;

use crate::renderer::ArtifactFormat;

/// Why a single renderer could not produce an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering service call failed: {0}")]
    Api(String),

    #[error("rendering service timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("rendering service returned no content")]
    EmptyResponse,

    #[error("pdf layout failed: {0}")]
    Pdf(String),

    #[error("{format:?} artifact rejected: {reason}")]
    InvalidArtifact { format: ArtifactFormat, reason: String },

    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct RenderAttempt {
    pub renderer: String,
    pub error: String,
}

/// Failures that originate outside the analysis core.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("acquisition produced no records for {source_label}")]
    EmptyAcquisition { source_label: String },

    #[error("every renderer failed ({} attempted)", .attempts.len())]
    RenderExhausted { attempts: Vec<RenderAttempt> },
}
