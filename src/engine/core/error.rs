use super::profile::DvProfile;
use crate::engine::invoker::EngineStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run. A missing input file is not among them: it is
/// reported as an outcome, not an error.
#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("Invalid Dolby Vision profile: {0}")]
    InvalidProfile(String),

    #[error("Dolby Vision profile {0} cannot be signalled by {1}")]
    UnsupportedProfile(DvProfile, String),

    #[error("Failed to generate Dolby Vision metadata for {}: {message}", path.display())]
    MetadataGeneration { path: PathBuf, message: String },

    #[error("ffmpeg failed with {0}")]
    EngineFailed(EngineStatus),
}

impl RemuxError {
    /// Process exit code the binary should use for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RemuxError::EngineFailed(status) => status.code().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}
