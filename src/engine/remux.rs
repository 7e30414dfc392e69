use crate::engine::builder::{build_audio_track, build_video_track};
use crate::engine::core::{EncodingParams, OutputSpec, RemuxError};
use crate::engine::invoker::Engine;
use crate::engine::metadata::MetadataGenerator;
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Options for one conversion, as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RemuxRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Dolby Vision profile identifier, resolved by the metadata generator
    pub profile: Option<String>,
    pub bitrate_kbps: Option<i64>,
    pub frame_rate: Option<f64>,
    pub audio_bitrate_kbps: Option<i64>,
}

impl RemuxRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            profile: None,
            bitrate_kbps: None,
            frame_rate: None,
            audio_bitrate_kbps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemuxOutcome {
    Completed,
    /// The input did not exist; nothing was generated or spawned.
    MissingInput(PathBuf),
}

/// Build the output specification for a request without running anything.
pub fn plan(
    request: &RemuxRequest,
    generator: &dyn MetadataGenerator,
    params: EncodingParams,
) -> Result<OutputSpec, RemuxError> {
    let mut video = build_video_track(
        generator,
        &request.input,
        request.profile.as_deref(),
        request.bitrate_kbps,
    )?;
    let audio = build_audio_track(&request.input, request.audio_bitrate_kbps);

    if let Some(fps) = request.frame_rate {
        video = video.with_frame_rate(fps);
    }

    Ok(OutputSpec::new(video, audio, &request.output).with_params(params))
}

/// Convert one file: check the input, build both tracks, invoke the engine once.
pub fn remux(
    request: &RemuxRequest,
    generator: &dyn MetadataGenerator,
    engine: &dyn Engine,
    params: EncodingParams,
) -> Result<RemuxOutcome> {
    if !request.input.exists() {
        return Ok(RemuxOutcome::MissingInput(request.input.clone()));
    }

    let spec = plan(request, generator, params)?;
    let status = engine.invoke(&spec)?;

    if !status.is_success() {
        return Err(RemuxError::EngineFailed(status).into());
    }

    info!("Wrote {}", request.output.display());
    Ok(RemuxOutcome::Completed)
}
