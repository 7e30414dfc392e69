// Track construction. All validation that can fail a run happens here,
// before anything is handed to the engine.

use crate::engine::core::{AudioTrack, RemuxError, VideoTrack};
use crate::engine::metadata::MetadataGenerator;
use std::path::Path;
use tracing::debug;

/// Build the video track: source, then Dolby Vision metadata when a profile
/// is requested, then the bitrate override.
///
/// The profile is resolved through the generator before any metadata is
/// generated; an unknown identifier fails with [`RemuxError::InvalidProfile`].
pub fn build_video_track(
    generator: &dyn MetadataGenerator,
    input: &Path,
    profile_id: Option<&str>,
    bitrate_kbps: Option<i64>,
) -> Result<VideoTrack, RemuxError> {
    let mut video = VideoTrack::from_source(input);

    if let Some(id) = profile_id {
        let profile = generator
            .lookup(id)
            .ok_or_else(|| RemuxError::InvalidProfile(id.to_string()))?;

        let rpu = generator
            .generate(input, profile)
            .map_err(|e| RemuxError::MetadataGeneration {
                path: input.to_path_buf(),
                message: format!("{:#}", e),
            })?;

        debug!(%profile, bytes = rpu.len(), "attaching Dolby Vision metadata");
        video = video.with_dolby_vision(profile, rpu);
    }

    if let Some(kbps) = bitrate_kbps {
        video = video.with_bitrate(kbps);
    }

    Ok(video)
}

/// Build the audio track: a stream copy, or stereo/48 kHz normalization at
/// the requested bitrate.
pub fn build_audio_track(input: &Path, audio_bitrate_kbps: Option<i64>) -> AudioTrack {
    let audio = AudioTrack::from_source(input);
    match audio_bitrate_kbps {
        Some(kbps) => audio.with_bitrate(kbps),
        None => audio,
    }
}
