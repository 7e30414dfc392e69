use super::track::{AudioTrack, VideoTrack};
use std::path::{Path, PathBuf};

/// Encoder settings applied to every run: 10-bit 4:2:0 HEVC with BT.2020
/// primaries, PQ transfer and non-constant-luminance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingParams {
    pub video_codec: String,
    pub pix_fmt: String,
    pub color_primaries: String,
    pub color_trc: String,
    pub colorspace: String,
    pub preset: String,
    pub crf: u32,
    pub tune: String,
    pub movflags: String,
    /// VBV max rate used for Dolby Vision when no video bitrate is set
    pub dv_vbv_maxrate_kbps: u32,
}

impl EncodingParams {
    pub fn hdr10() -> Self {
        Self {
            video_codec: "libx265".to_string(),
            pix_fmt: "yuv420p10le".to_string(),
            color_primaries: "bt2020".to_string(),
            color_trc: "smpte2084".to_string(),
            colorspace: "bt2020nc".to_string(),
            preset: "slow".to_string(),
            crf: 18,
            tune: "fastdecode".to_string(),
            movflags: "+faststart".to_string(),
            dv_vbv_maxrate_kbps: 20_000,
        }
    }
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self::hdr10()
    }
}

/// Everything the engine needs for one run: both tracks, the destination and
/// the encoder settings. Existing destinations are always overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    video: VideoTrack,
    audio: AudioTrack,
    destination: PathBuf,
    params: EncodingParams,
}

impl OutputSpec {
    pub fn new(video: VideoTrack, audio: AudioTrack, destination: impl Into<PathBuf>) -> Self {
        Self {
            video,
            audio,
            destination: destination.into(),
            params: EncodingParams::hdr10(),
        }
    }

    pub fn with_params(mut self, params: EncodingParams) -> Self {
        self.params = params;
        self
    }

    pub fn video(&self) -> &VideoTrack {
        &self.video
    }

    pub fn audio(&self) -> &AudioTrack {
        &self.audio
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn params(&self) -> &EncodingParams {
        &self.params
    }

    /// Lowercased destination extension, used to pick a compatible audio codec
    pub fn container(&self) -> Option<String> {
        self.destination
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
    }
}
