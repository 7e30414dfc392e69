// Track descriptors: an input stream plus the ordered steps applied to it.
//
// Descriptors are built once per run and never mutated afterwards; every
// `with_*` method consumes the track and returns it with one more step.

use super::profile::DvProfile;
use std::fmt;
use std::path::{Path, PathBuf};

/// Sample format forced by audio normalization
pub const NORMALIZED_SAMPLE_FMT: &str = "fltp";
/// Channel layout forced by audio normalization
pub const NORMALIZED_CHANNEL_LAYOUT: &str = "stereo";
/// Sample rate forced by audio normalization (Hz)
pub const NORMALIZED_SAMPLE_RATE: u32 = 48_000;

/// Bitrate in kb/s. Not range-checked: whatever parsed as an integer is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitrate {
    pub kbps: i64,
}

impl Bitrate {
    pub fn kbps(kbps: i64) -> Self {
        Self { kbps }
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}k", self.kbps)
    }
}

/// Timestamp rounding used by ffmpeg's `fps` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsRounding {
    Zero,
    Inf,
    Down,
    Up,
    Near,
}

impl FpsRounding {
    pub fn as_str(self) -> &'static str {
        match self {
            FpsRounding::Zero => "zero",
            FpsRounding::Inf => "inf",
            FpsRounding::Down => "down",
            FpsRounding::Up => "up",
            FpsRounding::Near => "near",
        }
    }

    /// Number of frames produced when `duration_s` seconds are resampled to `fps`.
    pub fn frames(self, duration_s: f64, fps: f64) -> u64 {
        let exact = duration_s * fps;
        if !exact.is_finite() || exact <= 0.0 {
            return 0;
        }
        let rounded = match self {
            FpsRounding::Zero | FpsRounding::Down => exact.floor(),
            FpsRounding::Inf | FpsRounding::Up => exact.ceil(),
            FpsRounding::Near => exact.round(),
        };
        rounded as u64
    }
}

/// Rate conversion applied with ffmpeg's `fps` filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateConversion {
    pub fps: f64,
    pub rounding: FpsRounding,
}

impl FrameRateConversion {
    /// Conversion that never drops below the requested rate.
    pub fn round_up(fps: f64) -> Self {
        Self {
            fps,
            rounding: FpsRounding::Up,
        }
    }

    /// Frames in the converted stream for a source of `duration_s` seconds.
    pub fn output_frames(&self, duration_s: f64) -> u64 {
        self.rounding.frames(duration_s, self.fps)
    }

    /// ffmpeg filter expression, e.g. `fps=fps=24:round=up`.
    pub fn filter(&self) -> String {
        format!("fps=fps={}:round={}", self.fps, self.rounding.as_str())
    }
}

/// Opaque RPU payload attached to the video stream.
#[derive(Clone, PartialEq, Eq)]
pub struct DolbyVisionMetadata {
    pub profile: DvProfile,
    pub rpu: Vec<u8>,
}

// RPU payloads run to megabytes; keep Debug output readable.
impl fmt::Debug for DolbyVisionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DolbyVisionMetadata")
            .field("profile", &self.profile)
            .field("rpu_bytes", &self.rpu.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoStep {
    DolbyVision(DolbyVisionMetadata),
    Bitrate(Bitrate),
    FrameRate(FrameRateConversion),
}

/// First video stream of `source`, followed by its steps in application order.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTrack {
    source: PathBuf,
    steps: Vec<VideoStep>,
}

impl VideoTrack {
    pub fn from_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_dolby_vision(mut self, profile: DvProfile, rpu: Vec<u8>) -> Self {
        self.steps
            .push(VideoStep::DolbyVision(DolbyVisionMetadata { profile, rpu }));
        self
    }

    pub fn with_bitrate(mut self, kbps: i64) -> Self {
        self.steps.push(VideoStep::Bitrate(Bitrate::kbps(kbps)));
        self
    }

    /// Attach an `fps` conversion with round-up semantics.
    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.steps
            .push(VideoStep::FrameRate(FrameRateConversion::round_up(fps)));
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn steps(&self) -> &[VideoStep] {
        &self.steps
    }

    pub fn dolby_vision(&self) -> Option<&DolbyVisionMetadata> {
        self.steps.iter().find_map(|step| match step {
            VideoStep::DolbyVision(dv) => Some(dv),
            _ => None,
        })
    }

    pub fn bitrate(&self) -> Option<Bitrate> {
        self.steps.iter().rev().find_map(|step| match step {
            VideoStep::Bitrate(b) => Some(*b),
            _ => None,
        })
    }

    pub fn frame_rate(&self) -> Option<FrameRateConversion> {
        self.steps.iter().rev().find_map(|step| match step {
            VideoStep::FrameRate(f) => Some(*f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioStep {
    /// Pass the encoded stream through untouched
    StreamCopy,
    Format {
        sample_fmt: &'static str,
        channel_layout: &'static str,
    },
    SampleRate(u32),
    Bitrate(Bitrate),
}

/// First audio stream of `source`, stream-copied unless normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    source: PathBuf,
    steps: Vec<AudioStep>,
}

impl AudioTrack {
    pub fn from_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            steps: vec![AudioStep::StreamCopy],
        }
    }

    /// Normalize to stereo `fltp` at 48 kHz and re-encode at `kbps`.
    ///
    /// Filtering cannot be combined with a stream copy, so the copy step is
    /// dropped.
    pub fn with_bitrate(mut self, kbps: i64) -> Self {
        self.steps.retain(|step| *step != AudioStep::StreamCopy);
        self.steps.push(AudioStep::Format {
            sample_fmt: NORMALIZED_SAMPLE_FMT,
            channel_layout: NORMALIZED_CHANNEL_LAYOUT,
        });
        self.steps.push(AudioStep::SampleRate(NORMALIZED_SAMPLE_RATE));
        self.steps.push(AudioStep::Bitrate(Bitrate::kbps(kbps)));
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn steps(&self) -> &[AudioStep] {
        &self.steps
    }

    pub fn is_stream_copy(&self) -> bool {
        self.steps == [AudioStep::StreamCopy]
    }

    /// Filter chain for `-af`, or `None` when nothing needs filtering.
    pub fn filter_chain(&self) -> Option<String> {
        let filters: Vec<String> = self
            .steps
            .iter()
            .filter_map(|step| match step {
                AudioStep::Format {
                    sample_fmt,
                    channel_layout,
                } => Some(format!(
                    "aformat=sample_fmts={}:channel_layouts={}",
                    sample_fmt, channel_layout
                )),
                AudioStep::SampleRate(rate) => Some(format!("aresample={}", rate)),
                AudioStep::StreamCopy | AudioStep::Bitrate(_) => None,
            })
            .collect();

        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }

    pub fn bitrate(&self) -> Option<Bitrate> {
        self.steps.iter().rev().find_map(|step| match step {
            AudioStep::Bitrate(b) => Some(*b),
            _ => None,
        })
    }
}
