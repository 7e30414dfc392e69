// Dolby Vision metadata generation.
//
// The generator is consulted twice per run: `lookup` validates the requested
// profile before anything expensive happens, `generate` produces the RPU
// payload that ends up in the encoded stream.

use crate::engine::core::{DvProfile, FrameRateConversion, probe_video_timing, resolve_tool};
use anyhow::{Context, Result};
use dolby_vision::rpu::generate::{GenerateConfig, GenerateProfile, VideoShot};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub trait MetadataGenerator {
    /// Resolve a profile identifier; `None` means it is not supported.
    fn lookup(&self, id: &str) -> Option<DvProfile> {
        DvProfile::lookup(id)
    }

    /// Produce the RPU payload for `input` in Annex B form.
    fn generate(&self, input: &Path, profile: DvProfile) -> Result<Vec<u8>>;
}

/// Map a requested profile onto what the `dolby_vision` crate can generate.
pub fn generate_profile(profile: DvProfile) -> Option<GenerateProfile> {
    match profile {
        DvProfile::Profile4 => None,
        DvProfile::Profile5 => Some(GenerateProfile::Profile5),
        DvProfile::Profile8 => Some(GenerateProfile::Profile81),
    }
}

/// Write `frames` RPUs for one static shot and return them in Annex B form.
///
/// The generator checks that the shot durations add up to `length`, so the
/// whole stream is a single shot starting at frame 0.
pub fn write_rpus(profile: GenerateProfile, frames: u64) -> Result<Vec<u8>> {
    let length = usize::try_from(frames).context("Frame count does not fit in memory")?;
    let config = GenerateConfig {
        profile,
        length,
        shots: vec![VideoShot {
            start: 0,
            duration: length,
            ..Default::default()
        }],
        ..Default::default()
    };

    let staging = tempfile::Builder::new()
        .prefix("dvmux-gen-")
        .suffix(".bin")
        .tempfile()
        .context("Failed to create temporary RPU file")?;
    config
        .write_rpus(staging.path())
        .context("dolby_vision RPU generation failed")?;
    fs::read(staging.path()).context("Failed to read generated RPUs")
}

/// Generates static (single-shot) RPUs covering every frame of the input,
/// using the `dolby_vision` crate's generator defaults.
#[derive(Debug, Clone)]
pub struct DoviGenerator {
    ffprobe: String,
    target_fps: Option<f64>,
}

impl DoviGenerator {
    pub fn new(ffprobe: impl Into<String>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            target_fps: None,
        }
    }

    /// Size the RPU list for the stream after an `fps` conversion.
    pub fn with_target_fps(mut self, fps: Option<f64>) -> Self {
        self.target_fps = fps;
        self
    }
}

impl MetadataGenerator for DoviGenerator {
    fn generate(&self, input: &Path, profile: DvProfile) -> Result<Vec<u8>> {
        let gen_profile = generate_profile(profile).with_context(|| {
            format!("Dolby Vision profile {} RPUs cannot be generated", profile)
        })?;

        let ffprobe = resolve_tool(&self.ffprobe)?;
        let timing = probe_video_timing(&ffprobe, input)?;
        let frames = timing.output_frames(self.target_fps.map(FrameRateConversion::round_up))?;
        debug!(?timing, frames, "probed input timing");

        let rpu = write_rpus(gen_profile, frames)?;

        info!(
            "Generated {} Dolby Vision profile {} RPUs ({} bytes)",
            frames,
            profile,
            rpu.len()
        );
        Ok(rpu)
    }
}
