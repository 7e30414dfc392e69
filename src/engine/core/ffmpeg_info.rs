use super::track::{FpsRounding, FrameRateConversion};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    nb_frames: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: FfprobeFormat,
}

/// Frame timing of the first video stream, as far as ffprobe could tell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoTiming {
    pub fps: Option<f64>,
    pub duration_s: Option<f64>,
    pub frame_count: Option<u64>,
}

impl VideoTiming {
    fn duration(&self) -> Option<f64> {
        self.duration_s.or_else(|| match (self.frame_count, self.fps) {
            (Some(frames), Some(fps)) if fps > 0.0 => Some(frames as f64 / fps),
            _ => None,
        })
    }

    /// Frames the encoder will see, after an optional rate conversion.
    pub fn output_frames(&self, conversion: Option<FrameRateConversion>) -> Result<u64> {
        let frames = match conversion {
            Some(conversion) => {
                let duration = self
                    .duration()
                    .context("Cannot determine input duration for frame rate conversion")?;
                conversion.output_frames(duration)
            }
            None => match self.frame_count.filter(|n| *n > 0) {
                Some(count) => count,
                None => {
                    let duration = self.duration().context("No duration found in ffprobe output")?;
                    let fps = self.fps.context("No frame rate found in ffprobe output")?;
                    FpsRounding::Near.frames(duration, fps)
                }
            },
        };

        if frames == 0 {
            anyhow::bail!("Input has no video frames");
        }
        Ok(frames)
    }
}

/// Locate an external tool, either a path or a name searched in PATH
pub fn resolve_tool(name: &str) -> Result<PathBuf> {
    which::which(name).with_context(|| format!("{} not found. Is it installed and in PATH?", name))
}

/// First line of `<program> -version`
pub fn tool_version(program: &Path) -> Result<String> {
    let output = Command::new(program)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {}", program.display()))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} -version failed with status: {}",
            program.display(),
            output.status
        );
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}

/// Probe the first video stream's timing with ffprobe
pub fn probe_video_timing(ffprobe: &Path, path: &Path) -> Result<VideoTiming> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=nb_frames,r_frame_rate,avg_frame_rate:format=duration",
        ])
        .arg(path)
        .output()
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        anyhow::bail!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    parse_ffprobe_timing(&String::from_utf8_lossy(&output.stdout))
}

/// Parse timing from ffprobe JSON output
pub fn parse_ffprobe_timing(json: &str) -> Result<VideoTiming> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe JSON output")?;

    let stream = probe
        .streams
        .first()
        .context("No video stream found in ffprobe output")?;

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_fraction)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_fraction));

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok());

    let duration_s = probe
        .format
        .duration
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok());

    Ok(VideoTiming {
        fps,
        duration_s,
        frame_count,
    })
}

/// Parse a rate like "24000/1001" or "25"
fn parse_fraction(s: &str) -> Option<f64> {
    let value = match s.split_once('/') {
        Some((num, den)) => {
            let numerator: f64 = num.trim().parse().ok()?;
            let denominator: f64 = den.trim().parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => s.trim().parse().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}
