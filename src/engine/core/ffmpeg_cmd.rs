use super::error::RemuxError;
use super::output::{EncodingParams, OutputSpec};
use super::track::{AudioTrack, VideoStep, VideoTrack};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Stand-in for the staged RPU file when a command is only displayed
pub const RPU_PLACEHOLDER: &str = "RPU.bin";

fn resolve_audio_codec(container: Option<&str>) -> &'static str {
    match container {
        // WebM only carries Vorbis/Opus audio.
        Some("webm") => "libopus",
        _ => "aac",
    }
}

/// Video filters, in the order the steps were attached
fn video_filter_chain(video: &VideoTrack) -> Option<String> {
    let filters: Vec<String> = video
        .steps()
        .iter()
        .filter_map(|step| match step {
            VideoStep::FrameRate(conversion) => Some(conversion.filter()),
            VideoStep::DolbyVision(_) | VideoStep::Bitrate(_) => None,
        })
        .collect();

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

/// libx265 private options: colour signalling, plus the RPU file and the VBV
/// settings libx265 insists on when Dolby Vision is enabled.
fn x265_params(spec: &OutputSpec, rpu_path: Option<&Path>) -> Result<String> {
    let params = spec.params();
    let mut x265 = vec![
        format!("colorprim={}", params.color_primaries),
        format!("transfer={}", params.color_trc),
        format!("colormatrix={}", params.colorspace),
    ];

    if let Some(dv) = spec.video().dolby_vision() {
        let profile = dv.profile.x265_value().ok_or_else(|| {
            RemuxError::UnsupportedProfile(dv.profile, params.video_codec.clone())
        })?;
        let rpu_path = rpu_path.context("Dolby Vision metadata has not been staged to a file")?;

        let maxrate = spec
            .video()
            .bitrate()
            .map(|b| b.kbps)
            .filter(|kbps| *kbps > 0)
            .unwrap_or(i64::from(params.dv_vbv_maxrate_kbps));

        x265.push(format!("vbv-maxrate={}", maxrate));
        x265.push(format!("vbv-bufsize={}", maxrate.saturating_mul(2)));
        x265.push(format!("dolby-vision-profile={}", profile));
        x265.push(format!("dolby-vision-rpu={}", rpu_path.display()));
    }

    Ok(x265.join(":"))
}

fn apply_video_settings(
    cmd: &mut Command,
    spec: &OutputSpec,
    rpu_path: Option<&Path>,
) -> Result<()> {
    let params = spec.params();
    let video = spec.video();

    if let Some(filters) = video_filter_chain(video) {
        cmd.arg("-vf").arg(filters);
    }

    cmd.arg("-c:v").arg(&params.video_codec);
    cmd.arg("-pix_fmt").arg(&params.pix_fmt);
    cmd.arg("-preset").arg(&params.preset);
    cmd.arg("-crf").arg(params.crf.to_string());
    cmd.arg("-tune").arg(&params.tune);

    if let Some(bitrate) = video.bitrate() {
        cmd.arg("-b:v").arg(bitrate.to_string());
    }

    cmd.arg("-x265-params").arg(x265_params(spec, rpu_path)?);
    Ok(())
}

/// Container-level colour tags, so players see HDR10 without parsing the bitstream
fn apply_color_metadata(cmd: &mut Command, params: &EncodingParams) {
    cmd.arg("-color_primaries").arg(&params.color_primaries);
    cmd.arg("-color_trc").arg(&params.color_trc);
    cmd.arg("-colorspace").arg(&params.colorspace);
}

fn apply_audio_settings(cmd: &mut Command, audio: &AudioTrack, container: Option<&str>) {
    if audio.is_stream_copy() {
        cmd.arg("-c:a").arg("copy");
        return;
    }

    if let Some(filters) = audio.filter_chain() {
        cmd.arg("-af").arg(filters);
    }
    cmd.arg("-c:a").arg(resolve_audio_codec(container));
    if let Some(bitrate) = audio.bitrate() {
        cmd.arg("-b:a").arg(bitrate.to_string());
    }
}

/// Apply additional user-provided ffmpeg arguments.
/// Shell-style parsing keeps quoted strings with spaces together.
fn apply_additional_args(cmd: &mut Command, additional_args: &str) {
    if additional_args.trim().is_empty() {
        return;
    }

    match shlex::split(additional_args) {
        Some(args) => {
            cmd.args(args);
        }
        // Unbalanced quotes
        None => {
            cmd.args(additional_args.split_whitespace());
        }
    }
}

/// Render an output specification as a single ffmpeg invocation.
///
/// `rpu_path` must point at the staged Dolby Vision metadata whenever the
/// video track carries some.
pub fn build_ffmpeg_cmd(
    program: &Path,
    spec: &OutputSpec,
    rpu_path: Option<&Path>,
    additional_args: &str,
) -> Result<Command> {
    let mut cmd = Command::new(program);
    cmd.arg("-hide_banner");
    // Always overwrite the destination
    cmd.arg("-y");

    let video_source = spec.video().source();
    let audio_source = spec.audio().source();
    cmd.arg("-i").arg(video_source);
    let audio_input = if audio_source == video_source {
        0
    } else {
        cmd.arg("-i").arg(audio_source);
        1
    };

    cmd.arg("-map").arg("0:v:0");
    // Sources without audio still encode
    cmd.arg("-map").arg(format!("{}:a:0?", audio_input));

    apply_video_settings(&mut cmd, spec, rpu_path)?;
    apply_color_metadata(&mut cmd, spec.params());

    let container = spec.container();
    apply_audio_settings(&mut cmd, spec.audio(), container.as_deref());

    cmd.arg("-movflags").arg(&spec.params().movflags);

    apply_additional_args(&mut cmd, additional_args);

    cmd.arg(spec.destination());
    Ok(cmd)
}

/// Human-readable command line, quoting arguments that contain spaces
pub fn format_ffmpeg_cmd(cmd: &Command) -> String {
    let args = cmd
        .get_args()
        .map(|arg| {
            let s = arg.to_string_lossy();
            if s.contains(' ') {
                format!("\"{}\"", s)
            } else {
                s.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!("{} {}", cmd.get_program().to_string_lossy(), args)
}
