// End-to-end runs through a real ffmpeg. Dolby Vision needs metadata from the
// generator, so these runs cover the HDR10 path; metadata injection is covered
// by the command tests.

use dvmux::engine::{
    EncodingParams, FfmpegEngine, RemuxOutcome, RemuxRequest, probe_video_timing, remux,
    resolve_tool,
};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::helpers::*;

// Helper to check if ffmpeg with libx265 is available, skip test if not
macro_rules! require_ffmpeg {
    () => {
        if !is_ffmpeg_with_x265_available() {
            eprintln!("Skipping test: ffmpeg with libx265 not available");
            return;
        }
    };
}

fn create_test_video(temp_dir: &TempDir, fps: &str) -> PathBuf {
    let video_path = temp_dir.path().join("test_input.mp4");
    generate_test_video(&video_path, 1.0, fps).expect("Failed to generate test video");
    video_path
}

#[test]
fn e2e_hdr10_encode_with_stream_copy() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(&temp_dir, "25");
    let output = temp_dir.path().join("out.mp4");
    let request = RemuxRequest {
        bitrate_kbps: Some(768),
        ..RemuxRequest::new(&input, &output)
    };

    let outcome = remux(
        &request,
        &FakeGenerator::default(),
        &FfmpegEngine::new("ffmpeg"),
        EncodingParams::hdr10(),
    )
    .expect("ffmpeg run failed");

    assert_eq!(outcome, RemuxOutcome::Completed);
    assert!(output.exists());
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn e2e_frame_rate_conversion_and_audio_normalization() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(&temp_dir, "24000/1001");
    let output = temp_dir.path().join("out_24.mp4");
    let request = RemuxRequest {
        bitrate_kbps: Some(500),
        frame_rate: Some(24.0),
        audio_bitrate_kbps: Some(128),
        ..RemuxRequest::new(&input, &output)
    };

    remux(
        &request,
        &FakeGenerator::default(),
        &FfmpegEngine::new("ffmpeg"),
        EncodingParams::hdr10(),
    )
    .expect("ffmpeg run failed");

    let ffprobe = match resolve_tool("ffprobe") {
        Ok(path) => path,
        Err(_) => return,
    };
    let timing = probe_video_timing(&ffprobe, &output).expect("Failed to probe output");
    let fps = timing.fps.expect("output has no frame rate");
    assert!(fps >= 24.0 - 1e-6, "output fps {} dropped below target", fps);
}

#[test]
fn e2e_existing_output_is_overwritten() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = create_test_video(&temp_dir, "25");
    let output = temp_dir.path().join("out.mp4");
    std::fs::write(&output, b"stale").unwrap();

    remux(
        &RemuxRequest::new(&input, &output),
        &FakeGenerator::default(),
        &FfmpegEngine::new("ffmpeg"),
        EncodingParams::hdr10(),
    )
    .expect("ffmpeg run failed");

    assert!(std::fs::metadata(&output).unwrap().len() > 5);
}

#[test]
fn e2e_corrupt_input_reports_engine_failure() {
    require_ffmpeg!();

    let temp_dir = TempDir::new().unwrap();
    let input = existing_input(&temp_dir, "garbage.mp4");
    let output = temp_dir.path().join("out.mp4");

    let err = remux(
        &RemuxRequest::new(&input, &output),
        &FakeGenerator::default(),
        &FfmpegEngine::new("ffmpeg"),
        EncodingParams::hdr10(),
    )
    .unwrap_err();

    let remux_err = err
        .downcast_ref::<dvmux::engine::RemuxError>()
        .expect("typed error");
    assert_ne!(remux_err.exit_code(), 0);
}
