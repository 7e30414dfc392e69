// Full runs against a recording engine: one invocation, the right spec, the
// right outcome for each failure class.

use dvmux::engine::{
    AudioStep, Bitrate, DvProfile, EncodingParams, EngineStatus, RemuxError, RemuxOutcome,
    RemuxRequest, VideoStep, remux,
};
use tempfile::TempDir;

use crate::common::helpers::*;

fn request(dir: &TempDir) -> RemuxRequest {
    let input = existing_input(dir, "clip.mp4");
    RemuxRequest {
        profile: Some("5".to_string()),
        bitrate_kbps: Some(768),
        ..RemuxRequest::new(input, dir.path().join("clip_dv.mp4"))
    }
}

#[test]
fn test_default_scenario_invokes_engine_once() {
    let dir = TempDir::new().unwrap();
    let request = request(&dir);
    let generator = FakeGenerator::default();
    let engine = RecordingEngine::new();

    let outcome = remux(&request, &generator, &engine, EncodingParams::hdr10()).unwrap();

    assert_eq!(outcome, RemuxOutcome::Completed);
    assert_eq!(engine.calls(), 1);

    let spec = engine.last().unwrap();
    assert_eq!(spec.video().source(), request.input.as_path());
    assert_eq!(spec.video().steps().len(), 2);
    match &spec.video().steps()[0] {
        VideoStep::DolbyVision(dv) => {
            assert_eq!(dv.profile, DvProfile::Profile5);
            assert_eq!(dv.rpu, fake_rpu(DvProfile::Profile5));
        }
        other => panic!("expected metadata first, got {:?}", other),
    }
    assert_eq!(spec.video().steps()[1], VideoStep::Bitrate(Bitrate::kbps(768)));

    assert_eq!(spec.audio().source(), request.input.as_path());
    assert_eq!(spec.audio().steps(), &[AudioStep::StreamCopy]);

    assert_eq!(spec.destination(), request.output.as_path());
    let params = spec.params();
    assert_eq!(params.video_codec, "libx265");
    assert_eq!(params.pix_fmt, "yuv420p10le");
    assert_eq!(params.color_primaries, "bt2020");
    assert_eq!(params.colorspace, "bt2020nc");
    assert_eq!(params.preset, "slow");
    assert_eq!(params.tune, "fastdecode");
    assert_eq!(params.crf, 18);
    assert_eq!(params.movflags, "+faststart");
}

#[test]
fn test_frame_rate_and_audio_bitrate_reach_the_engine() {
    let dir = TempDir::new().unwrap();
    let request = RemuxRequest {
        frame_rate: Some(24.0),
        audio_bitrate_kbps: Some(192),
        ..request(&dir)
    };
    let engine = RecordingEngine::new();

    remux(&request, &FakeGenerator::default(), &engine, EncodingParams::hdr10()).unwrap();

    let spec = engine.last().unwrap();
    assert!(matches!(spec.video().steps().last(), Some(VideoStep::FrameRate(_))));
    assert_eq!(spec.audio().bitrate(), Some(Bitrate::kbps(192)));
    assert!(!spec.audio().is_stream_copy());
}

#[test]
fn test_missing_input_skips_everything() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.mp4");
    let request = RemuxRequest {
        profile: Some("5".to_string()),
        ..RemuxRequest::new(&missing, dir.path().join("out.mp4"))
    };
    let generator = FakeGenerator::default();
    let engine = RecordingEngine::new();

    let outcome = remux(&request, &generator, &engine, EncodingParams::hdr10())
        .expect("missing input is not an error");

    assert_eq!(outcome, RemuxOutcome::MissingInput(missing));
    assert_eq!(generator.calls(), 0);
    assert_eq!(engine.calls(), 0);
}

#[test]
fn test_missing_input_wins_over_invalid_profile() {
    let dir = TempDir::new().unwrap();
    let request = RemuxRequest {
        profile: Some("abc".to_string()),
        ..RemuxRequest::new(dir.path().join("nope.mp4"), dir.path().join("out.mp4"))
    };
    let engine = RecordingEngine::new();

    let outcome = remux(&request, &FakeGenerator::default(), &engine, EncodingParams::hdr10()).unwrap();
    assert!(matches!(outcome, RemuxOutcome::MissingInput(_)));
}

#[test]
fn test_invalid_profile_never_invokes_engine() {
    let dir = TempDir::new().unwrap();
    for id in ["99", "abc"] {
        let request = RemuxRequest {
            profile: Some(id.to_string()),
            ..request(&dir)
        };
        let generator = FakeGenerator::default();
        let engine = RecordingEngine::new();

        let err = remux(&request, &generator, &engine, EncodingParams::hdr10()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RemuxError>(),
            Some(RemuxError::InvalidProfile(_))
        ));
        assert_eq!(err.downcast_ref::<RemuxError>().unwrap().exit_code(), 1);
        assert_eq!(generator.calls(), 0);
        assert_eq!(engine.calls(), 0);
    }
}

#[test]
fn test_engine_failure_propagates_status() {
    let dir = TempDir::new().unwrap();
    let engine = RecordingEngine::with_status(EngineStatus::from_code(187));

    let err = remux(&request(&dir), &FakeGenerator::default(), &engine, EncodingParams::hdr10())
        .unwrap_err();

    assert_eq!(engine.calls(), 1);
    let remux_err = err.downcast_ref::<RemuxError>().expect("typed error");
    assert!(matches!(remux_err, RemuxError::EngineFailed(status) if status.code() == Some(187)));
    assert_eq!(remux_err.exit_code(), 187);
    assert_eq!(err.to_string(), "ffmpeg failed with exit code 187");
}

#[test]
fn test_engine_killed_by_signal_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let engine = RecordingEngine::with_status(EngineStatus::signalled());

    let err = remux(&request(&dir), &FakeGenerator::default(), &engine, EncodingParams::hdr10())
        .unwrap_err();

    assert_eq!(err.downcast_ref::<RemuxError>().unwrap().exit_code(), 1);
}

#[test]
fn test_without_profile_generator_is_not_consulted() {
    let dir = TempDir::new().unwrap();
    let request = RemuxRequest {
        profile: None,
        ..request(&dir)
    };
    let generator = FakeGenerator::default();
    let engine = RecordingEngine::new();

    remux(&request, &generator, &engine, EncodingParams::hdr10()).unwrap();

    assert_eq!(generator.calls(), 0);
    let spec = engine.last().unwrap();
    assert!(spec.video().dolby_vision().is_none());
    assert_eq!(spec.video().bitrate(), Some(Bitrate::kbps(768)));
}
