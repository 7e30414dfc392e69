mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod log;
mod output;
mod profile;
mod track;

pub use error::RemuxError;
pub use ffmpeg_cmd::{RPU_PLACEHOLDER, build_ffmpeg_cmd, format_ffmpeg_cmd};
pub use ffmpeg_info::{
    VideoTiming, parse_ffprobe_timing, probe_video_timing, resolve_tool, tool_version,
};
pub use log::DebugLog;
pub use output::{EncodingParams, OutputSpec};
pub use profile::DvProfile;
pub use track::{
    AudioStep, AudioTrack, Bitrate, DolbyVisionMetadata, FpsRounding, FrameRateConversion,
    NORMALIZED_CHANNEL_LAYOUT, NORMALIZED_SAMPLE_FMT, NORMALIZED_SAMPLE_RATE, VideoStep,
    VideoTrack,
};
