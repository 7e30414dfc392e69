use clap::Parser;
use dvmux::engine::RemuxRequest;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dvmux")]
#[command(about = "Convert video to Dolby Vision-compatible format", long_about = None)]
pub struct Cli {
    /// Input video file path
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output video file path (overwritten if it exists)
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Dolby Vision profile (4, 5, or 8). Profile 4 is dual-layer and is
    /// rejected at encode time: libx265 only signals profiles 5 and 8.1
    #[arg(long, value_name = "ID", default_value = "5")]
    pub dolby_vision_profile: String,

    /// Encode without Dolby Vision metadata (HDR10 only)
    #[arg(long, conflicts_with = "dolby_vision_profile")]
    pub no_dolby_vision: bool,

    /// Bitrate of the output video (in kb/s)
    #[arg(long, value_name = "KBPS", default_value_t = 768, allow_negative_numbers = true)]
    pub bitrate: i64,

    /// Frame rate of the output video
    #[arg(long, value_name = "FPS")]
    pub frame_rate: Option<f64>,

    /// Bitrate of the output audio (in kb/s); audio is copied when omitted
    #[arg(long, value_name = "KBPS", allow_negative_numbers = true)]
    pub audio_bitrate: Option<i64>,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Exit code to use when the input file does not exist (overrides config)
    #[arg(long, value_name = "CODE")]
    pub missing_input_exit_code: Option<i32>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn remux_request(&self) -> RemuxRequest {
        RemuxRequest {
            input: self.input.clone(),
            output: self.output.clone(),
            profile: (!self.no_dolby_vision).then(|| self.dolby_vision_profile.clone()),
            bitrate_kbps: Some(self.bitrate),
            frame_rate: self.frame_rate,
            audio_bitrate_kbps: self.audio_bitrate,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
