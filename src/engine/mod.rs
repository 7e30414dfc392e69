// Conversion engine - independent of the command line

pub mod builder;
pub mod core;
pub mod invoker;
pub mod metadata;
pub mod remux;

pub use builder::{build_audio_track, build_video_track};
pub use self::core::*;
pub use invoker::{DryRunEngine, Engine, EngineStatus, FfmpegEngine};
pub use metadata::{DoviGenerator, MetadataGenerator};
pub use remux::{RemuxOutcome, RemuxRequest, plan, remux};
