// Engine invocation: the only place a child process is spawned.

use crate::engine::core::{
    DebugLog, OutputSpec, RPU_PLACEHOLDER, build_ffmpeg_cmd, format_ffmpeg_cmd, resolve_tool,
};
use anyhow::{Context, Result};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Bytes of ffmpeg stderr kept for the debug log
const STDERR_TAIL_BYTES: usize = 4096;

/// How the engine process finished. `code` is `None` when it was killed by a
/// signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStatus {
    code: Option<i32>,
}

impl EngineStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn signalled() -> Self {
        Self { code: None }
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for EngineStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

/// Runs one output specification to completion.
pub trait Engine {
    fn invoke(&self, spec: &OutputSpec) -> Result<EngineStatus>;
}

/// Write the RPU payload somewhere libx265 can read it. The file lives as long
/// as the returned handle.
fn stage_metadata(spec: &OutputSpec) -> Result<Option<NamedTempFile>> {
    let Some(dv) = spec.video().dolby_vision() else {
        return Ok(None);
    };

    let mut file = tempfile::Builder::new()
        .prefix("dvmux-")
        .suffix(".rpu.bin")
        .tempfile()
        .context("Failed to create temporary RPU file")?;
    file.write_all(&dv.rpu)
        .context("Failed to write temporary RPU file")?;
    file.flush()?;

    debug!(
        path = %file.path().display(),
        bytes = dv.rpu.len(),
        profile = %dv.profile,
        "staged Dolby Vision metadata"
    );
    Ok(Some(file))
}

/// Copy everything from `reader` to `sink`, keeping the last
/// `STDERR_TAIL_BYTES` bytes.
fn forward_stream(mut reader: impl Read, mut sink: impl Write) -> io::Result<Vec<u8>> {
    let mut tail = Vec::with_capacity(STDERR_TAIL_BYTES);
    let mut buf = [0u8; 8192];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        sink.write_all(&buf[..n])?;
        sink.flush()?;

        tail.extend_from_slice(&buf[..n]);
        if tail.len() > STDERR_TAIL_BYTES {
            tail.drain(..tail.len() - STDERR_TAIL_BYTES);
        }
    }

    Ok(tail)
}

/// Spawns ffmpeg once per invocation, forwarding its stderr and overwriting
/// the destination.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    program: String,
    additional_args: String,
    debug_log: Option<DebugLog>,
}

impl FfmpegEngine {
    /// `program` is a path or a name looked up in PATH at invoke time
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            additional_args: String::new(),
            debug_log: None,
        }
    }

    pub fn with_additional_args(mut self, args: impl Into<String>) -> Self {
        self.additional_args = args.into();
        self
    }

    pub fn with_debug_log(mut self, log: Option<DebugLog>) -> Self {
        self.debug_log = log;
        self
    }

    fn log(&self, message: &str) {
        if let Some(log) = &self.debug_log {
            if let Err(e) = log.append(message) {
                warn!("Could not write debug log: {:#}", e);
            }
        }
    }
}

impl Engine for FfmpegEngine {
    fn invoke(&self, spec: &OutputSpec) -> Result<EngineStatus> {
        let program = resolve_tool(&self.program)?;
        let staged = stage_metadata(spec)?;
        let rpu_path = staged.as_ref().map(|f| f.path());

        let mut cmd = build_ffmpeg_cmd(&program, spec, rpu_path, &self.additional_args)?;
        let rendered = format_ffmpeg_cmd(&cmd);
        debug!(command = %rendered, "spawning ffmpeg");
        self.log(&format!("[ffmpeg] {}", rendered));

        info!(
            "Encoding: {} → {}",
            spec.video().source().display(),
            spec.destination().display()
        );

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program.display()))?;

        let tail = match child.stderr.take() {
            Some(stderr) => forward_stream(stderr, io::stderr()).unwrap_or_else(|e| {
                warn!("Lost ffmpeg stderr: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let status: EngineStatus = child
            .wait()
            .context("Failed to wait for ffmpeg")?
            .into();
        // Keep the RPU file until ffmpeg has exited.
        drop(staged);

        self.log(&format!("[ffmpeg] finished with {}", status));
        if !status.is_success() {
            warn!("ffmpeg finished with {}", status);
            self.log(&String::from_utf8_lossy(&tail));
        }

        Ok(status)
    }
}

/// Prints the command that would run instead of spawning anything.
#[derive(Debug, Clone)]
pub struct DryRunEngine {
    program: PathBuf,
    additional_args: String,
}

impl DryRunEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            additional_args: String::new(),
        }
    }

    pub fn with_additional_args(mut self, args: impl Into<String>) -> Self {
        self.additional_args = args.into();
        self
    }

    /// The command as it would be spawned, with the RPU file shown as a placeholder
    pub fn render(&self, spec: &OutputSpec) -> Result<String> {
        let cmd = build_ffmpeg_cmd(
            &self.program,
            spec,
            Some(Path::new(RPU_PLACEHOLDER)),
            &self.additional_args,
        )?;
        Ok(format_ffmpeg_cmd(&cmd))
    }
}

impl Engine for DryRunEngine {
    fn invoke(&self, spec: &OutputSpec) -> Result<EngineStatus> {
        println!("{}", self.render(spec)?);
        Ok(EngineStatus::success())
    }
}
