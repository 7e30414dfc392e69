use crate::cli::Cli;
use dvmux::config::Config;
use dvmux::engine::{
    self, DebugLog, DoviGenerator, DryRunEngine, Engine, EncodingParams, FfmpegEngine,
    RemuxError, RemuxOutcome,
};
use std::process;
use tracing::debug;

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "dvmux=debug".to_string()
        } else {
            "dvmux=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    loaded.unwrap_or_else(|e| {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    })
}

pub fn run(cli: Cli) {
    let config = load_config(&cli);
    let request = cli.remux_request();
    debug!(?request, "parsed options");

    let generator = DoviGenerator::new(config.engine.ffprobe.clone()).with_target_fps(cli.frame_rate);

    let runner: Box<dyn Engine> = if cli.dry_run {
        Box::new(
            DryRunEngine::new(&config.engine.ffmpeg)
                .with_additional_args(config.engine.extra_args.clone()),
        )
    } else {
        if cli.verbose {
            if let Ok(version) = engine::resolve_tool(&config.engine.ffmpeg)
                .and_then(|program| engine::tool_version(&program))
            {
                debug!("using {}", version);
            }
        }
        Box::new(
            FfmpegEngine::new(config.engine.ffmpeg.clone())
                .with_additional_args(config.engine.extra_args.clone())
                .with_debug_log(config.engine.debug_log.clone().map(DebugLog::new)),
        )
    };

    match engine::remux(&request, &generator, runner.as_ref(), EncodingParams::hdr10()) {
        Ok(RemuxOutcome::Completed) => process::exit(0),
        Ok(RemuxOutcome::MissingInput(path)) => {
            println!("Input file '{}' does not exist.", path.display());
            let code = cli
                .missing_input_exit_code
                .unwrap_or(config.behavior.missing_input_exit_code);
            process::exit(code);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<RemuxError>()
                .map(RemuxError::exit_code)
                .unwrap_or(1);
            process::exit(code);
        }
    }
}
