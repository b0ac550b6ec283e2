use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::bounded;
use gesture_control::{
    RecognitionPipeline,
    config::{self, Settings, default_settings_path},
    dispatch::{ActionDispatcher, LogBackend, gesture_mappings, start_dispatcher},
    source::{LandmarkSource, start_replay},
    worker::{FrameSlot, start_recognizer},
};

const EVENT_QUEUE: usize = 16;
const USAGE: &str = "usage: gesture-control [--config <settings.json>] <frames.jsonl>\n       \
                     gesture-control [--config <settings.json>] --write-default-config";

#[derive(Debug, PartialEq)]
enum Command {
    /// Write default settings to the config path and exit.
    WriteDefaultConfig,
    Replay { frames: PathBuf },
}

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    command: Command,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut config = None;
    let mut write_default_config = false;
    let mut frames = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or_else(|| anyhow!("--config needs a path"))?;
                config = Some(PathBuf::from(path));
            }
            "--write-default-config" => write_default_config = true,
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            other => frames = Some(PathBuf::from(other)),
        }
    }

    let command = match (write_default_config, frames) {
        (true, None) => Command::WriteDefaultConfig,
        (true, Some(_)) => bail!("--write-default-config takes no frames file\n{USAGE}"),
        (false, Some(frames)) => Command::Replay { frames },
        (false, None) => bail!("{USAGE}"),
    };

    Ok(Args { config, command })
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let settings_path = args.config.clone().unwrap_or_else(default_settings_path);

    let frames = match args.command {
        Command::Replay { frames } => frames,
        Command::WriteDefaultConfig => {
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .init();
            return Settings::default()
                .save(&settings_path)
                .context("failed to write default settings");
        }
    };

    let loaded = Settings::read_file(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    let found = loaded.is_some();
    let (settings, rejected) = loaded.unwrap_or_default().validated();

    env_logger::Builder::new()
        .filter_level(settings.log_filter())
        .parse_default_env()
        .init();

    config::log_source(&settings_path, found);
    for err in &rejected {
        log::warn!("{err}; using default");
    }

    for (gesture, action) in gesture_mappings() {
        log::info!("{}{} -> {action}", gesture.emoji(), gesture.display_name());
    }

    let source = LandmarkSource::open(&frames, Instant::now())
        .with_context(|| format!("failed to open {}", frames.display()))?
        .with_max_hands(settings.max_hands());

    let (slot, feed) = FrameSlot::new();
    let (event_tx, event_rx) = bounded(EVENT_QUEUE);

    let recognizer = start_recognizer(
        RecognitionPipeline::new(settings.pipeline_config()),
        feed,
        event_tx,
    );
    let dispatcher = start_dispatcher(
        ActionDispatcher::new(LogBackend, settings.dispatch_config()),
        event_rx,
    );
    let replay = start_replay(source, slot);

    let replayed = match replay.join() {
        Ok(Ok(stats)) => stats,
        Ok(Err(err)) => {
            dispatcher.emergency_stop();
            return Err(err).context("failed to replay landmark frames");
        }
        Err(_) => {
            dispatcher.emergency_stop();
            bail!("replay thread panicked");
        }
    };
    let recognized = recognizer.join()?;
    let dispatched = dispatcher.join()?;

    println!(
        "frames: {} replayed, {} replaced before use, {} skipped",
        replayed.published, replayed.replaced, replayed.skipped
    );
    println!(
        "recognition: {} processed, {} without hand, {} malformed, {} suppressed, {} events",
        recognized.frames,
        recognized.no_hand,
        recognized.malformed,
        recognized.suppressed,
        recognized.emitted
    );
    println!(
        "actions: {} executed, {} skipped, {} failed",
        dispatched.executed, dispatched.skipped, dispatched.failed
    );

    Ok(())
}
