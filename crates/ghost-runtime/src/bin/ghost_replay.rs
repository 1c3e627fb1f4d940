//! ghost-replay - run a landmark recording through the trainer
//!
//! Prints one render instruction per evaluated frame as JSON lines on
//! stdout. Logs go to stderr.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use ghost_assets::{catalog, DirectoryAssetSource};
use ghost_core::TrainerConfig;
use ghost_runtime::{
    init_tracing, recorded_landmarks, run_paced, run_to_end, LogFormat, RecordedPoses, Recording,
    RenderInstruction, Trainer,
};
use ghost_time::ManualClock;
use tracing::info;

const USAGE: &str = "\
Usage: ghost-replay --assets <dir> [options]

Options:
  --recording <file>   JSON-lines landmark recording to replay
  --config <file>      Trainer configuration (JSON)
  --realtime           Pace ticks on the wall clock; Ctrl-C stops
  --tick-ms <n>        Tick period in real-time mode [default: 33]
  --catalog            Print the pose catalog and exit
  --json-logs          Log as JSON
";

struct Args {
    assets: PathBuf,
    recording: Option<PathBuf>,
    config: Option<PathBuf>,
    realtime: bool,
    tick_ms: u64,
    catalog: bool,
    json_logs: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut assets = None;
    let mut recording = None;
    let mut config = None;
    let mut realtime = false;
    let mut tick_ms = 33;
    let mut catalog = false;
    let mut json_logs = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => assets = Some(PathBuf::from(args.next().context("--assets needs a value")?)),
            "--recording" => {
                recording = Some(PathBuf::from(args.next().context("--recording needs a value")?))
            }
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a value")?)),
            "--realtime" => realtime = true,
            "--tick-ms" => {
                tick_ms = args
                    .next()
                    .context("--tick-ms needs a value")?
                    .parse()
                    .context("--tick-ms must be a number of milliseconds")?
            }
            "--catalog" => catalog = true,
            "--json-logs" => json_logs = true,
            "-h" | "--help" => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}\n\n{USAGE}"),
        }
    }

    Ok(Args {
        assets: assets.context(format!("--assets is required\n\n{USAGE}"))?,
        recording,
        config,
        realtime,
        tick_ms,
        catalog,
        json_logs,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    init_tracing(if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })?;

    let source = DirectoryAssetSource::open(&args.assets)
        .with_context(|| format!("opening assets at {}", args.assets.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.catalog {
        for entry in catalog(&source) {
            serde_json::to_writer(&mut out, &entry)?;
            writeln!(out)?;
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => TrainerConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    let path = args.recording.context("--recording is required unless --catalog is given")?;
    let recording =
        Recording::from_path(&path).with_context(|| format!("reading recording {}", path.display()))?;
    if recording.is_empty() {
        bail!("recording {} has no frames", path.display());
    }
    info!(frames = recording.len(), path = %path.display(), "recording loaded");

    let clock = ManualClock::starting_at(recording.start_time().unwrap_or_default());
    let camera = recording.into_camera(clock.clone());
    let mut trainer = Trainer::new(
        config,
        source,
        camera,
        recorded_landmarks as RecordedPoses,
        clock,
    )?;
    trainer.start().context("trainer failed to start")?;

    let emit = |instruction: &RenderInstruction| -> ghost_core::GhostResult<()> {
        serde_json::to_writer(&mut out, instruction).map_err(std::io::Error::from)?;
        writeln!(out)?;
        Ok(())
    };
    let emitted = if args.realtime {
        run_paced(&mut trainer, Duration::from_millis(args.tick_ms), emit).await?
    } else {
        run_to_end(&mut trainer, emit)?
    };

    let stats = trainer.stats().clone();
    trainer.stop();
    info!(
        emitted,
        ticks = stats.ticks,
        no_person = stats.no_person_ticks,
        unavailable = stats.unavailable_ticks,
        stages = stats.stages_completed,
        poses = stats.poses_completed,
        "replay finished"
    );
    Ok(())
}
