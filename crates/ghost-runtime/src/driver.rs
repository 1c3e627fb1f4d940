//! Host loops
//!
//! The trainer is driven one tick at a time by whoever owns the frame
//! callback. These loops are that owner for finite video sources.

use std::time::Duration;

use ghost_assets::AssetSource;
use ghost_core::GhostResult;
use ghost_time::Clock;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::{PoseSource, RenderInstruction, Trainer, VideoSource};

/// Tick as fast as possible until the video source finishes or the
/// trainer stops. Returns the number of instructions emitted.
pub fn run_to_end<S, V, P, C, F>(trainer: &mut Trainer<S, V, P, C>, mut emit: F) -> GhostResult<u64>
where
    S: AssetSource,
    V: VideoSource,
    P: PoseSource<V::Frame>,
    C: Clock,
    F: FnMut(&RenderInstruction) -> GhostResult<()>,
{
    let mut emitted = 0;
    while trainer.is_active() && !trainer.video().is_finished() {
        if let Some(instruction) = trainer.tick() {
            emit(&instruction)?;
            emitted += 1;
        }
    }
    Ok(emitted)
}

/// Tick once per `period` of wall time; Ctrl-C stops the trainer
pub async fn run_paced<S, V, P, C, F>(
    trainer: &mut Trainer<S, V, P, C>,
    period: Duration,
    mut emit: F,
) -> GhostResult<u64>
where
    S: AssetSource,
    V: VideoSource,
    P: PoseSource<V::Frame>,
    C: Clock,
    F: FnMut(&RenderInstruction) -> GhostResult<()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut emitted = 0;
    while trainer.is_active() && !trainer.video().is_finished() {
        tokio::select! {
            _ = interval.tick() => {
                if let Some(instruction) = trainer.tick() {
                    emit(&instruction)?;
                    emitted += 1;
                }
            }
            signal = &mut shutdown => {
                signal?;
                info!("interrupt received");
                trainer.stop();
            }
        }
    }
    Ok(emitted)
}
