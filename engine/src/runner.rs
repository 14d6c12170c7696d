//! Drivers that run a stage without a presentation layer.

use std::thread;
use std::time::Duration;

use tracing::info;

use blocks::Millis;

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::stage::Stage;

/// Outcome of a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub swaps: u64,
    /// Stage time that passed between start and the end of the run.
    pub elapsed: Millis,
    /// True if the scheduler went idle by itself, false if the limit cut the
    /// run short.
    pub completed: bool,
}

/// Start the stage and step simulated time one frame at a time until the
/// scheduler goes idle or `limit` milliseconds have passed.
pub fn run_until_idle(stage: &mut Stage<ManualClock>, limit: Millis) -> RunSummary {
    let clock = stage.clock().clone();
    let frame = stage.config().frame_interval_ms.max(1);
    drive(stage, limit, |_| clock.advance(frame))
}

/// Like [`run_until_idle`] but against the wall clock, sleeping one frame
/// interval between pumps.
pub fn run_realtime(stage: &mut Stage<SystemClock>, limit: Millis) -> RunSummary {
    let frame = Duration::from_millis(stage.config().frame_interval_ms.max(1));
    drive(stage, limit, |_| thread::sleep(frame))
}

fn drive<C: Clock>(stage: &mut Stage<C>, limit: Millis, mut wait: impl FnMut(&C)) -> RunSummary {
    let started = stage.clock().now();
    stage.start();

    let mut completed = true;
    while stage.is_running() {
        if stage.clock().now().saturating_sub(started) >= limit {
            info!(limit, "time limit reached, stopping");
            stage.stop();
            completed = false;
            break;
        }
        wait(stage.clock());
        stage.pump();
    }

    let stats = stage.stats();
    RunSummary {
        ticks: stats.ticks,
        swaps: stats.swaps,
        elapsed: stage.clock().now().saturating_sub(started),
        completed,
    }
}
