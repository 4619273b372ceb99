// src/sequencer.rs - Drives the motion core through a script under a timing policy
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use crate::motion::{MotionCore, MotionError, MotionPhase, Pose};
use crate::strategy::{Command, Script};

/// Largest wall-clock delta fed into a single physics tick. A stalled
/// host (debugger, suspend) gets clamped instead of integrated as one
/// huge step.
const MAX_FRAME_DT: f64 = 0.25;

/// How command completion is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingPolicy {
    /// Frame-paced playback: wall-clock dt per tick, yields between
    /// ticks, cancellable via the shutdown channel.
    RealTime,
    /// Headless verification: fixed dt per tick, no pacing, no yielding,
    /// runs to completion non-interruptibly.
    FastForward,
}

/// How a run ended. Cancellation is an outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("motion error: {0}")]
    Motion(#[from] MotionError),
}

/// Receives the pose after every physics tick and after every completed
/// command. The renderer side of the house implements this; the
/// sequencer never reads anything back.
pub trait TickObserver {
    fn on_tick(&mut self, pose: Pose, phase: MotionPhase);
    fn on_command_complete(&mut self, _pose: Pose) {}
}

/// Observer that discards everything.
pub struct NullObserver;

impl TickObserver for NullObserver {
    fn on_tick(&mut self, _pose: Pose, _phase: MotionPhase) {}
}

/// Walks a script group by group, command by command, issuing each to the
/// motion core and ticking it to completion before the next. Command i+1
/// is never issued before command i reports idle.
pub struct Sequencer {
    core: MotionCore,
    frame_rate: f64,
    shutdown_rx: broadcast::Receiver<()>,
}

impl Sequencer {
    pub fn new(core: MotionCore, frame_rate: f64, shutdown_rx: broadcast::Receiver<()>) -> Self {
        Self {
            core,
            frame_rate,
            shutdown_rx,
        }
    }

    pub fn core(&self) -> &MotionCore {
        &self.core
    }

    /// Run the whole script under `policy`. Returns `Cancelled` when the
    /// shutdown channel fires mid-command in real-time mode.
    pub async fn run(
        &mut self,
        script: &Script,
        policy: TimingPolicy,
        observer: &mut dyn TickObserver,
    ) -> Result<RunOutcome, SequencerError> {
        for group in &script.groups {
            tracing::info!(group = %group.name, commands = group.commands.len(), "executing group");
            for command in &group.commands {
                self.issue(command)?;
                match policy {
                    TimingPolicy::FastForward => self.wait_fast_forward(observer),
                    TimingPolicy::RealTime => {
                        if self.wait_real_time(observer).await {
                            tracing::warn!("run cancelled before command completion");
                            return Ok(RunOutcome::Cancelled);
                        }
                    }
                }
                observer.on_command_complete(self.core.pose());
            }
        }
        let pose = self.core.pose();
        tracing::info!(x = pose.x, y = pose.y, heading = pose.heading, "script complete");
        Ok(RunOutcome::Completed)
    }

    /// The wait loops guarantee the core is idle here; a Busy error means
    /// the sequencer itself is broken, and it is propagated as-is.
    fn issue(&mut self, command: &Command) -> Result<(), SequencerError> {
        match *command {
            Command::Goto { x, y, heading } => {
                tracing::debug!(x, y, heading, "issue goto");
                self.core.goto_pose(x, y, heading)?;
            }
            Command::Forward { distance } => {
                tracing::debug!(distance, "issue forward");
                self.core.move_forward(distance)?;
            }
            Command::Rotate { delta } => {
                tracing::debug!(delta, "issue rotate");
                self.core.rotate_by(delta)?;
            }
        }
        Ok(())
    }

    fn wait_fast_forward(&mut self, observer: &mut dyn TickObserver) {
        let dt = 1.0 / self.frame_rate;
        while self.core.is_moving() {
            self.core.update(dt);
            observer.on_tick(self.core.pose(), self.core.phase());
        }
    }

    /// Returns true when cancelled. Cancellation lands only at tick
    /// boundaries, never inside an integration step.
    async fn wait_real_time(&mut self, observer: &mut dyn TickObserver) -> bool {
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / self.frame_rate));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();
        let mut cancellable = true;
        while self.core.is_moving() {
            let tick = if cancellable {
                tokio::select! {
                    result = self.shutdown_rx.recv() => match result {
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => return true,
                        Err(broadcast::error::RecvError::Closed) => {
                            // Sender dropped: nothing can cancel this run.
                            cancellable = false;
                            continue;
                        }
                    },
                    tick = interval.tick() => tick,
                }
            } else {
                interval.tick().await
            };
            let dt = (tick - last).as_secs_f64().min(MAX_FRAME_DT);
            last = tick;
            self.core.update(dt);
            observer.on_tick(self.core.pose(), self.core.phase());
        }
        false
    }
}
