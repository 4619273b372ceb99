// src/simulation.rs - Wires config, script, motion core, sequencer, and renderer
use std::path::Path;

use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::{ConfigError, SimConfig};
use crate::motion::{MotionCore, Pose};
use crate::render::{RenderError, SvgRenderer, TrajectoryRecorder};
use crate::sequencer::{RunOutcome, Sequencer, SequencerError, TimingPolicy};
use crate::strategy::{Script, ScriptError};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("sequencer error: {0}")]
    Sequencer(#[from] SequencerError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Other(String),
}

/// One verification run: a validated script executed against a fresh
/// motion core, with the trajectory recorded for rendering.
pub struct Simulation {
    config: SimConfig,
    script: Script,
    sequencer: Sequencer,
    recorder: TrajectoryRecorder,
}

impl Simulation {
    pub fn new(
        config: SimConfig,
        script: Script,
        speed_multiplier: f64,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<Self, SimulationError> {
        if speed_multiplier <= 0.0 {
            return Err(SimulationError::Other(
                "speed multiplier must be positive".to_string(),
            ));
        }
        config.validate()?;

        let mut core = MotionCore::new(
            config.robot.speed,
            config.robot.rotation_speed,
            speed_multiplier,
        );
        let start = script.starting_pose;
        core.set_pose(start.x, start.y, start.heading);
        tracing::info!(
            x = start.x,
            y = start.y,
            heading = start.heading,
            color = ?script.color,
            "robot placed at starting pose"
        );

        let sequencer = Sequencer::new(core, config.simulation.frame_rate, shutdown_rx);
        Ok(Self {
            config,
            script,
            sequencer,
            recorder: TrajectoryRecorder::new(),
        })
    }

    pub async fn run(&mut self, policy: TimingPolicy) -> Result<RunOutcome, SimulationError> {
        let outcome = self
            .sequencer
            .run(&self.script, policy, &mut self.recorder)
            .await?;
        Ok(outcome)
    }

    pub fn pose(&self) -> Pose {
        self.sequencer.core().pose()
    }

    pub fn recorder(&self) -> &TrajectoryRecorder {
        &self.recorder
    }

    /// Write the recorded trajectory as a state-colored SVG.
    pub fn write_trajectory(&self, path: &Path) -> Result<(), SimulationError> {
        let renderer = SvgRenderer::new(&self.config.map, &self.config.robot);
        renderer.write(path, self.script.starting_pose, self.recorder.samples())?;
        Ok(())
    }
}
