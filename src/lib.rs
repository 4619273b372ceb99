// src/lib.rs - Scripted 2D robot strategy simulator
pub mod config;
pub mod motion;
pub mod render;
pub mod sequencer;
pub mod simulation;
pub mod strategy;

pub use config::{ConfigError, SimConfig, load_config};
pub use motion::{MotionCore, MotionError, MotionPhase, MotionState, Pose, ROTATION_EPSILON};
pub use render::{SvgRenderer, TrajectoryRecorder};
pub use sequencer::{NullObserver, RunOutcome, Sequencer, TickObserver, TimingPolicy};
pub use simulation::{Simulation, SimulationError};
pub use strategy::{Command, Group, RobotColor, Script, ScriptError, load_script, parse_script};
