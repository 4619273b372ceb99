// src/motion/mod.rs
pub mod physics;

pub use physics::{
    GotoParams, MotionCore, MotionError, MotionPhase, MotionState, Pose, ROTATION_EPSILON,
};
