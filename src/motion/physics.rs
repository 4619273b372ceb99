// src/motion/physics.rs - Open-loop kinematics and the motion state machine
use thiserror::Error;

/// Heading error below which a rotation is considered complete, in degrees.
pub const ROTATION_EPSILON: f64 = 0.1;

/// Robot pose on the table: millimetres for x/y, degrees for heading.
///
/// Heading is kept normalized to [0, 360). 0 degrees faces the world +x
/// axis and increases counter-clockwise (the atan2 convention), so forward
/// projection is `x += d*cos(h)`, `y += d*sin(h)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

/// Precomputed parameters of an in-flight goto sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct GotoParams {
    pub target_x: f64,
    pub target_y: f64,
    pub distance: f64,
    pub final_heading: f64,
}

/// Motion state machine. `Idle` is both initial and terminal for every
/// command; goto carries its parameters in the states that need them, so
/// "rotating but no parameters" is unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionState {
    Idle,
    /// First goto phase: turning to face the target point.
    RotatingToTarget(GotoParams),
    /// Translating toward a position target. `None` for a standalone
    /// forward command, `Some` while inside a goto sequence.
    MovingForward(Option<GotoParams>),
    /// Pure rotation to a heading target: goto's closing phase and the
    /// whole of a standalone rotate command.
    FinalRotation,
}

/// Copyable discriminant of [`MotionState`], for rendering and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Idle,
    RotatingToTarget,
    MovingForward,
    FinalRotation,
}

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("command issued while a motion is in progress (phase: {0:?})")]
    Busy(MotionPhase),
}

/// Normalize a heading into [0, 360).
pub(crate) fn normalize_heading(heading: f64) -> f64 {
    // rem_euclid rounds up to exactly 360.0 for tiny negative inputs.
    let normalized = heading.rem_euclid(360.0);
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Shortest signed rotation from `current` to `target`, in (-180, 180].
pub(crate) fn shortest_heading_diff(target: f64, current: f64) -> f64 {
    let diff = (target - current).rem_euclid(360.0);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Owns the robot pose and advances it by a bounded amount per tick.
///
/// Commands may only be issued while idle; the caller polls
/// [`MotionCore::is_moving`] and feeds elapsed time into
/// [`MotionCore::update`]. The integration is dt-agnostic: every phase
/// clamps its step to the exact remaining delta, so the final pose does
/// not depend on tick granularity.
pub struct MotionCore {
    pose: Pose,
    speed: f64,          // mm per second, already multiplier-scaled
    rotation_speed: f64, // degrees per second, already multiplier-scaled
    target: Option<(f64, f64)>,
    target_heading: Option<f64>,
    state: MotionState,
}

impl MotionCore {
    pub fn new(base_speed: f64, base_rotation_speed: f64, multiplier: f64) -> Self {
        Self {
            pose: Pose::default(),
            speed: base_speed * multiplier,
            rotation_speed: base_rotation_speed * multiplier,
            target: None,
            target_heading: None,
            state: MotionState::Idle,
        }
    }

    /// Hard reset: place the robot and drop any outstanding motion.
    pub fn set_pose(&mut self, x: f64, y: f64, heading: f64) {
        self.pose = Pose {
            x,
            y,
            heading: normalize_heading(heading),
        };
        self.target = None;
        self.target_heading = None;
        self.state = MotionState::Idle;
    }

    /// Absolute move: rotate to face `(x, y)`, translate there, then
    /// rotate to `heading`.
    pub fn goto_pose(&mut self, x: f64, y: f64, heading: f64) -> Result<(), MotionError> {
        self.ensure_idle()?;
        let dx = x - self.pose.x;
        let dy = y - self.pose.y;
        let distance = dx.hypot(dy);
        let bearing = normalize_heading(dy.atan2(dx).to_degrees());
        tracing::debug!(distance, bearing, "goto decomposed");
        self.target_heading = Some(bearing);
        self.state = MotionState::RotatingToTarget(GotoParams {
            target_x: x,
            target_y: y,
            distance,
            final_heading: normalize_heading(heading),
        });
        Ok(())
    }

    /// Relative translation along the current heading. Negative distance
    /// backs up; heading is left untouched either way.
    pub fn move_forward(&mut self, distance: f64) -> Result<(), MotionError> {
        self.ensure_idle()?;
        let rad = self.pose.heading.to_radians();
        self.target = Some((
            self.pose.x + distance * rad.cos(),
            self.pose.y + distance * rad.sin(),
        ));
        self.state = MotionState::MovingForward(None);
        Ok(())
    }

    /// Relative rotation by `delta` degrees, taking the shortest path to
    /// the resulting heading.
    pub fn rotate_by(&mut self, delta: f64) -> Result<(), MotionError> {
        self.ensure_idle()?;
        self.target_heading = Some(normalize_heading(self.pose.heading + delta));
        self.state = MotionState::FinalRotation;
        Ok(())
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self.state, MotionState::Idle)
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn state(&self) -> &MotionState {
        &self.state
    }

    pub fn phase(&self) -> MotionPhase {
        match self.state {
            MotionState::Idle => MotionPhase::Idle,
            MotionState::RotatingToTarget(_) => MotionPhase::RotatingToTarget,
            MotionState::MovingForward(_) => MotionPhase::MovingForward,
            MotionState::FinalRotation => MotionPhase::FinalRotation,
        }
    }

    /// Advance the simulation by `dt` seconds. No-op while idle.
    ///
    /// A tick that still has rotation to do never advances translation;
    /// a tick that completes a rotation may start translating in the same
    /// call, with the same dt.
    pub fn update(&mut self, dt: f64) {
        if !self.is_moving() {
            return;
        }

        if let Some(target_heading) = self.target_heading {
            let diff = shortest_heading_diff(target_heading, self.pose.heading);
            if diff.abs() > ROTATION_EPSILON {
                let step = (self.rotation_speed * dt).min(diff.abs());
                self.pose.heading = normalize_heading(self.pose.heading + step.copysign(diff));
                return;
            }
            self.pose.heading = target_heading;
            self.target_heading = None;
            if !self.finish_rotation() {
                return;
            }
        }

        if let Some((tx, ty)) = self.target {
            let dx = tx - self.pose.x;
            let dy = ty - self.pose.y;
            let remaining = dx.hypot(dy);
            let step = self.speed * dt;
            if remaining > 0.0 && step < remaining {
                self.pose.x += dx / remaining * step;
                self.pose.y += dy / remaining * step;
                return;
            }
            // Snap exactly onto the target; covers the zero-distance case.
            self.pose.x = tx;
            self.pose.y = ty;
            self.target = None;
            self.finish_translation();
        }
    }

    fn ensure_idle(&self) -> Result<(), MotionError> {
        if self.is_moving() {
            return Err(MotionError::Busy(self.phase()));
        }
        Ok(())
    }

    /// Heading target reached. Returns true when a translation target was
    /// installed and may be advanced within the same tick.
    fn finish_rotation(&mut self) -> bool {
        match std::mem::replace(&mut self.state, MotionState::Idle) {
            MotionState::RotatingToTarget(params) => {
                self.target = Some((params.target_x, params.target_y));
                tracing::debug!(distance = params.distance, "facing target, translating");
                self.state = MotionState::MovingForward(Some(params));
                true
            }
            MotionState::FinalRotation => false,
            other => {
                debug_assert!(false, "heading target outstanding in {other:?}");
                self.state = other;
                false
            }
        }
    }

    fn finish_translation(&mut self) {
        match std::mem::replace(&mut self.state, MotionState::Idle) {
            MotionState::MovingForward(Some(params)) => {
                self.target_heading = Some(params.final_heading);
                self.state = MotionState::FinalRotation;
            }
            MotionState::MovingForward(None) => {}
            other => {
                debug_assert!(false, "position target outstanding in {other:?}");
                self.state = other;
            }
        }
    }
}
