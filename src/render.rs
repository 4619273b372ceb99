// src/render.rs - Trajectory recording and SVG rendering over the map
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;

use crate::config::{MapConfig, RobotConfig};
use crate::motion::{MotionPhase, Pose};
use crate::sequencer::TickObserver;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub pose: Pose,
    pub phase: MotionPhase,
}

/// Observer that keeps one sample per tick for later rendering.
#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    samples: Vec<TrajectorySample>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }
}

impl TickObserver for TrajectoryRecorder {
    fn on_tick(&mut self, pose: Pose, phase: MotionPhase) {
        self.samples.push(TrajectorySample { pose, phase });
    }
}

/// Trajectory color per motion phase, matching the debug palette of the
/// competition table overlay.
pub fn phase_color(phase: MotionPhase) -> &'static str {
    match phase {
        MotionPhase::Idle => "#00ff00",
        MotionPhase::RotatingToTarget => "#ffff00",
        MotionPhase::MovingForward => "#0000ff",
        MotionPhase::FinalRotation => "#ff0000",
    }
}

/// Renders a recorded trajectory to SVG.
///
/// Screen mapping keeps the table convention: the origin sits at the
/// bottom center of the map, world +x points up the screen and world +y
/// points right.
pub struct SvgRenderer {
    width_px: f64,
    height_px: f64,
    scale: f64,
    marker_radius: f64,
}

impl SvgRenderer {
    pub fn new(map: &MapConfig, robot: &RobotConfig) -> Self {
        Self {
            width_px: map.width * map.scale,
            height_px: map.height * map.scale,
            scale: map.scale,
            marker_radius: robot.width.max(robot.height) * map.scale / 2.0,
        }
    }

    fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.width_px / 2.0 + y * self.scale,
            self.height_px - x * self.scale,
        )
    }

    /// Build the SVG document: map background, one colored segment per
    /// tick that moved the robot, and an oriented marker at the final pose.
    pub fn render(&self, start: Pose, samples: &[TrajectorySample]) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
            self.width_px, self.height_px, self.width_px, self.height_px
        );
        let _ = writeln!(
            svg,
            r##"  <rect width="{:.0}" height="{:.0}" fill="#202020"/>"##,
            self.width_px, self.height_px
        );

        let mut previous = start;
        for sample in samples {
            let (x1, y1) = self.to_screen(previous.x, previous.y);
            let (x2, y2) = self.to_screen(sample.pose.x, sample.pose.y);
            // Rotation-in-place ticks produce zero-length segments; skip them.
            if (x2 - x1).abs() > f64::EPSILON || (y2 - y1).abs() > f64::EPSILON {
                let _ = writeln!(
                    svg,
                    r#"  <line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{}" stroke-width="2"/>"#,
                    phase_color(sample.phase)
                );
            }
            previous = sample.pose;
        }

        self.render_marker(&mut svg, previous);
        svg.push_str("</svg>\n");
        svg
    }

    pub fn write(
        &self,
        path: &Path,
        start: Pose,
        samples: &[TrajectorySample],
    ) -> Result<(), RenderError> {
        std::fs::write(path, self.render(start, samples))?;
        Ok(())
    }

    /// Triangle pointing along the final heading. World heading 0 maps to
    /// screen "up" under the table convention.
    fn render_marker(&self, svg: &mut String, pose: Pose) {
        let (cx, cy) = self.to_screen(pose.x, pose.y);
        let r = self.marker_radius;
        let rad = pose.heading.to_radians();
        // Tip plus two base corners, offset from the center in world axes.
        let corners = [
            (r * rad.cos(), r * rad.sin()),
            (-0.5 * r * rad.cos() - 0.4 * r * rad.sin(), -0.5 * r * rad.sin() + 0.4 * r * rad.cos()),
            (-0.5 * r * rad.cos() + 0.4 * r * rad.sin(), -0.5 * r * rad.sin() - 0.4 * r * rad.cos()),
        ];
        let points: Vec<String> = corners
            .iter()
            // World offsets map to screen as (dy, -dx), same as to_screen.
            .map(|(dx, dy)| format!("{:.1},{:.1}", cx + dy, cy - dx))
            .collect();
        let _ = writeln!(
            svg,
            r##"  <polygon points="{}" fill="#ffffff" opacity="0.8"/>"##,
            points.join(" ")
        );
    }
}
