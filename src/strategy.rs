// src/strategy.rs - Strategy script loading, validation, and color mirroring
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::motion::Pose;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{context} must be in format 'x,y,angle', got '{value}'")]
    Coordinates {
        context: &'static str,
        value: String,
    },
    #[error("unknown robot color '{0}' (expected 'blue' or 'yellow')")]
    Color(String),
}

/// A single validated motion command. Closed sum type: the sequencer
/// matches it exhaustively, so a new command kind cannot be half-wired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Goto { x: f64, y: f64, heading: f64 },
    Forward { distance: f64 },
    Rotate { delta: f64 },
}

/// A named, ordered batch of commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub commands: Vec<Command>,
}

/// A fully validated strategy: starting pose plus ordered groups.
/// Immutable for the lifetime of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub starting_pose: Pose,
    pub color: RobotColor,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotColor {
    Blue,
    Yellow,
}

// Raw JSON schema. Actions are one-key objects like {"goto": "x,y,angle"},
// which maps directly onto an externally tagged enum.
#[derive(Debug, Deserialize)]
struct RawStrategy {
    #[serde(rename = "startingPos")]
    starting_pos: String,
    #[serde(default)]
    color: Option<String>,
    strategy: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    name: String,
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawAction {
    Goto(String),
    Forward(f64),
    Rotate(f64),
}

/// Load and validate a strategy file.
pub fn load_script(path: &Path) -> Result<Script, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("failed to read strategy file '{}': {}", path.display(), e);
        e
    })?;
    parse_script(&text)
}

/// Parse and validate strategy JSON. The yellow color mirrors the whole
/// script across the x axis so one file serves both starting sides.
pub fn parse_script(text: &str) -> Result<Script, ScriptError> {
    let raw: RawStrategy = serde_json::from_str(text)?;

    let color = match raw.color.as_deref() {
        None => RobotColor::Blue,
        Some(c) if c.eq_ignore_ascii_case("blue") => RobotColor::Blue,
        Some(c) if c.eq_ignore_ascii_case("yellow") => RobotColor::Yellow,
        Some(c) => return Err(ScriptError::Color(c.to_string())),
    };
    let mirror = color == RobotColor::Yellow;

    let (x, y, heading) = parse_coordinates(&raw.starting_pos, "starting position")?;
    let starting_pose = if mirror {
        Pose { x, y: -y, heading: -heading }
    } else {
        Pose { x, y, heading }
    };

    let groups = raw
        .strategy
        .iter()
        .map(|group| {
            let commands = group
                .actions
                .iter()
                .map(|action| convert_action(action, mirror))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Group {
                name: group.name.clone(),
                commands,
            })
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;

    Ok(Script {
        starting_pose,
        color,
        groups,
    })
}

fn convert_action(action: &RawAction, mirror: bool) -> Result<Command, ScriptError> {
    Ok(match action {
        RawAction::Goto(coords) => {
            let (x, y, heading) = parse_coordinates(coords, "goto command")?;
            if mirror {
                Command::Goto { x, y: -y, heading: -heading }
            } else {
                Command::Goto { x, y, heading }
            }
        }
        RawAction::Forward(distance) => Command::Forward { distance: *distance },
        RawAction::Rotate(delta) => Command::Rotate {
            delta: if mirror { -delta } else { *delta },
        },
    })
}

fn parse_coordinates(value: &str, context: &'static str) -> Result<(f64, f64, f64), ScriptError> {
    let invalid = || ScriptError::Coordinates {
        context,
        value: value.to_string(),
    };
    let mut parts = value.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), Some(angle), None) => Ok((
            x.parse().map_err(|_| invalid())?,
            y.parse().map_err(|_| invalid())?,
            angle.parse().map_err(|_| invalid())?,
        )),
        _ => Err(invalid()),
    }
}
