// src/config.rs - Simulation configuration
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Main configuration struct for the map, robot, and simulation pacing.
/// Defaults match the competition table: 3000x2000 mm, 315x235 mm robot,
/// 500 mm/s, 90 deg/s, 60 fps.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            robot: RobotConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

/// Map dimensions in millimetres plus the mm-to-pixel render scale.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: f64,
    #[serde(default = "default_map_height")]
    pub height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
            scale: default_scale(),
        }
    }
}

/// Robot footprint and base speeds (before the CLI multiplier).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    #[serde(default = "default_robot_width")]
    pub width: f64,
    #[serde(default = "default_robot_height")]
    pub height: f64,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            width: default_robot_width(),
            height: default_robot_height(),
            speed: default_speed(),
            rotation_speed: default_rotation_speed(),
        }
    }
}

/// Pacing configuration shared by both timing policies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width <= 0.0 || self.map.height <= 0.0 {
            return Err(ConfigError::Invalid("map dimensions must be positive".into()));
        }
        if self.map.scale <= 0.0 {
            return Err(ConfigError::Invalid("map scale must be positive".into()));
        }
        if self.robot.speed <= 0.0 || self.robot.rotation_speed <= 0.0 {
            return Err(ConfigError::Invalid("robot speeds must be positive".into()));
        }
        if self.simulation.frame_rate <= 0.0 {
            return Err(ConfigError::Invalid("frame rate must be positive".into()));
        }
        Ok(())
    }
}

// Default value functions
fn default_map_width() -> f64 { 3000.0 }
fn default_map_height() -> f64 { 2000.0 }
fn default_scale() -> f64 { 0.4 }
fn default_robot_width() -> f64 { 315.0 }
fn default_robot_height() -> f64 { 235.0 }
fn default_speed() -> f64 { 500.0 }
fn default_rotation_speed() -> f64 { 90.0 }
fn default_frame_rate() -> f64 { 60.0 }

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<SimConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!("failed to read config file '{}': {}", path, e);
        e
    })?;
    let config: SimConfig = toml::from_str(&contents).map_err(|e| {
        tracing::error!("failed to parse config TOML: {}", e);
        e
    })?;
    config.validate()?;
    Ok(config)
}
