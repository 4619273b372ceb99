// End-to-end tests: strategy JSON in, final pose and trajectory SVG out

use robosim::config::SimConfig;
use robosim::sequencer::{RunOutcome, TimingPolicy};
use robosim::simulation::{Simulation, SimulationError};
use robosim::strategy::parse_script;
use tokio::sync::broadcast;

const STRATEGY: &str = r#"{
    "startingPos": "0, 0, 0",
    "strategy": [
        {
            "name": "approach",
            "actions": [
                {"goto": "500,500,90"},
                {"forward": 100}
            ]
        },
        {
            "name": "align",
            "actions": [
                {"rotate": -90}
            ]
        }
    ]
}"#;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn fast_forward_verification_run() {
    let script = parse_script(STRATEGY).unwrap();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut simulation = Simulation::new(SimConfig::default(), script, 4.0, shutdown_rx).unwrap();

    let outcome = simulation.run(TimingPolicy::FastForward).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // goto lands at (500, 500, 90), forward 100 along 90 degrees adds
    // (0, 100), and the closing rotate brings the heading back to 0.
    let pose = simulation.pose();
    assert_close(pose.x, 500.0);
    assert_close(pose.y, 600.0);
    assert_close(pose.heading, 0.0);
    assert!(!simulation.recorder().samples().is_empty());
}

#[tokio::test]
async fn writes_the_trajectory_svg() {
    let script = parse_script(STRATEGY).unwrap();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut simulation = Simulation::new(SimConfig::default(), script, 4.0, shutdown_rx).unwrap();
    simulation.run(TimingPolicy::FastForward).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trajectory.svg");
    simulation.write_trajectory(&path).unwrap();
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<line"));
}

#[tokio::test]
async fn rejects_non_positive_speed_multiplier() {
    let script = parse_script(STRATEGY).unwrap();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let result = Simulation::new(SimConfig::default(), script, 0.0, shutdown_rx);
    assert!(matches!(result, Err(SimulationError::Other(_))));
}

#[tokio::test]
async fn rejects_invalid_config() {
    let script = parse_script(STRATEGY).unwrap();
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut config = SimConfig::default();
    config.robot.speed = -1.0;
    let result = Simulation::new(config, script, 1.0, shutdown_rx);
    assert!(matches!(result, Err(SimulationError::Config(_))));
}
