// Integration tests for the command sequencer and its timing policies

use robosim::motion::{MotionCore, MotionPhase, Pose};
use robosim::sequencer::{NullObserver, RunOutcome, Sequencer, TickObserver, TimingPolicy};
use robosim::strategy::{Command, Group, RobotColor, Script};
use tokio::sync::broadcast;
use tokio_test::assert_ok;

fn test_core() -> MotionCore {
    MotionCore::new(500.0, 90.0, 1.0)
}

fn script(groups: Vec<Group>) -> Script {
    Script {
        starting_pose: Pose::default(),
        color: RobotColor::Blue,
        groups,
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[derive(Default)]
struct CommandLog {
    ticks: usize,
    completions: Vec<Pose>,
}

impl TickObserver for CommandLog {
    fn on_tick(&mut self, _pose: Pose, _phase: MotionPhase) {
        self.ticks += 1;
    }

    fn on_command_complete(&mut self, pose: Pose) {
        self.completions.push(pose);
    }
}

#[tokio::test]
async fn commands_run_strictly_in_script_order() {
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut sequencer = Sequencer::new(test_core(), 60.0, shutdown_rx);
    let script = script(vec![
        Group {
            name: "first".to_string(),
            commands: vec![Command::Forward { distance: 50.0 }],
        },
        Group {
            name: "second".to_string(),
            commands: vec![
                Command::Rotate { delta: 90.0 },
                Command::Goto { x: 0.0, y: 0.0, heading: 0.0 },
            ],
        },
    ]);

    let mut log = CommandLog::default();
    let outcome = sequencer
        .run(&script, TimingPolicy::FastForward, &mut log)
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    // One completion per command, each observed at the pose the command
    // left behind: the next command never started early.
    assert_eq!(log.completions.len(), 3);
    assert_close(log.completions[0].x, 50.0);
    assert_close(log.completions[0].y, 0.0);
    assert_close(log.completions[0].heading, 0.0);
    assert_close(log.completions[1].x, 50.0);
    assert_close(log.completions[1].heading, 90.0);
    assert_close(log.completions[2].x, 0.0);
    assert_close(log.completions[2].y, 0.0);
    assert_close(log.completions[2].heading, 0.0);
    assert!(log.ticks > 0);
    assert!(!sequencer.core().is_moving());
}

#[tokio::test]
async fn fast_forward_is_deterministic() {
    let make = || {
        let (_tx, rx) = broadcast::channel(1);
        Sequencer::new(test_core(), 60.0, rx)
    };
    let script = script(vec![Group {
        name: "run".to_string(),
        commands: vec![
            Command::Goto { x: 300.0, y: 400.0, heading: 45.0 },
            Command::Forward { distance: -75.0 },
        ],
    }]);

    let mut first = make();
    let mut second = make();
    first
        .run(&script, TimingPolicy::FastForward, &mut NullObserver)
        .await
        .unwrap();
    second
        .run(&script, TimingPolicy::FastForward, &mut NullObserver)
        .await
        .unwrap();
    assert_eq!(first.core().pose(), second.core().pose());
}

#[tokio::test(start_paused = true)]
async fn real_time_run_completes() {
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut sequencer = Sequencer::new(test_core(), 60.0, shutdown_rx);
    let script = script(vec![Group {
        name: "short".to_string(),
        commands: vec![Command::Forward { distance: 50.0 }],
    }]);

    let mut log = CommandLog::default();
    let outcome = assert_ok!(
        sequencer.run(&script, TimingPolicy::RealTime, &mut log).await
    );
    assert_eq!(outcome, RunOutcome::Completed);
    assert_close(sequencer.core().pose().x, 50.0);
    assert!(log.ticks > 0);
}

#[tokio::test(start_paused = true)]
async fn real_time_run_is_cancellable() {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut sequencer = Sequencer::new(test_core(), 60.0, shutdown_rx);
    let script = script(vec![Group {
        name: "endless".to_string(),
        commands: vec![Command::Forward { distance: 100_000.0 }],
    }]);

    shutdown_tx.send(()).unwrap();
    let outcome = sequencer
        .run(&script, TimingPolicy::RealTime, &mut NullObserver)
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    // The run stopped mid-command.
    assert!(sequencer.core().is_moving());
    assert!(sequencer.core().pose().x < 100_000.0);
}

#[tokio::test(start_paused = true)]
async fn real_time_run_survives_a_dropped_shutdown_sender() {
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    drop(shutdown_tx);
    let mut sequencer = Sequencer::new(test_core(), 60.0, shutdown_rx);
    let script = script(vec![Group {
        name: "short".to_string(),
        commands: vec![Command::Rotate { delta: 15.0 }],
    }]);

    let outcome = sequencer
        .run(&script, TimingPolicy::RealTime, &mut NullObserver)
        .await
        .unwrap();
    assert_eq!(outcome, RunOutcome::Completed);
    assert_close(sequencer.core().pose().heading, 15.0);
}
