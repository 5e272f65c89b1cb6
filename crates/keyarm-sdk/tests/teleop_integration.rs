//! 端到端集成测试
//!
//! 按键 -> 控制环 -> DLS 求解 -> 线级命令，全链路走真实实现，
//! 只有硬件通道用内存记录端替代。

use keyarm_sdk::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 记录所有下发命令的假硬件通道
#[derive(Clone)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<ServoCommand>>>,
}

impl RecordingSink {
    fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn commands(&self) -> Vec<ServoCommand> {
        self.sent.lock().unwrap().clone()
    }
}

impl CommandSink for RecordingSink {
    fn send(&mut self, command: &ServoCommand) -> Result<(), LinkError> {
        self.sent.lock().unwrap().push(*command);
        Ok(())
    }
}

fn press(shared: &TeleopShared, key: MotionKey) {
    let mut keys = KeySet::empty();
    keys.insert(key);
    shared.store_keys(keys);
}

fn pipeline(
    step: f64,
) -> (
    Arc<TeleopShared>,
    ControlLoop<DlsSolver, RecordingSink>,
    RecordingSink,
    KinematicChain,
) {
    let chain = KinematicChain::hobby_arm();
    let home_angles = JointAngles::neutral();
    let home_pose = Pose {
        position: chain.forward_kinematics(&home_angles).end_effector.position,
        orientation: None,
    };
    let shared = TeleopShared::new(home_pose, home_angles);
    let solver = DlsSolver::new(chain.clone(), WristGuard::default());
    let sink = RecordingSink::new();
    let control = ControlLoop::new(
        shared.clone(),
        ReachabilitySearch::default(),
        solver,
        sink.clone(),
        step,
        Duration::from_millis(50),
    );
    (shared, control, sink, chain)
}

#[test]
fn test_key_press_moves_arm_and_emits_commands() {
    let (shared, mut control, sink, chain) = pipeline(0.002);
    let start = shared.desired_pose();

    press(&shared, MotionKey::ZPos);
    for _ in 0..3 {
        let outcome = control.tick();
        assert!(
            matches!(outcome, TickOutcome::Committed { .. }),
            "tick failed: {outcome:?}"
        );
    }

    // 期望位姿沿 z 上移 6mm
    let pose = shared.desired_pose();
    assert!((pose.position.z - start.position.z - 0.006).abs() < 1e-9);

    // 提交的位形经正解复现提交的位姿
    let fk = chain.forward_kinematics(&shared.current_angles());
    assert!(
        (fk.end_effector.position - pose.position).norm() < 1e-3,
        "committed angles do not reproduce committed pose"
    );

    // 每拍恰好一条移动命令
    let commands = sink.commands();
    assert_eq!(commands.len(), 3);
    for command in &commands {
        assert!(matches!(command, ServoCommand::Move(_)));
    }
}

#[test]
fn test_released_keys_stop_the_stream() {
    let (shared, mut control, sink, _) = pipeline(0.002);

    press(&shared, MotionKey::XNeg);
    assert!(matches!(control.tick(), TickOutcome::Committed { .. }));

    shared.store_keys(KeySet::empty());
    for _ in 0..5 {
        assert!(matches!(control.tick(), TickOutcome::Idle));
    }
    // 松开后不再有命令
    assert_eq!(sink.commands().len(), 1);
}

#[test]
fn test_commands_stay_within_wire_range() {
    let (shared, mut control, sink, _) = pipeline(0.002);

    press(&shared, MotionKey::YPos);
    for _ in 0..5 {
        if matches!(control.tick(), TickOutcome::RolledBack { .. }) {
            break;
        }
    }

    for command in sink.commands() {
        let line = format_tcp_command(&command).unwrap();
        for token in line.trim().split(',') {
            let value: i16 = token.split(':').nth(1).unwrap().parse().unwrap();
            assert!((10..=170).contains(&value));
        }
    }
}

#[test]
fn test_ordered_shutdown_of_both_loops() {
    let (shared, mut control, _, _) = pipeline(0.002);

    let control_handle = std::thread::spawn(move || control.run());
    let telemetry_shared = shared.clone();
    let frames = Arc::new(Mutex::new(0usize));
    let frame_count = frames.clone();
    let telemetry_handle = std::thread::spawn(move || {
        run_telemetry_loop(
            telemetry_shared,
            move |_: &Pose, _: &JointAngles| {
                *frame_count.lock().unwrap() += 1;
            },
            Duration::from_millis(5),
        )
    });

    std::thread::sleep(Duration::from_millis(40));
    shared.stop();
    control_handle.join().unwrap();
    telemetry_handle.join().unwrap();
    assert!(*frames.lock().unwrap() > 0);
}
