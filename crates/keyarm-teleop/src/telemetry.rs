//! 遥测环：低频只读快照
//!
//! 遥测只消费共享状态的快照，绝不写回、绝不持有任何会阻塞控制环的
//! 资源。输出端抽象成 [`TelemetrySink`]，CLI 用它画正视/俯视两个
//! 平面投影，测试用它记录快照序列。

use crate::state::TeleopShared;
use keyarm_kinematics::{JointAngles, Pose};
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// 遥测输出端
pub trait TelemetrySink {
    /// 呈现一帧快照；失败只记日志，不影响控制
    fn render(&mut self, desired: &Pose, angles: &JointAngles);
}

impl<F: FnMut(&Pose, &JointAngles)> TelemetrySink for F {
    fn render(&mut self, desired: &Pose, angles: &JointAngles) {
        self(desired, angles)
    }
}

/// 以固定周期渲染快照直到 running 清零
pub fn run_telemetry_loop<T: TelemetrySink>(
    shared: Arc<TeleopShared>,
    mut sink: T,
    period: Duration,
) {
    let sleeper = SpinSleeper::default();
    debug!(period_ms = period.as_millis() as u64, "telemetry loop started");
    while shared.is_running() {
        let started = Instant::now();
        let (desired, angles) = shared.snapshot();
        sink.render(&desired, &angles);
        if let Some(remaining) = period.checked_sub(started.elapsed()) {
            sleeper.sleep(remaining);
        }
    }
    debug!("telemetry loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_telemetry_observes_committed_snapshots() {
        let shared = TeleopShared::new(
            Pose::from_position(0.15, 0.0, 0.2).unwrap(),
            JointAngles::neutral(),
        );
        let frames: Arc<Mutex<Vec<Pose>>> = Arc::new(Mutex::new(Vec::new()));

        let loop_shared = shared.clone();
        let loop_frames = frames.clone();
        let handle = std::thread::spawn(move || {
            let sink = move |pose: &Pose, _: &JointAngles| {
                loop_frames.lock().unwrap().push(*pose);
            };
            run_telemetry_loop(loop_shared, sink, Duration::from_millis(2));
        });

        std::thread::sleep(Duration::from_millis(10));
        shared.store_desired_pose(Pose::from_position(0.2, 0.0, 0.2).unwrap());
        std::thread::sleep(Duration::from_millis(10));
        shared.stop();
        handle.join().unwrap();

        let frames = frames.lock().unwrap();
        assert!(!frames.is_empty());
        // 停止前的最后一帧反映最近一次提交
        assert!((frames.last().unwrap().position.x - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_loop_exits_promptly_on_stop() {
        let shared = TeleopShared::new(
            Pose::from_position(0.15, 0.0, 0.2).unwrap(),
            JointAngles::neutral(),
        );
        shared.stop();
        let started = Instant::now();
        run_telemetry_loop(shared, |_: &Pose, _: &JointAngles| {}, Duration::from_secs(10));
        // running 已清零时一轮都不睡
        assert!(started.elapsed() < Duration::from_millis(100));
    }
}
