//! 跨线程共享的控制状态
//!
//! 字段与写者的对应关系（单写者纪律）：
//!
//! | 字段             | 写者           | 同步机制      |
//! |------------------|----------------|---------------|
//! | `desired_pose`   | 控制环         | ArcSwap       |
//! | `current_angles` | 控制环         | ArcSwap       |
//! | `keys`           | 输入线程       | parking_lot   |
//! | `running`        | 输入线程/信号  | AtomicBool    |
//!
//! 写者发布完整的新值（原子替换不可变值），读者拿到的永远是
//! 自洽的单字段快照，不存在撕裂的半更新。求解器与硬件通道的调用
//! 都发生在所有锁之外。

use crate::input::KeySet;
use arc_swap::ArcSwap;
use keyarm_kinematics::{JointAngles, Pose};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 遥操作共享状态
pub struct TeleopShared {
    desired_pose: ArcSwap<Pose>,
    current_angles: ArcSwap<JointAngles>,
    keys: Mutex<KeySet>,
    running: AtomicBool,
}

impl TeleopShared {
    /// 以初始（home）位姿和位形构造，running 置位
    pub fn new(home_pose: Pose, home_angles: JointAngles) -> Arc<Self> {
        Arc::new(Self {
            desired_pose: ArcSwap::from_pointee(home_pose),
            current_angles: ArcSwap::from_pointee(home_angles),
            keys: Mutex::new(KeySet::empty()),
            running: AtomicBool::new(true),
        })
    }

    /// 期望位姿快照（复制，不持锁）
    pub fn desired_pose(&self) -> Pose {
        **self.desired_pose.load()
    }

    /// 当前位形快照
    pub fn current_angles(&self) -> JointAngles {
        **self.current_angles.load()
    }

    /// 遥测用的成对快照
    ///
    /// 两个字段由同一写者（控制环）在一次提交内先后发布，
    /// 单独读取各自自洽；可视化对二者间微小的时间差不敏感。
    pub fn snapshot(&self) -> (Pose, JointAngles) {
        (self.desired_pose(), self.current_angles())
    }

    /// 发布新的期望位姿（仅控制环调用）
    pub fn store_desired_pose(&self, pose: Pose) {
        self.desired_pose.store(Arc::new(pose));
    }

    /// 发布新的当前位形（仅控制环调用）
    pub fn store_current_angles(&self, angles: JointAngles) {
        self.current_angles.store(Arc::new(angles));
    }

    /// 按键集快照（短临界区内复制）
    pub fn keys(&self) -> KeySet {
        *self.keys.lock()
    }

    /// 替换按键集（仅输入线程调用）
    pub fn store_keys(&self, keys: KeySet) {
        *self.keys.lock() = keys;
    }

    /// 运行标志；各环在每轮迭代开头轮询
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 请求有序停机：环在一个节拍内退出，传输层在环退出后才关闭
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MotionKey;

    fn shared() -> Arc<TeleopShared> {
        TeleopShared::new(
            Pose::from_position(0.15, 0.0, 0.2).unwrap(),
            JointAngles::neutral(),
        )
    }

    #[test]
    fn test_snapshot_reflects_last_store() {
        let state = shared();
        let pose = Pose::from_position(0.1, 0.05, 0.25).unwrap();
        state.store_desired_pose(pose);
        assert_eq!(state.desired_pose(), pose);

        let angles = JointAngles::from_degrees([1.0, 91.0, 89.0, 90.0, 92.0, 90.0]);
        state.store_current_angles(angles);
        assert_eq!(state.current_angles(), angles);
    }

    #[test]
    fn test_keys_round_trip() {
        let state = shared();
        let mut keys = KeySet::empty();
        keys.insert(MotionKey::XPos);
        keys.insert(MotionKey::ZNeg);
        state.store_keys(keys);
        let read = state.keys();
        assert!(read.contains(MotionKey::XPos));
        assert!(read.contains(MotionKey::ZNeg));
        assert!(!read.contains(MotionKey::YPos));
    }

    #[test]
    fn test_stop_flag() {
        let state = shared();
        assert!(state.is_running());
        state.stop();
        assert!(!state.is_running());
    }

    #[test]
    fn test_concurrent_reads_see_whole_values() {
        let state = shared();
        let writer = state.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..1000 {
                let v = i as f64 * 1e-4;
                writer.store_desired_pose(Pose::from_position(v, v, v).unwrap());
            }
        });
        // 读者永远看到 x == y == z 的完整快照
        for _ in 0..1000 {
            let pose = state.desired_pose();
            assert_eq!(pose.position.x, pose.position.y);
            assert_eq!(pose.position.y, pose.position.z);
        }
        handle.join().unwrap();
    }
}
