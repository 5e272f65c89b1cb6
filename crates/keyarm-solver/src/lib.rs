//! keyarm-solver - 位姿求解适配器与自动后退搜索
//!
//! 控制环只依赖 [`PoseSolver`] 接口，两个实现可互换：
//!
//! - [`DlsSolver`]: 进程内阻尼最小二乘数值 IK
//! - [`ProcessSolver`]: 调用外部求解器进程（stdout 协议 + 截止时间）
//!
//! [`ReachabilitySearch`] 在适配器之上实现自动后退策略：
//! 目标不可达时沿原点方向按固定步长回退重试，直到找到可行点或预算耗尽。

pub mod dls;
pub mod error;
pub mod guard;
pub mod process;
pub mod search;

pub use dls::DlsSolver;
pub use error::{SolveError, SearchError};
pub use guard::WristGuard;
pub use process::ProcessSolver;
pub use search::{ReachabilitySearch, ReachedPose};

use keyarm_kinematics::{JointAngles, Pose};

/// 位姿求解适配器接口
///
/// 约定：收敛到正解能在固定容差内复现 `target` 的位形，否则返回
/// [`SolveError::Unreachable`]。种子始终是机械臂的当前位形，使连续调用
/// 跟踪同一解支而不是在不同解支间跳变。数值收敛但违反腕关节安全带的解
/// 同样按不可达处理。
pub trait PoseSolver {
    /// 求解 `target` 的关节角，`seed` 为当前位形，`max_iterations` 为迭代预算
    fn solve(
        &mut self,
        target: &Pose,
        seed: &JointAngles,
        max_iterations: u32,
    ) -> Result<JointAngles, SolveError>;
}

/// 闭包也可作为求解器使用（主要面向测试）
impl<F> PoseSolver for F
where
    F: FnMut(&Pose, &JointAngles, u32) -> Result<JointAngles, SolveError>,
{
    fn solve(
        &mut self,
        target: &Pose,
        seed: &JointAngles,
        max_iterations: u32,
    ) -> Result<JointAngles, SolveError> {
        self(target, seed, max_iterations)
    }
}
