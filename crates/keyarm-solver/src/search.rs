//! 可达性约束的自动后退搜索
//!
//! 目标点解不出时，沿原点到候选点的射线把候选点按固定步长向原点回退，
//! 逐点重试，直到求解成功或重试预算耗尽。单次失败没有任何可用的退路，
//! 沿射线回退则以可控的方式退化到该方向上最近的可达点。
//!
//! 注意：回退方向每轮都从**当前**（已回退的）候选点重新计算，而不是从
//! 最初的目标点计算。两者在直线回退下等价，但这是刻意保留的既有行为，
//! 见 DESIGN.md。

use crate::{PoseSolver, SearchError, SolveError};
use keyarm_kinematics::{JointAngles, Pose};
use tracing::{debug, trace};

/// 方向无定义的判定阈值：候选点距原点小于该值时不再归一化
const DEGENERATE_NORM: f64 = 1e-9;

/// 搜索成功的结果：实际达成的位姿（可能比请求点更靠近原点）+ 解出的关节角
#[derive(Debug, Clone)]
pub struct ReachedPose {
    pub pose: Pose,
    pub angles: JointAngles,
}

/// 自动后退搜索参数
#[derive(Debug, Clone, Copy)]
pub struct ReachabilitySearch {
    /// 每轮回退的固定步长（米）
    pub retreat_step: f64,
    /// 重试预算（求解器最多被调用的次数）
    pub budget: u32,
    /// 传给求解器的单次迭代预算
    pub solver_iterations: u32,
}

impl Default for ReachabilitySearch {
    fn default() -> Self {
        Self {
            retreat_step: 0.01,
            budget: 50,
            solver_iterations: 200,
        }
    }
}

impl ReachabilitySearch {
    /// 对 `desired` 执行自动后退搜索，`seed` 为当前位形
    ///
    /// 不变量：返回的达成位姿到原点的距离不大于 `desired` 的距离；
    /// 每轮重试使候选点到原点的距离严格减小一个步长（浮点容差内）。
    pub fn search(
        &self,
        solver: &mut dyn PoseSolver,
        desired: &Pose,
        seed: &JointAngles,
    ) -> Result<ReachedPose, SearchError> {
        let mut candidate = *desired;

        for attempt in 0..self.budget {
            match solver.solve(&candidate, seed, self.solver_iterations) {
                Ok(angles) => {
                    if attempt > 0 {
                        debug!(
                            attempts = attempt + 1,
                            reached = %candidate,
                            requested = %desired,
                            "retreat search succeeded off the requested point"
                        );
                    }
                    return Ok(ReachedPose {
                        pose: candidate,
                        angles,
                    });
                }
                Err(SolveError::Faulted(msg)) => {
                    // 求解器故障与不可达同样处理：继续回退
                    debug!(attempt, %msg, "solver fault during retreat search");
                }
                Err(_) => {
                    trace!(attempt, candidate = %candidate, "candidate unreachable, retreating");
                }
            }

            let norm = candidate.position.norm();
            if norm < DEGENERATE_NORM {
                // 候选点落在原点上，射线方向无定义
                return Err(SearchError::DegenerateDirection);
            }
            let direction = candidate.position / norm;
            candidate = Pose {
                position: candidate.position - direction * self.retreat_step,
                orientation: candidate.orientation,
            };
        }

        Err(SearchError::Exhausted {
            attempts: self.budget,
        })
    }
}
