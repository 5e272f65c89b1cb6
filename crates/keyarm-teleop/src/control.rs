//! 固定周期控制环
//!
//! 两状态机：**Idle**（无待处理的位姿变更）/ **Resolving**（期望位姿
//! 有新的增量待求解）。每个 Resolving 节拍：
//!
//! 1. 采样按键集，合成位置增量
//! 2. 以当前期望位姿 + 增量为候选，调用自动后退搜索（当前位形为种子）
//! 3. 成功：先下发命令，传输成功后才提交新位形与达成位姿
//! 4. 任何失败（不可达/预算耗尽/方向退化/传输错误）：不提交任何字段，
//!    期望位姿保持节拍开始时的值——回滚由"不发布未确认值"实现
//!
//! 求解与发送都在锁外执行；节拍超时不跳帧，只顺延下一拍。

use crate::input::sample_delta;
use crate::state::TeleopShared;
use keyarm_kinematics::Pose;
use keyarm_link::{CommandSink, ServoCommand};
use keyarm_solver::{PoseSolver, ReachabilitySearch, SearchError};
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// 控制环状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// 无待处理的位姿变更
    Idle,
    /// 正在求解新的期望位姿
    Resolving,
}

/// 单节拍失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 后退预算耗尽
    Exhausted,
    /// 后退方向无定义（候选点在原点）
    DegenerateDirection,
    /// 传输层写入失败
    Transport,
    /// 增量使目标位姿越出有限值域
    InvalidTarget,
}

/// 单节拍结果（测试直接驱动 [`ControlLoop::tick`] 断言）
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// 本拍无输入
    Idle,
    /// 已提交并下发命令；`retreated` 表示达成位姿比请求点更靠近原点
    Committed { achieved: Pose, retreated: bool },
    /// 已回滚：期望位姿与当前位形均保持节拍开始时的值
    RolledBack { reason: FailureKind },
}

/// 固定周期控制环
pub struct ControlLoop<S: PoseSolver, K: CommandSink> {
    shared: Arc<TeleopShared>,
    search: ReachabilitySearch,
    solver: S,
    sink: K,
    /// 每个方向键一拍的步长（米）
    input_step: f64,
    period: Duration,
    state: LoopState,
}

impl<S: PoseSolver, K: CommandSink> ControlLoop<S, K> {
    pub fn new(
        shared: Arc<TeleopShared>,
        search: ReachabilitySearch,
        solver: S,
        sink: K,
        input_step: f64,
        period: Duration,
    ) -> Self {
        Self {
            shared,
            search,
            solver,
            sink,
            input_step,
            period,
            state: LoopState::Idle,
        }
    }

    /// 当前状态机状态
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// 执行一个控制节拍
    pub fn tick(&mut self) -> TickOutcome {
        let keys = self.shared.keys();
        let delta = sample_delta(keys, self.input_step);

        if delta == nalgebra::Vector3::zeros() {
            if self.state != LoopState::Idle {
                trace!("control loop: Resolving -> Idle");
            }
            self.state = LoopState::Idle;
            return TickOutcome::Idle;
        }

        if self.state != LoopState::Resolving {
            trace!("control loop: Idle -> Resolving");
        }
        self.state = LoopState::Resolving;

        // 节拍开始时的期望位姿；失败路径上它保持为已发布值，无需显式回写
        let previous = self.shared.desired_pose();
        let candidate = match previous.translated(delta) {
            Ok(pose) => pose,
            Err(e) => {
                warn!(%e, "input delta produced invalid target, tick rolled back");
                return TickOutcome::RolledBack {
                    reason: FailureKind::InvalidTarget,
                };
            }
        };

        let seed = self.shared.current_angles();
        let reached = match self.search.search(&mut self.solver, &candidate, &seed) {
            Ok(reached) => reached,
            Err(SearchError::Exhausted { attempts }) => {
                debug!(attempts, requested = %candidate, "retreat budget exhausted, tick rolled back");
                return TickOutcome::RolledBack {
                    reason: FailureKind::Exhausted,
                };
            }
            Err(SearchError::DegenerateDirection) => {
                debug!("degenerate retreat direction, tick rolled back");
                return TickOutcome::RolledBack {
                    reason: FailureKind::DegenerateDirection,
                };
            }
        };

        // 先下发，后提交：硬件故障绝不能让共享状态指向未送达的位姿
        let command = ServoCommand::move_to(&reached.angles);
        if let Err(e) = self.sink.send(&command) {
            warn!(%e, "hardware send failed, tick rolled back; control continues");
            return TickOutcome::RolledBack {
                reason: FailureKind::Transport,
            };
        }

        let retreated = reached.pose.position != candidate.position;
        self.shared.store_current_angles(reached.angles);
        self.shared.store_desired_pose(reached.pose);

        TickOutcome::Committed {
            achieved: reached.pose,
            retreated,
        }
    }

    /// 以固定周期运行直到 running 清零
    ///
    /// 每轮开头轮询 running；清零后在一个节拍内退出。工作时间之外
    /// 睡满周期余量；超时节拍顺延下一拍，不丢帧。
    pub fn run(&mut self) {
        let sleeper = SpinSleeper::default();
        debug!(period_ms = self.period.as_millis() as u64, "control loop started");
        while self.shared.is_running() {
            let started = Instant::now();
            let outcome = self.tick();
            if let TickOutcome::Committed { achieved, retreated } = &outcome {
                trace!(pose = %achieved, retreated, "tick committed");
            }
            if let Some(remaining) = self.period.checked_sub(started.elapsed()) {
                sleeper.sleep(remaining);
            }
        }
        debug!("control loop stopped");
    }
}
