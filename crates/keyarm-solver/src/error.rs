//! 求解层错误类型定义
//!
//! 显式结果标签取代异常式控制流：调用方按标签分支，
//! 所有失败都在控制环内通过回滚恢复，不终止进程。

use thiserror::Error;

/// 单次求解的失败标签
#[derive(Error, Debug)]
pub enum SolveError {
    /// 未收敛，或收敛解违反物理约束（如腕关节安全带）
    #[error("Target unreachable")]
    Unreachable,

    /// 外部求解进程超过执行截止时间（调用方按 Unreachable 处理）
    #[error("Solver deadline exceeded")]
    Timeout,

    /// 求解器自身故障（进程无法启动、数值奇异等）
    #[error("Solver fault: {0}")]
    Faulted(String),
}

/// 自动后退搜索的失败标签
#[derive(Error, Debug)]
pub enum SearchError {
    /// 后退预算耗尽仍未找到可行点
    #[error("Retreat budget exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// 候选点与原点重合，后退方向无定义
    #[error("Retreat direction undefined: candidate at origin")]
    DegenerateDirection,
}
