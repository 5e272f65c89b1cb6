//! 腕关节安全带检查
//!
//! 数值求解器不知道物理约束：某些收敛解会把腕关节压到机械干涉区。
//! 求解之后统一套用本检查，违反即按不可达处理。

use crate::SolveError;
use keyarm_kinematics::JointAngles;

/// 指定关节的运行角度带（度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WristGuard {
    /// 受检关节索引（0 起）
    pub joint: usize,
    /// 下限（度，开区间）
    pub min_deg: f64,
    /// 上限（度，开区间）
    pub max_deg: f64,
}

impl Default for WristGuard {
    fn default() -> Self {
        // 腕俯仰关节 J5，机械安全带 45..135 度
        Self {
            joint: 4,
            min_deg: 45.0,
            max_deg: 135.0,
        }
    }
}

impl WristGuard {
    /// 检查解是否落在安全带内；越界返回 [`SolveError::Unreachable`]
    pub fn check(&self, angles: &JointAngles) -> Result<(), SolveError> {
        let deg = angles.to_degrees();
        let value = match deg.get(self.joint) {
            Some(v) => *v,
            None => return Err(SolveError::Faulted(format!(
                "wrist guard joint index {} out of range",
                self.joint
            ))),
        };
        if value > self.min_deg && value < self.max_deg {
            Ok(())
        } else {
            tracing::debug!(
                joint = self.joint,
                angle_deg = value,
                "solution rejected by wrist guard"
            );
            Err(SolveError::Unreachable)
        }
    }
}
