//! 运动学层错误类型定义

use thiserror::Error;

/// 运动学层错误类型
#[derive(Error, Debug)]
pub enum KinematicsError {
    /// 位姿分量非有限值（NaN 或无穷）
    #[error("Non-finite pose component: {component} = {value}")]
    NonFinitePose {
        component: &'static str,
        value: f64,
    },

    /// 关节角数量与链的驱动关节数不匹配
    #[error("Joint count mismatch: chain has {expected} actuated joints, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::KinematicsError;

    #[test]
    fn test_error_display() {
        let err = KinematicsError::NonFinitePose {
            component: "x",
            value: f64::NAN,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Non-finite pose component"));
        assert!(msg.contains("x"));

        let err = KinematicsError::JointCountMismatch {
            expected: 6,
            actual: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("6") && msg.contains("5"));
    }
}
