//! 关节角值类型
//!
//! `JointAngles` 是不可变值语义的 6 元角度向量（弧度）。
//! 跨线程共享时整体替换，绝不原地修改，见 `keyarm-teleop` 的共享状态约定。

use crate::JOINT_COUNT;
use std::fmt;
use std::ops::Index;

/// 6 关节角配置（弧度）
///
/// 值语义：`Copy`，修改即替换。由运动学模型或 IK 求解器创建。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngles([f64; JOINT_COUNT]);

impl JointAngles {
    /// 从弧度数组创建
    pub const fn from_radians(values: [f64; JOINT_COUNT]) -> Self {
        Self(values)
    }

    /// 从度数组创建
    pub fn from_degrees(values: [f64; JOINT_COUNT]) -> Self {
        let mut rad = [0.0; JOINT_COUNT];
        for (out, deg) in rad.iter_mut().zip(values.iter()) {
            *out = deg.to_radians();
        }
        Self(rad)
    }

    /// 中立位形（各舵机行程中点），IK 冷启动时的种子
    pub fn neutral() -> Self {
        Self::from_degrees([0.0, 90.0, 90.0, 90.0, 90.0, 90.0])
    }

    /// 全零位形
    pub const fn zeros() -> Self {
        Self([0.0; JOINT_COUNT])
    }

    /// 以弧度数组返回
    #[inline]
    pub const fn as_radians(&self) -> &[f64; JOINT_COUNT] {
        &self.0
    }

    /// 以度数组返回
    pub fn to_degrees(&self) -> [f64; JOINT_COUNT] {
        let mut deg = [0.0; JOINT_COUNT];
        for (out, rad) in deg.iter_mut().zip(self.0.iter()) {
            *out = rad.to_degrees();
        }
        deg
    }

    /// 所有分量是否有限
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Index<usize> for JointAngles {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for JointAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = self.to_degrees();
        write!(
            f,
            "[{:.1}, {:.1}, {:.1}, {:.1}, {:.1}, {:.1}] deg",
            deg[0], deg[1], deg[2], deg[3], deg[4], deg[5]
        )
    }
}

/// 角度归一化到 (-PI, PI]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * std::f64::consts::PI);
    if a <= -std::f64::consts::PI {
        a += 2.0 * std::f64::consts::PI;
    } else if a > std::f64::consts::PI {
        a -= 2.0 * std::f64::consts::PI;
    }
    a
}
