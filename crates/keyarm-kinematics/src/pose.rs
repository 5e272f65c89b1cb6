//! 末端位姿类型

use crate::angles::normalize_angle;
use crate::error::KinematicsError;
use nalgebra::Vector3;
use std::fmt;

/// 末端位姿：位置（米）+ 可选姿态（RPY 欧拉角，弧度）
///
/// 姿态为 `None` 表示目标不约束姿态，由求解器自由选择。
/// 不变量：位置分量有限；姿态分量归一化到 (-PI, PI]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// 位置（米）
    pub position: Vector3<f64>,
    /// 姿态（roll, pitch, yaw，弧度），`None` = 不约束
    pub orientation: Option<[f64; 3]>,
}

impl Pose {
    /// 创建仅约束位置的位姿
    ///
    /// 位置分量非有限时返回错误。
    pub fn from_position(x: f64, y: f64, z: f64) -> Result<Self, KinematicsError> {
        for (component, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(KinematicsError::NonFinitePose { component, value });
            }
        }
        Ok(Self {
            position: Vector3::new(x, y, z),
            orientation: None,
        })
    }

    /// 创建带姿态约束的位姿；姿态分量归一化到 (-PI, PI]
    pub fn with_orientation(
        x: f64,
        y: f64,
        z: f64,
        rpy: [f64; 3],
    ) -> Result<Self, KinematicsError> {
        let mut pose = Self::from_position(x, y, z)?;
        for (i, component) in ["roll", "pitch", "yaw"].into_iter().enumerate() {
            if !rpy[i].is_finite() {
                return Err(KinematicsError::NonFinitePose {
                    component,
                    value: rpy[i],
                });
            }
        }
        pose.orientation = Some([
            normalize_angle(rpy[0]),
            normalize_angle(rpy[1]),
            normalize_angle(rpy[2]),
        ]);
        Ok(pose)
    }

    /// 平移后的新位姿（值语义，原位姿不变）
    ///
    /// 平移结果非有限时返回错误，控制环据此拒绝本次输入。
    pub fn translated(&self, delta: Vector3<f64>) -> Result<Self, KinematicsError> {
        let position = self.position + delta;
        for (component, value) in [("x", position.x), ("y", position.y), ("z", position.z)] {
            if !value.is_finite() {
                return Err(KinematicsError::NonFinitePose { component, value });
            }
        }
        Ok(Self {
            position,
            orientation: self.orientation,
        })
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) m",
            self.position.x, self.position.y, self.position.z
        )?;
        if let Some(rpy) = self.orientation {
            write!(
                f,
                " rpy ({:.2}, {:.2}, {:.2}) rad",
                rpy[0], rpy[1], rpy[2]
            )?;
        }
        Ok(())
    }
}
