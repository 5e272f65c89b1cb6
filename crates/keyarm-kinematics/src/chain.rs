//! DH 运动学链与正向运动学
//!
//! 链在启动时由固定物理尺寸构造一次，之后只读。
//! 正解是纯函数：相同输入产生位级相同的输出。

use crate::angles::normalize_angle;
use crate::error::KinematicsError;
use crate::{JointAngles, Pose};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use std::f64::consts::FRAC_PI_2;

/// 单个 DH 连杆参数（标准 DH 约定）
///
/// 构造后不可变，所有长度单位为米、角度单位为弧度。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhLink {
    /// 关节角偏置（theta 的固定偏移；固定连杆即全部 theta）
    pub theta_offset: f64,
    /// 连杆距离 d（沿前一 z 轴）
    pub d: f64,
    /// 连杆长度 a（沿当前 x 轴）
    pub a: f64,
    /// 连杆扭角 alpha（绕当前 x 轴）
    pub alpha: f64,
}

impl DhLink {
    /// 本连杆的齐次变换：Rz(theta) * Tz(d) * Tx(a) * Rx(alpha)
    fn transform(&self, joint_angle: f64) -> Isometry3<f64> {
        let theta = self.theta_offset + joint_angle;
        let rz = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta),
        );
        let tz = Isometry3::from_parts(Translation3::new(0.0, 0.0, self.d), UnitQuaternion::identity());
        let tx = Isometry3::from_parts(Translation3::new(self.a, 0.0, 0.0), UnitQuaternion::identity());
        let rx = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.alpha),
        );
        rz * tz * tx * rx
    }
}

/// 正解结果：各连杆原点位置 + 末端位姿
#[derive(Debug, Clone)]
pub struct FkResult {
    /// 从基座到末端每个连杆坐标系原点的位置（含基座原点，用于可视化）
    pub joint_positions: Vec<Point3<f64>>,
    /// 末端执行器位姿（位置 + RPY 姿态）
    pub end_effector: Pose,
}

/// DH 连杆序列 + 驱动掩码
///
/// `actuated[i]` 为 false 的连杆是固定连杆（基座抬升、工具偏移），
/// 不消耗关节角。驱动连杆数必须等于 [`crate::JOINT_COUNT`]。
#[derive(Debug, Clone)]
pub struct KinematicChain {
    links: Vec<DhLink>,
    actuated: Vec<bool>,
}

impl KinematicChain {
    /// 从连杆表和驱动掩码构造
    ///
    /// 掩码长度必须等于连杆数，驱动连杆数必须等于 [`crate::JOINT_COUNT`]，
    /// 否则 panic。构造期校验让正解对任何已构造的链都无越界路径。
    pub fn new(links: Vec<DhLink>, actuated: Vec<bool>) -> Self {
        assert_eq!(links.len(), actuated.len(), "mask length must match link count");
        let actuated_count = actuated.iter().filter(|&&m| m).count();
        assert_eq!(
            actuated_count,
            crate::JOINT_COUNT,
            "chain must have exactly {} actuated links",
            crate::JOINT_COUNT
        );
        Self { links, actuated }
    }

    /// 桌面 6 关节臂的固定尺寸链
    ///
    /// 物理尺寸：基座抬升 35mm，大臂 105mm，小臂 105mm，腕-工具 35mm。
    /// 首尾为固定连杆（基座、工具），中间 6 个为驱动关节。
    pub fn hobby_arm() -> Self {
        const L_BS: f64 = 0.035; // 基座抬升
        const L_AM: f64 = 0.105; // 大臂
        const L_FA: f64 = 0.105; // 小臂
        const L_WT: f64 = 0.035; // 腕到工具端

        let links = vec![
            // 固定基座连杆
            DhLink { theta_offset: 0.0, d: L_BS, a: 0.0, alpha: 0.0 },
            // J1 基座回转
            DhLink { theta_offset: 0.0, d: 0.0, a: 0.0, alpha: -FRAC_PI_2 },
            // J2 肩部俯仰
            DhLink { theta_offset: -FRAC_PI_2, d: 0.0, a: L_AM, alpha: 0.0 },
            // J3 肘部俯仰
            DhLink { theta_offset: 0.0, d: 0.0, a: 0.0, alpha: FRAC_PI_2 },
            // J4 腕回转
            DhLink { theta_offset: 0.0, d: L_FA, a: 0.0, alpha: -FRAC_PI_2 },
            // J5 腕俯仰
            DhLink { theta_offset: 0.0, d: 0.0, a: 0.0, alpha: FRAC_PI_2 },
            // J6 末端回转
            DhLink { theta_offset: 0.0, d: 0.0, a: 0.0, alpha: 0.0 },
            // 固定工具连杆
            DhLink { theta_offset: 0.0, d: L_WT, a: 0.0, alpha: 0.0 },
        ];
        let actuated = vec![false, true, true, true, true, true, true, false];
        Self::new(links, actuated)
    }

    /// 连杆数（含固定连杆）
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// 驱动关节数
    pub fn actuated_count(&self) -> usize {
        self.actuated.iter().filter(|&&m| m).count()
    }

    /// 最大展开半径（各连杆 |d| + |a| 之和），用于可达性粗判
    pub fn max_reach(&self) -> f64 {
        self.links.iter().map(|l| l.d.abs() + l.a.abs()).sum()
    }

    /// 正向运动学：关节角 -> 各连杆位置 + 末端位姿
    ///
    /// 确定性纯函数；任何有限输入产生有限输出，无失败模式。
    pub fn forward_kinematics(&self, angles: &JointAngles) -> FkResult {
        let mut frame = Isometry3::identity();
        let mut joint_positions = Vec::with_capacity(self.links.len() + 1);
        joint_positions.push(Point3::origin());

        let mut joint_index = 0usize;
        for (link, &is_actuated) in self.links.iter().zip(self.actuated.iter()) {
            let angle = if is_actuated {
                let a = angles[joint_index];
                joint_index += 1;
                a
            } else {
                0.0
            };
            frame *= link.transform(angle);
            joint_positions.push(frame * Point3::origin());
        }

        let (roll, pitch, yaw) = frame.rotation.euler_angles();
        let translation = frame.translation.vector;
        let end_effector = Pose {
            position: translation,
            orientation: Some([
                normalize_angle(roll),
                normalize_angle(pitch),
                normalize_angle(yaw),
            ]),
        };

        FkResult {
            joint_positions,
            end_effector,
        }
    }

    /// 校验关节角数量与驱动关节数一致
    pub fn check_joint_count(&self, count: usize) -> Result<(), KinematicsError> {
        let expected = self.actuated_count();
        if count != expected {
            return Err(KinematicsError::JointCountMismatch {
                expected,
                actual: count,
            });
        }
        Ok(())
    }
}
