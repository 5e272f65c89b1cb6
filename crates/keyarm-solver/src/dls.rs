//! 进程内数值 IK：阻尼最小二乘（DLS）迭代
//!
//! 有限差分雅可比 + 阻尼伪逆，位姿无姿态约束时只解位置三行。
//! 种子来自当前位形，解沿当前解支连续演化。

use crate::{PoseSolver, SolveError, WristGuard};
use keyarm_kinematics::angles::normalize_angle;
use keyarm_kinematics::{JointAngles, KinematicChain, Pose, JOINT_COUNT};
use nalgebra::{DMatrix, DVector, UnitQuaternion, Vector3};

/// 阻尼最小二乘求解器
#[derive(Debug, Clone)]
pub struct DlsSolver {
    chain: KinematicChain,
    guard: WristGuard,
    /// 位置收敛容差（米）
    position_tolerance: f64,
    /// 姿态收敛容差（弧度）
    orientation_tolerance: f64,
    /// 阻尼系数 lambda
    damping: f64,
    /// 有限差分扰动量
    epsilon: f64,
}

impl DlsSolver {
    /// 用默认数值参数构造
    pub fn new(chain: KinematicChain, guard: WristGuard) -> Self {
        Self {
            chain,
            guard,
            position_tolerance: 1e-4,
            orientation_tolerance: 1e-3,
            damping: 0.05,
            epsilon: 1e-6,
        }
    }

    /// 目标相对当前正解的误差向量（位置 3 行，带姿态约束时再加 3 行）
    fn error_vector(
        target: &Pose,
        current_position: &Vector3<f64>,
        current_rotation: &UnitQuaternion<f64>,
    ) -> DVector<f64> {
        let e_pos = target.position - current_position;
        match target.orientation {
            None => DVector::from_column_slice(e_pos.as_slice()),
            Some(rpy) => {
                let target_rot = UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]);
                let e_rot = (target_rot * current_rotation.inverse()).scaled_axis();
                DVector::from_column_slice(&[
                    e_pos.x, e_pos.y, e_pos.z, e_rot.x, e_rot.y, e_rot.z,
                ])
            }
        }
    }

    /// 当前位形的末端位置与姿态
    fn fk_frame(&self, q: &[f64; JOINT_COUNT]) -> (Vector3<f64>, UnitQuaternion<f64>) {
        let fk = self
            .chain
            .forward_kinematics(&JointAngles::from_radians(*q));
        let rpy = fk
            .end_effector
            .orientation
            .unwrap_or([0.0, 0.0, 0.0]);
        (
            fk.end_effector.position,
            UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]),
        )
    }

    /// 有限差分雅可比（行数随误差向量维度取 3 或 6）
    fn jacobian(
        &self,
        q: &[f64; JOINT_COUNT],
        base_position: &Vector3<f64>,
        base_rotation: &UnitQuaternion<f64>,
        rows: usize,
    ) -> DMatrix<f64> {
        let mut jacobian = DMatrix::zeros(rows, JOINT_COUNT);
        for joint in 0..JOINT_COUNT {
            let mut perturbed = *q;
            perturbed[joint] += self.epsilon;
            let (pos, rot) = self.fk_frame(&perturbed);

            let d_pos = (pos - base_position) / self.epsilon;
            jacobian[(0, joint)] = d_pos.x;
            jacobian[(1, joint)] = d_pos.y;
            jacobian[(2, joint)] = d_pos.z;

            if rows == 6 {
                let d_rot = (rot * base_rotation.inverse()).scaled_axis() / self.epsilon;
                jacobian[(3, joint)] = d_rot.x;
                jacobian[(4, joint)] = d_rot.y;
                jacobian[(5, joint)] = d_rot.z;
            }
        }
        jacobian
    }

    fn converged(&self, error: &DVector<f64>) -> bool {
        let pos_norm =
            (error[0] * error[0] + error[1] * error[1] + error[2] * error[2]).sqrt();
        if pos_norm >= self.position_tolerance {
            return false;
        }
        if error.len() == 6 {
            let rot_norm =
                (error[3] * error[3] + error[4] * error[4] + error[5] * error[5]).sqrt();
            if rot_norm >= self.orientation_tolerance {
                return false;
            }
        }
        true
    }
}

impl PoseSolver for DlsSolver {
    fn solve(
        &mut self,
        target: &Pose,
        seed: &JointAngles,
        max_iterations: u32,
    ) -> Result<JointAngles, SolveError> {
        let mut q = *seed.as_radians();
        let rows = if target.orientation.is_some() { 6 } else { 3 };
        let lambda2 = self.damping * self.damping;

        for _ in 0..max_iterations {
            let (position, rotation) = self.fk_frame(&q);
            let error = Self::error_vector(target, &position, &rotation);

            if self.converged(&error) {
                let mut normalized = q;
                for v in normalized.iter_mut() {
                    *v = normalize_angle(*v);
                }
                let solution = JointAngles::from_radians(normalized);
                self.guard.check(&solution)?;
                return Ok(solution);
            }

            let jacobian = self.jacobian(&q, &position, &rotation, rows);
            // dq = J^T (J J^T + lambda^2 I)^-1 e
            let jjt = &jacobian * jacobian.transpose();
            let damped = jjt + DMatrix::identity(rows, rows) * lambda2;
            let inverse = damped.try_inverse().ok_or_else(|| {
                SolveError::Faulted("damped normal matrix is singular".into())
            })?;
            let dq = jacobian.transpose() * inverse * error;

            for (value, delta) in q.iter_mut().zip(dq.iter()) {
                *value += delta;
            }
        }

        Err(SolveError::Unreachable)
    }
}
