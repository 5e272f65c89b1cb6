//! keyarm-kinematics - 6 关节串联机械臂的运动学模型
//!
//! 提供 Denavit-Hartenberg 参数表示的运动学链和正向运动学求解。
//!
//! # 分层说明
//!
//! 本 crate 是整个 SDK 的最底层：纯函数、无 IO、无共享状态。
//! 逆解（IK）适配器在 `keyarm-solver` 中实现，依赖这里的正解。
//!
//! # 快速开始
//!
//! ```rust
//! use keyarm_kinematics::{KinematicChain, JointAngles};
//!
//! let chain = KinematicChain::hobby_arm();
//! let fk = chain.forward_kinematics(&JointAngles::neutral());
//! assert!(fk.end_effector.position.norm() > 0.0);
//! ```

pub mod angles;
pub mod chain;
pub mod error;
pub mod pose;

pub use angles::JointAngles;
pub use chain::{DhLink, FkResult, KinematicChain};
pub use error::KinematicsError;
pub use pose::Pose;

/// 关节数量（固定 6 关节串联臂）
pub const JOINT_COUNT: usize = 6;
