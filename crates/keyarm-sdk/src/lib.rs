//! keyarm-sdk - 键盘遥操作机械臂统一入口
//!
//! 把各子 crate 的公开面聚合成一个依赖项：
//!
//! - [`kinematics`]：DH 链、正运动学、关节角与位姿类型
//! - [`solver`]：位姿求解适配（进程内 DLS / 外部求解进程）与自动后退搜索
//! - [`link`]：线级命令与 TCP / 串口通道
//! - [`teleop`]：共享状态、输入采样、控制环与遥测环、配置
//!
//! 快速上手用 [`prelude`]：
//!
//! ```no_run
//! use keyarm_sdk::prelude::*;
//!
//! let chain = KinematicChain::hobby_arm();
//! let fk = chain.forward_kinematics(&JointAngles::neutral());
//! println!("neutral end effector at {}", fk.end_effector);
//! ```

pub use keyarm_kinematics as kinematics;
pub use keyarm_link as link;
pub use keyarm_solver as solver;
pub use keyarm_teleop as teleop;

/// 常用类型一站式导入
pub mod prelude {
    pub use keyarm_kinematics::{
        DhLink, FkResult, JointAngles, KinematicChain, KinematicsError, Pose, JOINT_COUNT,
    };
    pub use keyarm_link::{
        format_serial_command, format_tcp_command, CommandSink, LinkError, SerialLink,
        ServoCommand, TcpLink, SERVO_COUNT,
    };
    pub use keyarm_solver::{
        DlsSolver, PoseSolver, ProcessSolver, ReachabilitySearch, ReachedPose, SearchError,
        SolveError, WristGuard,
    };
    pub use keyarm_teleop::{
        run_telemetry_loop, sample_delta, ConfigError, ControlLoop, FailureKind, KeySet,
        LoopState, MotionKey, SolverBackend, TelemetrySink, TeleopConfig, TeleopShared,
        TickOutcome, TransportConfig,
    };
}

/// 初始化日志订阅器
///
/// 过滤级别来自 `RUST_LOG`，未设置时回退到 `info`。重复调用安全，
/// 第二次起为空操作。
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
