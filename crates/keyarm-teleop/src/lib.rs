//! keyarm-teleop - 共享控制状态与遥操作环
//!
//! 三个独立调度的活动并行运行，各自以不同节奏读写一小块共享状态：
//!
//! - **输入捕获**（事件驱动）：写按键集 `keys`，清 `running`
//! - **控制环**（固定周期）：读按键、求解、下发命令，写 `desired_pose` / `current_angles`
//! - **遥测环**（更低优先级的固定周期）：只读快照做可视化，绝不阻塞控制环
//!
//! 共享纪律见 [`state::TeleopShared`]：每个字段恰有一个写者，
//! 读者得到完整值快照，任何锁都不会跨越求解或网络调用持有。

pub mod config;
pub mod control;
pub mod input;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, SolverBackend, TeleopConfig, TransportConfig};
pub use control::{ControlLoop, FailureKind, LoopState, TickOutcome};
pub use input::{sample_delta, KeySet, MotionKey};
pub use state::TeleopShared;
pub use telemetry::{run_telemetry_loop, TelemetrySink};
