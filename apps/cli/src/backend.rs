//! 配置到具体实现的落地
//!
//! 求解后端与传输目标都在配置里二选一，这里用枚举做静态分发，
//! 控制环保持对具体实现无感。

use anyhow::{Context, Result};
use keyarm_sdk::prelude::*;
use std::time::Duration;

/// 连接控制器的超时
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// 求解后端
pub enum SolverImpl {
    Dls(DlsSolver),
    Process(ProcessSolver),
}

impl SolverImpl {
    pub fn from_config(backend: &SolverBackend, chain: KinematicChain, guard: WristGuard) -> Self {
        match backend {
            SolverBackend::InProcess => Self::Dls(DlsSolver::new(chain, guard)),
            SolverBackend::External {
                program,
                deadline_ms,
            } => Self::Process(
                ProcessSolver::new(program, guard)
                    .with_deadline(Duration::from_millis(*deadline_ms)),
            ),
        }
    }
}

impl PoseSolver for SolverImpl {
    fn solve(
        &mut self,
        target: &Pose,
        seed: &JointAngles,
        max_iterations: u32,
    ) -> std::result::Result<JointAngles, SolveError> {
        match self {
            Self::Dls(solver) => solver.solve(target, seed, max_iterations),
            Self::Process(solver) => solver.solve(target, seed, max_iterations),
        }
    }
}

/// 硬件传输
pub enum Transport {
    Tcp(TcpLink),
    Serial(SerialLink),
    /// 干跑：命令只进日志，不碰硬件
    DryRun,
}

impl Transport {
    pub fn open(config: &TransportConfig) -> Result<Self> {
        match config {
            TransportConfig::Tcp { addr } => {
                let link = TcpLink::connect(addr.as_str(), CONNECT_TIMEOUT)
                    .with_context(|| format!("connecting to arm controller at {addr}"))?;
                Ok(Self::Tcp(link))
            }
            TransportConfig::Serial { port, baud_rate } => {
                let link = SerialLink::open(port, *baud_rate)
                    .with_context(|| format!("opening serial port {port}"))?;
                Ok(Self::Serial(link))
            }
        }
    }
}

impl CommandSink for Transport {
    fn send(&mut self, command: &ServoCommand) -> std::result::Result<(), LinkError> {
        match self {
            Self::Tcp(link) => link.send(command),
            Self::Serial(link) => link.send(command),
            Self::DryRun => {
                tracing::info!(wire = %format_serial_command(command).trim_end(), "dry run");
                Ok(())
            }
        }
    }
}
