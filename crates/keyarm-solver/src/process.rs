//! 外部求解器进程适配器
//!
//! 调用约定（与外部求解器的 stdout 协议）：
//!
//! - 位置参数：目标位置 3 个 + 目标姿态 3 个（无约束时传 0）+ 当前关节角 6 个（度）
//! - 成功：stdout 一行，以字面量 `angles:` 开头，后跟 6 个空白分隔的度数值
//! - 其他任何输出、非零退出码、超过截止时间，一律按不可达处理
//!
//! 截止时间通过 crossbeam 通道的 `recv_timeout` 实现：读取线程阻塞在子进程
//! stdout 上，主线程超时后 kill 子进程，使读取线程随管道关闭而退出。

use crate::{PoseSolver, SolveError, WristGuard};
use keyarm_kinematics::{JointAngles, Pose, JOINT_COUNT};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// stdout 成功行的前缀标记
const ANGLES_TOKEN: &str = "angles:";

/// 外部进程求解器
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    /// 求解器可执行文件路径
    program: PathBuf,
    /// 单次调用的执行截止时间
    deadline: Duration,
    guard: WristGuard,
}

impl ProcessSolver {
    /// 默认截止时间 500ms
    pub fn new(program: impl Into<PathBuf>, guard: WristGuard) -> Self {
        Self {
            program: program.into(),
            deadline: Duration::from_millis(500),
            guard,
        }
    }

    /// 自定义执行截止时间
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    fn build_args(target: &Pose, seed: &JointAngles) -> Vec<String> {
        let mut args = Vec::with_capacity(3 + 3 + JOINT_COUNT);
        for v in target.position.iter() {
            args.push(format!("{v}"));
        }
        let rpy = target.orientation.unwrap_or([0.0, 0.0, 0.0]);
        for v in rpy {
            args.push(format!("{v}"));
        }
        for v in seed.to_degrees() {
            args.push(format!("{v}"));
        }
        args
    }

    /// 在剩余截止时间内等待子进程退出；超时返回 None
    fn wait_with_deadline(child: &mut Child, until: Instant) -> Option<std::process::ExitStatus> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Some(status),
                Ok(None) => {
                    if Instant::now() >= until {
                        return None;
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(_) => return None,
            }
        }
    }

    fn kill_quietly(child: &mut Child) {
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// 解析 `angles: v1 v2 ... v6` 行（度），格式不符返回 None
pub fn parse_angles_line(line: &str) -> Option<JointAngles> {
    let rest = line.trim().strip_prefix(ANGLES_TOKEN)?;
    let mut values = [0.0f64; JOINT_COUNT];
    let mut count = 0;
    for token in rest.split_whitespace() {
        if count >= JOINT_COUNT {
            return None; // 多余的值同样视为协议违例
        }
        values[count] = token.parse().ok()?;
        count += 1;
    }
    if count != JOINT_COUNT {
        return None;
    }
    Some(JointAngles::from_degrees(values))
}

impl PoseSolver for ProcessSolver {
    fn solve(
        &mut self,
        target: &Pose,
        seed: &JointAngles,
        _max_iterations: u32,
    ) -> Result<JointAngles, SolveError> {
        let started = Instant::now();
        let until = started + self.deadline;

        let mut child = Command::new(&self.program)
            .args(Self::build_args(target, seed))
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| SolveError::Faulted(format!("failed to spawn solver: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SolveError::Faulted("solver stdout not captured".into()))?;

        // 读取线程只取第一行；超时 kill 后管道关闭，线程自行结束
        let (tx, rx) = crossbeam_channel::bounded::<String>(1);
        std::thread::spawn(move || {
            let mut line = String::new();
            let mut reader = BufReader::new(stdout);
            let _ = reader.read_line(&mut line);
            let _ = tx.send(line);
        });

        let line = match rx.recv_timeout(self.deadline) {
            Ok(line) => line,
            Err(_) => {
                warn!(deadline_ms = self.deadline.as_millis() as u64, "solver deadline exceeded, killing child");
                Self::kill_quietly(&mut child);
                return Err(SolveError::Timeout);
            }
        };

        let status = match Self::wait_with_deadline(&mut child, until) {
            Some(status) => status,
            None => {
                warn!("solver printed output but did not exit before deadline");
                Self::kill_quietly(&mut child);
                return Err(SolveError::Timeout);
            }
        };

        if !status.success() {
            debug!(code = ?status.code(), "solver exited with failure status");
            return Err(SolveError::Unreachable);
        }

        let angles = parse_angles_line(&line).ok_or(SolveError::Unreachable)?;
        self.guard.check(&angles)?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "external solve succeeded");
        Ok(angles)
    }
}
