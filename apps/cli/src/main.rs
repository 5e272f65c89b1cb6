//! # keyarm CLI
//!
//! 键盘遥操作入口：
//!
//! ```bash
//! # 用默认配置连 TCP 控制器并进入遥操作
//! keyarm-cli teleop
//!
//! # 指定配置文件
//! keyarm-cli teleop --config keyarm.toml
//!
//! # 让机械臂回到控制器内置初始姿态后退出
//! keyarm-cli home --config keyarm.toml
//! ```
//!
//! 键位：D/A = x±，W/S = y±，Q/E = z±，Esc 退出。
//! 按住连续移动，松开即停（无按键事件协议的终端下按 150ms 超时判定松开）。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keyarm_sdk::prelude::*;
use std::path::PathBuf;
use tracing::info;

mod backend;
mod keyboard;
mod view;

use backend::{SolverImpl, Transport};
use view::TerminalView;

/// keyarm CLI - 键盘遥操作机械臂
#[derive(Parser, Debug)]
#[command(name = "keyarm-cli")]
#[command(about = "Keyboard teleoperation for hobby robot arms", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 进入键盘遥操作
    Teleop {
        /// 配置文件路径（TOML；省略时用内置默认值）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 覆盖配置：TCP 控制器地址（host:port）
        #[arg(long, conflicts_with = "serial")]
        tcp: Option<String>,

        /// 覆盖配置：串口设备路径
        #[arg(long)]
        serial: Option<String>,

        /// 覆盖配置：使用外部求解器程序
        #[arg(long)]
        solver_program: Option<PathBuf>,

        /// 不连接硬件，命令只写日志
        #[arg(long)]
        dry_run: bool,
    },

    /// 发送复位命令后退出
    Home {
        /// 配置文件路径
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<TeleopConfig> {
    match path {
        Some(path) => TeleopConfig::load_from_file(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(TeleopConfig::default()),
    }
}

fn main() -> Result<()> {
    keyarm_sdk::init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Teleop {
            config,
            tcp,
            serial,
            solver_program,
            dry_run,
        } => {
            let mut config = load_config(config)?;
            if let Some(addr) = tcp {
                config.transport = TransportConfig::Tcp { addr };
            }
            if let Some(port) = serial {
                config.transport = TransportConfig::Serial {
                    port,
                    baud_rate: 115_200,
                };
            }
            if let Some(program) = solver_program {
                config.solver = SolverBackend::External {
                    program: program.display().to_string(),
                    deadline_ms: 500,
                };
            }
            config.validate().context("validating effective config")?;
            run_teleop(config, dry_run)
        }
        Commands::Home { config } => run_home(load_config(config)?),
    }
}

fn run_home(config: TeleopConfig) -> Result<()> {
    // TCP 方言没有复位命令，提前拒绝而不是假装已发送
    if matches!(config.transport, TransportConfig::Tcp { .. }) {
        anyhow::bail!("home is not supported by the TCP controller dialect, use a serial transport");
    }
    let mut sink = Transport::open(&config.transport)?;
    sink.send(&ServoCommand::Home)?;
    info!("home command sent");
    Ok(())
}

fn run_teleop(config: TeleopConfig, dry_run: bool) -> Result<()> {
    let chain = KinematicChain::hobby_arm();
    let guard = WristGuard {
        joint: config.wrist_guard.joint,
        min_deg: config.wrist_guard.min_deg,
        max_deg: config.wrist_guard.max_deg,
    };
    let mut solver = SolverImpl::from_config(&config.solver, chain.clone(), guard);

    // 传输建立失败是唯一的致命启动错误
    let sink = if dry_run {
        Transport::DryRun
    } else {
        Transport::open(&config.transport)?
    };

    let [x, y, z] = config.home_position_m;
    let home_pose = Pose::from_position(x, y, z)?;
    // 初始位形：先解一次 home 位姿；解不出就从中立位形起步
    let home_angles = match solver.solve(&home_pose, &JointAngles::neutral(), config.solver_iterations) {
        Ok(angles) => angles,
        Err(e) => {
            tracing::warn!(%e, "home pose not solvable at startup, starting from neutral");
            JointAngles::neutral()
        }
    };
    let shared = TeleopShared::new(home_pose, home_angles);

    let ctrlc_shared = shared.clone();
    ctrlc::set_handler(move || ctrlc_shared.stop())
        .context("installing Ctrl-C handler")?;

    let input_shared = shared.clone();
    let input_handle = std::thread::spawn(move || keyboard::run_input_loop(input_shared));

    let telemetry_shared = shared.clone();
    let telemetry_period = config.telemetry_period();
    let telemetry_handle = std::thread::spawn(move || {
        run_telemetry_loop(telemetry_shared, TerminalView::new(), telemetry_period)
    });

    let search = ReachabilitySearch {
        retreat_step: config.retreat_step_m,
        budget: config.retreat_budget,
        solver_iterations: config.solver_iterations,
    };
    let mut control = ControlLoop::new(
        shared.clone(),
        search,
        solver,
        sink,
        config.input_step_m,
        config.control_period(),
    );

    info!("teleoperation started, Esc or Ctrl-C to quit");
    control.run();

    // 有序停机：先等各环退出，传输层随 ControlLoop 一起在其后释放
    let _ = telemetry_handle.join();
    match input_handle.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("input thread panicked"),
    }
    info!("teleoperation stopped");
    Ok(())
}
