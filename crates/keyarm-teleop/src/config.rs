//! 遥操作配置
//!
//! TOML 文件加载，缺省字段回退到内置默认值。加载后做一次集中校验，
//! 所有周期/步长/预算都必须是可用的正值，传输目标必须完整。

use keyarm_kinematics::JOINT_COUNT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// 求解后端
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverBackend {
    /// 进程内阻尼最小二乘求解
    InProcess,
    /// 外部求解进程（按次启动，命令行传参，标准输出取回）
    External {
        /// 求解程序路径
        program: String,
        /// 单次求解的硬超时（毫秒）
        #[serde(default = "default_solver_deadline_ms")]
        deadline_ms: u64,
    },
}

impl Default for SolverBackend {
    fn default() -> Self {
        Self::InProcess
    }
}

/// 硬件传输目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    /// TCP 控制器（`A1:{v},...` 方言）
    Tcp { addr: String },
    /// 串口控制器（`mov,arms,...` 方言）
    Serial {
        port: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
    },
}

/// 腕关节门限（度，开区间）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristGuardConfig {
    #[serde(default = "default_guard_joint")]
    pub joint: usize,
    #[serde(default = "default_guard_min")]
    pub min_deg: f64,
    #[serde(default = "default_guard_max")]
    pub max_deg: f64,
}

impl Default for WristGuardConfig {
    fn default() -> Self {
        Self {
            joint: default_guard_joint(),
            min_deg: default_guard_min(),
            max_deg: default_guard_max(),
        }
    }
}

/// 遥操作配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    /// 控制环周期（毫秒）
    pub control_period_ms: u64,
    /// 遥测环周期（毫秒）
    pub telemetry_period_ms: u64,
    /// 每个方向键一拍的步长（米）
    pub input_step_m: f64,
    /// 自动后退步长（米）
    pub retreat_step_m: f64,
    /// 后退重试预算
    pub retreat_budget: u32,
    /// 求解器单次迭代预算
    pub solver_iterations: u32,
    /// 初始（home）末端位置（米）
    pub home_position_m: [f64; 3],
    /// 腕关节门限
    pub wrist_guard: WristGuardConfig,
    /// 求解后端
    pub solver: SolverBackend,
    /// 硬件传输目标
    pub transport: TransportConfig,
}

fn default_solver_deadline_ms() -> u64 {
    500
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_guard_joint() -> usize {
    4
}

fn default_guard_min() -> f64 {
    45.0
}

fn default_guard_max() -> f64 {
    135.0
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            control_period_ms: 50,
            telemetry_period_ms: 200,
            input_step_m: 0.01,
            retreat_step_m: 0.01,
            retreat_budget: 50,
            solver_iterations: 200,
            home_position_m: [0.15, 0.0, 0.2],
            wrist_guard: WristGuardConfig::default(),
            solver: SolverBackend::default(),
            transport: TransportConfig::Tcp {
                addr: "192.168.4.1:8080".to_string(),
            },
        }
    }
}

impl TeleopConfig {
    /// 从 TOML 文件加载并校验
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 集中校验
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                });
            }
            Ok(())
        }

        if self.control_period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "control_period_ms",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.telemetry_period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "telemetry_period_ms",
                reason: "must be non-zero".to_string(),
            });
        }
        positive("input_step_m", self.input_step_m)?;
        positive("retreat_step_m", self.retreat_step_m)?;
        if self.retreat_budget == 0 {
            return Err(ConfigError::Invalid {
                field: "retreat_budget",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::Invalid {
                field: "solver_iterations",
                reason: "must be non-zero".to_string(),
            });
        }
        for value in self.home_position_m {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "home_position_m",
                    reason: format!("components must be finite, got {value}"),
                });
            }
        }
        if self.wrist_guard.joint >= JOINT_COUNT {
            return Err(ConfigError::Invalid {
                field: "wrist_guard.joint",
                reason: format!(
                    "joint index {} out of range (< {JOINT_COUNT})",
                    self.wrist_guard.joint
                ),
            });
        }
        if self.wrist_guard.min_deg >= self.wrist_guard.max_deg {
            return Err(ConfigError::Invalid {
                field: "wrist_guard",
                reason: format!(
                    "open band requires min < max, got [{}, {}]",
                    self.wrist_guard.min_deg, self.wrist_guard.max_deg
                ),
            });
        }
        match &self.transport {
            TransportConfig::Tcp { addr } if addr.is_empty() => {
                return Err(ConfigError::Invalid {
                    field: "transport.addr",
                    reason: "must not be empty".to_string(),
                });
            }
            TransportConfig::Serial { port, .. } if port.is_empty() => {
                return Err(ConfigError::Invalid {
                    field: "transport.port",
                    reason: "must not be empty".to_string(),
                });
            }
            _ => {}
        }
        if let SolverBackend::External { program, .. } = &self.solver {
            if program.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "solver.program",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }

    pub fn telemetry_period(&self) -> Duration {
        Duration::from_millis(self.telemetry_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults_validate() {
        TeleopConfig::default().validate().unwrap();
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
control_period_ms = 20
input_step_m = 0.005

[transport]
kind = "serial"
port = "/dev/ttyUSB0"
"#
        )
        .unwrap();

        let config = TeleopConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.control_period_ms, 20);
        assert!((config.input_step_m - 0.005).abs() < 1e-12);
        // 未给出的字段回退默认值
        assert_eq!(config.telemetry_period_ms, 200);
        assert_eq!(config.retreat_budget, 50);
        assert_eq!(
            config.transport,
            TransportConfig::Serial {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: 115_200,
            }
        );
    }

    #[test]
    fn test_external_solver_backend() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[solver]
kind = "external"
program = "/usr/local/bin/arm-ik"
"#
        )
        .unwrap();

        let config = TeleopConfig::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.solver,
            SolverBackend::External {
                program: "/usr/local/bin/arm-ik".to_string(),
                deadline_ms: 500,
            }
        );
    }

    #[test]
    fn test_rejects_zero_period() {
        let config = TeleopConfig {
            control_period_ms: 0,
            ..TeleopConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "control_period_ms",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_inverted_guard_band() {
        let config = TeleopConfig {
            wrist_guard: WristGuardConfig {
                joint: 4,
                min_deg: 135.0,
                max_deg: 45.0,
            },
            ..TeleopConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "control_period_ms = \"fast\"").unwrap();
        assert!(matches!(
            TeleopConfig::load_from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
