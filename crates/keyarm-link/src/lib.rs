//! keyarm-link - 硬件命令通道
//!
//! 把关节角格式化为控制器的文本线协议并写入传输层。两种方言：
//!
//! - TCP：`A1:{v},...,A5:{v}\n`，角度钳位到 [10, 170] 度，发完即走
//! - 串口：`mov,arms,{v1},...,{v5}\n`，钳位到 [0, 180] 度；
//!   复位命令为字面量 `mov,default\n`；应答行机会性读取，不要求
//!
//! 通道无缓冲：发送失败由控制环的回滚路径处理，命令永不排队或合并。

pub mod command;
pub mod error;
pub mod serial;
pub mod tcp;

pub use command::{format_serial_command, format_tcp_command, ServoCommand, SERVO_COUNT};
pub use error::LinkError;
pub use serial::SerialLink;
pub use tcp::TcpLink;

/// 硬件命令接收端
///
/// 实现者负责方言格式化与传输写入。无缓冲：`send` 返回前命令要么
/// 已交给传输层，要么以 [`LinkError`] 失败，调用方据此回滚。
pub trait CommandSink: Send {
    fn send(&mut self, command: &ServoCommand) -> Result<(), LinkError>;
}
