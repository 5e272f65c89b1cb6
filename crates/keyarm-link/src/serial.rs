//! 串口传输：ESP32 控制器方言
//!
//! 应答行是机会性的：控制器可能回一行状态，读到就记日志，
//! 读不到不算错误，正确性不依赖应答。

use crate::command::{format_serial_command, ServoCommand};
use crate::{CommandSink, LinkError};
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// 应答读取的短超时
const ACK_TIMEOUT: Duration = Duration::from_millis(20);

/// 串口命令通道
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// 打开串口；启动期失败是致命错误，直接上抛给调用方
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud_rate)
            .timeout(ACK_TIMEOUT)
            .open()
            .map_err(|e| LinkError::Serial(e.to_string()))?;
        info!(path, baud_rate, "opened serial link to arm controller");
        Ok(Self { port })
    }

    /// 机会性读取一行应答；任何读取失败都按"没有应答"处理
    fn try_read_ack(&mut self) -> Option<String> {
        let pending = self.port.bytes_to_read().ok()?;
        if pending == 0 {
            return None;
        }
        let mut buf = [0u8; 128];
        let n = self.port.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        Some(String::from_utf8_lossy(&buf[..n]).trim().to_string())
    }
}

impl CommandSink for SerialLink {
    fn send(&mut self, command: &ServoCommand) -> Result<(), LinkError> {
        let line = format_serial_command(command);
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        if let Some(ack) = self.try_read_ack() {
            debug!(%ack, "controller response");
        }
        Ok(())
    }
}
