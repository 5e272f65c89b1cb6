//! 链路层错误类型定义

use thiserror::Error;

/// 硬件链路错误
#[derive(Error, Debug)]
pub enum LinkError {
    /// 传输层写入/连接失败（连接复位、写失败等）
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// 串口打开失败
    #[error("Serial port error: {0}")]
    Serial(String),
}

#[cfg(test)]
mod tests {
    use super::LinkError;
    use std::io;

    #[test]
    fn test_transport_error_from_io() {
        let err: LinkError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        let msg = format!("{}", err);
        assert!(msg.contains("Transport error"));
        assert!(msg.contains("reset"));
    }

    #[test]
    fn test_serial_error_display() {
        let err = LinkError::Serial("no such device".into());
        assert!(format!("{}", err).contains("no such device"));
    }
}
