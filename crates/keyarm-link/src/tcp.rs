//! TCP 传输：面向已连接的流套接字，发完即走
//!
//! 写失败（连接复位等）原样上抛，由控制环回滚；本层不重连。

use crate::command::{format_tcp_command, ServoCommand};
use crate::{CommandSink, LinkError};
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{info, warn};

/// TCP 命令通道
pub struct TcpLink<W: Write + Send = TcpStream> {
    stream: W,
}

impl TcpLink<TcpStream> {
    /// 连接控制器；启动期传输建立失败是整个系统唯一的致命错误
    pub fn connect(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self, LinkError> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| LinkError::Transport(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no address resolved",
            )))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        info!(%addr, "connected to arm controller over TCP");
        Ok(Self { stream })
    }
}

impl<W: Write + Send> TcpLink<W> {
    /// 在任意写入端上构造（测试注入用）
    pub fn from_writer(stream: W) -> Self {
        Self { stream }
    }
}

impl<W: Write + Send> CommandSink for TcpLink<W> {
    fn send(&mut self, command: &ServoCommand) -> Result<(), LinkError> {
        let Some(line) = format_tcp_command(command) else {
            // TCP 方言没有复位命令
            warn!("home command has no TCP wire form, ignored");
            return Ok(());
        };
        self.stream.write_all(line.as_bytes())?;
        self.stream.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// 记录写入内容的假流
    #[derive(Default)]
    struct RecordingStream {
        written: Vec<u8>,
        fail: bool,
    }

    impl Write for RecordingStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_writes_single_line() {
        let mut link = TcpLink::from_writer(RecordingStream::default());
        link.send(&ServoCommand::Move([90, 90, 90, 90, 90])).unwrap();
        let written = String::from_utf8(link.stream.written.clone()).unwrap();
        assert_eq!(written, "A1:90,A2:90,A3:90,A4:90,A5:90\n");
    }

    #[test]
    fn test_write_failure_surfaces_as_transport_error() {
        let mut link = TcpLink::from_writer(RecordingStream {
            fail: true,
            ..Default::default()
        });
        let result = link.send(&ServoCommand::Move([90; 5]));
        assert!(matches!(result, Err(LinkError::Transport(_))));
    }

    #[test]
    fn test_home_is_silently_skipped() {
        let mut link = TcpLink::from_writer(RecordingStream::default());
        link.send(&ServoCommand::Home).unwrap();
        assert!(link.stream.written.is_empty());
    }
}
