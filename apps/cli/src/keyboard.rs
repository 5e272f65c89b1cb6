//! 键盘输入线程
//!
//! 终端进 raw 模式逐事件读取。多数终端只上报按下/重复，没有松开
//! 事件，所以每个键记录最近一次事件时间，超过保持超时即视为松开。
//! 支持按键事件协议（kitty 等）的终端会直接收到 Release，走同一条
//! 移除路径。

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use keyarm_sdk::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// 无松开事件的终端下判定松开的保持超时
const HOLD_TIMEOUT: Duration = Duration::from_millis(150);

/// 事件轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn map_key(code: KeyCode) -> Option<MotionKey> {
    match code {
        KeyCode::Char('d') | KeyCode::Char('D') => Some(MotionKey::XPos),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(MotionKey::XNeg),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(MotionKey::YPos),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(MotionKey::YNeg),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(MotionKey::ZPos),
        KeyCode::Char('e') | KeyCode::Char('E') => Some(MotionKey::ZNeg),
        _ => None,
    }
}

/// 输入线程主体：退出时恢复终端模式
///
/// 无论正常退出还是出错，离开前都清 running，让其余环跟着收尾。
pub fn run_input_loop(shared: Arc<TeleopShared>) -> Result<()> {
    let result = match terminal::enable_raw_mode().context("enabling raw terminal mode") {
        Ok(()) => {
            let result = poll_events(&shared);
            let _ = terminal::disable_raw_mode();
            result
        }
        Err(e) => Err(e),
    };
    shared.stop();
    result
}

fn poll_events(shared: &TeleopShared) -> Result<()> {
    let mut held: HashMap<MotionKey, Instant> = HashMap::new();

    while shared.is_running() {
        if event::poll(POLL_INTERVAL).context("polling terminal events")? {
            if let Event::Key(key) = event::read().context("reading terminal event")? {
                let quit = key.code == KeyCode::Esc
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL));
                if quit {
                    debug!("quit key received");
                    shared.stop();
                    break;
                }
                if let Some(motion) = map_key(key.code) {
                    match key.kind {
                        KeyEventKind::Press | KeyEventKind::Repeat => {
                            held.insert(motion, Instant::now());
                        }
                        KeyEventKind::Release => {
                            held.remove(&motion);
                        }
                    }
                }
            }
        }

        // 超过保持超时没有重复事件的键按松开处理
        let now = Instant::now();
        held.retain(|_, last_seen| now.duration_since(*last_seen) < HOLD_TIMEOUT);

        let mut keys = KeySet::empty();
        for key in held.keys() {
            keys.insert(*key);
        }
        shared.store_keys(keys);
    }

    Ok(())
}
