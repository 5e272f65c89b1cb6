//! 终端可视化
//!
//! 遥测环的输出端：由当前位形做一次正解，把连杆骨架投到两个平面
//! （正视 x-z、俯视 x-y）画成字符画，外加期望位姿和关节角读数。
//! 渲染失败只记日志，绝不影响控制。

use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};
use keyarm_sdk::prelude::*;
use std::io::Write;
use tracing::debug;

const GRID_WIDTH: usize = 41;
const GRID_HEIGHT: usize = 15;
/// 水平显示范围（米，对称）
const SPAN_XY: f64 = 0.30;
/// 垂直显示范围（米，从基座向上）
const SPAN_Z: f64 = 0.32;
/// 连杆段的插值采样数
const SEGMENT_SAMPLES: usize = 24;

struct Grid {
    cells: [[char; GRID_WIDTH]; GRID_HEIGHT],
}

impl Grid {
    fn new() -> Self {
        Self {
            cells: [[' '; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    fn plot(&mut self, col: f64, row: f64, glyph: char) {
        if !col.is_finite() || !row.is_finite() {
            return;
        }
        let col = col.round();
        let row = row.round();
        if col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col < GRID_WIDTH && row < GRID_HEIGHT {
            // 关节标记优先于连杆线条
            if glyph == '.' && self.cells[row][col] != ' ' {
                return;
            }
            self.cells[row][col] = glyph;
        }
    }

    fn line(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.iter().map(|row| row.iter().collect())
    }
}

/// 水平坐标 -> 列
fn to_col(value: f64) -> f64 {
    (value + SPAN_XY) / (2.0 * SPAN_XY) * (GRID_WIDTH - 1) as f64
}

/// 高度 -> 行（屏幕向下增长）
fn to_row_z(value: f64) -> f64 {
    (1.0 - value / SPAN_Z) * (GRID_HEIGHT - 1) as f64
}

/// 俯视 y -> 行
fn to_row_y(value: f64) -> f64 {
    (1.0 - (value + SPAN_XY) / (2.0 * SPAN_XY)) * (GRID_HEIGHT - 1) as f64
}

/// 终端骨架视图
pub struct TerminalView {
    chain: KinematicChain,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            chain: KinematicChain::hobby_arm(),
        }
    }

    fn draw(&self, desired: &Pose, angles: &JointAngles) -> std::io::Result<()> {
        let fk = self.chain.forward_kinematics(angles);
        let points = &fk.joint_positions;

        let mut front = Grid::new();
        let mut top = Grid::new();
        for pair in points.windows(2) {
            for i in 0..=SEGMENT_SAMPLES {
                let t = i as f64 / SEGMENT_SAMPLES as f64;
                let p = pair[0].coords.lerp(&pair[1].coords, t);
                front.plot(to_col(p.x), to_row_z(p.z), '.');
                top.plot(to_col(p.x), to_row_y(p.y), '.');
            }
        }
        for p in points {
            front.plot(to_col(p.x), to_row_z(p.z), 'o');
            top.plot(to_col(p.x), to_row_y(p.y), 'o');
        }
        if let Some(end) = points.last() {
            front.plot(to_col(end.x), to_row_z(end.z), 'E');
            top.plot(to_col(end.x), to_row_y(end.y), 'E');
        }

        let deg = angles.to_degrees();
        let mut out = std::io::stdout();
        queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
        queue!(out, Print(format!("desired {desired}\r\n")))?;
        queue!(
            out,
            Print(format!(
                "joints  [{:6.1} {:6.1} {:6.1} {:6.1} {:6.1} {:6.1}] deg\r\n\r\n",
                deg[0], deg[1], deg[2], deg[3], deg[4], deg[5]
            ))
        )?;
        queue!(out, Print("front (x-z)                               top (x-y)\r\n"))?;
        for (left, right) in front.line().zip(top.line()) {
            queue!(out, Print(format!("{left}  {right}\r\n")))?;
        }
        queue!(
            out,
            Print("\r\nD/A: x±  W/S: y±  Q/E: z±  Esc: quit\r\n")
        )?;
        out.flush()
    }
}

impl TelemetrySink for TerminalView {
    fn render(&mut self, desired: &Pose, angles: &JointAngles) {
        if let Err(e) = self.draw(desired, angles) {
            debug!(%e, "telemetry render failed");
        }
    }
}
