//! 线级命令与方言格式化
//!
//! 命令由控制环（或显式复位请求）创建，立即被通道消费，绝不持久化。
//! 钳位策略：越界值钳到安全行程端点，而不是拒绝——控制器侧舵机没有
//! 软限位，宁可贴边也不能发送会撞机械限位的值。

use keyarm_kinematics::JointAngles;

/// 硬件舵机数量
///
/// 运动学链有 6 个驱动关节，但控制器只暴露 5 路舵机（末端回转
/// 关节求解但不下发），与原控制器协议一致。
pub const SERVO_COUNT: usize = 5;

/// TCP 方言的安全角度行程（度）
pub const TCP_RANGE: (i16, i16) = (10, 170);
/// 串口方言的安全角度行程（度）
pub const SERIAL_RANGE: (i16, i16) = (0, 180);

/// 线级命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    /// 移动到目标角度（整数度，发送前按方言钳位）
    Move([i16; SERVO_COUNT]),
    /// 回到控制器内置的初始姿态
    Home,
}

impl ServoCommand {
    /// 从关节角构造移动命令：取前 5 个驱动关节，弧度转整数度
    pub fn move_to(angles: &JointAngles) -> Self {
        let deg = angles.to_degrees();
        let mut servos = [0i16; SERVO_COUNT];
        for (out, value) in servos.iter_mut().zip(deg.iter()) {
            // 溢出 i16 的值随后会被方言钳位吞掉
            *out = value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        }
        Self::Move(servos)
    }
}

fn clamp_to(range: (i16, i16), value: i16) -> i16 {
    value.clamp(range.0, range.1)
}

/// TCP 方言：`A1:{v},A2:{v},...,A5:{v}\n`，钳位 [10, 170]
///
/// TCP 控制器没有复位命令，`Home` 返回 `None`，由调用方决定如何处理。
pub fn format_tcp_command(command: &ServoCommand) -> Option<String> {
    match command {
        ServoCommand::Move(servos) => {
            let body = servos
                .iter()
                .enumerate()
                .map(|(i, v)| format!("A{}:{}", i + 1, clamp_to(TCP_RANGE, *v)))
                .collect::<Vec<_>>()
                .join(",");
            Some(format!("{body}\n"))
        }
        ServoCommand::Home => None,
    }
}

/// 串口方言：`mov,arms,{v1},...,{v5}\n`，钳位 [0, 180]；复位为 `mov,default\n`
pub fn format_serial_command(command: &ServoCommand) -> String {
    match command {
        ServoCommand::Move(servos) => {
            let body = servos
                .iter()
                .map(|v| clamp_to(SERIAL_RANGE, *v).to_string())
                .collect::<Vec<_>>()
                .join(",");
            format!("mov,arms,{body}\n")
        }
        ServoCommand::Home => "mov,default\n".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_from_angles_takes_first_five_joints() {
        let angles = JointAngles::from_degrees([10.0, 90.0, 45.5, 170.0, 90.0, 33.0]);
        let ServoCommand::Move(servos) = ServoCommand::move_to(&angles) else {
            panic!("expected move command");
        };
        assert_eq!(servos, [10, 90, 46, 170, 90]);
    }

    #[test]
    fn test_tcp_format_golden() {
        let cmd = ServoCommand::Move([10, 90, 46, 170, 90]);
        assert_eq!(
            format_tcp_command(&cmd).unwrap(),
            "A1:10,A2:90,A3:46,A4:170,A5:90\n"
        );
    }

    #[test]
    fn test_serial_format_golden() {
        let cmd = ServoCommand::Move([0, 90, 46, 180, 90]);
        assert_eq!(format_serial_command(&cmd), "mov,arms,0,90,46,180,90\n");
        assert_eq!(format_serial_command(&ServoCommand::Home), "mov,default\n");
    }

    #[test]
    fn test_tcp_clamps_never_outside_range() {
        let extremes = [
            ServoCommand::Move([i16::MIN, -1, 0, 180, i16::MAX]),
            ServoCommand::Move([9, 10, 170, 171, 500]),
        ];
        for cmd in extremes {
            let line = format_tcp_command(&cmd).unwrap();
            for token in line.trim().split(',') {
                let value: i16 = token.split(':').nth(1).unwrap().parse().unwrap();
                assert!((10..=170).contains(&value), "out of range: {value}");
            }
        }
    }

    #[test]
    fn test_serial_clamps_never_outside_range() {
        let cmd = ServoCommand::Move([i16::MIN, -20, 90, 181, i16::MAX]);
        let line = format_serial_command(&cmd);
        let values: Vec<i16> = line
            .trim()
            .strip_prefix("mov,arms,")
            .unwrap()
            .split(',')
            .map(|t| t.parse().unwrap())
            .collect();
        for value in values {
            assert!((0..=180).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn test_tcp_home_has_no_wire_form() {
        assert!(format_tcp_command(&ServoCommand::Home).is_none());
    }

    #[test]
    fn test_huge_angle_input_survives_conversion() {
        let angles = JointAngles::from_radians([1e6, -1e6, 0.0, 0.0, 0.0, 0.0]);
        let cmd = ServoCommand::move_to(&angles);
        // 转换不会 panic，格式化后仍然在行程内
        let line = format_serial_command(&cmd);
        assert!(line.starts_with("mov,arms,"));
    }
}
