//! 输入采样：按键集 -> 位置增量
//!
//! 这里不做任何求解，只把当前物理按住的方向键转换成一次节拍的
//! 位姿增量提案；同时按住的键在同一节拍内相加合成。

use nalgebra::Vector3;

/// 方向运动键（与轴的对应关系由 CLI 的键位映射决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKey {
    XPos,
    XNeg,
    YPos,
    YNeg,
    ZPos,
    ZNeg,
}

impl MotionKey {
    const ALL: [MotionKey; 6] = [
        MotionKey::XPos,
        MotionKey::XNeg,
        MotionKey::YPos,
        MotionKey::YNeg,
        MotionKey::ZPos,
        MotionKey::ZNeg,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// 该键对单位步长增量的贡献
    fn axis_contribution(self) -> Vector3<f64> {
        match self {
            MotionKey::XPos => Vector3::new(1.0, 0.0, 0.0),
            MotionKey::XNeg => Vector3::new(-1.0, 0.0, 0.0),
            MotionKey::YPos => Vector3::new(0.0, 1.0, 0.0),
            MotionKey::YNeg => Vector3::new(0.0, -1.0, 0.0),
            MotionKey::ZPos => Vector3::new(0.0, 0.0, 1.0),
            MotionKey::ZNeg => Vector3::new(0.0, 0.0, -1.0),
        }
    }
}

/// 当前按住的方向键集合（位集，值语义）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeySet(u8);

impl KeySet {
    /// 空集
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, key: MotionKey) {
        self.0 |= key.bit();
    }

    pub fn remove(&mut self, key: MotionKey) {
        self.0 &= !key.bit();
    }

    pub fn contains(self, key: MotionKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// 一次节拍的位置增量：每个按住的方向键贡献一个 ±step
pub fn sample_delta(keys: KeySet, step: f64) -> Vector3<f64> {
    let mut delta = Vector3::zeros();
    for key in MotionKey::ALL {
        if keys.contains(key) {
            delta += key.axis_contribution() * step;
        }
    }
    delta
}
