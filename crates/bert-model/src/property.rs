//! 舵机属性名
//!
//! 协议层据此查找控制表地址与数据宽度，不在帧构建代码中硬编码地址。

use crate::ModelError;
use std::fmt;
use std::str::FromStr;

/// 舵机属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointProperty {
    /// 最大角度限位（EEPROM）
    MaximumAngle,
    /// 最小角度限位（EEPROM）
    MinimumAngle,
    /// 位置（度）
    Position,
    /// 速度（度/秒）
    Speed,
    /// 力矩（N·m）
    Torque,
    /// 当前负载（N·m，带方向）
    Load,
    /// 力矩使能（上电/断电）
    State,
    /// 温度（℃）
    Temperature,
    /// 电压（V）
    Voltage,
}

impl JointProperty {
    pub const ALL: [JointProperty; 9] = [
        JointProperty::MaximumAngle,
        JointProperty::MinimumAngle,
        JointProperty::Position,
        JointProperty::Speed,
        JointProperty::Torque,
        JointProperty::Load,
        JointProperty::State,
        JointProperty::Temperature,
        JointProperty::Voltage,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            JointProperty::MaximumAngle => "MAXIMUMANGLE",
            JointProperty::MinimumAngle => "MINIMUMANGLE",
            JointProperty::Position => "POSITION",
            JointProperty::Speed => "SPEED",
            JointProperty::Torque => "TORQUE",
            JointProperty::Load => "LOAD",
            JointProperty::State => "STATE",
            JointProperty::Temperature => "TEMPERATURE",
            JointProperty::Voltage => "VOLTAGE",
        }
    }
}

impl fmt::Display for JointProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for JointProperty {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JointProperty::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownProperty(s.to_string()))
    }
}
