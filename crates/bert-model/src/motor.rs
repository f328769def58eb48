//! 舵机配置与实时状态
//!
//! 每个物理舵机对应一个 `MotorConfiguration`：启动时由静态配置创建，
//! 之后随协议响应或新目标值不断更新，进程生命周期内不销毁。
//!
//! 角度单位为度，速度为度/秒，力矩与负载为 N·m。

use crate::{DynamixelType, Joint, JointProperty};
use serde::{Deserialize, Serialize};

/// 单个舵机的标定参数与实时状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorConfiguration {
    /// 舵机驱动的关节
    pub joint: Joint,
    /// 舵机型号
    pub model: DynamixelType,
    /// 总线 ID
    pub id: u8,
    /// 所在串口控制器名（如 "upper" / "lower"）
    pub controller: String,
    /// 安装偏置（度）
    pub offset: f64,
    /// 安装方向：`true` 为正装
    pub direct: bool,
    /// 最小角度（度）
    pub min_angle: f64,
    /// 最大角度（度）
    pub max_angle: f64,
    /// 最大速度（度/秒）
    pub max_speed: f64,
    /// 最大力矩（N·m）
    pub max_torque: f64,

    // 以下为当前目标值（或读回的实际值）
    position: f64,
    /// 速度（度/秒）
    pub speed: f64,
    /// 力矩（N·m）
    pub torque: f64,
    /// 当前负载（N·m，带方向）
    pub load: f64,
    /// 温度（℃）
    pub temperature: f64,
    /// 电压（V）
    pub voltage: f64,
    /// 力矩使能
    pub torque_enabled: bool,
    travel_time_ms: u64,
}

impl MotorConfiguration {
    /// 创建舵机配置，其余字段取出厂默认值
    ///
    /// 位置初始为 0.0，表示"尚未读取"。
    pub fn new(
        joint: Joint,
        model: DynamixelType,
        id: u8,
        controller: impl Into<String>,
        direct: bool,
    ) -> Self {
        Self {
            joint,
            model,
            id,
            controller: controller.into(),
            offset: 0.0,
            direct,
            min_angle: -90.0,
            max_angle: 90.0,
            max_speed: 600.0,
            max_torque: 1.9,
            position: 0.0,
            speed: 684.0,
            torque: 0.0,
            load: 0.0,
            temperature: 20.0,
            voltage: 0.0,
            torque_enabled: true,
            travel_time_ms: 0,
        }
    }

    /// 当前位置（度）
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// 最近一次位置变更的预计运行时间（毫秒）
    #[inline]
    pub fn travel_time_ms(&self) -> u64 {
        self.travel_time_ms
    }

    /// 设置新位置，并按当前速度估算运行时间
    ///
    /// `travel_time = 1000 * |Δ| / speed`；速度非正时保留上一次的估算。
    pub fn set_position(&mut self, position: f64) {
        let delta = (self.position - position).abs();
        if self.speed > 0.0 {
            self.travel_time_ms = (1000.0 * delta / self.speed) as u64;
        }
        self.position = position;
    }

    /// 角度限位检查
    #[inline]
    pub fn is_within_limits(&self, angle: f64) -> bool {
        angle >= self.min_angle && angle <= self.max_angle
    }

    /// 把角度限制到 [min_angle, max_angle]
    #[inline]
    pub fn clamp_angle(&self, angle: f64) -> f64 {
        angle.max(self.min_angle).min(self.max_angle)
    }

    /// 按属性名写入工程值
    pub fn set_property(&mut self, property: JointProperty, value: f64) {
        match property {
            JointProperty::Position => self.set_position(value),
            JointProperty::Speed => self.speed = value,
            JointProperty::Torque => self.torque = value,
            JointProperty::Load => self.load = value,
            JointProperty::State => self.torque_enabled = value != 0.0,
            JointProperty::Temperature => self.temperature = value,
            JointProperty::Voltage => self.voltage = value,
            JointProperty::MaximumAngle => self.max_angle = value,
            JointProperty::MinimumAngle => self.min_angle = value,
        }
    }

    /// 按属性名读取工程值（布尔值映射为 0.0 / 1.0）
    pub fn property(&self, property: JointProperty) -> f64 {
        match property {
            JointProperty::Position => self.position,
            JointProperty::Speed => self.speed,
            JointProperty::Torque => self.torque,
            JointProperty::Load => self.load,
            JointProperty::State => {
                if self.torque_enabled {
                    1.0
                } else {
                    0.0
                }
            },
            JointProperty::Temperature => self.temperature,
            JointProperty::Voltage => self.voltage,
            JointProperty::MaximumAngle => self.max_angle,
            JointProperty::MinimumAngle => self.min_angle,
        }
    }
}
