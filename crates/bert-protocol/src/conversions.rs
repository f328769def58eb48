//! # 单位换算
//!
//! 工程单位（度、度/秒、N·m、℃、V）与舵机寄存器原始值之间的换算，按舵机型号查表。
//!
//! | 型号 | 量程 | 分辨率 | 满量程速度 | 满量程力矩 |
//! |------|------|--------|------------|------------|
//! | AX-12 | 300° | 0x3FF | 684 °/s | 1.2 N·m |
//! | MX-28 | 360° | 0xFFF | 700 °/s | 2.5 N·m |
//! | MX-64 | 360° | 0xFFF | 700 °/s | 6.0 N·m |
//!
//! 速度与力矩寄存器的低 10 位为幅值，bit 10 为方向位；方向位与安装方向异或后得到符号。

use crate::{
    GOAL_POSITION, GOAL_SPEED, GOAL_TORQUE, GOAL_TORQUE_ENABLE, MAXIMUM_ANGLE, MINIMUM_ANGLE,
    PRESENT_LOAD, PRESENT_POSITION, PRESENT_SPEED, PRESENT_TEMPERATURE, PRESENT_VOLTAGE,
    ProtocolError,
};
use bert_model::{DynamixelType, JointProperty, MotorConfiguration};
use tracing::{trace, warn};

/// 速度/力矩方向位
pub const DIRECTION_BIT: u16 = 0x400;
/// 速度/力矩幅值掩码
pub const MAGNITUDE_MASK: u16 = 0x3FF;

const FULL_SCALE: f64 = 1023.0;

/// 转动范围（度）
pub const fn range(model: DynamixelType) -> f64 {
    match model {
        DynamixelType::Ax12 => 300.0,
        DynamixelType::Mx28 | DynamixelType::Mx64 => 360.0,
    }
}

/// 位置分辨率，同时作为位置掩码
pub const fn resolution(model: DynamixelType) -> u16 {
    match model {
        DynamixelType::Ax12 => 0x3FF,
        DynamixelType::Mx28 | DynamixelType::Mx64 => 0xFFF,
    }
}

/// 满量程（原始值 1023）角速度，度/秒
pub const fn velocity(model: DynamixelType) -> f64 {
    match model {
        DynamixelType::Ax12 => 684.0,
        DynamixelType::Mx28 | DynamixelType::Mx64 => 700.0,
    }
}

/// 满量程（原始值 1023）力矩，N·m
pub const fn rated_torque(model: DynamixelType) -> f64 {
    match model {
        DynamixelType::Ax12 => 1.2,
        DynamixelType::Mx28 => 2.5,
        DynamixelType::Mx64 => 6.0,
    }
}

/// AX-12 不支持 BULK_READ
pub const fn supports_bulk_read(model: DynamixelType) -> bool {
    !matches!(model, DynamixelType::Ax12)
}

/// 小端两字节合成一个寄存器值
#[inline]
pub fn word(b1: u8, b2: u8) -> u16 {
    u16::from_le_bytes([b1, b2])
}

/// 角度命令换算结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionCommand {
    /// 寄存器原始值
    pub raw: u16,
    /// 限位后的角度（度），调用方应将其存为新位置
    pub degrees: f64,
    /// 是否发生了限位
    pub clamped: bool,
}

/// 角度 → 原始值
///
/// 先限位到 [min_angle, max_angle]，再减偏置，反装时取 `range - v`，
/// 按 `v * res / range` 截断取整后与分辨率相与。
pub fn degree_to_dxl(mc: &MotorConfiguration, value: f64) -> PositionCommand {
    let mut degrees = value;
    let mut clamped = false;
    if value > mc.max_angle {
        warn!(
            "{} attempted move to {:.0} (max = {:.0})",
            mc.joint, value, mc.max_angle
        );
        degrees = mc.max_angle;
        clamped = true;
    } else if value < mc.min_angle {
        warn!(
            "{} attempted move to {:.0} (min = {:.0})",
            mc.joint, value, mc.min_angle
        );
        degrees = mc.min_angle;
        clamped = true;
    }

    let r = range(mc.model);
    let res = resolution(mc.model);
    let mut v = degrees - mc.offset;
    if !mc.direct {
        v = r - v;
    }
    let raw = ((v * res as f64 / r) as i64 & res as i64) as u16;
    trace!(
        "{} -> b1,b2: {:02X},{:02X}, offset {:.0} {}",
        mc.joint,
        raw & 0xFF,
        raw >> 8,
        mc.offset,
        if mc.direct { "DIRECT" } else { "INDIRECT" }
    );

    PositionCommand {
        raw,
        degrees,
        clamped,
    }
}

/// 原始值 → 角度
pub fn dxl_to_degree(mc: &MotorConfiguration, b1: u8, b2: u8) -> f64 {
    let res = resolution(mc.model);
    let raw = word(b1, b2) & res;
    let r = range(mc.model);
    let mut result = raw as f64 * r / res as f64;
    if !mc.direct {
        result = r - result;
    }
    result + mc.offset
}

/// 速度（度/秒）→ 原始值；有效方向为逆时针时置方向位
pub fn speed_to_dxl(mc: &MotorConfiguration, value: f64) -> u16 {
    let mut cw = mc.direct;
    if value < 0.0 {
        cw = !cw;
    }
    let magnitude = ((value.abs() * FULL_SCALE / velocity(mc.model)) as u16).min(MAGNITUDE_MASK);
    if cw { magnitude } else { magnitude | DIRECTION_BIT }
}

/// 原始值 → 速度（度/秒，带符号）
pub fn dxl_to_speed(mc: &MotorConfiguration, b1: u8, b2: u8) -> f64 {
    let raw = word(b1, b2);
    let mut cw = mc.direct;
    if raw & DIRECTION_BIT != 0 {
        cw = !cw;
    }
    let result = (raw & MAGNITUDE_MASK) as f64 * velocity(mc.model) / FULL_SCALE;
    if cw { result } else { -result }
}

/// 力矩（N·m）→ 原始值；有效方向为顺时针时置方向位
pub fn torque_to_dxl(mc: &MotorConfiguration, value: f64) -> u16 {
    let mut cw = mc.direct;
    if value < 0.0 {
        cw = !cw;
    }
    let magnitude = ((value.abs() * FULL_SCALE / rated_torque(mc.model)) as u16).min(MAGNITUDE_MASK);
    if cw { magnitude | DIRECTION_BIT } else { magnitude }
}

/// 原始值 → 负载（N·m，带符号）
pub fn dxl_to_load(mc: &MotorConfiguration, b1: u8, b2: u8) -> f64 {
    let raw = word(b1, b2);
    let mut cw = mc.direct;
    if raw & DIRECTION_BIT != 0 {
        cw = !cw;
    }
    let result = (raw & MAGNITUDE_MASK) as f64 * rated_torque(mc.model) / FULL_SCALE;
    if cw { -result } else { result }
}

/// 原始值 → 力矩限制（N·m，非负）
///
/// EEPROM 出厂值高字节为 0xFF（AX-12 为 8C FF，MX 为 A0 FF），此时返回额定力矩。
pub fn dxl_to_torque_limit(model: DynamixelType, b1: u8, b2: u8) -> f64 {
    let rated = rated_torque(model);
    if b2 == 0xFF {
        return rated;
    }
    (word(b1, b2) & MAGNITUDE_MASK) as f64 * rated / MAGNITUDE_MASK as f64
}

/// 力矩使能
#[inline]
pub fn dxl_to_torque_enable(b1: u8) -> bool {
    b1 != 0
}

/// 温度（℃）
#[inline]
pub fn dxl_to_temperature(b1: u8) -> f64 {
    b1 as f64
}

/// 电压（V），寄存器单位为 0.1V
#[inline]
pub fn dxl_to_voltage(b1: u8) -> f64 {
    b1 as f64 / 10.0
}

// ============================================================================
// 属性表
// ============================================================================

/// 属性对应的目标值（RAM）地址，只有可写属性才有
pub fn address_for_goal_property(property: JointProperty) -> Result<u8, ProtocolError> {
    match property {
        JointProperty::Position => Ok(GOAL_POSITION),
        JointProperty::Speed => Ok(GOAL_SPEED),
        JointProperty::Torque => Ok(GOAL_TORQUE),
        JointProperty::State => Ok(GOAL_TORQUE_ENABLE),
        other => Err(ProtocolError::UnsupportedProperty {
            property: other,
            operation: "goal address",
        }),
    }
}

/// 属性对应的当前值地址
pub const fn address_for_present_property(property: JointProperty) -> u8 {
    match property {
        JointProperty::MaximumAngle => MAXIMUM_ANGLE,
        JointProperty::MinimumAngle => MINIMUM_ANGLE,
        JointProperty::Position => PRESENT_POSITION,
        JointProperty::Speed => PRESENT_SPEED,
        JointProperty::Torque => GOAL_TORQUE,
        JointProperty::Load => PRESENT_LOAD,
        JointProperty::State => GOAL_TORQUE_ENABLE,
        JointProperty::Temperature => PRESENT_TEMPERATURE,
        JointProperty::Voltage => PRESENT_VOLTAGE,
    }
}

/// 属性在控制表中的字节数（目标值与当前值相同）
pub const fn data_bytes_for_property(property: JointProperty) -> u8 {
    match property {
        JointProperty::Temperature | JointProperty::State | JointProperty::Voltage => 1,
        _ => 2,
    }
}

/// 工程值 → 写入寄存器的原始值
///
/// 位置会被限位，但不会写回 `mc`；需要保存限位结果时使用 [`degree_to_dxl`]。
pub fn dxl_value_for_property(
    property: JointProperty,
    mc: &MotorConfiguration,
    value: f64,
) -> Result<u16, ProtocolError> {
    match property {
        JointProperty::Position => Ok(degree_to_dxl(mc, value).raw),
        JointProperty::Speed => Ok(speed_to_dxl(mc, value)),
        JointProperty::Torque => Ok(torque_to_dxl(mc, value)),
        JointProperty::State => Ok(if value == 0.0 { 0 } else { 1 }),
        other => Err(ProtocolError::UnsupportedProperty {
            property: other,
            operation: "write",
        }),
    }
}

/// 寄存器字节 → 工程值；单字节属性忽略 `b2`
pub fn value_for_property(property: JointProperty, mc: &MotorConfiguration, b1: u8, b2: u8) -> f64 {
    match property {
        JointProperty::MaximumAngle | JointProperty::MinimumAngle | JointProperty::Position => {
            dxl_to_degree(mc, b1, b2)
        },
        JointProperty::Speed => dxl_to_speed(mc, b1, b2),
        JointProperty::Torque => dxl_to_torque_limit(mc.model, b1, b2),
        JointProperty::Load => dxl_to_load(mc, b1, b2),
        JointProperty::State => {
            if dxl_to_torque_enable(b1) {
                1.0
            } else {
                0.0
            }
        },
        JointProperty::Temperature => dxl_to_temperature(b1),
        JointProperty::Voltage => dxl_to_voltage(b1),
    }
}

/// 带单位的可读文本
pub fn text_for_property(property: JointProperty, mc: &MotorConfiguration, b1: u8, b2: u8) -> String {
    let value = value_for_property(property, mc, b1, b2);
    match property {
        JointProperty::MaximumAngle | JointProperty::MinimumAngle | JointProperty::Position => {
            format!("{:.0} degrees", value)
        },
        JointProperty::Speed => format!("{:.0} degrees per second", value),
        JointProperty::Temperature => format!("{:.0} degrees centigrade", value),
        JointProperty::Torque | JointProperty::Load => format!("{:.1} newton-meters", value),
        JointProperty::State => {
            format!("torque-{}", if value == 0.0 { "disabled" } else { "enabled" })
        },
        JointProperty::Voltage => format!("{:.1} volts", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bert_model::Joint;
    use proptest::prelude::*;

    fn motor(model: DynamixelType, direct: bool, offset: f64) -> MotorConfiguration {
        let mut mc = MotorConfiguration::new(Joint::LeftElbowY, model, 1, "upper", direct);
        mc.offset = offset;
        mc.min_angle = -1000.0;
        mc.max_angle = 1000.0;
        mc
    }

    #[test]
    fn test_degree_to_dxl_known_values() {
        // 180° * 4095 / 360 = 2047.5 → 截断为 2047
        assert_eq!(degree_to_dxl(&motor(DynamixelType::Mx28, true, 0.0), 180.0).raw, 2047);
        // 150° * 1023 / 300 = 511.5 → 511
        assert_eq!(degree_to_dxl(&motor(DynamixelType::Ax12, true, 0.0), 150.0).raw, 511);
        // 反装：300 - 100 = 200 → 200 * 1023 / 300 = 682
        assert_eq!(degree_to_dxl(&motor(DynamixelType::Ax12, false, 0.0), 100.0).raw, 682);
        // 偏置：190 - 10 = 180
        assert_eq!(degree_to_dxl(&motor(DynamixelType::Mx64, true, 10.0), 190.0).raw, 2047);
    }

    #[test]
    fn test_degree_to_dxl_clamps_above_max() {
        let mut mc = motor(DynamixelType::Mx28, true, 0.0);
        mc.max_angle = 90.0;
        let cmd = degree_to_dxl(&mc, 120.0);
        assert!(cmd.clamped);
        assert_eq!(cmd.degrees, 90.0);
        // 90 * 4095 / 360 = 1023.75
        assert_eq!(cmd.raw, 1023);
    }

    #[test]
    fn test_degree_to_dxl_clamps_below_min() {
        let mut mc = motor(DynamixelType::Ax12, true, 0.0);
        mc.min_angle = 30.0;
        let cmd = degree_to_dxl(&mc, 10.0);
        assert!(cmd.clamped);
        assert_eq!(cmd.degrees, 30.0);
    }

    #[test]
    fn test_dxl_to_degree_masks_to_resolution() {
        let mc = motor(DynamixelType::Ax12, true, 0.0);
        // 0xFFFF & 0x3FF = 0x3FF → 300°
        assert_eq!(dxl_to_degree(&mc, 0xFF, 0xFF), 300.0);
        let mc = motor(DynamixelType::Ax12, false, 0.0);
        assert!((dxl_to_degree(&mc, 0xAA, 0x02) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_direction_bit() {
        let direct = motor(DynamixelType::Mx28, true, 0.0);
        assert_eq!(speed_to_dxl(&direct, 350.0), 511);
        assert_eq!(speed_to_dxl(&direct, -350.0), 511 | DIRECTION_BIT);

        let indirect = motor(DynamixelType::Mx28, false, 0.0);
        assert_eq!(speed_to_dxl(&indirect, 350.0), 511 | DIRECTION_BIT);

        let raw = speed_to_dxl(&direct, -350.0).to_le_bytes();
        let back = dxl_to_speed(&direct, raw[0], raw[1]);
        assert!(back < 0.0);
        assert!((back + 350.0).abs() <= velocity(DynamixelType::Mx28) / 1023.0);
    }

    #[test]
    fn test_speed_saturates_at_full_scale() {
        let mc = motor(DynamixelType::Ax12, true, 0.0);
        assert_eq!(speed_to_dxl(&mc, 5000.0), MAGNITUDE_MASK);
    }

    #[test]
    fn test_torque_and_load_polarity() {
        let mc = motor(DynamixelType::Mx28, true, 0.0);
        let raw = torque_to_dxl(&mc, 1.25);
        assert_eq!(raw, 511 | DIRECTION_BIT);
        let [b1, b2] = raw.to_le_bytes();
        let load = dxl_to_load(&mc, b1, b2);
        assert!((load - 1.25).abs() <= rated_torque(DynamixelType::Mx28) / 1023.0);

        let raw = torque_to_dxl(&mc, -1.25);
        assert_eq!(raw, 511);
        let [b1, b2] = raw.to_le_bytes();
        assert!(dxl_to_load(&mc, b1, b2) < 0.0);
    }

    #[test]
    fn test_torque_limit() {
        assert_eq!(dxl_to_torque_limit(DynamixelType::Ax12, 0x8C, 0xFF), 1.2);
        assert_eq!(dxl_to_torque_limit(DynamixelType::Mx64, 0xFF, 0x03), 6.0);
        assert!((dxl_to_torque_limit(DynamixelType::Mx28, 0x00, 0x02) - 2.5 * 512.0 / 1023.0).abs() < 1e-12);
    }

    #[test]
    fn test_scalar_reads() {
        assert_eq!(dxl_to_temperature(40), 40.0);
        assert_eq!(dxl_to_voltage(121), 12.1);
        assert!(dxl_to_torque_enable(1));
        assert!(!dxl_to_torque_enable(0));
    }

    #[test]
    fn test_property_tables() {
        assert_eq!(address_for_goal_property(JointProperty::Position).unwrap(), 0x1E);
        assert_eq!(address_for_goal_property(JointProperty::Speed).unwrap(), 0x20);
        assert_eq!(address_for_goal_property(JointProperty::Torque).unwrap(), 0x22);
        assert_eq!(address_for_goal_property(JointProperty::State).unwrap(), 0x18);
        assert!(address_for_goal_property(JointProperty::Temperature).is_err());

        assert_eq!(address_for_present_property(JointProperty::Temperature), 0x2B);
        assert_eq!(address_for_present_property(JointProperty::Voltage), 0x2A);
        assert_eq!(address_for_present_property(JointProperty::Position), 0x24);
        assert_eq!(address_for_present_property(JointProperty::MinimumAngle), 0x06);
        assert_eq!(address_for_present_property(JointProperty::MaximumAngle), 0x08);

        assert_eq!(data_bytes_for_property(JointProperty::Temperature), 1);
        assert_eq!(data_bytes_for_property(JointProperty::State), 1);
        assert_eq!(data_bytes_for_property(JointProperty::Position), 2);
    }

    #[test]
    fn test_text_for_property() {
        let mc = motor(DynamixelType::Mx28, true, 0.0);
        assert_eq!(text_for_property(JointProperty::Temperature, &mc, 41, 0), "41 degrees centigrade");
        assert_eq!(text_for_property(JointProperty::Voltage, &mc, 120, 0), "12.0 volts");
        assert_eq!(text_for_property(JointProperty::State, &mc, 0, 0), "torque-disabled");
        assert_eq!(text_for_property(JointProperty::Position, &mc, 0x00, 0x08), "180 degrees");
    }

    #[test]
    fn test_dxl_value_for_property_rejects_read_only() {
        let mc = motor(DynamixelType::Mx28, true, 0.0);
        assert!(dxl_value_for_property(JointProperty::Voltage, &mc, 12.0).is_err());
        assert_eq!(dxl_value_for_property(JointProperty::State, &mc, 1.0).unwrap(), 1);
    }

    #[test]
    fn test_every_raw_value_survives_round_trip() {
        for model in DynamixelType::ALL {
            let step = 360.0 / resolution(model) as f64;
            for direct in [true, false] {
                let mc = motor(model, direct, -12.5);
                for raw in 0..=resolution(model) {
                    let [b1, b2] = raw.to_le_bytes();
                    let degrees = dxl_to_degree(&mc, b1, b2);
                    let [c1, c2] = degree_to_dxl(&mc, degrees).raw.to_le_bytes();
                    let again = dxl_to_degree(&mc, c1, c2);
                    assert!(
                        (again - degrees).abs() <= step + 1e-9,
                        "{model} direct={direct} raw={raw}: {degrees} -> {again}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_indirect_round_trip_drifts_one_tick() {
        // 反装时 `range - v` 后截断取整，可能比原值少一个刻度
        let mc = motor(DynamixelType::Mx28, false, -12.5);
        let degrees = dxl_to_degree(&mc, 188, 0);
        let command = degree_to_dxl(&mc, degrees);
        assert_eq!(command.raw, 187);
        let [c1, c2] = command.raw.to_le_bytes();
        let again = dxl_to_degree(&mc, c1, c2);
        assert!(((again - degrees) - 360.0 / 4095.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn test_degree_round_trip_within_one_step(
            model_index in 0usize..3,
            direct in any::<bool>(),
            offset in -30.0f64..30.0,
            fraction in 0.0f64..1.0,
        ) {
            let model = DynamixelType::ALL[model_index];
            let mc = motor(model, direct, offset);
            let x = offset + fraction * range(model);
            let [b1, b2] = degree_to_dxl(&mc, x).raw.to_le_bytes();
            let back = dxl_to_degree(&mc, b1, b2);
            prop_assert!((back - x).abs() <= 360.0 / resolution(model) as f64 + 1e-9);
        }
    }
}
