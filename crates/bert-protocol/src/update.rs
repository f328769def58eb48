//! # 响应处理（读路径）
//!
//! 解析舵机应答并把结果写入 `MotorConfiguration`，这是编解码器中唯一会修改共享状态的路径。
//! 调用方需保证同一舵机同一时刻只有一个写者（见 `bert-driver` 的 `MotorRegistry`）。
//!
//! 帧错误与设备错误都会连同十六进制转储记入日志，并归属到单个舵机；
//! 批量应答中某个舵机出错不影响其他舵机的更新。

use crate::conversions::{data_bytes_for_property, text_for_property, value_for_property};
use crate::{ProtocolError, StatusPacket, dump, parse_status, split_status_frames};
use bert_model::{JointProperty, MotorConfiguration};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, info};

/// 目标块读数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goals {
    /// 度
    pub position: f64,
    /// 度/秒
    pub speed: f64,
    /// N·m
    pub torque: f64,
}

/// EEPROM 限位块读数（未做偏置与方向修正）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min_angle: f64,
    pub max_angle: f64,
    /// ℃
    pub temperature_limit: f64,
    /// V
    pub min_voltage: f64,
    /// V
    pub max_voltage: f64,
    /// N·m
    pub max_torque: f64,
}

/// 批量应答的处理结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterUpdate {
    /// 成功更新的舵机 ID → 工程值
    pub values: BTreeMap<u8, f64>,
    /// 每个失败的帧或舵机一个错误
    pub errors: Vec<ProtocolError>,
}

/// 解析单帧并校验错误位与舵机 ID
fn expect_status(
    context: &str,
    mc: &MotorConfiguration,
    bytes: &[u8],
) -> Result<StatusPacket, ProtocolError> {
    let result = parse_status(bytes).and_then(StatusPacket::check).and_then(|packet| {
        if packet.id == mc.id {
            Ok(packet)
        } else {
            Err(ProtocolError::UnknownMotor { id: packet.id })
        }
    });
    if let Err(e) = &result {
        error!("{}: {} {} ({})", context, mc.joint, e, dump(bytes));
    }
    result
}

/// 处理目标块（位置、速度、力矩）应答
pub fn update_goals_from_bytes(mc: &mut MotorConfiguration, bytes: &[u8]) -> Result<Goals, ProtocolError> {
    let packet = expect_status("update_goals_from_bytes", mc, bytes)?;
    let (p1, p2) = packet.register(0, 2)?;
    let (s1, s2) = packet.register(2, 2)?;
    let (t1, t2) = packet.register(4, 2)?;

    let goals = Goals {
        position: value_for_property(JointProperty::Position, mc, p1, p2),
        speed: value_for_property(JointProperty::Speed, mc, s1, s2),
        torque: value_for_property(JointProperty::Torque, mc, t1, t2),
    };
    info!(
        "{} goal angle, speed and torque are: {}, {}, {}",
        mc.joint,
        text_for_property(JointProperty::Position, mc, p1, p2),
        text_for_property(JointProperty::Speed, mc, s1, s2),
        text_for_property(JointProperty::Torque, mc, t1, t2),
    );

    mc.set_position(goals.position);
    mc.speed = goals.speed;
    mc.torque = goals.torque;
    Ok(goals)
}

/// 处理 EEPROM 限位块应答
///
/// 角度按正装、零偏置换算，只用于报告，不覆盖标定后的 `min_angle` / `max_angle`；
/// 力矩上限写入 `max_torque`。
pub fn update_limits_from_bytes(mc: &mut MotorConfiguration, bytes: &[u8]) -> Result<Limits, ProtocolError> {
    let packet = expect_status("update_limits_from_bytes", mc, bytes)?;
    let mut raw_view = mc.clone();
    raw_view.direct = true;
    raw_view.offset = 0.0;

    let (a1, a2) = packet.register(0, 2)?;
    let (b1, b2) = packet.register(2, 2)?;
    let (temperature, _) = packet.register(5, 1)?;
    let (low, _) = packet.register(6, 1)?;
    let (high, _) = packet.register(7, 1)?;
    let (t1, t2) = packet.register(8, 2)?;

    let limits = Limits {
        min_angle: value_for_property(JointProperty::MinimumAngle, &raw_view, a1, a2),
        max_angle: value_for_property(JointProperty::MaximumAngle, &raw_view, b1, b2),
        temperature_limit: value_for_property(JointProperty::Temperature, &raw_view, temperature, 0),
        min_voltage: value_for_property(JointProperty::Voltage, &raw_view, low, 0),
        max_voltage: value_for_property(JointProperty::Voltage, &raw_view, high, 0),
        max_torque: value_for_property(JointProperty::Torque, &raw_view, t1, t2),
    };
    info!(
        "{} min, max angle and torque limits are: {:.0} degrees, {:.0} degrees, {:.1} newton-meters",
        mc.joint, limits.min_angle, limits.max_angle, limits.max_torque
    );

    mc.max_torque = limits.max_torque;
    Ok(limits)
}

/// 处理单个属性的应答
pub fn update_parameter_from_bytes(
    property: JointProperty,
    mc: &mut MotorConfiguration,
    bytes: &[u8],
) -> Result<f64, ProtocolError> {
    let packet = expect_status("update_parameter_from_bytes", mc, bytes)?;
    let (b1, b2) = packet.register(0, data_bytes_for_property(property))?;
    let value = value_for_property(property, mc, b1, b2);
    info!("{} {}={:.2}", mc.joint, property, value);
    mc.set_property(property, value);
    Ok(value)
}

/// 处理多个连续到达的属性应答（BULK_READ 或逐个 READ 的结果）
///
/// 舵机按应答中的 ID 匹配；错误逐个记入 `errors`，其余舵机照常更新。
pub fn update_parameter_array_from_bytes<'a, I>(
    property: JointProperty,
    configurations: I,
    bytes: &[u8],
) -> ParameterUpdate
where
    I: IntoIterator<Item = &'a mut MotorConfiguration>,
{
    let mut by_id: HashMap<u8, &'a mut MotorConfiguration> =
        configurations.into_iter().map(|mc| (mc.id, mc)).collect();
    let width = data_bytes_for_property(property);
    let mut update = ParameterUpdate::default();

    for result in split_status_frames(bytes) {
        let outcome = result.and_then(StatusPacket::check).and_then(|packet| {
            let mc: &mut MotorConfiguration = by_id
                .get_mut(&packet.id)
                .ok_or(ProtocolError::UnknownMotor { id: packet.id })?;
            let (b1, b2) = packet.register(0, width)?;
            let value = value_for_property(property, mc, b1, b2);
            mc.set_property(property, value);
            debug!("{} {}={:.0}", mc.joint, property, value);
            Ok((packet.id, value))
        });
        match outcome {
            Ok((id, value)) => {
                update.values.insert(id, value);
            },
            Err(e) => {
                error!("update_parameter_array_from_bytes: {} ({})", e, dump(bytes));
                update.errors.push(e);
            },
        }
    }
    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum;
    use bert_model::{DynamixelType, Joint};

    fn status(id: u8, error: u8, params: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xFF, id, (params.len() + 2) as u8, error];
        bytes.extend_from_slice(params);
        let sum = checksum(&bytes[2..]);
        bytes.push(sum);
        bytes
    }

    fn mx28(joint: Joint, id: u8) -> MotorConfiguration {
        let mut mc = MotorConfiguration::new(joint, DynamixelType::Mx28, id, "lower", true);
        mc.min_angle = 0.0;
        mc.max_angle = 360.0;
        mc
    }

    #[test]
    fn test_update_goals() {
        let mut mc = mx28(Joint::LeftKneeY, 12);
        // 位置 0x0800，速度 0x01FF，力矩 0x03FF
        let bytes = status(12, 0, &[0x00, 0x08, 0xFF, 0x01, 0xFF, 0x03]);
        let goals = update_goals_from_bytes(&mut mc, &bytes).unwrap();

        assert!((goals.position - 2048.0 * 360.0 / 4095.0).abs() < 1e-9);
        assert!((goals.speed - 511.0 * 700.0 / 1023.0).abs() < 1e-9);
        assert_eq!(goals.torque, 2.5);
        assert_eq!(mc.position(), goals.position);
        assert_eq!(mc.speed, goals.speed);
        assert_eq!(mc.torque, 2.5);
    }

    #[test]
    fn test_update_goals_device_error_leaves_motor_untouched() {
        let mut mc = mx28(Joint::LeftKneeY, 12);
        let before = mc.clone();
        let bytes = status(12, 0x02, &[0x00, 0x08, 0xFF, 0x01, 0xFF, 0x03]);
        let err = update_goals_from_bytes(&mut mc, &bytes).unwrap_err();
        assert!(matches!(err, ProtocolError::Device { id: 12, bits: 0x02, .. }));
        assert_eq!(mc, before);
    }

    #[test]
    fn test_update_goals_rejects_foreign_id() {
        let mut mc = mx28(Joint::LeftKneeY, 12);
        let bytes = status(13, 0, &[0x00, 0x08, 0xFF, 0x01, 0xFF, 0x03]);
        assert_eq!(
            update_goals_from_bytes(&mut mc, &bytes).unwrap_err(),
            ProtocolError::UnknownMotor { id: 13 }
        );
    }

    #[test]
    fn test_update_goals_short_payload() {
        let mut mc = mx28(Joint::LeftKneeY, 12);
        let bytes = status(12, 0, &[0x00, 0x08]);
        assert!(matches!(
            update_goals_from_bytes(&mut mc, &bytes),
            Err(ProtocolError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn test_update_limits_ignores_calibration() {
        let mut mc = mx28(Joint::RightHipY, 14);
        mc.direct = false;
        mc.offset = 25.0;
        // CW 0x0400，CCW 0x0C00，保留，温度 70，电压 6.0-16.0，力矩 0x03FF
        let bytes = status(14, 0, &[0x00, 0x04, 0x00, 0x0C, 0x00, 70, 60, 160, 0xFF, 0x03]);
        let limits = update_limits_from_bytes(&mut mc, &bytes).unwrap();

        assert!((limits.min_angle - 1024.0 * 360.0 / 4095.0).abs() < 1e-9);
        assert!((limits.max_angle - 3072.0 * 360.0 / 4095.0).abs() < 1e-9);
        assert_eq!(limits.temperature_limit, 70.0);
        assert_eq!(limits.min_voltage, 6.0);
        assert_eq!(limits.max_voltage, 16.0);
        assert_eq!(limits.max_torque, 2.5);

        // 标定参数不变
        assert!(!mc.direct);
        assert_eq!(mc.offset, 25.0);
        assert_eq!(mc.min_angle, 0.0);
        assert_eq!(mc.max_torque, 2.5);
    }

    #[test]
    fn test_update_parameter_temperature() {
        let mut mc = mx28(Joint::NeckY, 33);
        let value = update_parameter_from_bytes(JointProperty::Temperature, &mut mc, &status(33, 0, &[41])).unwrap();
        assert_eq!(value, 41.0);
        assert_eq!(mc.temperature, 41.0);
    }

    #[test]
    fn test_update_parameter_state() {
        let mut mc = mx28(Joint::NeckY, 33);
        update_parameter_from_bytes(JointProperty::State, &mut mc, &status(33, 0, &[0])).unwrap();
        assert!(!mc.torque_enabled);
    }

    #[test]
    fn test_update_parameter_array_attributes_errors() {
        let mut motors = vec![
            mx28(Joint::LeftHipX, 11),
            mx28(Joint::LeftHipY, 12),
            mx28(Joint::LeftHipZ, 13),
        ];
        let mut bytes = status(11, 0, &[0x00, 0x08]);
        bytes.extend(status(12, 0x20, &[0x00, 0x04]));
        bytes.extend(status(13, 0, &[0x00, 0x04]));
        bytes.extend(status(99, 0, &[0x00, 0x04]));

        let update = update_parameter_array_from_bytes(JointProperty::Position, motors.iter_mut(), &bytes);

        assert_eq!(update.values.len(), 2);
        assert!(update.values.contains_key(&11));
        assert!(update.values.contains_key(&13));
        assert_eq!(update.errors.len(), 2);
        assert_eq!(update.errors[0].motor_id(), Some(12));
        assert_eq!(update.errors[1], ProtocolError::UnknownMotor { id: 99 });

        assert!((motors[0].position() - 2048.0 * 360.0 / 4095.0).abs() < 1e-9);
        assert_eq!(motors[1].position(), 0.0);
        assert!((motors[2].position() - 1024.0 * 360.0 / 4095.0).abs() < 1e-9);
    }
}
