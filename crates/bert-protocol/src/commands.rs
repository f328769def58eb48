//! # 命令构建（写路径）
//!
//! 把期望的关节属性变化转为待发送的帧，同时把目标值记入 `MotorConfiguration`。
//! 位置命令一律先限位；限位后的角度才是被保存和发送的值。
//!
//! SYNC_WRITE 没有应答，因此发送后的状态只能以这里记下的目标值为准。

use crate::conversions::{
    address_for_goal_property, address_for_present_property, data_bytes_for_property, degree_to_dxl,
    speed_to_dxl, torque_to_dxl,
};
use crate::{
    BulkReadEntry, DxlFrame, GOAL_BLOCK_ADDRESS, GOAL_BLOCK_BYTES, GOAL_POSITION, GOAL_SPEED, GOAL_TORQUE,
    HIP_X_LIMIT, HIP_Z_LIMIT, LIMIT_BLOCK_ADDRESS, LIMIT_BLOCK_BYTES, ProtocolError, READ, build_bulk_read,
    build_sync_write, build_write,
};
use bert_model::{Joint, JointProperty, MotorConfiguration};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 一次动作需要发送的帧及其预计耗时
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionPlan {
    pub frames: Vec<DxlFrame>,
    /// 所有被移动舵机中最长的运行时间（毫秒）
    pub travel_time_ms: u64,
}

/// 姿态：任意关节子集的力矩、速度和位置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    /// N·m
    pub torques: BTreeMap<Joint, f64>,
    /// 度/秒
    pub speeds: BTreeMap<Joint, f64>,
    /// 度
    pub positions: BTreeMap<Joint, f64>,
}

/// 读取目标块（位置、速度、力矩）
pub fn bytes_to_get_goals(id: u8) -> DxlFrame {
    DxlFrame::assemble(id, READ, &[GOAL_BLOCK_ADDRESS, GOAL_BLOCK_BYTES])
}

/// 读取 EEPROM 限位块
pub fn bytes_to_get_limits(id: u8) -> DxlFrame {
    DxlFrame::assemble(id, READ, &[LIMIT_BLOCK_ADDRESS, LIMIT_BLOCK_BYTES])
}

/// 读取单个属性的当前值
pub fn bytes_to_get_property(id: u8, property: JointProperty) -> DxlFrame {
    DxlFrame::assemble(
        id,
        READ,
        &[address_for_present_property(property), data_bytes_for_property(property)],
    )
}

/// 设置单个舵机的目标属性（WRITE），并记下目标值
///
/// 可写属性：位置、速度、力矩、力矩使能。
pub fn bytes_to_set_property(
    mc: &mut MotorConfiguration,
    property: JointProperty,
    value: f64,
) -> Result<DxlFrame, ProtocolError> {
    let address = address_for_goal_property(property)?;
    let raw = match property {
        JointProperty::Position => {
            let cmd = degree_to_dxl(mc, value);
            mc.set_position(cmd.degrees);
            cmd.raw
        },
        JointProperty::Speed => {
            mc.speed = value;
            speed_to_dxl(mc, value)
        },
        JointProperty::Torque => {
            mc.torque = value;
            torque_to_dxl(mc, value)
        },
        JointProperty::State => {
            mc.torque_enabled = value != 0.0;
            u16::from(mc.torque_enabled)
        },
        other => {
            return Err(ProtocolError::UnsupportedProperty {
                property: other,
                operation: "set",
            });
        },
    };
    build_write(mc.id, address, raw as u32, data_bytes_for_property(property) as usize)
}

/// 把每个舵机已保存的速度、力矩或力矩使能同步写出（SYNC_WRITE）
pub fn byte_array_to_set_property<'a, I>(
    configurations: I,
    property: JointProperty,
) -> Result<Vec<DxlFrame>, ProtocolError>
where
    I: IntoIterator<Item = &'a MotorConfiguration>,
{
    let address = address_for_goal_property(property)?;
    let mut entries = BTreeMap::new();
    for mc in configurations {
        let raw = match property {
            JointProperty::Speed => speed_to_dxl(mc, mc.speed),
            JointProperty::Torque => torque_to_dxl(mc, mc.torque),
            JointProperty::State => u16::from(mc.torque_enabled),
            other => {
                return Err(ProtocolError::UnsupportedProperty {
                    property: other,
                    operation: "sync write",
                });
            },
        };
        entries.insert(mc.id, raw as u32);
    }
    build_sync_write(address, data_bytes_for_property(property), &entries)
}

/// 读取多个舵机的同一属性：AX-12 逐个 READ，其余合并为一个 BULK_READ
pub fn byte_array_list_to_list_property<'a, I>(
    property: JointProperty,
    configurations: I,
) -> Result<Vec<DxlFrame>, ProtocolError>
where
    I: IntoIterator<Item = &'a MotorConfiguration>,
{
    let address = address_for_present_property(property);
    let length = data_bytes_for_property(property);
    let entries: Vec<BulkReadEntry> = configurations
        .into_iter()
        .map(|mc| BulkReadEntry {
            id: mc.id,
            model: mc.model,
            address,
            length,
        })
        .collect();
    build_bulk_read(&entries)
}

/// 设置姿态：依次生成力矩、速度、位置三个 SYNC_WRITE
///
/// 已处于目标值的舵机被跳过；某一类没有变化时不生成对应的帧。
/// 只处理 `configurations` 中存在的关节，姿态中的其他关节属于别的控制器。
pub fn byte_array_list_to_set_pose(
    configurations: &mut BTreeMap<Joint, MotorConfiguration>,
    pose: &Pose,
) -> Result<MotionPlan, ProtocolError> {
    let mut plan = MotionPlan::default();

    let mut torques = BTreeMap::new();
    for (joint, mc) in configurations.iter_mut() {
        let Some(&target) = pose.torques.get(joint) else {
            continue;
        };
        if mc.torque == target {
            continue;
        }
        torques.insert(mc.id, torque_to_dxl(mc, target) as u32);
        mc.torque = target;
    }
    plan.frames.extend(build_sync_write(GOAL_TORQUE, 2, &torques)?);

    let mut speeds = BTreeMap::new();
    for (joint, mc) in configurations.iter_mut() {
        let Some(&target) = pose.speeds.get(joint) else {
            continue;
        };
        if mc.speed == target {
            continue;
        }
        speeds.insert(mc.id, speed_to_dxl(mc, target) as u32);
        mc.speed = target;
    }
    plan.frames.extend(build_sync_write(GOAL_SPEED, 2, &speeds)?);

    let mut positions = BTreeMap::new();
    for (joint, mc) in configurations.iter_mut() {
        let Some(&target) = pose.positions.get(joint) else {
            continue;
        };
        if mc.position() == target {
            continue;
        }
        info!("Set pose position for {} to {:.0}", joint, target);
        let cmd = degree_to_dxl(mc, target);
        mc.set_position(cmd.degrees);
        plan.travel_time_ms = plan.travel_time_ms.max(mc.travel_time_ms());
        positions.insert(mc.id, cmd.raw as u32);
    }
    plan.frames.extend(build_sync_write(GOAL_POSITION, 2, &positions)?);

    debug!(
        "Pose: {} torques, {} speeds, {} positions, {}ms",
        torques.len(),
        speeds.len(),
        positions.len(),
        plan.travel_time_ms
    );
    Ok(plan)
}

/// 初始化：把超出限位的舵机移回合法位置（单个 SYNC_WRITE）
///
/// 当前位置恰为 0.0 的舵机视为从未读取，跳过限位检查。
/// 另外两条启发式避免双腿缠绕：髋 X 不超过 [`HIP_X_LIMIT`]，髋 Z 不低于 [`HIP_Z_LIMIT`]。
pub fn byte_array_list_to_initialize_positions(
    configurations: &mut BTreeMap<Joint, MotorConfiguration>,
) -> Result<MotionPlan, ProtocolError> {
    let mut targets: BTreeMap<Joint, f64> = BTreeMap::new();

    for (joint, mc) in configurations.iter() {
        let position = mc.position();
        if position == 0.0 {
            info!("{} never evaluated, ignored", joint);
        } else if position > mc.max_angle {
            info!("{} out-of-range at {:.0} (max={:.0})", joint, position, mc.max_angle);
            targets.insert(*joint, mc.max_angle);
        } else if position < mc.min_angle {
            info!("{} out-of-range at {:.0} (min={:.0})", joint, position, mc.min_angle);
            targets.insert(*joint, mc.min_angle);
        }
    }

    let pending = |joint: Joint, targets: &BTreeMap<Joint, f64>| {
        targets
            .get(&joint)
            .copied()
            .or_else(|| configurations.get(&joint).map(MotorConfiguration::position))
    };
    for joint in [Joint::LeftHipX, Joint::RightHipX] {
        if let Some(position) = pending(joint, &targets).filter(|p| *p > HIP_X_LIMIT) {
            info!("{} at {:.0} limited to {:.0}", joint, position, HIP_X_LIMIT);
            targets.insert(joint, HIP_X_LIMIT);
        }
    }
    for joint in [Joint::LeftHipZ, Joint::RightHipZ] {
        if let Some(position) = pending(joint, &targets).filter(|p| *p < HIP_Z_LIMIT) {
            info!("{} at {:.0} limited to {:.0}", joint, position, HIP_Z_LIMIT);
            targets.insert(joint, HIP_Z_LIMIT);
        }
    }

    let mut plan = MotionPlan::default();
    let mut entries = BTreeMap::new();
    for (joint, target) in targets {
        let Some(mc) = configurations.get_mut(&joint) else {
            continue;
        };
        let cmd = degree_to_dxl(mc, target);
        info!("Set position for {} to {:.0}", joint, cmd.degrees);
        mc.set_position(cmd.degrees);
        plan.travel_time_ms = plan.travel_time_ms.max(mc.travel_time_ms());
        entries.insert(mc.id, cmd.raw as u32);
    }
    plan.frames = build_sync_write(GOAL_POSITION, 2, &entries)?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BULK_READ, SYNC_WRITE, WRITE};
    use bert_model::DynamixelType;

    fn motor(joint: Joint, id: u8, model: DynamixelType) -> MotorConfiguration {
        let mut mc = MotorConfiguration::new(joint, model, id, "lower", true);
        mc.min_angle = 90.0;
        mc.max_angle = 270.0;
        mc.speed = 100.0;
        mc
    }

    fn lower_body() -> BTreeMap<Joint, MotorConfiguration> {
        let mut map = BTreeMap::new();
        map.insert(Joint::LeftHipX, motor(Joint::LeftHipX, 11, DynamixelType::Mx28));
        map.insert(Joint::RightHipX, motor(Joint::RightHipX, 21, DynamixelType::Mx28));
        map.insert(Joint::LeftKneeY, motor(Joint::LeftKneeY, 14, DynamixelType::Mx28));
        map.insert(Joint::RightKneeY, motor(Joint::RightKneeY, 24, DynamixelType::Mx28));
        let mut hip_z = motor(Joint::LeftHipZ, 12, DynamixelType::Mx28);
        hip_z.min_angle = -20.0;
        hip_z.max_angle = 20.0;
        map.insert(Joint::LeftHipZ, hip_z);
        map
    }

    #[test]
    fn test_get_frames() {
        assert_eq!(bytes_to_get_goals(3).params(), &[0x1E, 6]);
        assert_eq!(bytes_to_get_limits(3).params(), &[0x06, 10]);
        assert_eq!(bytes_to_get_property(3, JointProperty::Temperature).params(), &[0x2B, 1]);
        assert_eq!(bytes_to_get_property(3, JointProperty::Load).params(), &[0x28, 2]);
    }

    #[test]
    fn test_set_position_clamps_and_stores() {
        let mut mc = motor(Joint::LeftKneeY, 14, DynamixelType::Mx28);
        let frame = bytes_to_set_property(&mut mc, JointProperty::Position, 300.0).unwrap();
        assert_eq!(mc.position(), 270.0);
        assert_eq!(frame.instruction(), WRITE);
        // 270 * 4095 / 360 = 3071.25
        assert_eq!(frame.params(), &[0x1E, 0xFF, 0x0B]);
        // 0 → 270 @ 100°/s
        assert_eq!(mc.travel_time_ms(), 2700);
    }

    #[test]
    fn test_set_state_and_speed() {
        let mut mc = motor(Joint::LeftKneeY, 14, DynamixelType::Mx28);
        let frame = bytes_to_set_property(&mut mc, JointProperty::State, 0.0).unwrap();
        assert_eq!(frame.params(), &[0x18, 0x00]);
        assert!(!mc.torque_enabled);

        let frame = bytes_to_set_property(&mut mc, JointProperty::Speed, 350.0).unwrap();
        assert_eq!(frame.params(), &[0x20, 0xFF, 0x01]);
        assert_eq!(mc.speed, 350.0);

        assert!(bytes_to_set_property(&mut mc, JointProperty::Voltage, 12.0).is_err());
    }

    #[test]
    fn test_sync_set_property_uses_stored_values() {
        let motors = lower_body();
        let frames = byte_array_to_set_property(motors.values(), JointProperty::State).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].instruction(), SYNC_WRITE);
        // 地址、宽度，然后 5 个 [id, state]
        assert_eq!(frames[0].params().len(), 2 + 5 * 2);
        assert!(byte_array_to_set_property(motors.values(), JointProperty::Position).is_err());
    }

    #[test]
    fn test_list_property_splits_ax12() {
        let motors = [
            motor(Joint::NeckY, 31, DynamixelType::Ax12),
            motor(Joint::NeckZ, 32, DynamixelType::Ax12),
            motor(Joint::BustX, 33, DynamixelType::Mx64),
        ];
        let frames = byte_array_list_to_list_property(JointProperty::Position, motors.iter()).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].instruction(), READ);
        assert_eq!(frames[1].instruction(), READ);
        assert_eq!(frames[2].instruction(), BULK_READ);
        assert_eq!(frames[2].params(), &[0x00, 2, 33, 0x24]);
    }

    #[test]
    fn test_set_pose_skips_unchanged() {
        let mut motors = lower_body();
        motors.get_mut(&Joint::LeftKneeY).unwrap().set_position(180.0);

        let mut pose = Pose::default();
        pose.positions.insert(Joint::LeftKneeY, 180.0);
        pose.positions.insert(Joint::RightKneeY, 200.0);
        pose.speeds.insert(Joint::RightKneeY, 100.0);
        pose.torques.insert(Joint::RightKneeY, 1.0);

        let plan = byte_array_list_to_set_pose(&mut motors, &pose).unwrap();
        // 速度未变；力矩、位置各一帧
        assert_eq!(plan.frames.len(), 2);
        assert_eq!(plan.frames[0].params()[0], GOAL_TORQUE);
        assert_eq!(plan.frames[1].params()[0], GOAL_POSITION);
        // 只有右膝移动
        assert_eq!(plan.frames[1].params().len(), 2 + 3);
        assert_eq!(plan.frames[1].params()[2], 24);
        assert_eq!(motors[&Joint::RightKneeY].position(), 200.0);
        assert_eq!(motors[&Joint::RightKneeY].torque, 1.0);
        assert_eq!(plan.travel_time_ms, 2000);
    }

    #[test]
    fn test_set_pose_clamps_positions() {
        let mut motors = lower_body();
        let mut pose = Pose::default();
        pose.positions.insert(Joint::LeftKneeY, 300.0);
        byte_array_list_to_set_pose(&mut motors, &pose).unwrap();
        assert_eq!(motors[&Joint::LeftKneeY].position(), 270.0);
    }

    #[test]
    fn test_initialize_positions() {
        let mut motors = lower_body();
        // 左膝超上限，右膝从未读取，右髋 X 超过启发式上限（仍在限位内），左髋 Z 低于启发式下限
        motors.get_mut(&Joint::LeftKneeY).unwrap().set_position(280.0);
        motors.get_mut(&Joint::RightHipX).unwrap().set_position(200.0);
        motors.get_mut(&Joint::LeftHipZ).unwrap().set_position(-15.0);
        motors.get_mut(&Joint::LeftHipX).unwrap().set_position(120.0);

        let plan = byte_array_list_to_initialize_positions(&mut motors).unwrap();
        assert_eq!(plan.frames.len(), 1);
        assert_eq!(plan.frames[0].instruction(), SYNC_WRITE);
        // 3 个舵机：地址、宽度 + 3 * [id, lo, hi]
        assert_eq!(plan.frames[0].params().len(), 2 + 3 * 3);

        assert_eq!(motors[&Joint::LeftKneeY].position(), 270.0);
        assert_eq!(motors[&Joint::RightHipX].position(), HIP_X_LIMIT);
        assert_eq!(motors[&Joint::LeftHipZ].position(), HIP_Z_LIMIT);
        assert_eq!(motors[&Joint::LeftHipX].position(), 120.0);
        assert_eq!(motors[&Joint::RightKneeY].position(), 0.0);
        // 200 → 190 @ 100°/s 与 280 → 270 相同
        assert_eq!(plan.travel_time_ms, 100);
    }

    #[test]
    fn test_initialize_positions_nothing_to_do() {
        let mut motors = lower_body();
        let plan = byte_array_list_to_initialize_positions(&mut motors).unwrap();
        assert!(plan.frames.is_empty());
        assert_eq!(plan.travel_time_ms, 0);
    }
}
