//! 舵机注册表
//!
//! 按关节保存每个舵机的最新快照。读取端（运动学求解、监控）无锁；
//! 写入端（协议应答、命令）复制记录、修改后整体替换。

use crate::DriverError;
use arc_swap::ArcSwap;
use bert_model::{Joint, JointAngleSource, JointProperty, ModelError, MotorConfiguration, load_motor_configurations};
use bert_protocol::{
    DxlFrame, Goals, Limits, MotionPlan, ParameterUpdate, Pose, ProtocolError, StatusPacket,
    byte_array_list_to_initialize_positions, byte_array_list_to_list_property, byte_array_list_to_set_pose,
    byte_array_to_set_property, bytes_to_get_goals, bytes_to_get_limits, bytes_to_get_property,
    bytes_to_set_property, parse_status, update_goals_from_bytes, update_limits_from_bytes,
    update_parameter_array_from_bytes, update_parameter_from_bytes,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// 舵机注册表
///
/// - 读：`ArcSwap::load`，无锁，拿到的是某一时刻完整的记录
/// - 写：持有 `writer` 锁，克隆 → 修改 → `store`，写入之间不会互相覆盖
///
/// 注册表中的关节集合在创建后固定不变。
#[derive(Debug)]
pub struct MotorRegistry {
    motors: BTreeMap<Joint, ArcSwap<MotorConfiguration>>,
    ids: HashMap<u8, Joint>,
    writer: Mutex<()>,
}

impl MotorRegistry {
    /// 从配置表创建注册表；总线 ID 重复时返回错误
    pub fn new(configurations: BTreeMap<Joint, MotorConfiguration>) -> Result<Self, DriverError> {
        let mut ids = HashMap::with_capacity(configurations.len());
        for (joint, mc) in &configurations {
            if let Some(first) = ids.insert(mc.id, *joint) {
                return Err(ModelError::DuplicateId {
                    id: mc.id,
                    first: first.to_string(),
                    second: joint.to_string(),
                }
                .into());
            }
        }

        let motors = configurations
            .into_iter()
            .map(|(joint, mc)| (joint, ArcSwap::from_pointee(mc)))
            .collect();
        Ok(Self {
            motors,
            ids,
            writer: Mutex::new(()),
        })
    }

    /// 从 TOML 舵机配置文件创建注册表
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DriverError> {
        let registry = Self::new(load_motor_configurations(path)?)?;
        info!("Motor registry ready with {} motors", registry.len());
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.motors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motors.is_empty()
    }

    /// 已注册的关节（按枚举顺序）
    pub fn joints(&self) -> impl Iterator<Item = Joint> + '_ {
        self.motors.keys().copied()
    }

    /// 所有控制器名
    pub fn controllers(&self) -> BTreeSet<String> {
        self.motors.values().map(|slot| slot.load().controller.clone()).collect()
    }

    /// 关节当前快照（无锁）
    pub fn get(&self, joint: Joint) -> Option<Arc<MotorConfiguration>> {
        self.motors.get(&joint).map(|slot| slot.load_full())
    }

    /// 按总线 ID 查找快照（无锁）
    pub fn get_by_id(&self, id: u8) -> Option<Arc<MotorConfiguration>> {
        self.ids.get(&id).and_then(|joint| self.get(*joint))
    }

    /// 关节对应的总线 ID
    pub fn id_of(&self, joint: Joint) -> Result<u8, DriverError> {
        Ok(self.slot(joint)?.load().id)
    }

    /// 总线 ID 对应的关节
    pub fn joint_of(&self, id: u8) -> Result<Joint, DriverError> {
        self.ids.get(&id).copied().ok_or(DriverError::UnknownMotorId(id))
    }

    /// 复制出所有舵机的当前记录
    ///
    /// 每条记录各自完整，但不同舵机的记录可能来自不同时刻。
    pub fn snapshot(&self) -> BTreeMap<Joint, MotorConfiguration> {
        self.select(None)
    }

    /// 复制出某个控制器下所有舵机的当前记录
    pub fn controller(&self, name: &str) -> BTreeMap<Joint, MotorConfiguration> {
        self.select(Some(name))
    }

    fn select(&self, controller: Option<&str>) -> BTreeMap<Joint, MotorConfiguration> {
        self.motors
            .iter()
            .map(|(joint, slot)| (*joint, slot.load().as_ref().clone()))
            .filter(|(_, mc)| controller.is_none_or(|name| mc.controller == name))
            .collect()
    }

    fn slot(&self, joint: Joint) -> Result<&ArcSwap<MotorConfiguration>, DriverError> {
        self.motors.get(&joint).ok_or(DriverError::UnknownJoint(joint))
    }

    /// 单个舵机的写事务：失败时不发布任何改动
    fn modify<R>(
        &self,
        joint: Joint,
        f: impl FnOnce(&mut MotorConfiguration) -> Result<R, ProtocolError>,
    ) -> Result<R, DriverError> {
        let slot = self.slot(joint)?;
        let _guard = self.writer.lock();
        let mut next = slot.load().as_ref().clone();
        let result = f(&mut next)?;
        slot.store(Arc::new(next));
        Ok(result)
    }

    /// 多个舵机的写事务：只发布内容有变化的记录
    fn modify_many<R>(
        &self,
        controller: Option<&str>,
        f: impl FnOnce(&mut BTreeMap<Joint, MotorConfiguration>) -> Result<R, ProtocolError>,
    ) -> Result<R, DriverError> {
        let _guard = self.writer.lock();
        let mut selection = self.select(controller);
        let result = f(&mut selection)?;

        let mut published = 0;
        for (joint, next) in selection {
            let Some(slot) = self.motors.get(&joint) else {
                continue;
            };
            if **slot.load() != next {
                slot.store(Arc::new(next));
                published += 1;
            }
        }
        trace!("Published {} updated motor records", published);
        Ok(result)
    }

    // ==================== 读请求（只生成帧） ====================

    /// READ 目标块（位置、速度、力矩）
    pub fn request_goals(&self, joint: Joint) -> Result<DxlFrame, DriverError> {
        Ok(bytes_to_get_goals(self.id_of(joint)?))
    }

    /// READ EEPROM 限位块
    pub fn request_limits(&self, joint: Joint) -> Result<DxlFrame, DriverError> {
        Ok(bytes_to_get_limits(self.id_of(joint)?))
    }

    /// READ 单个属性
    pub fn request_property(&self, joint: Joint, property: JointProperty) -> Result<DxlFrame, DriverError> {
        Ok(bytes_to_get_property(self.id_of(joint)?, property))
    }

    /// 批量读取同一属性；`controller` 为 `None` 时覆盖全部舵机
    pub fn request_property_list(
        &self,
        property: JointProperty,
        controller: Option<&str>,
    ) -> Result<Vec<DxlFrame>, DriverError> {
        let selection = self.select(controller);
        Ok(byte_array_list_to_list_property(property, selection.values())?)
    }

    // ==================== 命令（生成帧并记下目标值） ====================

    /// 设置单个舵机的目标属性
    pub fn set_property(&self, joint: Joint, property: JointProperty, value: f64) -> Result<DxlFrame, DriverError> {
        self.modify(joint, |mc| bytes_to_set_property(mc, property, value))
    }

    /// 把已保存的速度、力矩或力矩使能同步写出
    pub fn sync_property(
        &self,
        property: JointProperty,
        controller: Option<&str>,
    ) -> Result<Vec<DxlFrame>, DriverError> {
        let selection = self.select(controller);
        Ok(byte_array_to_set_property(selection.values(), property)?)
    }

    /// 设置姿态；`controller` 限定只处理该控制器下的关节
    pub fn set_pose(&self, controller: Option<&str>, pose: &Pose) -> Result<MotionPlan, DriverError> {
        let plan = self.modify_many(controller, |selection| byte_array_list_to_set_pose(selection, pose))?;
        debug!("Pose plan: {} frames, {}ms", plan.frames.len(), plan.travel_time_ms);
        Ok(plan)
    }

    /// 把超出限位的舵机移回合法位置
    pub fn initialize_positions(&self, controller: Option<&str>) -> Result<MotionPlan, DriverError> {
        self.modify_many(controller, byte_array_list_to_initialize_positions)
    }

    // ==================== 应答（唯一的状态更新路径） ====================

    /// 应用目标块应答
    pub fn apply_goals(&self, joint: Joint, bytes: &[u8]) -> Result<Goals, DriverError> {
        self.modify(joint, |mc| update_goals_from_bytes(mc, bytes))
    }

    /// 应用限位块应答
    pub fn apply_limits(&self, joint: Joint, bytes: &[u8]) -> Result<Limits, DriverError> {
        self.modify(joint, |mc| update_limits_from_bytes(mc, bytes))
    }

    /// 应用单个属性应答
    pub fn apply_parameter(&self, joint: Joint, property: JointProperty, bytes: &[u8]) -> Result<f64, DriverError> {
        self.modify(joint, |mc| update_parameter_from_bytes(property, mc, bytes))
    }

    /// 应用连续到达的多个属性应答；舵机按应答 ID 匹配，失败的舵机记入 `errors`
    pub fn apply_parameter_array(&self, property: JointProperty, bytes: &[u8]) -> ParameterUpdate {
        let outcome = self.modify_many(None, |selection| {
            Ok(update_parameter_array_from_bytes(property, selection.values_mut(), bytes))
        });
        // 闭包本身不会失败
        outcome.unwrap_or_default()
    }

    /// 检查写命令的应答：帧合法、错误位为零、ID 已注册
    pub fn check_acknowledgement(&self, bytes: &[u8]) -> Result<Joint, DriverError> {
        let packet = parse_status(bytes).and_then(StatusPacket::check)?;
        self.joint_of(packet.id)
    }
}

impl JointAngleSource for MotorRegistry {
    fn position(&self, joint: Joint) -> Option<f64> {
        self.motors.get(&joint).map(|slot| slot.load().position())
    }
}
