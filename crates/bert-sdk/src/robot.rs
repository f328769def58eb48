//! 注册表 + 求解器的组合入口

use bert_driver::{DriverError, MotorRegistry};
use bert_kinematics::{ForwardSolver, KinematicsError, Target};
use bert_model::Joint;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// SDK 层错误
#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

/// 机器人：共享的舵机注册表 + 本线程持有的正运动学求解器
///
/// 注册表可以通过 [`Robot::registry`] 克隆给 IO 线程；求解时读取的是各舵机最新发布的快照。
#[derive(Debug)]
pub struct Robot {
    registry: Arc<MotorRegistry>,
    solver: ForwardSolver,
}

impl Robot {
    pub fn new(registry: Arc<MotorRegistry>, solver: ForwardSolver) -> Self {
        let robot = Self { registry, solver };
        for joint in robot.unmapped_joints() {
            warn!("{} is in the skeleton but has no motor", joint);
        }
        robot
    }

    /// 从骨架描述与舵机配置文件创建
    pub fn from_files<P, Q>(skeleton: P, motors: Q) -> Result<Self, SdkError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let solver = ForwardSolver::from_file(skeleton)?;
        let registry = Arc::new(MotorRegistry::from_file(motors)?);
        info!(
            "Robot ready: {} links, {} motors",
            solver.chain().len(),
            registry.len()
        );
        Ok(Self::new(registry, solver))
    }

    pub fn registry(&self) -> &Arc<MotorRegistry> {
        &self.registry
    }

    pub fn solver(&self) -> &ForwardSolver {
        &self.solver
    }

    /// 骨架中存在、注册表中没有舵机的关节（求解时保持上一次的角度）
    pub fn unmapped_joints(&self) -> Vec<Joint> {
        self.solver
            .chain()
            .joints()
            .filter(|joint| self.registry.get(*joint).is_none())
            .collect()
    }

    /// 更新 IMU 姿态
    pub fn set_imu(&mut self, orientation: UnitQuaternion<f64>) {
        self.solver.set_imu(orientation);
    }

    /// 目标的当前坐标（米）
    pub fn locate(&mut self, target: impl Into<Target>) -> Result<Point3<f64>, SdkError> {
        Ok(self.solver.compute_position(self.registry.as_ref(), target)?)
    }

    /// 目标的当前指向
    pub fn direction(&mut self, target: impl Into<Target>) -> Result<Unit<Vector3<f64>>, SdkError> {
        Ok(self.solver.compute_direction(self.registry.as_ref(), target)?)
    }

    /// 位置与指向的文本描述
    pub fn describe(&mut self, target: impl Into<Target>) -> Result<String, SdkError> {
        Ok(self.solver.describe(self.registry.as_ref(), target)?)
    }

    /// 所有已登记目标的当前坐标
    pub fn target_positions(&mut self) -> BTreeMap<Target, Point3<f64>> {
        self.solver.target_positions(self.registry.as_ref())
    }
}
