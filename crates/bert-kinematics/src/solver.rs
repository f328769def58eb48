//! # 正运动学求解
//!
//! 1. 从连杆树取出根到目标的连杆序列
//! 2. 以 IMU 姿态和固定原点作为初始位姿
//! 3. 按顺序刷新每个连杆的关节角（舵机可能已经转动）
//! 4. 依次右乘每个连杆的局部变换
//!
//! 结果的平移部分是目标的位置，旋转后的 x 轴是末端连杆的指向。

use crate::chain::{Chain, LinkId, build_chain};
use crate::description::SkeletonDescription;
use crate::KinematicsError;
use bert_model::{Appendage, Joint, JointAngleSource};
use nalgebra::{Isometry3, Point3, Unit, UnitQuaternion, Vector3};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// 打印前去掉浮点噪声，避免出现 `-0.000`
fn tidy(value: f64) -> f64 {
    if value.abs() < 5e-4 { 0.0 } else { value }
}

/// 求解目标：关节或附属件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Joint(Joint),
    Appendage(Appendage),
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Joint(joint) => joint.name(),
            Target::Appendage(appendage) => appendage.name(),
        }
    }

    /// 可朗读的名称
    pub fn to_text(self) -> String {
        match self {
            Target::Joint(joint) => joint.to_text().to_string(),
            Target::Appendage(appendage) => appendage.to_text(),
        }
    }
}

impl From<Joint> for Target {
    fn from(joint: Joint) -> Self {
        Target::Joint(joint)
    }
}

impl From<Appendage> for Target {
    fn from(appendage: Appendage) -> Self {
        Target::Appendage(appendage)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Target {
    type Err = KinematicsError;

    /// 先按关节名匹配，再按附属件名匹配（大小写不敏感）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(joint) = s.parse::<Joint>() {
            return Ok(Target::Joint(joint));
        }
        s.parse::<Appendage>()
            .map(Target::Appendage)
            .map_err(|_| KinematicsError::UnknownTarget(s.to_string()))
    }
}

/// 正运动学求解器
///
/// 持有连杆树（及其坐标缓存）；舵机角度在每次求解时从 [`JointAngleSource`] 读取。
#[derive(Debug, Clone)]
pub struct ForwardSolver {
    chain: Chain,
}

impl ForwardSolver {
    pub fn new(chain: Chain) -> Self {
        Self { chain }
    }

    pub fn from_description(description: &SkeletonDescription) -> Result<Self, KinematicsError> {
        Ok(Self::new(build_chain(description)?))
    }

    /// 从 TOML 骨架描述文件创建
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, KinematicsError> {
        Self::from_description(&SkeletonDescription::load_from_file(path)?)
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    /// 更新 IMU 姿态（每个求解周期一次）
    pub fn set_imu(&mut self, orientation: UnitQuaternion<f64>) {
        self.chain.set_imu(orientation);
    }

    fn resolve(&self, target: Target) -> Result<Vec<LinkId>, KinematicsError> {
        let path = self.chain.partial_chain_to(target);
        if path.is_empty() {
            warn!("No chain leads to {}", target);
            return Err(KinematicsError::UnknownTarget(target.to_string()));
        }
        Ok(path)
    }

    /// 从舵机读数刷新一组连杆的关节角
    fn refresh<S>(&mut self, motors: &S, path: &[LinkId])
    where
        S: JointAngleSource + ?Sized,
    {
        for id in path {
            let Target::Joint(joint) = self.chain.link(*id).end().terminal else {
                continue;
            };
            match motors.position(joint) {
                Some(degrees) => {
                    self.chain.set_joint_angle(joint, degrees);
                },
                None => trace!("No motor reading for {}, keeping previous angle", joint),
            }
        }
    }

    /// 目标末端坐标系的绝对位姿
    pub fn compute_pose<S>(&mut self, motors: &S, target: impl Into<Target>) -> Result<Isometry3<f64>, KinematicsError>
    where
        S: JointAngleSource + ?Sized,
    {
        let target = target.into();
        let path = self.resolve(target)?;
        self.refresh(motors, &path);

        let mut pose = self.chain.root_frame();
        for id in &path {
            let link = self.chain.link(*id);
            pose *= link.local_step();
            trace!(
                "{} end {}: ({:.3}, {:.3}, {:.3})",
                link.name(),
                link.end().terminal,
                pose.translation.x,
                pose.translation.y,
                pose.translation.z
            );
        }
        Ok(pose)
    }

    /// 目标的绝对坐标（米）
    pub fn compute_position<S>(&mut self, motors: &S, target: impl Into<Target>) -> Result<Point3<f64>, KinematicsError>
    where
        S: JointAngleSource + ?Sized,
    {
        let pose = self.compute_pose(motors, target)?;
        Ok(Point3::from(pose.translation.vector))
    }

    /// 末端连杆的指向（目标坐标系的 x 轴）
    pub fn compute_direction<S>(
        &mut self,
        motors: &S,
        target: impl Into<Target>,
    ) -> Result<Unit<Vector3<f64>>, KinematicsError>
    where
        S: JointAngleSource + ?Sized,
    {
        let pose = self.compute_pose(motors, target)?;
        Ok(pose.rotation * Vector3::x_axis())
    }

    /// 位置与指向的文本描述，如 `0.300,0.250,0.500 [0.000,1.000,0.000]`
    pub fn describe<S>(&mut self, motors: &S, target: impl Into<Target>) -> Result<String, KinematicsError>
    where
        S: JointAngleSource + ?Sized,
    {
        let pose = self.compute_pose(motors, target)?;
        let p = pose.translation.vector.map(tidy);
        let d = (pose.rotation * Vector3::x()).map(tidy);
        Ok(format!(
            "{:.3},{:.3},{:.3} [{:.3},{:.3},{:.3}]",
            p.x, p.y, p.z, d.x, d.y, d.z
        ))
    }

    /// 所有已登记目标（关节与附属件）的绝对坐标，使用连杆树缓存
    pub fn target_positions<S>(&mut self, motors: &S) -> BTreeMap<Target, Point3<f64>>
    where
        S: JointAngleSource + ?Sized,
    {
        let all: Vec<LinkId> = self.chain.link_ids().collect();
        self.refresh(motors, &all);

        let mut positions = BTreeMap::new();
        for id in all {
            let target = self.chain.link(id).end().terminal;
            positions.insert(target, self.chain.coordinates(id));
        }
        debug!("Computed {} target positions", positions.len());
        positions
    }

    /// 所有已登记关节的绝对坐标
    pub fn joint_positions<S>(&mut self, motors: &S) -> BTreeMap<Joint, Point3<f64>>
    where
        S: JointAngleSource + ?Sized,
    {
        self.target_positions(motors)
            .into_iter()
            .filter_map(|(target, point)| match target {
                Target::Joint(joint) => Some((joint, point)),
                Target::Appendage(_) => None,
            })
            .collect()
    }
}
