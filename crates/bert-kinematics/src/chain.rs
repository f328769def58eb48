//! # 连杆树
//!
//! 所有连杆存放在一个 `Vec` 中（arena），父关系用下标 [`LinkId`] 表示。
//! 另有关节 → 连杆、附属件 → 连杆两张索引，O(1) 找到某个目标的末端连杆。
//!
//! ## 惰性坐标缓存
//!
//! - 设置关节角只标记该关节所在的连杆
//! - [`Chain::frame`] 先递归取得父连杆的位姿，再决定是否重算自己
//! - 每次重算后连杆的代数加一；子连杆记录计算时父连杆的代数，不一致即视为过期
//!
//! 因此不需要向子孙传播失效，也不会读到过期坐标。

use crate::description::SkeletonDescription;
use crate::link::{Link, LinkPoint, rpy_to_quaternion};
use crate::{KinematicsError, Target};
use bert_model::{Appendage, Joint};
use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace, warn};

/// 连杆在 arena 中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 连杆树
#[derive(Debug, Clone)]
pub struct Chain {
    name: String,
    links: Vec<Link>,
    by_name: HashMap<String, LinkId>,
    by_joint: BTreeMap<Joint, LinkId>,
    by_appendage: BTreeMap<Appendage, LinkId>,

    /// IMU 原点的固定偏移与姿态
    origin: Isometry3<f64>,
    /// IMU 读数（惯性系中的姿态）
    imu: UnitQuaternion<f64>,
    /// 根坐标系的代数，IMU 读数变化时加一
    root_generation: u64,
}

/// 由骨架描述构建连杆树
///
/// 以下情况返回 `KinematicsError::Configuration`：
/// - 连杆名重复，或父连杆名不存在
/// - 连杆没有或同时声明了 `joint` 与 `appendage`
/// - 末端为 `IMU` / `NONE`
/// - 同一关节或附属件出现在多个连杆末端
/// - 父连杆以附属件结尾
/// - 父关系成环
pub fn build_chain(description: &SkeletonDescription) -> Result<Chain, KinematicsError> {
    let mut by_name: HashMap<String, LinkId> = HashMap::with_capacity(description.links.len());
    for (index, link) in description.links.iter().enumerate() {
        if by_name.insert(link.name.clone(), LinkId(index)).is_some() {
            return Err(KinematicsError::Configuration(format!("duplicate link name '{}'", link.name)));
        }
    }

    let mut by_joint = BTreeMap::new();
    let mut by_appendage = BTreeMap::new();
    let mut links = Vec::with_capacity(description.links.len());

    for (index, desc) in description.links.iter().enumerate() {
        let id = LinkId(index);
        let terminal = match (desc.joint, desc.appendage) {
            (Some(Joint::Imu | Joint::None), None) | (None, Some(Appendage::None)) => {
                return Err(KinematicsError::Configuration(format!(
                    "link '{}' cannot terminate in IMU or NONE",
                    desc.name
                )));
            },
            (Some(joint), None) => {
                if let Some(previous) = by_joint.insert(joint, id) {
                    return Err(KinematicsError::Configuration(format!(
                        "joint {} terminates both '{}' and '{}'",
                        joint, description.links[previous.0].name, desc.name
                    )));
                }
                Target::Joint(joint)
            },
            (None, Some(appendage)) => {
                if let Some(previous) = by_appendage.insert(appendage, id) {
                    return Err(KinematicsError::Configuration(format!(
                        "appendage {} terminates both '{}' and '{}'",
                        appendage, description.links[previous.0].name, desc.name
                    )));
                }
                Target::Appendage(appendage)
            },
            (Some(_), Some(_)) | (None, None) => {
                return Err(KinematicsError::Configuration(format!(
                    "link '{}' must end in exactly one joint or appendage",
                    desc.name
                )));
            },
        };

        let parent = match &desc.parent {
            None => None,
            Some(parent) => {
                let parent_id = *by_name.get(parent).ok_or_else(|| {
                    KinematicsError::Configuration(format!("link '{}' has unknown parent '{}'", desc.name, parent))
                })?;
                if description.links[parent_id.0].appendage.is_some() {
                    return Err(KinematicsError::Configuration(format!(
                        "link '{}' cannot attach to appendage link '{}'",
                        desc.name, parent
                    )));
                }
                Some(parent_id)
            },
        };

        let end = LinkPoint::new(desc.xyz, desc.rpy, terminal);
        links.push(Link::new(desc.name.clone(), parent, end, desc.home));
    }

    for link in &links {
        if has_cycle(&links, link) {
            return Err(KinematicsError::Configuration(format!(
                "link '{}' is part of a parent cycle",
                link.name()
            )));
        }
    }

    let origin = Isometry3::from_parts(
        Translation3::from(Vector3::from(description.imu.xyz)),
        rpy_to_quaternion(description.imu.rpy),
    );
    debug!(
        "Built chain '{}': {} links, {} joints, {} appendages",
        description.name,
        links.len(),
        by_joint.len(),
        by_appendage.len()
    );

    Ok(Chain {
        name: description.name.clone(),
        links,
        by_name,
        by_joint,
        by_appendage,
        origin,
        imu: UnitQuaternion::identity(),
        root_generation: 0,
    })
}

fn has_cycle(links: &[Link], start: &Link) -> bool {
    let mut visited = HashSet::new();
    let mut current = start.parent();
    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = links[id.0].parent();
    }
    false
}

impl Chain {
    pub fn from_description(description: &SkeletonDescription) -> Result<Self, KinematicsError> {
        build_chain(description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// 所有连杆的下标（按描述文件中的顺序）
    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + use<> {
        (0..self.links.len()).map(LinkId)
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn link_by_name(&self, name: &str) -> Option<LinkId> {
        self.by_name.get(name).copied()
    }

    /// 以该关节结尾的连杆
    pub fn link_for_joint(&self, joint: Joint) -> Option<LinkId> {
        self.by_joint.get(&joint).copied()
    }

    /// 以该附属件结尾的连杆
    pub fn link_for_appendage(&self, appendage: Appendage) -> Option<LinkId> {
        self.by_appendage.get(&appendage).copied()
    }

    pub fn link_for_target(&self, target: Target) -> Option<LinkId> {
        match target {
            Target::Joint(joint) => self.link_for_joint(joint),
            Target::Appendage(appendage) => self.link_for_appendage(appendage),
        }
    }

    /// 直接挂在 IMU 原点上的连杆
    pub fn roots(&self) -> Vec<LinkId> {
        self.link_ids()
            .filter(|id| self.links[id.0].parent().is_none())
            .collect()
    }

    /// 已登记的关节（按枚举顺序）
    pub fn joints(&self) -> impl Iterator<Item = Joint> + '_ {
        self.by_joint.keys().copied()
    }

    /// 已登记的附属件（按枚举顺序）
    pub fn appendages(&self) -> impl Iterator<Item = Appendage> + '_ {
        self.by_appendage.keys().copied()
    }

    /// 从根到 `id` 的连杆序列（根在前）
    pub fn partial_chain(&self, id: LinkId) -> Vec<LinkId> {
        let mut path = vec![id];
        let mut current = self.links[id.0].parent();
        while let Some(parent) = current {
            path.push(parent);
            current = self.links[parent.0].parent();
        }
        path.reverse();
        path
    }

    /// 从根到关节的连杆序列；关节未登记时返回空序列
    pub fn partial_chain_to_joint(&self, joint: Joint) -> Vec<LinkId> {
        match self.link_for_joint(joint) {
            Some(id) => self.partial_chain(id),
            None => {
                warn!("partial_chain_to_joint: {} is not in the chain", joint);
                Vec::new()
            },
        }
    }

    /// 从根到附属件的连杆序列；附属件未登记时返回空序列
    pub fn partial_chain_to_appendage(&self, appendage: Appendage) -> Vec<LinkId> {
        match self.link_for_appendage(appendage) {
            Some(id) => self.partial_chain(id),
            None => {
                warn!("partial_chain_to_appendage: {} is not in the chain", appendage);
                Vec::new()
            },
        }
    }

    pub fn partial_chain_to(&self, target: Target) -> Vec<LinkId> {
        match target {
            Target::Joint(joint) => self.partial_chain_to_joint(joint),
            Target::Appendage(appendage) => self.partial_chain_to_appendage(appendage),
        }
    }

    /// 设置关节角（舵机读数，度）；角度变化时只标记该关节所在的连杆
    ///
    /// 关节不在树中时返回 `false`。
    pub fn set_joint_angle(&mut self, joint: Joint, degrees: f64) -> bool {
        match self.by_joint.get(&joint) {
            Some(id) => self.links[id.0].set_joint_angle(degrees),
            None => false,
        }
    }

    /// 当前关节角（弧度）
    pub fn joint_angle(&self, joint: Joint) -> Option<f64> {
        self.link_for_joint(joint).map(|id| self.links[id.0].joint_angle())
    }

    /// 更新 IMU 姿态；变化时所有连杆的缓存随之过期
    pub fn set_imu(&mut self, orientation: UnitQuaternion<f64>) {
        if orientation != self.imu {
            self.imu = orientation;
            self.root_generation += 1;
            trace!("IMU orientation updated (generation {})", self.root_generation);
        }
    }

    pub fn imu(&self) -> UnitQuaternion<f64> {
        self.imu
    }

    /// 根坐标系：IMU 姿态作用于固定原点
    pub fn root_frame(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::identity(), self.imu) * self.origin
    }

    /// 连杆的缓存是否需要重算（自身或任一祖先变化过）
    pub fn is_dirty(&self, id: LinkId) -> bool {
        let link = &self.links[id.0];
        if link.dirty {
            return true;
        }
        match link.parent() {
            Some(parent) => self.is_dirty(parent) || link.parent_generation != self.links[parent.0].generation,
            None => link.parent_generation != self.root_generation,
        }
    }

    /// 连杆末端的绝对位姿（惰性重算）
    pub fn frame(&mut self, id: LinkId) -> Isometry3<f64> {
        self.refresh(id).0
    }

    /// 连杆末端的绝对坐标（米）
    pub fn coordinates(&mut self, id: LinkId) -> Point3<f64> {
        Point3::from(self.frame(id).translation.vector)
    }

    fn refresh(&mut self, id: LinkId) -> (Isometry3<f64>, u64) {
        let (parent_frame, parent_generation) = match self.links[id.0].parent() {
            Some(parent) => self.refresh(parent),
            None => (self.root_frame(), self.root_generation),
        };

        let link = &mut self.links[id.0];
        if link.dirty || link.parent_generation != parent_generation {
            link.frame = parent_frame * link.local_step();
            link.parent_generation = parent_generation;
            link.generation += 1;
            link.dirty = false;
            trace!("Recomputed {} (generation {})", link.name(), link.generation);
        }
        (link.frame, link.generation)
    }
}
