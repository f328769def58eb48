//! 连杆与连杆端点

use crate::{LinkId, Target};
use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

/// 由 roll / pitch / yaw（度）构造固定姿态
pub(crate) fn rpy_to_quaternion(rpy: [f64; 3]) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(rpy[0].to_radians(), rpy[1].to_radians(), rpy[2].to_radians())
}

/// 连杆末端：相对连杆原点的偏移与固定姿态，以及末端是关节还是附属件
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPoint {
    /// 偏移（米）
    pub offset: Vector3<f64>,
    /// 固定姿态
    pub orientation: UnitQuaternion<f64>,
    pub terminal: Target,
}

impl LinkPoint {
    /// `xyz` 单位为米，`rpy` 单位为度
    pub fn new(xyz: [f64; 3], rpy: [f64; 3], terminal: Target) -> Self {
        Self {
            offset: Vector3::from(xyz),
            orientation: rpy_to_quaternion(rpy),
            terminal,
        }
    }
}

/// 连杆：两个连接点之间的刚体段
///
/// 关节角在连杆末端绕局部 z 轴作用。坐标缓存由 [`Chain`](crate::Chain) 维护：
/// `dirty` 只在本连杆的角度变化时置位；祖先的变化通过代数（generation）比较发现。
#[derive(Debug, Clone)]
pub struct Link {
    name: String,
    parent: Option<LinkId>,
    end: LinkPoint,
    /// 伸直时的舵机读数（度）
    home: f64,
    /// 关节角（弧度）
    angle: f64,

    pub(crate) dirty: bool,
    /// 缓存的绝对位姿（末端坐标系）
    pub(crate) frame: Isometry3<f64>,
    /// 每次重算加一
    pub(crate) generation: u64,
    /// 上次重算时父连杆（或根）的代数
    pub(crate) parent_generation: u64,
}

impl Link {
    pub(crate) fn new(name: String, parent: Option<LinkId>, end: LinkPoint, home: f64) -> Self {
        Self {
            name,
            parent,
            end,
            home,
            angle: 0.0,
            dirty: true,
            frame: Isometry3::identity(),
            generation: 0,
            parent_generation: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 靠近根的父连杆；挂在 IMU 原点上的连杆返回 `None`
    pub fn parent(&self) -> Option<LinkId> {
        self.parent
    }

    pub fn end(&self) -> &LinkPoint {
        &self.end
    }

    pub fn home(&self) -> f64 {
        self.home
    }

    /// 当前关节角（弧度）
    pub fn joint_angle(&self) -> f64 {
        self.angle
    }

    /// 本连杆自身的脏标记（不含祖先）
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 由舵机读数（度）更新关节角；角度确实变化时置脏并返回 `true`
    ///
    /// 以附属件结尾的连杆没有关节，角度恒为 0。
    pub fn set_joint_angle(&mut self, degrees: f64) -> bool {
        if matches!(self.end.terminal, Target::Appendage(_)) {
            return false;
        }
        let angle = (degrees - self.home).to_radians();
        if angle == self.angle {
            return false;
        }
        self.angle = angle;
        self.dirty = true;
        true
    }

    /// 本连杆的局部变换：平移到末端，再施加固定姿态与关节转角
    pub fn local_step(&self) -> Isometry3<f64> {
        let rotation = self.end.orientation * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.angle);
        Isometry3::from_parts(Translation3::from(self.end.offset), rotation)
    }
}
