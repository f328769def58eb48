//! 关节角度来源
//!
//! 运动学层只依赖这个 trait 读取舵机位置，不关心数据由谁持有、如何同步。

use crate::{Joint, MotorConfiguration};
use std::collections::{BTreeMap, HashMap};

/// 按关节提供当前角度（度）
pub trait JointAngleSource {
    /// 关节当前位置；没有对应舵机时返回 `None`
    fn position(&self, joint: Joint) -> Option<f64>;
}

impl JointAngleSource for BTreeMap<Joint, MotorConfiguration> {
    fn position(&self, joint: Joint) -> Option<f64> {
        self.get(&joint).map(MotorConfiguration::position)
    }
}

impl JointAngleSource for HashMap<Joint, MotorConfiguration> {
    fn position(&self, joint: Joint) -> Option<f64> {
        self.get(&joint).map(MotorConfiguration::position)
    }
}

impl JointAngleSource for BTreeMap<Joint, f64> {
    fn position(&self, joint: Joint) -> Option<f64> {
        self.get(&joint).copied()
    }
}

impl JointAngleSource for HashMap<Joint, f64> {
    fn position(&self, joint: Joint) -> Option<f64> {
        self.get(&joint).copied()
    }
}

impl<T: JointAngleSource + ?Sized> JointAngleSource for &T {
    fn position(&self, joint: Joint) -> Option<f64> {
        (**self).position(joint)
    }
}
