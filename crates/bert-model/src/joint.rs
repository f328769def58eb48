//! 关节枚举
//!
//! Bert 的 25 个转动关节，外加 IMU（运动链根）和 `None` 两个哨兵值。
//! 关节是所有映射的键：舵机配置、运动链索引、协议批量读写。
//!
//! # 示例
//!
//! ```rust
//! use bert_model::Joint;
//!
//! let joint: Joint = "left_elbow_y".parse().unwrap();
//! assert_eq!(joint, Joint::LeftElbowY);
//! assert_eq!(joint.name(), "LEFT_ELBOW_Y");
//! assert_eq!(joint.to_text(), "left elbow");
//! ```

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 关节枚举
///
/// 命名沿用硬件配置文件中的大写蛇形名（如 `LEFT_HIP_X`），后缀表示转轴。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Joint {
    AbsX,
    AbsY,
    AbsZ,
    BustX,
    BustY,
    NeckY,
    NeckZ,
    LeftAnkleY,
    LeftShoulderZ,
    LeftElbowY,
    LeftHipX,
    LeftHipY,
    LeftHipZ,
    LeftKneeY,
    LeftShoulderX,
    LeftShoulderY,
    RightAnkleY,
    RightShoulderZ,
    RightElbowY,
    RightHipX,
    RightHipY,
    RightHipZ,
    RightKneeY,
    RightShoulderX,
    RightShoulderY,
    /// 惯性测量单元，运动链的根坐标系
    Imu,
    /// 未知关节
    None,
}

impl Joint {
    /// 所有由舵机驱动的关节（不含 `Imu` / `None`）
    pub const ALL: [Joint; 25] = [
        Joint::AbsX,
        Joint::AbsY,
        Joint::AbsZ,
        Joint::BustX,
        Joint::BustY,
        Joint::NeckY,
        Joint::NeckZ,
        Joint::LeftAnkleY,
        Joint::LeftShoulderZ,
        Joint::LeftElbowY,
        Joint::LeftHipX,
        Joint::LeftHipY,
        Joint::LeftHipZ,
        Joint::LeftKneeY,
        Joint::LeftShoulderX,
        Joint::LeftShoulderY,
        Joint::RightAnkleY,
        Joint::RightShoulderZ,
        Joint::RightElbowY,
        Joint::RightHipX,
        Joint::RightHipY,
        Joint::RightHipZ,
        Joint::RightKneeY,
        Joint::RightShoulderX,
        Joint::RightShoulderY,
    ];

    /// 配置文件中使用的规范名
    pub const fn name(self) -> &'static str {
        match self {
            Joint::AbsX => "ABS_X",
            Joint::AbsY => "ABS_Y",
            Joint::AbsZ => "ABS_Z",
            Joint::BustX => "BUST_X",
            Joint::BustY => "BUST_Y",
            Joint::NeckY => "NECK_Y",
            Joint::NeckZ => "NECK_Z",
            Joint::LeftAnkleY => "LEFT_ANKLE_Y",
            Joint::LeftShoulderZ => "LEFT_SHOULDER_Z",
            Joint::LeftElbowY => "LEFT_ELBOW_Y",
            Joint::LeftHipX => "LEFT_HIP_X",
            Joint::LeftHipY => "LEFT_HIP_Y",
            Joint::LeftHipZ => "LEFT_HIP_Z",
            Joint::LeftKneeY => "LEFT_KNEE_Y",
            Joint::LeftShoulderX => "LEFT_SHOULDER_X",
            Joint::LeftShoulderY => "LEFT_SHOULDER_Y",
            Joint::RightAnkleY => "RIGHT_ANKLE_Y",
            Joint::RightShoulderZ => "RIGHT_SHOULDER_Z",
            Joint::RightElbowY => "RIGHT_ELBOW_Y",
            Joint::RightHipX => "RIGHT_HIP_X",
            Joint::RightHipY => "RIGHT_HIP_Y",
            Joint::RightHipZ => "RIGHT_HIP_Z",
            Joint::RightKneeY => "RIGHT_KNEE_Y",
            Joint::RightShoulderX => "RIGHT_SHOULDER_X",
            Joint::RightShoulderY => "RIGHT_SHOULDER_Y",
            Joint::Imu => "IMU",
            Joint::None => "NONE",
        }
    }

    /// 可朗读的名称（如 "left elbow"）
    pub const fn to_text(self) -> &'static str {
        match self {
            Joint::AbsX => "abdomen x",
            Joint::AbsY => "abdomen y",
            Joint::AbsZ => "abdomen z",
            Joint::BustX => "chest horizontal",
            Joint::BustY => "chest vertical",
            Joint::NeckY => "neck y",
            Joint::NeckZ => "neck z",
            Joint::LeftAnkleY => "left ankle",
            Joint::LeftShoulderZ => "left shoulder z",
            Joint::LeftElbowY => "left elbow",
            Joint::LeftHipX => "left hip x",
            Joint::LeftHipY => "left hip y",
            Joint::LeftHipZ => "left hip z",
            Joint::LeftKneeY => "left knee",
            Joint::LeftShoulderX => "left shoulder x",
            Joint::LeftShoulderY => "left shoulder y",
            Joint::RightAnkleY => "right ankle",
            Joint::RightShoulderZ => "right shoulder z",
            Joint::RightElbowY => "right elbow",
            Joint::RightHipX => "right hip x",
            Joint::RightHipY => "right hip y",
            Joint::RightHipZ => "right hip z",
            Joint::RightKneeY => "right knee",
            Joint::RightShoulderX => "right shoulder x",
            Joint::RightShoulderY => "right shoulder y",
            Joint::Imu => "IMU",
            Joint::None => "unknown",
        }
    }

    /// 是否为舵机驱动的关节
    #[inline]
    pub const fn is_motorized(self) -> bool {
        !matches!(self, Joint::Imu | Joint::None)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Joint {
    type Err = ModelError;

    /// 大小写不敏感
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Joint::ALL
            .iter()
            .chain([Joint::Imu, Joint::None].iter())
            .copied()
            .find(|j| j.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownJoint(s.to_string()))
    }
}
