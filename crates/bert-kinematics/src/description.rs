//! 骨架描述文件
//!
//! ```toml
//! name = "bert"
//!
//! [imu]
//! xyz = [0.0, 0.0, 0.0]
//! rpy = [0.0, 0.0, 0.0]
//!
//! [[link]]
//! name = "pelvis"
//! joint = "ABS_Y"
//! xyz = [0.0, 0.0, 0.1]
//! home = 180.0
//!
//! [[link]]
//! name = "head"
//! parent = "neck"
//! appendage = "NOSE"
//! xyz = [0.08, 0.0, 0.05]
//! ```
//!
//! - `xyz`：连杆末端相对连杆原点的偏移（米）
//! - `rpy`：连杆末端的固定姿态（度，绕 x、y、z）
//! - `home`：关节伸直时的舵机读数（度）
//! - 省略 `parent` 的连杆挂在 IMU 原点上

use crate::KinematicsError;
use bert_model::{Appendage, Joint};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 整个骨架
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDescription {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub imu: ImuDescription,
    #[serde(rename = "link", default)]
    pub links: Vec<LinkDescription>,
}

/// IMU 原点（根坐标系）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuDescription {
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
}

/// 单个连杆
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub joint: Option<Joint>,
    #[serde(default)]
    pub appendage: Option<Appendage>,
    #[serde(default)]
    pub xyz: [f64; 3],
    #[serde(default)]
    pub rpy: [f64; 3],
    #[serde(default)]
    pub home: f64,
}

impl LinkDescription {
    /// 以关节结尾的连杆
    pub fn joint(name: impl Into<String>, parent: Option<&str>, joint: Joint, xyz: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            joint: Some(joint),
            xyz,
            ..Self::default()
        }
    }

    /// 以末端结尾的连杆
    pub fn appendage(name: impl Into<String>, parent: Option<&str>, appendage: Appendage, xyz: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            appendage: Some(appendage),
            xyz,
            ..Self::default()
        }
    }
}

impl SkeletonDescription {
    pub fn from_toml_str(content: &str) -> Result<Self, KinematicsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, KinematicsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let description = Self::from_toml_str(&content)?;
        info!(
            "Loaded skeleton '{}' with {} links from {}",
            description.name,
            description.links.len(),
            path.display()
        );
        Ok(description)
    }
}
