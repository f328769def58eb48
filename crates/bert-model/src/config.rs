//! # 舵机静态配置
//!
//! 启动时从 TOML 文件创建所有 `MotorConfiguration`：
//!
//! ```toml
//! [[motor]]
//! joint = "LEFT_ELBOW_Y"
//! type = "MX28"
//! id = 21
//! controller = "upper"
//! offset = 0.0
//! direct = true
//! min_angle = 45.0
//! max_angle = 185.0
//! ```

use crate::{DynamixelType, Joint, ModelError, MotorConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// 配置文件根结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MotorFile {
    #[serde(default, rename = "motor")]
    pub motors: Vec<MotorEntry>,
}

/// 单个舵机条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorEntry {
    pub joint: Joint,
    #[serde(rename = "type")]
    pub model: DynamixelType,
    pub id: u8,
    #[serde(default)]
    pub controller: String,
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_direct")]
    pub direct: bool,
    pub min_angle: f64,
    pub max_angle: f64,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub max_torque: Option<f64>,
}

fn default_direct() -> bool {
    true
}

impl MotorEntry {
    fn into_configuration(self) -> MotorConfiguration {
        let mut mc = MotorConfiguration::new(self.joint, self.model, self.id, self.controller, self.direct);
        mc.offset = self.offset;
        mc.min_angle = self.min_angle;
        mc.max_angle = self.max_angle;
        if let Some(speed) = self.max_speed {
            mc.max_speed = speed;
        }
        if let Some(torque) = self.max_torque {
            mc.max_torque = torque;
        }
        mc
    }
}

impl MotorFile {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> Result<Self, ModelError> {
        Ok(toml::from_str(content)?)
    }

    /// 从文件加载
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 校验并转换为按关节索引的配置表
    ///
    /// 关节或 ID 重复、限位倒置、关节为 `IMU`/`NONE` 时返回错误。
    pub fn into_configurations(self) -> Result<BTreeMap<Joint, MotorConfiguration>, ModelError> {
        let mut by_joint: BTreeMap<Joint, MotorConfiguration> = BTreeMap::new();
        let mut by_id: BTreeMap<u8, Joint> = BTreeMap::new();

        for entry in self.motors {
            let joint = entry.joint;
            if !joint.is_motorized() {
                return Err(ModelError::InvalidValue {
                    joint: joint.to_string(),
                    field: "joint",
                    reason: "not a motorized joint".to_string(),
                });
            }
            if entry.min_angle > entry.max_angle {
                return Err(ModelError::InvalidValue {
                    joint: joint.to_string(),
                    field: "min_angle",
                    reason: format!("{} exceeds max_angle {}", entry.min_angle, entry.max_angle),
                });
            }
            if by_joint.contains_key(&joint) {
                return Err(ModelError::DuplicateJoint(joint.to_string()));
            }
            if let Some(first) = by_id.insert(entry.id, joint) {
                return Err(ModelError::DuplicateId {
                    id: entry.id,
                    first: first.to_string(),
                    second: joint.to_string(),
                });
            }
            debug!("Configured {} as {} id {}", joint, entry.model, entry.id);
            by_joint.insert(joint, entry.into_configuration());
        }

        Ok(by_joint)
    }
}

/// 加载舵机配置文件并返回按关节索引的配置表
pub fn load_motor_configurations<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<Joint, MotorConfiguration>, ModelError> {
    let path = path.as_ref();
    let configurations = MotorFile::load_from_file(path)?.into_configurations()?;
    info!("Loaded {} motor configurations from {}", configurations.len(), path.display());
    Ok(configurations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[motor]]
joint = "LEFT_ELBOW_Y"
type = "MX28"
id = 21
controller = "upper"
min_angle = 45.0
max_angle = 185.0

[[motor]]
joint = "NECK_Z"
type = "AX12"
id = 36
controller = "upper"
offset = -10.0
direct = false
min_angle = 60.0
max_angle = 240.0
max_torque = 1.0
"#;

    #[test]
    fn test_parse_sample() {
        let configs = MotorFile::from_toml_str(SAMPLE).unwrap().into_configurations().unwrap();
        assert_eq!(configs.len(), 2);

        let elbow = &configs[&Joint::LeftElbowY];
        assert_eq!(elbow.model, DynamixelType::Mx28);
        assert_eq!(elbow.id, 21);
        assert!(elbow.direct);
        assert_eq!(elbow.max_torque, 1.9);

        let neck = &configs[&Joint::NeckZ];
        assert!(!neck.direct);
        assert_eq!(neck.offset, -10.0);
        assert_eq!(neck.max_torque, 1.0);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let content = r#"
[[motor]]
joint = "LEFT_HIP_X"
type = "MX28"
id = 11
min_angle = 0.0
max_angle = 10.0

[[motor]]
joint = "RIGHT_HIP_X"
type = "MX28"
id = 11
min_angle = 0.0
max_angle = 10.0
"#;
        let err = MotorFile::from_toml_str(content).unwrap().into_configurations().unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { id: 11, .. }));
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let content = r#"
[[motor]]
joint = "LEFT_HIP_X"
type = "MX28"
id = 11
min_angle = 0.0
max_angle = 10.0

[[motor]]
joint = "LEFT_HIP_X"
type = "MX28"
id = 12
min_angle = 0.0
max_angle = 10.0
"#;
        let err = MotorFile::from_toml_str(content).unwrap().into_configurations().unwrap_err();
        assert!(matches!(err, ModelError::DuplicateJoint(_)));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let content = r#"
[[motor]]
joint = "LEFT_HIP_X"
type = "MX28"
id = 11
min_angle = 20.0
max_angle = 10.0
"#;
        let err = MotorFile::from_toml_str(content).unwrap().into_configurations().unwrap_err();
        assert!(matches!(err, ModelError::InvalidValue { field: "min_angle", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let configs = load_motor_configurations(file.path()).unwrap();
        assert!(configs.contains_key(&Joint::NeckZ));
    }

    #[test]
    fn test_unknown_model_is_toml_error() {
        let content = r#"
[[motor]]
joint = "LEFT_HIP_X"
type = "XL320"
id = 11
min_angle = 0.0
max_angle = 10.0
"#;
        assert!(matches!(MotorFile::from_toml_str(content), Err(ModelError::Toml(_))));
    }
}
