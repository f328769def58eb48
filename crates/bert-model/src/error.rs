//! 数据模型错误类型定义

use thiserror::Error;

/// 模型层错误类型
#[derive(Error, Debug)]
pub enum ModelError {
    /// 读取配置文件失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Invalid motor configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// 无法识别的关节名
    #[error("Unknown joint name: {0}")]
    UnknownJoint(String),

    /// 无法识别的末端名
    #[error("Unknown appendage name: {0}")]
    UnknownAppendage(String),

    /// 无法识别的舵机型号
    #[error("Unknown Dynamixel model: {0}")]
    UnknownModel(String),

    /// 无法识别的属性名
    #[error("Unknown joint property: {0}")]
    UnknownProperty(String),

    /// 同一关节配置了多个舵机
    #[error("Joint {0} is configured more than once")]
    DuplicateJoint(String),

    /// 同一总线 ID 被多个舵机占用
    #[error("Motor id {id} is shared by {first} and {second}")]
    DuplicateId {
        id: u8,
        first: String,
        second: String,
    },

    /// 配置值非法（如 min_angle > max_angle）
    #[error("Invalid value for {joint}.{field}: {reason}")]
    InvalidValue {
        joint: String,
        field: &'static str,
        reason: String,
    },
}
