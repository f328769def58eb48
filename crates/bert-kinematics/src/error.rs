//! 运动学错误类型

use thiserror::Error;

/// 运动学层错误
#[derive(Error, Debug)]
pub enum KinematicsError {
    /// 骨架描述不一致（启动时致命）
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 关节或末端没有对应的连杆
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
