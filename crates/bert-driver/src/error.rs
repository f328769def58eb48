//! Driver 层错误类型定义

use bert_model::{Joint, ModelError};
use bert_protocol::ProtocolError;
use thiserror::Error;

/// Driver 层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 帧或设备错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置加载或校验错误
    #[error("Configuration error: {0}")]
    Model(#[from] ModelError),

    /// 注册表中没有该 ID 的舵机
    #[error("Unknown motor id: {0}")]
    UnknownMotorId(u8),

    /// 注册表中没有该关节的舵机
    #[error("No motor registered for joint {0}")]
    UnknownJoint(Joint),
}
