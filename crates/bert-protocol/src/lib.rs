//! # Bert Protocol
//!
//! Dynamixel Protocol 1 串口协议编解码（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 指令码与控制表地址
//! - `conversions`: 工程单位（度、度/秒、N·m）与寄存器原始值互换
//! - `frame`: 帧结构与校验和
//! - `message`: 纯函数帧构建（PING / READ / WRITE / SYNC_WRITE / BULK_READ）
//! - `status`: 状态帧解析、错误位描述
//! - `commands`: 命令路径：构建帧并把目标值写回 `MotorConfiguration`
//! - `update`: 读路径：解析响应并更新 `MotorConfiguration`
//!
//! ## 帧格式
//!
//! ```text
//! 0xFF 0xFF <ID> <LEN> <INSTRUCTION> <PARAM...> <CHECKSUM>
//! ```
//!
//! `LEN` 为参数个数 + 2；校验和为 ID 到最后一个参数之和取低 8 位后按位取反。
//! 多字节参数为小端序（低字节在前）。

pub mod commands;
pub mod constants;
pub mod conversions;
pub mod frame;
pub mod message;
pub mod status;
pub mod update;

pub use commands::*;
pub use constants::*;
pub use frame::{DxlFrame, checksum, dump};
pub use message::*;
pub use status::*;
pub use update::*;

use bert_model::JointProperty;
use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 缺少同步头或长度不足一个帧头
    #[error("Malformed frame: {dump}")]
    MalformedFrame { dump: String },

    /// 实际字节数少于 LEN 声明的长度
    #[error("Truncated frame: expected {expected} bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },

    /// 校验和不匹配
    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// 数据长度不在协议支持范围内
    #[error("Invalid {field} length: {length}")]
    InvalidLength { field: &'static str, length: usize },

    /// 帧长度超出 LEN 字段可表示的范围
    #[error("Frame too long: LEN would be {length} (max 255)")]
    FrameTooLong { length: usize },

    /// 状态帧错误位非零
    #[error("Motor {id} encountered {description}")]
    Device {
        id: u8,
        bits: u8,
        description: &'static str,
    },

    /// 属性不能用于该操作（如写温度）
    #[error("Property {property} is not supported for {operation}")]
    UnsupportedProperty {
        property: JointProperty,
        operation: &'static str,
    },

    /// 响应来自未配置的舵机
    #[error("Motor {id} not supplied in motor configurations")]
    UnknownMotor { id: u8 },
}

impl ProtocolError {
    /// 错误所属的舵机 ID（仅限能归属到单个舵机的错误）
    pub fn motor_id(&self) -> Option<u8> {
        match self {
            ProtocolError::Device { id, .. } | ProtocolError::UnknownMotor { id } => Some(*id),
            _ => None,
        }
    }
}
