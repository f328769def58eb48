//! 协议常量定义
//!
//! 控制表地址对 AX-12、MX-28、MX-64 相同（Protocol 1）。

/// 帧同步头
pub const HEADER: [u8; 2] = [0xFF, 0xFF];

/// 广播 ID，所有设备都会接收
pub const BROADCAST_ID: u8 = 0xFE;

/// LEN 字段可表示的最大值
pub const MAX_LENGTH_FIELD: usize = 0xFF;

// ============================================================================
// 指令码
// ============================================================================

pub const PING: u8 = 0x01;
pub const READ: u8 = 0x02;
pub const WRITE: u8 = 0x03;
pub const SYNC_WRITE: u8 = 0x83;
pub const BULK_READ: u8 = 0x92;

// ============================================================================
// 控制表地址
// ============================================================================

/// CW 角度限位（EEPROM），即最小角度
pub const MINIMUM_ANGLE: u8 = 0x06;
/// CCW 角度限位（EEPROM），即最大角度
pub const MAXIMUM_ANGLE: u8 = 0x08;
pub const GOAL_TORQUE_ENABLE: u8 = 0x18;
pub const GOAL_POSITION: u8 = 0x1E;
pub const GOAL_SPEED: u8 = 0x20;
/// RAM 中的力矩限制
pub const GOAL_TORQUE: u8 = 0x22;
pub const PRESENT_POSITION: u8 = 0x24;
pub const PRESENT_SPEED: u8 = 0x26;
pub const PRESENT_LOAD: u8 = 0x28;
/// 单字节
pub const PRESENT_VOLTAGE: u8 = 0x2A;
/// 单字节
pub const PRESENT_TEMPERATURE: u8 = 0x2B;

/// EEPROM 限位块：角度限位、温度/电压限制、最大力矩（0x06..=0x0F）
pub const LIMIT_BLOCK_ADDRESS: u8 = 0x06;
pub const LIMIT_BLOCK_BYTES: u8 = 10;

/// 目标块：位置、速度、力矩（0x1E..=0x23）
pub const GOAL_BLOCK_ADDRESS: u8 = 0x1E;
pub const GOAL_BLOCK_BYTES: u8 = 6;

// ============================================================================
// 姿态安全启发式（度）
// ============================================================================

/// 髋 X 上限，防止膝盖内扣相互缠绕
pub const HIP_X_LIMIT: f64 = 190.0;
/// 髋 Z 下限，防止内八字
pub const HIP_Z_LIMIT: f64 = -8.0;
