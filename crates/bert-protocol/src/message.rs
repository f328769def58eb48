//! # 帧构建
//!
//! 纯函数、无状态：只把参数编码为字节，不修改任何舵机状态。
//! 需要同时更新 `MotorConfiguration` 的命令见 `commands` 模块。

use crate::conversions::supports_bulk_read;
use crate::{
    BROADCAST_ID, BULK_READ, DxlFrame, MAX_LENGTH_FIELD, PING, ProtocolError, READ, SYNC_WRITE, WRITE,
};
use bert_model::DynamixelType;
use std::collections::BTreeMap;
use tracing::debug;

/// 校验 LEN 并组帧
fn frame(id: u8, instruction: u8, params: &[u8]) -> Result<DxlFrame, ProtocolError> {
    let length = params.len() + 2;
    if length > MAX_LENGTH_FIELD {
        return Err(ProtocolError::FrameTooLong { length });
    }
    Ok(DxlFrame::assemble(id, instruction, params))
}

/// 广播 PING（6 字节）
pub fn build_ping() -> DxlFrame {
    DxlFrame::assemble(BROADCAST_ID, PING, &[])
}

/// 单个设备 PING
pub fn build_ping_id(id: u8) -> DxlFrame {
    DxlFrame::assemble(id, PING, &[])
}

/// READ：从 `address` 开始读 `length` 字节
pub fn build_read(id: u8, address: u8, length: u8) -> Result<DxlFrame, ProtocolError> {
    if length == 0 {
        return Err(ProtocolError::InvalidLength {
            field: "read",
            length: 0,
        });
    }
    frame(id, READ, &[address, length])
}

/// WRITE：`value` 按小端序写入 `length`（1、2 或 4）字节
pub fn build_write(id: u8, address: u8, value: u32, length: usize) -> Result<DxlFrame, ProtocolError> {
    if !matches!(length, 1 | 2 | 4) {
        return Err(ProtocolError::InvalidLength {
            field: "write",
            length,
        });
    }
    let mut params = [0u8; 5];
    params[0] = address;
    params[1..1 + length].copy_from_slice(&value.to_le_bytes()[..length]);
    frame(id, WRITE, &params[..1 + length])
}

/// WRITE：写入任意字节串
pub fn build_write_bytes(id: u8, address: u8, data: &[u8]) -> Result<DxlFrame, ProtocolError> {
    if data.is_empty() {
        return Err(ProtocolError::InvalidLength {
            field: "write",
            length: 0,
        });
    }
    let mut params = Vec::with_capacity(data.len() + 1);
    params.push(address);
    params.extend_from_slice(data);
    frame(id, WRITE, &params)
}

/// SYNC_WRITE：同一地址、同一长度写到多个设备，每个设备各自的值
///
/// `entries` 为空时返回空列表（对零个设备的同步写是空操作）。
/// 值按小端序截取 `length` 字节。LEN = (length + 1) * N + 4。
pub fn build_sync_write(
    address: u8,
    length: u8,
    entries: &BTreeMap<u8, u32>,
) -> Result<Vec<DxlFrame>, ProtocolError> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }
    let width = length as usize;
    if !matches!(width, 1 | 2 | 4) {
        return Err(ProtocolError::InvalidLength {
            field: "sync write",
            length: width,
        });
    }

    let mut params = Vec::with_capacity(2 + entries.len() * (width + 1));
    params.push(address);
    params.push(length);
    for (id, value) in entries {
        params.push(*id);
        params.extend_from_slice(&value.to_le_bytes()[..width]);
    }
    let sync = frame(BROADCAST_ID, SYNC_WRITE, &params)?;
    debug!("SYNC_WRITE 0x{:02X} to {} motors", address, entries.len());
    Ok(vec![sync])
}

/// BULK_READ 条目：每个设备各自的地址和长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReadEntry {
    pub id: u8,
    pub model: DynamixelType,
    pub address: u8,
    pub length: u8,
}

/// BULK_READ
///
/// AX-12 不支持 BULK_READ：每个 AX-12 单独生成一个 READ 帧（排在前面），
/// 其余设备合并为一个 BULK_READ 帧（排在最后）。没有非 AX-12 设备时不生成 BULK_READ。
///
/// BULK_READ 参数为 `0x00` 后接每个设备的 `[length, id, address]`。
pub fn build_bulk_read(entries: &[BulkReadEntry]) -> Result<Vec<DxlFrame>, ProtocolError> {
    let mut frames = Vec::new();
    let mut params = vec![0x00u8];

    for entry in entries {
        if supports_bulk_read(entry.model) {
            if entry.length == 0 {
                return Err(ProtocolError::InvalidLength {
                    field: "bulk read",
                    length: 0,
                });
            }
            params.extend_from_slice(&[entry.length, entry.id, entry.address]);
        } else {
            frames.push(build_read(entry.id, entry.address, entry.length)?);
        }
    }

    if params.len() > 1 {
        frames.push(frame(BROADCAST_ID, BULK_READ, &params)?);
    }
    Ok(frames)
}
