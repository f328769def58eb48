//! 输入验证模块
//!
//! 命令行参数的解析与校验：十六进制帧、设备 ID、`KEY=VALUE` 对

use anyhow::{Context, Result, bail};
use bert_sdk::{DynamixelType, Joint};

/// 解析十进制或 `0x` 前缀的十六进制整数
pub fn parse_number(text: &str) -> Result<u32> {
    let text = text.trim();
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    value.with_context(|| format!("无效的数值: {}", text))
}

/// 解析单字节（设备 ID、地址、长度）
pub fn parse_u8(text: &str) -> Result<u8> {
    let value = parse_number(text)?;
    u8::try_from(value).with_context(|| format!("{} 超出单字节范围", text))
}

/// 解析十六进制字节串，允许空格与 `:` 分隔
pub fn parse_hex_bytes(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace() && *c != ':').collect();
    if cleaned.is_empty() {
        bail!("字节串为空");
    }
    hex::decode(&cleaned).with_context(|| format!("无效的十六进制字节串: {}", text))
}

/// 拆分 `KEY=VALUE`
pub fn split_pair(text: &str) -> Result<(&str, &str)> {
    match text.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok((key.trim(), value.trim())),
        _ => bail!("期望 KEY=VALUE 形式，得到: {}", text),
    }
}

/// 解析 `ID=VALUE`（同步写条目）
pub fn parse_sync_entry(text: &str) -> Result<(u8, u32)> {
    let (id, value) = split_pair(text)?;
    Ok((parse_u8(id)?, parse_number(value)?))
}

/// 解析 `JOINT=DEGREES`（覆盖关节角度）
pub fn parse_joint_angle(text: &str) -> Result<(Joint, f64)> {
    let (joint, degrees) = split_pair(text)?;
    let joint: Joint = joint.parse()?;
    if !joint.is_motorized() {
        bail!("{} 不是可驱动的关节", joint);
    }
    let degrees: f64 = degrees
        .parse()
        .with_context(|| format!("无效的角度: {}", degrees))?;
    if !degrees.is_finite() {
        bail!("角度必须是有限值: {}", degrees);
    }
    Ok((joint, degrees))
}

/// 解析 `ID:MODEL:ADDRESS:LENGTH`（批量读条目）
pub fn parse_bulk_entry(text: &str) -> Result<(u8, DynamixelType, u8, u8)> {
    let parts: Vec<&str> = text.split(':').collect();
    let [id, model, address, length] = parts.as_slice() else {
        bail!("期望 ID:MODEL:ADDRESS:LENGTH 形式，得到: {}", text);
    };
    Ok((parse_u8(id)?, model.parse()?, parse_u8(address)?, parse_u8(length)?))
}
