//! 帧结构与校验和

use crate::HEADER;
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// 一个完整的 Protocol 1 帧（含同步头与校验和）
///
/// 绝大多数帧不超过 16 字节，存放在栈上；SYNC_WRITE / BULK_READ 才会溢出到堆。
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DxlFrame {
    bytes: SmallVec<[u8; 16]>,
}

impl DxlFrame {
    /// 组帧：写入同步头、ID、LEN、指令、参数并计算校验和
    ///
    /// 调用方负责保证 `params.len() + 2 <= 255`。
    pub(crate) fn assemble(id: u8, instruction: u8, params: &[u8]) -> Self {
        let mut bytes: SmallVec<[u8; 16]> = SmallVec::with_capacity(params.len() + 6);
        bytes.extend_from_slice(&HEADER);
        bytes.push(id);
        bytes.push((params.len() + 2) as u8);
        bytes.push(instruction);
        bytes.extend_from_slice(params);
        let sum = checksum(&bytes[2..]);
        bytes.push(sum);
        Self { bytes }
    }

    /// 目标设备 ID
    #[inline]
    pub fn id(&self) -> u8 {
        self.bytes[2]
    }

    /// LEN 字段
    #[inline]
    pub fn length_field(&self) -> u8 {
        self.bytes[3]
    }

    /// 指令码
    #[inline]
    pub fn instruction(&self) -> u8 {
        self.bytes[4]
    }

    /// 参数区（不含校验和）
    #[inline]
    pub fn params(&self) -> &[u8] {
        &self.bytes[5..self.bytes.len() - 1]
    }

    /// 校验和字节
    #[inline]
    pub fn checksum_byte(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl Deref for DxlFrame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for DxlFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for DxlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DxlFrame({})", dump(&self.bytes))
    }
}

impl fmt::Display for DxlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&dump(&self.bytes))
    }
}

/// 计算校验和：`(255 - (Σ body mod 256)) mod 256`
///
/// `body` 为 ID 到最后一个参数（不含同步头和校验和本身）。
#[inline]
pub fn checksum(body: &[u8]) -> u8 {
    let sum = body.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    !sum
}

/// 十六进制转储，形如 `FF FF 01 04 02 2B 01 CC (8)`
pub fn dump(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "null message".to_string();
    }
    let mut out = String::with_capacity(bytes.len() * 3 + 6);
    for b in bytes {
        out.push_str(&format!("{:02X} ", b));
    }
    out.push_str(&format!("({})", bytes.len()));
    out
}
