//! # 状态帧解析
//!
//! 舵机对 READ / WRITE / PING 的应答都是状态帧：
//!
//! ```text
//! 0xFF 0xFF <ID> <LEN> <ERROR> <PARAM...> <CHECKSUM>
//! ```
//!
//! 解析只检查帧本身；错误位由调用方决定如何处理（见 [`StatusPacket::check`]）。

use crate::{HEADER, ProtocolError, checksum, dump};
use tracing::warn;

/// 解析后的状态帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPacket {
    pub id: u8,
    /// 错误位
    pub error: u8,
    pub params: Vec<u8>,
}

impl StatusPacket {
    /// 错误位为零时返回自身，否则返回归属到该舵机的 `Device` 错误
    pub fn check(self) -> Result<Self, ProtocolError> {
        if self.error == 0 {
            Ok(self)
        } else {
            Err(ProtocolError::Device {
                id: self.id,
                bits: self.error,
                description: error_description(self.error),
            })
        }
    }

    /// 取参数区第 `index` 字节起的一个寄存器（两字节小端；单字节时高字节为 0）
    ///
    /// `width` 只能是 1 或 2。
    pub fn register(&self, index: usize, width: u8) -> Result<(u8, u8), ProtocolError> {
        if !matches!(width, 1 | 2) {
            return Err(ProtocolError::InvalidLength {
                field: "register",
                length: width as usize,
            });
        }
        let needed = index + width as usize;
        if self.params.len() < needed {
            return Err(ProtocolError::TruncatedFrame {
                expected: needed + 6,
                actual: self.params.len() + 6,
            });
        }
        let b2 = if width >= 2 { self.params[index + 1] } else { 0 };
        Ok((self.params[index], b2))
    }
}

/// 从缓冲区读出整帧长度（LEN + 4）；不足 5 字节时无法判断，返回 `None`
pub fn get_message_length(bytes: &[u8]) -> Option<usize> {
    if bytes.len() > 4 {
        Some(bytes[3] as usize + 4)
    } else {
        None
    }
}

/// 跳过首个 `FF FF` 之前的杂字节；找不到同步头时原样返回
pub fn ensure_legal_start(bytes: &[u8]) -> &[u8] {
    match bytes.windows(2).position(|w| w == HEADER) {
        Some(0) | None => bytes,
        Some(i) => {
            warn!("Cut {} bytes to provide legal message start", i);
            &bytes[i..]
        },
    }
}

/// 解析一个状态帧
///
/// - 缺少同步头或不足 5 字节（同步头 + ID + LEN + ERROR）→ `MalformedFrame`
/// - 实际字节数少于 `LEN + 4` → `TruncatedFrame`
/// - 校验和错误 → `ChecksumMismatch`
///
/// 帧之后多余的字节被忽略。错误位不在此处判定。
pub fn parse_status(bytes: &[u8]) -> Result<StatusPacket, ProtocolError> {
    if bytes.len() < 5 || bytes[..2] != HEADER {
        return Err(ProtocolError::MalformedFrame { dump: dump(bytes) });
    }
    let declared = bytes[3] as usize;
    if declared < 2 {
        return Err(ProtocolError::MalformedFrame { dump: dump(bytes) });
    }
    let total = declared + 4;
    if bytes.len() < total {
        return Err(ProtocolError::TruncatedFrame {
            expected: total,
            actual: bytes.len(),
        });
    }
    let expected = checksum(&bytes[2..total - 1]);
    let actual = bytes[total - 1];
    if expected != actual {
        return Err(ProtocolError::ChecksumMismatch { expected, actual });
    }

    Ok(StatusPacket {
        id: bytes[2],
        error: bytes[4],
        params: bytes[5..total - 1].to_vec(),
    })
}

/// 拆分连续到达的多个状态帧（BULK_READ 的应答）
///
/// 每个元素对应一帧：帧间杂字节被跳过；截断或无同步头时以一个错误结束。
/// 校验和错误只丢弃当前帧，按声明长度继续向后解析。
pub fn split_status_frames(bytes: &[u8]) -> Vec<Result<StatusPacket, ProtocolError>> {
    let mut results = Vec::new();
    let mut rest = bytes;

    while !rest.is_empty() {
        let start = ensure_legal_start(rest);
        if start.len() < 2 || start[..2] != HEADER {
            results.push(Err(ProtocolError::MalformedFrame { dump: dump(rest) }));
            break;
        }
        rest = start;
        let result = parse_status(rest);
        let advance = match &result {
            Ok(_) | Err(ProtocolError::ChecksumMismatch { .. }) => get_message_length(rest),
            _ => None,
        };
        results.push(result);
        match advance {
            Some(n) => rest = &rest[n..],
            None => break,
        }
    }
    results
}

/// 错误位描述：按固定优先级只取第一个置位的原因
pub fn error_description(bits: u8) -> &'static str {
    if bits & 0x01 != 0 {
        "an instruction error"
    } else if bits & 0x02 != 0 {
        "an overload error"
    } else if bits & 0x04 != 0 {
        "an incorrect checksum"
    } else if bits & 0x08 != 0 {
        "a range error"
    } else if bits & 0x10 != 0 {
        "overheating"
    } else if bits & 0x20 != 0 {
        "a position outside angle limits"
    } else if bits & 0x40 != 0 {
        "an input voltage outside the acceptable range"
    } else {
        "Unrecognized error"
    }
}

/// 单设备写操作的应答只关心错误位；无错误时返回 `None`
pub fn error_message_from_status(bytes: &[u8]) -> Option<String> {
    if bytes.len() > 4 && bytes[4] != 0 {
        Some(format!("Motor {} encountered {}", bytes[2], error_description(bytes[4])))
    } else {
        None
    }
}
