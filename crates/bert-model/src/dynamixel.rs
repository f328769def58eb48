//! 舵机型号

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dynamixel 舵机型号
///
/// 各型号的量程、分辨率等换算常数见 `bert-protocol` 的 `conversions` 模块。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamixelType {
    /// AX-12：300° 量程，不支持 BULK_READ
    #[serde(rename = "AX12")]
    Ax12,
    #[serde(rename = "MX28")]
    Mx28,
    #[serde(rename = "MX64")]
    Mx64,
}

impl DynamixelType {
    pub const ALL: [DynamixelType; 3] = [DynamixelType::Ax12, DynamixelType::Mx28, DynamixelType::Mx64];

    pub const fn name(self) -> &'static str {
        match self {
            DynamixelType::Ax12 => "AX12",
            DynamixelType::Mx28 => "MX28",
            DynamixelType::Mx64 => "MX64",
        }
    }
}

impl fmt::Display for DynamixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DynamixelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DynamixelType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownModel(s.to_string()))
    }
}
