//! 末端枚举
//!
//! 末端（appendage）挂在运动链某个 Link 的末端，之后不再有关节。
//! 它们只用于求位置，没有对应的舵机。

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 末端枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Appendage {
    LeftEar,
    LeftEye,
    LeftFinger,
    LeftHeel,
    LeftToe,
    Nose,
    RightEar,
    RightEye,
    RightFinger,
    RightHeel,
    RightToe,
    /// 未知末端
    None,
}

impl Appendage {
    /// 所有真实末端（不含 `None`）
    pub const ALL: [Appendage; 11] = [
        Appendage::LeftEar,
        Appendage::LeftEye,
        Appendage::LeftFinger,
        Appendage::LeftHeel,
        Appendage::LeftToe,
        Appendage::Nose,
        Appendage::RightEar,
        Appendage::RightEye,
        Appendage::RightFinger,
        Appendage::RightHeel,
        Appendage::RightToe,
    ];

    /// 规范名
    pub const fn name(self) -> &'static str {
        match self {
            Appendage::LeftEar => "LEFT_EAR",
            Appendage::LeftEye => "LEFT_EYE",
            Appendage::LeftFinger => "LEFT_FINGER",
            Appendage::LeftHeel => "LEFT_HEEL",
            Appendage::LeftToe => "LEFT_TOE",
            Appendage::Nose => "NOSE",
            Appendage::RightEar => "RIGHT_EAR",
            Appendage::RightEye => "RIGHT_EYE",
            Appendage::RightFinger => "RIGHT_FINGER",
            Appendage::RightHeel => "RIGHT_HEEL",
            Appendage::RightToe => "RIGHT_TOE",
            Appendage::None => "NONE",
        }
    }

    /// 可朗读的名称
    pub fn to_text(self) -> String {
        match self {
            Appendage::None => "unknown".to_string(),
            other => other.name().replace('_', " ").to_lowercase(),
        }
    }
}

impl fmt::Display for Appendage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Appendage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Appendage::ALL
            .iter()
            .chain(std::iter::once(&Appendage::None))
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownAppendage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appendage_text() {
        assert_eq!(Appendage::LeftFinger.to_text(), "left finger");
        assert_eq!(Appendage::Nose.to_text(), "nose");
        assert_eq!(Appendage::None.to_text(), "unknown");
    }

    #[test]
    fn test_appendage_from_str() {
        assert_eq!("right_toe".parse::<Appendage>().unwrap(), Appendage::RightToe);
        assert!("LEFT_ELBOW_Y".parse::<Appendage>().is_err());
    }
}
