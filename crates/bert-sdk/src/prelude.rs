//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use bert_sdk::prelude::*;
//! ```

pub use crate::Robot;

// 模型层
pub use bert_model::{Appendage, DynamixelType, Joint, JointAngleSource, JointProperty, MotorConfiguration};

// 驱动层
pub use bert_driver::MotorRegistry;

// 运动学层
pub use bert_kinematics::{ForwardSolver, Target};

// 协议层
pub use bert_protocol::{DxlFrame, MotionPlan, Pose};

// 错误类型
pub use crate::SdkError;
pub use bert_driver::DriverError;
pub use bert_kinematics::KinematicsError;
pub use bert_protocol::ProtocolError;
