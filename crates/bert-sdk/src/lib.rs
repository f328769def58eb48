//! Bert SDK - 人形机器人 Bert 的控制核心
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **模型层** (`model`): 关节、附属件、舵机配置
//! - **协议层** (`protocol`): Dynamixel Protocol 1 帧编解码与单位换算
//! - **驱动层** (`driver`): 舵机注册表，并发安全的快照更新
//! - **运动学层** (`kinematics`): 连杆树与正运动学求解
//!
//! 舵机读数沿 字节 → 协议层 → 注册表 → 运动学 流动；
//! 命令沿 注册表 → 协议层 → 字节 流动。
//!
//! # 快速开始
//!
//! ```no_run
//! use bert_sdk::prelude::*;
//!
//! bert_sdk::init_logger();
//! let mut robot = Robot::from_files("bert.toml", "motors.toml")?;
//! let finger = robot.locate(Appendage::LeftFinger)?;
//! println!("{:.3} {:.3} {:.3}", finger.x, finger.y, finger.z);
//! # Ok::<(), bert_sdk::SdkError>(())
//! ```

pub use bert_driver as driver;
pub use bert_kinematics as kinematics;
pub use bert_model as model;
pub use bert_protocol as protocol;

mod logging;
pub mod prelude;
mod robot;

pub use logging::{init_logger, try_init_logger};
pub use robot::{Robot, SdkError};

pub use bert_driver::{DriverError, MotorRegistry};
pub use bert_kinematics::{ForwardSolver, KinematicsError, Target};
pub use bert_model::{Appendage, DynamixelType, Joint, JointAngleSource, JointProperty, ModelError, MotorConfiguration};
pub use bert_protocol::{DxlFrame, MotionPlan, Pose, ProtocolError};
