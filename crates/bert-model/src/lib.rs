//! # Bert Model
//!
//! 人形机器人 Bert 的共享数据模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `joint`: 关节枚举
//! - `appendage`: 末端（耳、眼、手指、脚趾等）枚举
//! - `dynamixel`: 舵机型号
//! - `property`: 舵机属性名
//! - `motor`: 每个舵机的配置与实时状态 `MotorConfiguration`
//! - `config`: 舵机静态配置文件（TOML）
//! - `source`: 运动学层读取关节角度的接口 `JointAngleSource`
//!
//! 协议层写入 `MotorConfiguration`，运动学层只通过 `JointAngleSource` 读取。

pub mod appendage;
pub mod config;
pub mod dynamixel;
pub mod error;
pub mod joint;
pub mod motor;
pub mod property;
pub mod source;

pub use appendage::Appendage;
pub use config::{MotorEntry, MotorFile, load_motor_configurations};
pub use dynamixel::DynamixelType;
pub use error::ModelError;
pub use joint::Joint;
pub use motor::MotorConfiguration;
pub use property::JointProperty;
pub use source::JointAngleSource;
