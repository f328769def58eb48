//! # Bert Driver
//!
//! 舵机注册表：持有所有舵机的 [`MotorConfiguration`](bert_model::MotorConfiguration)，
//! 把 `bert-protocol` 的编解码函数包装成并发安全的更新与命令操作。
//!
//! ## 并发模型
//!
//! - 每个关节一个 `ArcSwap<MotorConfiguration>`，读取无锁（`load()`）
//! - 写入时复制记录、应用更新、整体发布新快照（写入端由一把 `Mutex` 串行化）
//! - 读者永远看不到写了一半的记录；更新完成后开始的读取一定能看到它
//!
//! ```no_run
//! use bert_driver::MotorRegistry;
//! use bert_model::Joint;
//!
//! let registry = MotorRegistry::from_file("motors.toml")?;
//! let frame = registry.request_goals(Joint::LeftElbowY)?;
//! # let response: Vec<u8> = frame.to_vec();
//! registry.apply_goals(Joint::LeftElbowY, &response)?;
//! # Ok::<(), bert_driver::DriverError>(())
//! ```

mod error;
mod registry;

pub use error::DriverError;
pub use registry::MotorRegistry;
