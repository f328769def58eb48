//! # Bert Kinematics
//!
//! 骨架运动学：由骨架描述构建连杆树，按当前舵机角度计算任意关节或末端的空间位置与朝向。
//!
//! ## 模块
//!
//! - `description`: 骨架描述文件（TOML）
//! - `link`: 连杆与连杆端点
//! - `chain`: 连杆树（arena 存储）与惰性坐标缓存
//! - `solver`: 正运动学求解器
//!
//! ## 坐标约定
//!
//! - 每个连杆的局部 z 轴是其末端关节的转轴，x 轴指向下一段连杆
//! - 长度单位为米，描述文件中的角度单位为度，内部使用弧度
//! - 变换按根到目标的顺序右乘；顺序颠倒会得到看似合理但错误的坐标
//!
//! ```no_run
//! use bert_kinematics::{ForwardSolver, Target};
//! use bert_model::Joint;
//! use std::collections::BTreeMap;
//!
//! let mut solver = ForwardSolver::from_file("bert.toml")?;
//! let mut angles = BTreeMap::new();
//! angles.insert(Joint::LeftElbowY, 90.0);
//! let p = solver.compute_position(&angles, Target::Joint(Joint::LeftElbowY))?;
//! println!("{:.3} {:.3} {:.3}", p.x, p.y, p.z);
//! # Ok::<(), bert_kinematics::KinematicsError>(())
//! ```

pub mod chain;
pub mod description;
mod error;
pub mod link;
pub mod solver;

pub use chain::{Chain, LinkId, build_chain};
pub use description::{ImuDescription, LinkDescription, SkeletonDescription};
pub use error::KinematicsError;
pub use link::{Link, LinkPoint};
pub use solver::{ForwardSolver, Target};
