//! 正运动学求解命令
//!
//! 载入骨架与舵机配置，按 `--angle` 设定舵机目标角度后求解目标坐标。

use crate::validation::parse_joint_angle;
use anyhow::Result;
use bert_sdk::{Joint, JointProperty, Robot, Target};
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// 求解参数
#[derive(Args, Debug)]
pub struct LocateCommand {
    /// 骨架描述文件（TOML）
    #[arg(short, long)]
    pub skeleton: PathBuf,

    /// 舵机配置文件（TOML）
    #[arg(short, long)]
    pub motors: PathBuf,

    /// 关节角度，形如 LEFT_ELBOW_Y=90（可重复）
    #[arg(short, long = "angle", value_parser = parse_joint_angle)]
    pub angles: Vec<(Joint, f64)>,

    /// 求解目标（关节或附属件）；省略时输出所有目标
    #[arg(short, long)]
    pub target: Option<Target>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// 单个目标的求解结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Located {
    pub target: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<[f64; 3]>,
}

impl Located {
    fn table_row(&self) -> String {
        let mut row = format!("{:<18} {:>8.3} {:>8.3} {:>8.3}", self.target, self.x, self.y, self.z);
        if let Some([dx, dy, dz]) = self.direction {
            row.push_str(&format!("  [{:.3},{:.3},{:.3}]", dx, dy, dz));
        }
        row
    }
}

impl LocateCommand {
    /// 求解，返回按目标顺序排列的结果
    pub fn solve(&self) -> Result<Vec<Located>> {
        let mut robot = Robot::from_files(&self.skeleton, &self.motors)?;
        for (joint, degrees) in &self.angles {
            robot
                .registry()
                .set_property(*joint, JointProperty::Position, *degrees)?;
            debug!("{} commanded to {:.1}", joint, degrees);
        }

        match self.target {
            Some(target) => {
                let position = robot.locate(target)?;
                let direction = robot.direction(target)?;
                Ok(vec![Located {
                    target: target.to_string(),
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    direction: Some([direction.x, direction.y, direction.z]),
                }])
            },
            None => Ok(robot
                .target_positions()
                .into_iter()
                .map(|(target, position)| Located {
                    target: target.to_string(),
                    x: position.x,
                    y: position.y,
                    z: position.z,
                    direction: None,
                })
                .collect()),
        }
    }

    pub fn execute(&self) -> Result<()> {
        let results = self.solve()?;
        match self.format {
            OutputFormat::Table => {
                println!("{:<18} {:>8} {:>8} {:>8}", "TARGET", "X", "Y", "Z");
                for located in &results {
                    println!("{}", located.table_row());
                }
            },
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&results)?);
            },
        }
        Ok(())
    }
}
