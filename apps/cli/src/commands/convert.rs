//! 角度与原始位置值的换算命令

use crate::validation::parse_number;
use anyhow::{Result, bail};
use bert_sdk::protocol::conversions::{degree_to_dxl, dxl_to_degree, range, resolution};
use bert_sdk::{DynamixelType, Joint, MotorConfiguration};
use clap::Args;

/// 换算参数
#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// 舵机型号（AX12、MX28 或 MX64）
    #[arg(short, long, default_value = "MX28")]
    pub model: DynamixelType,

    /// 角度 → 原始值
    #[arg(long, allow_negative_numbers = true, conflicts_with = "raw")]
    pub degrees: Option<f64>,

    /// 原始值 → 角度
    #[arg(long, value_parser = parse_number, required_unless_present = "degrees")]
    pub raw: Option<u32>,

    /// 零位偏置（度）
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,

    /// 反向安装
    #[arg(long)]
    pub indirect: bool,

    #[arg(long, default_value_t = -360.0, allow_negative_numbers = true)]
    pub min: f64,

    #[arg(long, default_value_t = 360.0, allow_negative_numbers = true)]
    pub max: f64,
}

impl ConvertCommand {
    fn configuration(&self) -> MotorConfiguration {
        let mut mc = MotorConfiguration::new(Joint::None, self.model, 0, "cli", !self.indirect);
        mc.offset = self.offset;
        mc.min_angle = self.min;
        mc.max_angle = self.max;
        mc
    }

    /// 换算结果的单行描述
    pub fn render(&self) -> Result<String> {
        if self.min > self.max {
            bail!("min ({}) 大于 max ({})", self.min, self.max);
        }
        let mc = self.configuration();

        if let Some(degrees) = self.degrees {
            let command = degree_to_dxl(&mc, degrees);
            let mut line = format!(
                "{} {:.2} deg -> raw {} (0x{:04X})",
                self.model, command.degrees, command.raw, command.raw
            );
            if command.clamped {
                line.push_str(&format!(", clamped from {:.2}", degrees));
            }
            return Ok(line);
        }

        let Some(raw) = self.raw else {
            bail!("需要 --degrees 或 --raw");
        };
        let res = resolution(self.model) as u32;
        if raw > res {
            bail!("raw {} 超出 {} 的分辨率 {}", raw, self.model, res);
        }
        let [b1, b2, ..] = raw.to_le_bytes();
        let degrees = dxl_to_degree(&mc, b1, b2);
        Ok(format!(
            "{} raw {} (0x{:04X}) -> {:.2} deg (range {:.0})",
            self.model,
            raw,
            raw,
            degrees,
            range(self.model)
        ))
    }

    pub fn execute(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}
