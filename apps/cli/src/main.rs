//! # Bert CLI
//!
//! 人形机器人 Bert 的离线工具：构建与解码 Dynamixel 帧、换算舵机单位、查看骨架、求解正运动学。
//! 不访问串口，所有命令只处理字节与配置文件。
//!
//! ```bash
//! # 广播 PING
//! bert-cli frame ping
//!
//! # 解码状态帧
//! bert-cli decode "FF FF 01 02 00 FC"
//!
//! # 肘关节 90 度时左手指尖的位置
//! bert-cli locate -s bert.toml -m motors.toml -a LEFT_ELBOW_Y=90 -t LEFT_FINGER
//! ```
//!
//! 日志输出到 stderr，级别由 `RUST_LOG` 控制。

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod validation;

use commands::{ChainCommand, ConvertCommand, DecodeCommand, FrameCommand, LocateCommand};

/// Bert CLI - 人形机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "bert-cli")]
#[command(about = "Command-line tools for the Bert humanoid", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 构建指令帧并打印
    #[command(subcommand)]
    Frame(FrameCommand),

    /// 解码状态帧
    Decode {
        #[command(flatten)]
        args: DecodeCommand,
    },

    /// 角度与原始位置值换算
    Convert {
        #[command(flatten)]
        args: ConvertCommand,
    },

    /// 查看骨架结构
    Chain {
        #[command(flatten)]
        args: ChainCommand,
    },

    /// 求解目标坐标
    Locate {
        #[command(flatten)]
        args: LocateCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("bert_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Frame(cmd) => cmd.execute(),
        Commands::Decode { args } => args.execute(),
        Commands::Convert { args } => args.execute(),
        Commands::Chain { args } => args.execute(),
        Commands::Locate { args } => args.execute(),
    }
}
