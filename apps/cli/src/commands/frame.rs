//! 帧构建命令
//!
//! 只打印帧的十六进制转储，不访问串口。

use crate::validation::{parse_bulk_entry, parse_number, parse_sync_entry, parse_u8};
use anyhow::Result;
use bert_sdk::DynamixelType;
use bert_sdk::protocol::{
    BulkReadEntry, DxlFrame, build_bulk_read, build_ping, build_ping_id, build_read, build_sync_write, build_write,
};
use clap::Subcommand;
use std::collections::BTreeMap;

/// 帧构建子命令
#[derive(Subcommand, Debug)]
pub enum FrameCommand {
    /// PING（省略 ID 时广播）
    Ping {
        #[arg(long, value_parser = parse_u8)]
        id: Option<u8>,
    },

    /// READ：从地址开始读取若干字节
    Read {
        #[arg(value_parser = parse_u8)]
        id: u8,
        #[arg(value_parser = parse_u8)]
        address: u8,
        #[arg(value_parser = parse_u8)]
        length: u8,
    },

    /// WRITE：小端序写入 1、2 或 4 字节
    Write {
        #[arg(value_parser = parse_u8)]
        id: u8,
        #[arg(value_parser = parse_u8)]
        address: u8,
        #[arg(value_parser = parse_number)]
        value: u32,
        #[arg(short, long, default_value_t = 2)]
        length: usize,
    },

    /// SYNC_WRITE：同一地址写到多个设备（条目形如 ID=VALUE）
    Sync {
        #[arg(value_parser = parse_u8)]
        address: u8,
        #[arg(value_parser = parse_u8)]
        length: u8,
        #[arg(required = true, value_parser = parse_sync_entry)]
        entries: Vec<(u8, u32)>,
    },

    /// BULK_READ（条目形如 ID:MODEL:ADDRESS:LENGTH，AX12 单独生成 READ）
    Bulk {
        #[arg(required = true, value_parser = parse_bulk_entry)]
        entries: Vec<(u8, DynamixelType, u8, u8)>,
    },
}

impl FrameCommand {
    /// 构建帧
    pub fn build(&self) -> Result<Vec<DxlFrame>> {
        let frames = match self {
            FrameCommand::Ping { id: None } => vec![build_ping()],
            FrameCommand::Ping { id: Some(id) } => vec![build_ping_id(*id)],
            FrameCommand::Read { id, address, length } => vec![build_read(*id, *address, *length)?],
            FrameCommand::Write {
                id,
                address,
                value,
                length,
            } => vec![build_write(*id, *address, *value, *length)?],
            FrameCommand::Sync {
                address,
                length,
                entries,
            } => {
                let entries: BTreeMap<u8, u32> = entries.iter().copied().collect();
                build_sync_write(*address, *length, &entries)?
            },
            FrameCommand::Bulk { entries } => {
                let entries: Vec<BulkReadEntry> = entries
                    .iter()
                    .map(|(id, model, address, length)| BulkReadEntry {
                        id: *id,
                        model: *model,
                        address: *address,
                        length: *length,
                    })
                    .collect();
                build_bulk_read(&entries)?
            },
        };
        Ok(frames)
    }

    /// 打印帧
    pub fn execute(&self) -> Result<()> {
        for frame in self.build()? {
            println!("{}", frame);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_broadcast() {
        let frames = FrameCommand::Ping { id: None }.build().unwrap();
        assert_eq!(frames[0].to_string(), "FF FF FE 02 01 FE (6)");
    }

    #[test]
    fn test_read_temperature() {
        let frames = FrameCommand::Read {
            id: 1,
            address: 0x2B,
            length: 1,
        }
        .build()
        .unwrap();
        assert_eq!(frames[0].checksum_byte(), 0xCC);
    }

    #[test]
    fn test_write_rejects_bad_length() {
        let cmd = FrameCommand::Write {
            id: 1,
            address: 0x1E,
            value: 512,
            length: 3,
        };
        assert!(cmd.build().is_err());
    }

    #[test]
    fn test_sync_fixture() {
        let cmd = FrameCommand::Sync {
            address: 0x1E,
            length: 4,
            entries: vec![(0, 0x0150_0010), (1, 0x0360_0220)],
        };
        let frames = cmd.build().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].checksum_byte(), 0x67);
    }

    #[test]
    fn test_bulk_splits_ax12() {
        let cmd = FrameCommand::Bulk {
            entries: vec![
                (1, DynamixelType::Ax12, 0x24, 2),
                (2, DynamixelType::Mx28, 0x24, 2),
            ],
        };
        assert_eq!(cmd.build().unwrap().len(), 2);
    }
}
