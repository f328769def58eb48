//! 状态帧解码命令

use crate::validation::parse_hex_bytes;
use anyhow::{Result, bail};
use bert_sdk::protocol::{StatusPacket, error_description, split_status_frames};
use clap::Args;

/// 状态帧解码参数
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// 十六进制字节（可分多个参数，多个状态帧可以首尾相连）
    #[arg(required = true)]
    pub bytes: Vec<String>,
}

/// 单帧的可读描述
pub fn describe_packet(packet: &StatusPacket) -> String {
    let status = if packet.error == 0 {
        "ok".to_string()
    } else {
        format!("error 0x{:02X} ({})", packet.error, error_description(packet.error))
    };
    let params = if packet.params.is_empty() {
        "-".to_string()
    } else {
        hex::encode_upper(&packet.params)
    };
    format!("id={} {} params={}", packet.id, status, params)
}

impl DecodeCommand {
    pub fn execute(&self) -> Result<()> {
        let bytes = parse_hex_bytes(&self.bytes.join(" "))?;
        let results = split_status_frames(&bytes);

        let mut failures = 0;
        for result in &results {
            match result {
                Ok(packet) => println!("{}", describe_packet(packet)),
                Err(e) => {
                    failures += 1;
                    println!("invalid frame: {}", e);
                },
            }
        }
        if failures > 0 {
            bail!("{} of {} frames could not be decoded", failures, results.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_ok_packet() {
        let packet = StatusPacket {
            id: 1,
            error: 0,
            params: vec![0x00, 0x02],
        };
        assert_eq!(describe_packet(&packet), "id=1 ok params=0002");
    }

    #[test]
    fn test_describe_error_packet() {
        let packet = StatusPacket {
            id: 3,
            error: 0x20,
            params: vec![],
        };
        assert_eq!(
            describe_packet(&packet),
            "id=3 error 0x20 (a position outside angle limits) params=-"
        );
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let cmd = DecodeCommand {
            bytes: vec!["FF FF 01 02 00 FB".to_string()],
        };
        assert!(cmd.execute().is_err());
    }

    #[test]
    fn test_decode_valid_frame() {
        let cmd = DecodeCommand {
            bytes: vec!["FF FF 01 02 00 FC".to_string()],
        };
        assert!(cmd.execute().is_ok());
    }
}
