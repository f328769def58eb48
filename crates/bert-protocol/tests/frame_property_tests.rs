//! 帧构建的属性测试
//!
//! 使用 proptest 验证：所有构建出的帧校验和正确、LEN 与实际长度一致、能被状态解析器读回。

use bert_model::DynamixelType;
use bert_protocol::*;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn assert_well_formed(frame: &DxlFrame) -> Result<(), TestCaseError> {
    let n = frame.len();
    prop_assert_eq!(&frame[..2], &HEADER[..]);
    prop_assert_eq!(frame.length_field() as usize + 4, n);
    prop_assert_eq!(checksum(&frame[2..n - 1]), frame[n - 1]);
    let packet = parse_status(frame).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(packet.id, frame.id());
    Ok(())
}

fn model_strategy() -> impl Strategy<Value = DynamixelType> {
    prop_oneof![
        Just(DynamixelType::Ax12),
        Just(DynamixelType::Mx28),
        Just(DynamixelType::Mx64),
    ]
}

proptest! {
    /// READ 帧
    #[test]
    fn read_frames_are_well_formed(id in 0u8..=0xFE, address in any::<u8>(), length in 1u8..=0xFF) {
        let frame = build_read(id, address, length).unwrap();
        assert_well_formed(&frame)?;
        prop_assert_eq!(frame.params(), &[address, length][..]);
    }

    /// WRITE 帧：小端序
    #[test]
    fn write_frames_are_little_endian(id in 0u8..=0xFE, address in any::<u8>(), value in any::<u16>()) {
        let frame = build_write(id, address, value as u32, 2).unwrap();
        assert_well_formed(&frame)?;
        prop_assert_eq!(frame.params(), &[address, (value & 0xFF) as u8, (value >> 8) as u8][..]);
    }

    /// SYNC_WRITE 帧：LEN = (L + 1) * N + 4
    #[test]
    fn sync_write_frames_are_well_formed(
        entries in prop::collection::btree_map(0u8..0xFE, any::<u16>(), 1..40),
    ) {
        let entries: BTreeMap<u8, u32> = entries.into_iter().map(|(k, v)| (k, v as u32)).collect();
        let frames = build_sync_write(GOAL_POSITION, 2, &entries).unwrap();
        prop_assert_eq!(frames.len(), 1);
        assert_well_formed(&frames[0])?;
        prop_assert_eq!(frames[0].length_field() as usize, 3 * entries.len() + 4);
    }

    /// BULK_READ：N_AX12 个 READ + 至多一个 BULK_READ
    #[test]
    fn bulk_read_splits_by_model(
        devices in prop::collection::vec((0u8..0xFE, model_strategy()), 1..30),
    ) {
        let entries: Vec<BulkReadEntry> = devices
            .iter()
            .map(|(id, model)| BulkReadEntry { id: *id, model: *model, address: PRESENT_POSITION, length: 2 })
            .collect();
        let ax12 = devices.iter().filter(|(_, m)| *m == DynamixelType::Ax12).count();
        let others = devices.len() - ax12;

        let frames = build_bulk_read(&entries).unwrap();
        let reads = frames.iter().filter(|f| f.instruction() == READ).count();
        let bulks = frames.iter().filter(|f| f.instruction() == BULK_READ).count();
        prop_assert_eq!(reads, ax12);
        prop_assert_eq!(bulks, usize::from(others > 0));
        for frame in &frames {
            assert_well_formed(frame)?;
        }
        if let Some(bulk) = frames.iter().find(|f| f.instruction() == BULK_READ) {
            prop_assert_eq!(bulk.length_field() as usize, 3 * others + 3);
        }
    }

    /// 任意字节串都不会让解析器 panic
    #[test]
    fn parse_status_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = parse_status(&bytes);
        let _ = split_status_frames(&bytes);
    }
}

/// 三个文档化的线上样例
#[test]
fn test_documented_fixtures() {
    assert_eq!(build_read(0x01, PRESENT_TEMPERATURE, 1).unwrap().checksum_byte(), 0xCC);
    assert_eq!(build_ping().checksum_byte(), 0xFE);

    let mut entries = BTreeMap::new();
    entries.insert(0x00, 0x0150_0010);
    entries.insert(0x01, 0x0360_0220);
    let sync = build_sync_write(0x1E, 4, &entries).unwrap();
    assert_eq!(sync[0].len(), 18);
    assert_eq!(sync[0].checksum_byte(), 0x67);
    assert_eq!(
        sync[0].to_vec(),
        hex::decode("FFFFFE0E831E0400100050010120026003 67".replace(' ', "")).unwrap()
    );
}
