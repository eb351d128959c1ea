//! Byte-exact wire compatibility checks
//!
//! These pin the layouts other PacketCrypt implementations read and write:
//! field offsets, little-endian integers and the coinbase magic.

use packetcrypt_wire::core::constants::*;
use packetcrypt_wire::core::{
    AnnounceHeader, Announcement, BlockHeader, CoinbaseCommitment, Find, HeaderAndProof, SoftNonce,
    ValidationContext, WorkBits,
};

#[test]
fn test_record_sizes() {
    assert_eq!(BlockHeader::SIZE, 80, "Block header must be 80 bytes");
    assert_eq!(AnnounceHeader::SIZE, 88, "Announcement header must be 88 bytes");
    assert_eq!(Announcement::SIZE, 1024, "Announcement must be 1024 bytes");
    assert_eq!(HeaderAndProof::FIXED_SIZE, 4184, "Bundle without proof must be 4184 bytes");
    assert_eq!(CoinbaseCommitment::SIZE, 48, "Coinbase commitment must be 48 bytes");
    assert_eq!(Find::SIZE, 16, "Find record must be 16 bytes");
    assert_eq!(ValidationContext::SIZE, 8192, "Validation context must be 8192 bytes");
    assert_eq!(std::mem::size_of::<ValidationContext>(), 8192);
}

#[test]
fn test_block_header_layout() {
    let mut header = BlockHeader {
        version: 1,
        time_seconds: 0x5F5E_1000,
        work_bits: WorkBits::new(0x1d00ffff),
        nonce: 0xDEADBEEF,
        ..Default::default()
    };
    header.hash_prev_block[0] = 0x0403_0201;
    header.hash_merkle_root[7] = 0x8877_6655;

    let bytes = header.encode();
    assert_eq!(&bytes[0..4], &[0x01, 0x00, 0x00, 0x00]);
    assert_eq!(&bytes[4..8], &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(&bytes[64..68], &[0x55, 0x66, 0x77, 0x88]);
    assert_eq!(&bytes[68..72], &[0x00, 0x10, 0x5E, 0x5F]);
    assert_eq!(&bytes[72..76], &[0xFF, 0xFF, 0x00, 0x1D]);
    assert_eq!(&bytes[76..80], &[0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn test_announce_header_layout() {
    let header = AnnounceHeader {
        version: 1,
        soft_nonce: SoftNonce::new(0x00ABCDEF).unwrap(),
        hard_nonce: 0x11223344,
        work_bits: WorkBits::new(0x2000ffff),
        parent_block_height: 1_000_000,
        content_type: 0x0102030405060708,
        content_hash: [0xCC; 32],
        signing_key: [0x5A; 32],
    };

    let bytes = header.encode();
    assert_eq!(bytes[0], 0x01);
    assert_eq!(&bytes[1..4], &[0xEF, 0xCD, 0xAB]);
    assert_eq!(&bytes[4..8], &[0x44, 0x33, 0x22, 0x11]);
    assert_eq!(&bytes[8..12], &[0xFF, 0xFF, 0x00, 0x20]);
    assert_eq!(&bytes[12..16], &1_000_000u32.to_le_bytes());
    assert_eq!(&bytes[16..24], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    assert!(bytes[24..56].iter().all(|b| *b == 0xCC));
    assert!(bytes[56..88].iter().all(|b| *b == 0x5A));
}

#[test]
fn test_announcement_layout() {
    let mut proof = [0u8; ANN_PROOF_SIZE];
    proof[0] = 0xA1;
    proof[ITEM4_PREFIX_OFFSET] = 0xB2;
    let ann = Announcement::new(AnnounceHeader::default(), proof);

    let bytes = ann.encode();
    assert_eq!(bytes[88], 0xA1, "Proof region starts at offset 88");
    assert_eq!(bytes[1008], 0xB2, "Item 4 prefix starts at offset 1008");
    assert_eq!(ann.item4_prefix().len(), 16);
    assert_eq!(ann.item4_prefix()[0], 0xB2);
}

#[test]
fn test_coinbase_magic_bytes() {
    assert_eq!(COINBASE_MAGIC, 0x0211f909);

    let commit = CoinbaseCommitment::new(WorkBits::new(0x1e0fffff), [0x77; 32], 42);
    let bytes = commit.encode();
    assert_eq!(&bytes[0..4], &[0x09, 0xF9, 0x11, 0x02]);
    assert_eq!(&bytes[4..8], &[0xFF, 0xFF, 0x0F, 0x1E]);
    assert!(bytes[8..40].iter().all(|b| *b == 0x77));
    assert_eq!(&bytes[40..48], &42u64.to_le_bytes());
}

#[test]
fn test_header_and_proof_layout() {
    let header = BlockHeader {
        nonce: 0x01020304,
        ..Default::default()
    };
    let mut anns: [Announcement; NUM_ANNS] = Default::default();
    for (i, ann) in anns.iter_mut().enumerate() {
        ann.header.hard_nonce = i as u32 + 1;
    }
    let bundle = HeaderAndProof::new(header, 0xCAFEBABE, anns, vec![0xEE; 5]);

    let bytes = bundle.encode().unwrap();
    assert_eq!(bytes.len(), 4189);
    assert_eq!(&bytes[76..80], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&bytes[80..84], &[0xBE, 0xBA, 0xFE, 0xCA]);
    assert_eq!(&bytes[84..88], &[0x05, 0x00, 0x00, 0x00]);
    for i in 0..NUM_ANNS {
        let start = 88 + i * 1024;
        assert_eq!(&bytes[start + 4..start + 8], &(i as u32 + 1).to_le_bytes());
    }
    assert_eq!(&bytes[4184..], &[0xEE; 5]);
}

#[test]
fn test_find_layout() {
    let find = Find {
        ptr: 0x1122334455667788,
        size: 4096,
    };
    let bytes = find.encode();
    assert_eq!(&bytes[0..8], &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
    assert_eq!(&bytes[8..16], &4096u64.to_le_bytes());
}

#[test]
fn test_work_bits_expansion() {
    // Bitcoin genesis difficulty
    let target = WorkBits::new(0x1d00ffff).to_target().unwrap();
    assert_eq!(
        target.to_hex(),
        "00000000ffff0000000000000000000000000000000000000000000000000000"
    );
    assert_eq!(WorkBits::from_target(&target), WorkBits::new(0x1d00ffff));
}
