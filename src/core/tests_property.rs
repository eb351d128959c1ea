//! Property-based tests for the record codecs
//!
//! Every well-formed value survives encode/decode, and decoders never panic
//! on arbitrary input.

use super::codec;
use super::constants::*;
use super::*;
use proptest::prelude::*;

fn block_header() -> impl Strategy<Value = BlockHeader> {
    (
        any::<u32>(),
        prop::array::uniform8(any::<u32>()),
        prop::array::uniform8(any::<u32>()),
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(|(version, prev, root, time, bits, nonce)| BlockHeader {
            version,
            hash_prev_block: prev,
            hash_merkle_root: root,
            time_seconds: time,
            work_bits: WorkBits::new(bits),
            nonce,
        })
}

fn announce_header() -> impl Strategy<Value = AnnounceHeader> {
    (
        any::<u8>(),
        0u32..=codec::U24_MAX,
        any::<u32>(),
        any::<u32>(),
        any::<u32>(),
        any::<u64>(),
        prop::array::uniform32(any::<u8>()),
        prop::array::uniform32(any::<u8>()),
    )
        .prop_map(
            |(version, soft, hard, bits, height, content_type, content_hash, signing_key)| {
                AnnounceHeader {
                    version,
                    soft_nonce: SoftNonce::new(soft).unwrap(),
                    hard_nonce: hard,
                    work_bits: WorkBits::new(bits),
                    parent_block_height: height,
                    content_type,
                    content_hash,
                    signing_key,
                }
            },
        )
}

fn announcement() -> impl Strategy<Value = Announcement> {
    (
        announce_header(),
        prop::collection::vec(any::<u8>(), ANN_PROOF_SIZE),
    )
        .prop_map(|(header, proof)| {
            let proof: [u8; ANN_PROOF_SIZE] = proof.try_into().unwrap();
            Announcement::new(header, proof)
        })
}

proptest! {
    #[test]
    fn codec_u32_roundtrip(value in any::<u32>(), offset in 0usize..16) {
        let mut buf = vec![0u8; 20];
        codec::put_u32(&mut buf, offset, value).unwrap();
        prop_assert_eq!(codec::get_u32(&buf, offset).unwrap(), value);
        prop_assert_eq!(&buf[offset..offset + 4], &value.to_le_bytes()[..]);
    }

    #[test]
    fn codec_u64_roundtrip(value in any::<u64>(), offset in 0usize..8) {
        let mut buf = vec![0u8; 16];
        codec::put_u64(&mut buf, offset, value).unwrap();
        prop_assert_eq!(codec::get_u64(&buf, offset).unwrap(), value);
    }

    #[test]
    fn codec_u24_roundtrip(value in 0u32..=codec::U24_MAX) {
        let mut buf = [0u8; 3];
        codec::put_u24(&mut buf, 0, value).unwrap();
        prop_assert_eq!(codec::get_u24(&buf, 0).unwrap(), value);
    }

    #[test]
    fn codec_reads_past_end_fail(len in 0usize..8, offset in 0usize..16) {
        let buf = vec![0u8; len];
        let fits = offset + 4 <= len;
        prop_assert_eq!(codec::get_u32(&buf, offset).is_ok(), fits);
    }

    #[test]
    fn block_header_roundtrip(header in block_header()) {
        let bytes = header.encode();
        prop_assert_eq!(BlockHeader::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn announce_header_roundtrip(header in announce_header()) {
        let bytes = header.encode();
        prop_assert_eq!(AnnounceHeader::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn announcement_roundtrip(ann in announcement()) {
        let bytes = ann.encode();
        prop_assert_eq!(&bytes[..ANNOUNCE_HEADER_SIZE], &ann.header.encode()[..]);
        prop_assert_eq!(Announcement::decode(&bytes).unwrap(), ann);
    }

    #[test]
    fn coinbase_roundtrip(
        bits in any::<u32>(),
        root in prop::array::uniform32(any::<u8>()),
        num_anns in any::<u64>()
    ) {
        let commit = CoinbaseCommitment::new(WorkBits::new(bits), root, num_anns);
        let bytes = commit.encode();
        prop_assert_eq!(CoinbaseCommitment::decode(&bytes).unwrap(), commit);
    }

    #[test]
    fn find_roundtrip(ptr in any::<u64>(), size in any::<u64>()) {
        let find = Find { ptr, size };
        prop_assert_eq!(Find::decode(&find.encode()).unwrap(), find);
    }

    #[test]
    fn header_and_proof_roundtrip(
        header in block_header(),
        nonce2 in any::<u32>(),
        ann in announcement(),
        proof in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        let anns = [ann.clone(), ann.clone(), ann.clone(), ann];
        let bundle = HeaderAndProof::new(header, nonce2, anns, proof.clone());
        let bytes = bundle.encode().unwrap();
        prop_assert_eq!(bytes.len() as u64, HeaderAndProof::sizeof(proof.len() as u32));
        prop_assert_eq!(HeaderAndProof::decode(&bytes).unwrap(), bundle);
    }

    #[test]
    fn header_and_proof_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..4400)) {
        let _ = HeaderAndProof::decode(&bytes);
    }

    #[test]
    fn header_and_proof_rejects_wrong_length(proof_len in 0u32..64, delta in 1usize..64, longer in any::<bool>()) {
        let declared = HeaderAndProof::sizeof(proof_len) as usize;
        let len = if longer { declared + delta } else { declared - delta };
        let mut bytes = vec![0u8; len];
        codec::put_u32(&mut bytes, 84, proof_len).unwrap();
        prop_assert!(HeaderAndProof::decode(&bytes).unwrap_err().is_structural());
    }
}
