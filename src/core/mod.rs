//! Wire records of the PacketCrypt proof-of-work scheme
//!
//! This module contains the fixed-layout records exchanged between miners and
//! validators: the block header, announcement header, announcement,
//! header-and-proof bundle, coinbase commitment and find record, together with
//! the validation context buffer handed to the external evaluator.

pub mod codec;
mod announce;
mod block_header;
mod coinbase;
mod context;
mod find;
mod header_and_proof;
mod work_bits;

pub use announce::{AnnounceHeader, Announcement, SoftNonce};
pub use block_header::BlockHeader;
pub use coinbase::CoinbaseCommitment;
pub use context::ValidationContext;
pub use find::Find;
pub use header_and_proof::HeaderAndProof;
pub use work_bits::{Target, WorkBits};

/// Constants for the wire format
pub mod constants {
    /// Number of announcements embedded in every header-and-proof bundle
    pub const NUM_ANNS: usize = 4;

    /// Size of a 256-bit hash or key in bytes
    pub const HASH_SIZE: usize = 32;

    /// Size of a block header in bytes
    pub const BLOCK_HEADER_SIZE: usize = 80;

    /// Size of an announcement header in bytes
    pub const ANNOUNCE_HEADER_SIZE: usize = 88;

    /// Number of 64-bit words in an announcement's proof region
    pub const ANN_PROOF_WORDS: usize = 117;

    /// Size of an announcement's proof region in bytes
    pub const ANN_PROOF_SIZE: usize = ANN_PROOF_WORDS * 8;

    /// Size of the item prefix stored at the tail of the proof region
    pub const ITEM4_PREFIX_SIZE: usize = 16;

    /// Offset of the item prefix within the proof region
    pub const ITEM4_PREFIX_OFFSET: usize = ANN_PROOF_SIZE - ITEM4_PREFIX_SIZE;

    /// Size of an announcement in bytes
    pub const ANNOUNCEMENT_SIZE: usize = ANNOUNCE_HEADER_SIZE + ANN_PROOF_SIZE;

    /// Size of the block header, nonce2 and proofLen prefix of a bundle
    pub const HAP_PREFIX_SIZE: usize = BLOCK_HEADER_SIZE + 4 + 4;

    /// Size of a header-and-proof bundle without its proof
    pub const HAP_FIXED_SIZE: usize = HAP_PREFIX_SIZE + ANNOUNCEMENT_SIZE * NUM_ANNS;

    /// Magic tag identifying a coinbase commitment
    pub const COINBASE_MAGIC: u32 = 0x0211_f909;

    /// Size of a coinbase commitment in bytes
    pub const COINBASE_SIZE: usize = 48;

    /// Size of a find record in bytes
    pub const FIND_SIZE: usize = 16;

    /// Number of 32-bit words in a validation context
    pub const CONTEXT_WORDS: usize = 2048;

    /// Size of a validation context in bytes
    pub const CONTEXT_SIZE: usize = CONTEXT_WORDS * 4;

    const _: () = assert!(ANNOUNCEMENT_SIZE == 1024);
    const _: () = assert!(HAP_FIXED_SIZE == 4184);
    const _: () = assert!(CONTEXT_SIZE == 8192);
}

/// Serde helper encoding byte arrays as lowercase hex strings
pub(crate) mod hex_array {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        bytes.try_into().map_err(|v: Vec<u8>| {
            de::Error::custom(format!("expected {} bytes, got {}", N, v.len()))
        })
    }
}


#[cfg(test)]
mod tests_property;
