//! 80-byte block header, bit-for-bit compatible with Bitcoin

use crate::core::codec;
use crate::core::constants::{BLOCK_HEADER_SIZE, HASH_SIZE};
use crate::core::WorkBits;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

const VERSION_OFFSET: usize = 0;
const PREV_BLOCK_OFFSET: usize = 4;
const MERKLE_ROOT_OFFSET: usize = 36;
const TIME_OFFSET: usize = 68;
const WORK_BITS_OFFSET: usize = 72;
const NONCE_OFFSET: usize = 76;

/// Block header used as the proof-of-work target object
///
/// Hashes are kept as eight little-endian 32-bit words, matching the wire
/// layout; [`BlockHeader::hash_prev_block_bytes`] gives the 32-byte form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    #[serde(with = "hash_words")]
    pub hash_prev_block: [u32; 8],
    #[serde(with = "hash_words")]
    pub hash_merkle_root: [u32; 8],
    pub time_seconds: u32,
    pub work_bits: WorkBits,
    pub nonce: u32,
}

impl BlockHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = BLOCK_HEADER_SIZE;

    /// Decode from exactly [`BlockHeader::SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::expect_len("block-header", bytes, Self::SIZE)?;
        Self::read_from(bytes, 0)
    }

    /// Read a header embedded at `offset` of a larger buffer
    pub(crate) fn read_from(buf: &[u8], offset: usize) -> Result<Self> {
        Ok(Self {
            version: codec::get_u32(buf, offset + VERSION_OFFSET)?,
            hash_prev_block: codec::get_u32_words::<8>(buf, offset + PREV_BLOCK_OFFSET)?,
            hash_merkle_root: codec::get_u32_words::<8>(buf, offset + MERKLE_ROOT_OFFSET)?,
            time_seconds: codec::get_u32(buf, offset + TIME_OFFSET)?,
            work_bits: WorkBits::new(codec::get_u32(buf, offset + WORK_BITS_OFFSET)?),
            nonce: codec::get_u32(buf, offset + NONCE_OFFSET)?,
        })
    }

    /// Write the header at `offset` of a larger buffer
    pub(crate) fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        codec::put_u32(buf, offset + VERSION_OFFSET, self.version)?;
        codec::put_u32_words(buf, offset + PREV_BLOCK_OFFSET, &self.hash_prev_block)?;
        codec::put_u32_words(buf, offset + MERKLE_ROOT_OFFSET, &self.hash_merkle_root)?;
        codec::put_u32(buf, offset + TIME_OFFSET, self.time_seconds)?;
        codec::put_u32(buf, offset + WORK_BITS_OFFSET, self.work_bits.value())?;
        codec::put_u32(buf, offset + NONCE_OFFSET, self.nonce)
    }

    /// Encode into exactly [`BlockHeader::SIZE`] bytes
    pub fn encode(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut out = [0u8; BLOCK_HEADER_SIZE];
        let written = self.write_to(&mut out, 0);
        debug_assert!(written.is_ok());
        out
    }

    /// Encode into a caller-supplied buffer of exactly [`BlockHeader::SIZE`] bytes
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        codec::expect_len("block-header", buf, Self::SIZE)?;
        self.write_to(buf, 0)
    }

    /// A copy of this header with a different nonce
    pub fn with_nonce(self, nonce: u32) -> Self {
        Self { nonce, ..self }
    }

    /// Previous block hash as 32 bytes
    pub fn hash_prev_block_bytes(&self) -> [u8; HASH_SIZE] {
        words_to_bytes(&self.hash_prev_block)
    }

    /// Merkle root as 32 bytes
    pub fn hash_merkle_root_bytes(&self) -> [u8; HASH_SIZE] {
        words_to_bytes(&self.hash_merkle_root)
    }

    /// Hex of the encoded header
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Decode from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::decode(&hex::decode(s)?)
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHeader(version={}, time={}, bits={}, nonce={})",
            self.version, self.time_seconds, self.work_bits, self.nonce
        )
    }
}

pub(crate) fn words_to_bytes(words: &[u32; 8]) -> [u8; HASH_SIZE] {
    let mut out = [0u8; HASH_SIZE];
    let written = codec::put_u32_words(&mut out, 0, words);
    debug_assert!(written.is_ok());
    out
}

pub(crate) fn bytes_to_words(bytes: &[u8; HASH_SIZE]) -> [u32; 8] {
    codec::get_u32_words::<8>(bytes, 0).unwrap_or_default()
}

/// Serde helper: hash words as the hex of their little-endian bytes
mod hash_words {
    use super::{bytes_to_words, words_to_bytes};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(words: &[u32; 8], serializer: S) -> Result<S::Ok, S::Error> {
        crate::core::hex_array::serialize(&words_to_bytes(words), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u32; 8], D::Error> {
        let bytes: [u8; 32] = crate::core::hex_array::deserialize(deserializer)?;
        Ok(bytes_to_words(&bytes))
    }
}
