//! Coinbase commitment summarizing a block's announcement set

use crate::core::codec;
use crate::core::constants::{COINBASE_MAGIC, COINBASE_SIZE, HASH_SIZE};
use crate::core::{hex_array, WorkBits};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAGIC_OFFSET: usize = 0;
const LEAST_WORK_OFFSET: usize = 4;
const MERKLE_ROOT_OFFSET: usize = 8;
const NUM_ANNS_OFFSET: usize = 40;

/// 48-byte commitment embedded in the coinbase transaction
///
/// The magic tag is implied by the type: a decoded value always carried
/// [`COINBASE_MAGIC`] and encoding always writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CoinbaseCommitment {
    /// Weakest difficulty among the committed announcements
    pub ann_least_work_target: WorkBits,
    /// Root over the committed announcement set
    #[serde(with = "hex_array")]
    pub merkle_root: [u8; HASH_SIZE],
    pub num_anns: u64,
}

impl CoinbaseCommitment {
    /// Encoded size in bytes
    pub const SIZE: usize = COINBASE_SIZE;

    /// Magic tag written at offset 0
    pub const MAGIC: u32 = COINBASE_MAGIC;

    /// Create a commitment
    pub fn new(ann_least_work_target: WorkBits, merkle_root: [u8; HASH_SIZE], num_anns: u64) -> Self {
        Self {
            ann_least_work_target,
            merkle_root,
            num_anns,
        }
    }

    /// Summarize a set of announcement difficulties under a Merkle root
    ///
    /// Fails when the set is empty or a difficulty does not expand to a target.
    pub fn summarize<I>(work_bits: I, merkle_root: [u8; HASH_SIZE]) -> Result<Self>
    where
        I: IntoIterator<Item = WorkBits>,
    {
        let bits: Vec<WorkBits> = work_bits.into_iter().collect();
        let least = WorkBits::least_work(bits.iter().copied()).ok_or_else(|| {
            Error::invalid_field("ann_least_work_target", "no valid announcement difficulty")
        })?;
        Ok(Self::new(least, merkle_root, bits.len() as u64))
    }

    /// Decode from exactly [`CoinbaseCommitment::SIZE`] bytes
    ///
    /// The magic tag is checked before any other field is read.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::expect_len("coinbase", bytes, Self::SIZE)?;
        let magic = codec::get_u32(bytes, MAGIC_OFFSET)?;
        if magic != Self::MAGIC {
            return Err(Error::bad_magic(Self::MAGIC, magic));
        }
        Ok(Self {
            ann_least_work_target: WorkBits::new(codec::get_u32(bytes, LEAST_WORK_OFFSET)?),
            merkle_root: codec::get_bytes::<HASH_SIZE>(bytes, MERKLE_ROOT_OFFSET)?,
            num_anns: codec::get_u64(bytes, NUM_ANNS_OFFSET)?,
        })
    }

    /// Encode into exactly [`CoinbaseCommitment::SIZE`] bytes
    pub fn encode(&self) -> [u8; COINBASE_SIZE] {
        let mut out = [0u8; COINBASE_SIZE];
        let written = self.encode_into(&mut out);
        debug_assert!(written.is_ok());
        out
    }

    /// Encode into a caller-supplied buffer of exactly [`CoinbaseCommitment::SIZE`] bytes
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        codec::expect_len("coinbase", buf, Self::SIZE)?;
        codec::put_u32(buf, MAGIC_OFFSET, Self::MAGIC)?;
        codec::put_u32(buf, LEAST_WORK_OFFSET, self.ann_least_work_target.value())?;
        codec::put_bytes(buf, MERKLE_ROOT_OFFSET, &self.merkle_root)?;
        codec::put_u64(buf, NUM_ANNS_OFFSET, self.num_anns)
    }

    /// Locate a commitment inside a larger blob such as coinbase extra data
    ///
    /// Returns the first 48-byte window that starts with the magic tag and
    /// decodes cleanly.
    pub fn find_in(data: &[u8]) -> Option<(usize, Self)> {
        let magic = Self::MAGIC.to_le_bytes();
        data.windows(Self::SIZE)
            .enumerate()
            .filter(|(_, w)| w[..4] == magic)
            .find_map(|(i, w)| Self::decode(w).ok().map(|c| (i, c)))
    }

    /// Hex of the encoded commitment
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Decode from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::decode(&hex::decode(s)?)
    }
}

impl fmt::Display for CoinbaseCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coinbase(anns={}, least_work={}, root={})",
            self.num_anns,
            self.ann_least_work_target,
            hex::encode(self.merkle_root)
        )
    }
}
