//! Announcement header and announcement records
//!
//! An announcement is the 88-byte header followed by a 936-byte proof region:
//!
//! ```text
//! [ Header 0:88 ][ AnnMerkle proof 88:1008 ][ Item 4 Prefix 1008:1024 ]
//! ```
//!
//! The record only guarantees the byte budget of the proof region. How it is
//! split between proof steps and the item prefix belongs to the Merkle proof
//! verifier, so neither part is interpreted here.

use crate::core::codec::{self, U24_MAX};
use crate::core::constants::{
    ANNOUNCEMENT_SIZE, ANNOUNCE_HEADER_SIZE, ANN_PROOF_SIZE, ANN_PROOF_WORDS, HASH_SIZE,
    ITEM4_PREFIX_OFFSET, ITEM4_PREFIX_SIZE,
};
use crate::core::{hex_array, WorkBits};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const VERSION_OFFSET: usize = 0;
const SOFT_NONCE_OFFSET: usize = 1;
const HARD_NONCE_OFFSET: usize = 4;
const WORK_BITS_OFFSET: usize = 8;
const PARENT_HEIGHT_OFFSET: usize = 12;
const CONTENT_TYPE_OFFSET: usize = 16;
const CONTENT_HASH_OFFSET: usize = 24;
const SIGNING_KEY_OFFSET: usize = 56;

/// 24-bit nonce which can be rolled without regenerating the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SoftNonce(u32);

impl SoftNonce {
    /// Largest representable soft nonce
    pub const MAX: SoftNonce = SoftNonce(U24_MAX);

    /// Create a soft nonce, refusing values wider than 24 bits
    pub fn new(value: u32) -> Result<Self> {
        if value > U24_MAX {
            return Err(Error::invalid_field(
                "soft_nonce",
                format!("{:#x} does not fit in 24 bits", value),
            ));
        }
        Ok(Self(value))
    }

    /// Get the inner value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Increment by one, wrapping at 24 bits
    pub fn incremented(self) -> Self {
        Self(self.0.wrapping_add(1) & U24_MAX)
    }
}

impl TryFrom<u32> for SoftNonce {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SoftNonce> for u32 {
    fn from(nonce: SoftNonce) -> Self {
        nonce.0
    }
}

impl fmt::Display for SoftNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Header of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AnnounceHeader {
    /// Always zero for now
    pub version: u8,
    pub soft_nonce: SoftNonce,
    /// Rolling this nonce requires regenerating the dataset
    pub hard_nonce: u32,
    pub work_bits: WorkBits,
    /// Height of the most recent known block; its hash is committed when hashing
    pub parent_block_height: u32,
    pub content_type: u64,
    /// Merkle root of the announcement content, opaque here
    #[serde(with = "hex_array")]
    pub content_hash: [u8; HASH_SIZE],
    /// All-zero when unsigned
    #[serde(with = "hex_array")]
    pub signing_key: [u8; HASH_SIZE],
}

impl AnnounceHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = ANNOUNCE_HEADER_SIZE;

    /// Decode from exactly [`AnnounceHeader::SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::expect_len("announce-header", bytes, Self::SIZE)?;
        Self::read_from(bytes, 0)
    }

    pub(crate) fn read_from(buf: &[u8], offset: usize) -> Result<Self> {
        Ok(Self {
            version: codec::get_u8(buf, offset + VERSION_OFFSET)?,
            soft_nonce: SoftNonce(codec::get_u24(buf, offset + SOFT_NONCE_OFFSET)?),
            hard_nonce: codec::get_u32(buf, offset + HARD_NONCE_OFFSET)?,
            work_bits: WorkBits::new(codec::get_u32(buf, offset + WORK_BITS_OFFSET)?),
            parent_block_height: codec::get_u32(buf, offset + PARENT_HEIGHT_OFFSET)?,
            content_type: codec::get_u64(buf, offset + CONTENT_TYPE_OFFSET)?,
            content_hash: codec::get_bytes::<HASH_SIZE>(buf, offset + CONTENT_HASH_OFFSET)?,
            signing_key: codec::get_bytes::<HASH_SIZE>(buf, offset + SIGNING_KEY_OFFSET)?,
        })
    }

    pub(crate) fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        codec::put_u8(buf, offset + VERSION_OFFSET, self.version)?;
        codec::put_u24(buf, offset + SOFT_NONCE_OFFSET, self.soft_nonce.value())?;
        codec::put_u32(buf, offset + HARD_NONCE_OFFSET, self.hard_nonce)?;
        codec::put_u32(buf, offset + WORK_BITS_OFFSET, self.work_bits.value())?;
        codec::put_u32(buf, offset + PARENT_HEIGHT_OFFSET, self.parent_block_height)?;
        codec::put_u64(buf, offset + CONTENT_TYPE_OFFSET, self.content_type)?;
        codec::put_bytes(buf, offset + CONTENT_HASH_OFFSET, &self.content_hash)?;
        codec::put_bytes(buf, offset + SIGNING_KEY_OFFSET, &self.signing_key)
    }

    /// Encode into exactly [`AnnounceHeader::SIZE`] bytes
    pub fn encode(&self) -> [u8; ANNOUNCE_HEADER_SIZE] {
        let mut out = [0u8; ANNOUNCE_HEADER_SIZE];
        let written = self.write_to(&mut out, 0);
        debug_assert!(written.is_ok());
        out
    }

    /// Encode into a caller-supplied buffer of exactly [`AnnounceHeader::SIZE`] bytes
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        codec::expect_len("announce-header", buf, Self::SIZE)?;
        self.write_to(buf, 0)
    }

    /// Whether the announcement must be followed by a detached signature
    pub fn is_signed(&self) -> bool {
        self.signing_key.iter().any(|b| *b != 0)
    }

    /// The signing key, if the announcement is signed
    pub fn signing_key(&self) -> Option<&[u8; HASH_SIZE]> {
        self.is_signed().then_some(&self.signing_key)
    }
}

/// A complete 1024-byte announcement
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Announcement {
    pub header: AnnounceHeader,
    #[serde(with = "proof_hex")]
    proof: Box<[u8; ANN_PROOF_SIZE]>,
}

impl Announcement {
    /// Encoded size in bytes
    pub const SIZE: usize = ANNOUNCEMENT_SIZE;

    /// Create an announcement from a header and its proof region
    pub fn new(header: AnnounceHeader, proof: [u8; ANN_PROOF_SIZE]) -> Self {
        Self {
            header,
            proof: Box::new(proof),
        }
    }

    /// Create an announcement from a header and the proof region as 64-bit words
    pub fn from_proof_words(header: AnnounceHeader, words: &[u64; ANN_PROOF_WORDS]) -> Self {
        let mut proof = [0u8; ANN_PROOF_SIZE];
        let written = codec::put_u64_words(&mut proof, 0, words);
        debug_assert!(written.is_ok());
        Self::new(header, proof)
    }

    /// Decode from exactly [`Announcement::SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::expect_len("announcement", bytes, Self::SIZE)?;
        Self::read_from(bytes, 0)
    }

    pub(crate) fn read_from(buf: &[u8], offset: usize) -> Result<Self> {
        let header = AnnounceHeader::read_from(buf, offset)?;
        let proof = codec::get_bytes::<ANN_PROOF_SIZE>(buf, offset + ANNOUNCE_HEADER_SIZE)?;
        Ok(Self::new(header, proof))
    }

    pub(crate) fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        self.header.write_to(buf, offset)?;
        codec::put_bytes(buf, offset + ANNOUNCE_HEADER_SIZE, &self.proof[..])
    }

    /// Encode into exactly [`Announcement::SIZE`] bytes
    pub fn encode(&self) -> [u8; ANNOUNCEMENT_SIZE] {
        let mut out = [0u8; ANNOUNCEMENT_SIZE];
        let written = self.write_to(&mut out, 0);
        debug_assert!(written.is_ok());
        out
    }

    /// Encode into a caller-supplied buffer of exactly [`Announcement::SIZE`] bytes
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        codec::expect_len("announcement", buf, Self::SIZE)?;
        self.write_to(buf, 0)
    }

    /// The 936-byte proof region
    pub fn proof(&self) -> &[u8; ANN_PROOF_SIZE] {
        &self.proof
    }

    /// Mutable access to the proof region
    pub fn proof_mut(&mut self) -> &mut [u8; ANN_PROOF_SIZE] {
        &mut self.proof
    }

    /// The proof region as 117 little-endian 64-bit words
    pub fn proof_words(&self) -> [u64; ANN_PROOF_WORDS] {
        codec::get_u64_words::<ANN_PROOF_WORDS>(&self.proof[..], 0)
            .unwrap_or([0u64; ANN_PROOF_WORDS])
    }

    /// Trailing 16 bytes of the proof region, where the item 4 prefix lives
    pub fn item4_prefix(&self) -> &[u8] {
        &self.proof[ITEM4_PREFIX_OFFSET..ITEM4_PREFIX_OFFSET + ITEM4_PREFIX_SIZE]
    }

    /// Whether the announcement is signed
    pub fn is_signed(&self) -> bool {
        self.header.is_signed()
    }

    /// Hex of the encoded announcement
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    /// Decode from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::decode(&hex::decode(s)?)
    }
}

impl Default for Announcement {
    fn default() -> Self {
        Self::new(AnnounceHeader::default(), [0u8; ANN_PROOF_SIZE])
    }
}

impl fmt::Debug for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcement")
            .field("header", &self.header)
            .field("item4_prefix", &hex::encode(self.item4_prefix()))
            .finish_non_exhaustive()
    }
}

mod proof_hex {
    use super::ANN_PROOF_SIZE;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        proof: &[u8; ANN_PROOF_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        crate::core::hex_array::serialize(proof, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Box<[u8; ANN_PROOF_SIZE]>, D::Error> {
        crate::core::hex_array::deserialize(deserializer).map(Box::new)
    }
}
