//! Header-and-proof bundle: the full solution a miner submits
//!
//! Layout:
//!
//! ```text
//! [ BlockHeader 0:80 ][ nonce2 80:84 ][ proofLen 84:88 ]
//! [ 4 x Announcement 88:4184 ][ proof 4184:4184+proofLen ]
//! ```
//!
//! `proofLen` is never trusted on its own. Decoding first checks that the
//! buffer is exactly `4184 + proofLen` bytes; encoding derives it from the
//! proof buffer.

use crate::core::codec;
use crate::core::constants::{
    ANNOUNCEMENT_SIZE, BLOCK_HEADER_SIZE, HAP_FIXED_SIZE, HAP_PREFIX_SIZE, NUM_ANNS,
};
use crate::core::{Announcement, BlockHeader};
use crate::error::{Error, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

const NONCE2_OFFSET: usize = BLOCK_HEADER_SIZE;
const PROOF_LEN_OFFSET: usize = BLOCK_HEADER_SIZE + 4;

/// Block header, second nonce, four announcements and a variable-length proof
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderAndProof {
    pub block_header: BlockHeader,
    pub nonce2: u32,
    pub announcements: [Announcement; NUM_ANNS],
    #[serde(with = "bytes_hex")]
    proof: Bytes,
}

impl HeaderAndProof {
    /// Size of everything but the proof
    pub const FIXED_SIZE: usize = HAP_FIXED_SIZE;

    /// Create a bundle; `proofLen` is taken from `proof`
    pub fn new(
        block_header: BlockHeader,
        nonce2: u32,
        announcements: [Announcement; NUM_ANNS],
        proof: impl Into<Bytes>,
    ) -> Self {
        Self {
            block_header,
            nonce2,
            announcements,
            proof: proof.into(),
        }
    }

    /// Total encoded size for a given proof length
    pub const fn sizeof(proof_len: u32) -> u64 {
        HAP_FIXED_SIZE as u64 + proof_len as u64
    }

    /// Read the declared proof length without decoding anything else
    pub fn peek_proof_len(bytes: &[u8]) -> Result<u32> {
        codec::get_u32(bytes, PROOF_LEN_OFFSET)
    }

    /// Check that `bytes` is exactly as long as it declares itself to be
    ///
    /// Returns the declared proof length on success.
    pub fn check_size(bytes: &[u8]) -> Result<u32> {
        if bytes.len() < HAP_PREFIX_SIZE {
            // Not even proofLen is present; the bundle is at least FIXED_SIZE
            return Err(Error::truncated(HAP_FIXED_SIZE as u64, bytes.len()));
        }
        let proof_len = Self::peek_proof_len(bytes)?;
        let expected = Self::sizeof(proof_len);
        let actual = bytes.len() as u64;
        if actual < expected {
            return Err(Error::truncated(expected, bytes.len()));
        }
        if actual > expected {
            return Err(Error::trailing_bytes(expected, bytes.len()));
        }
        Ok(proof_len)
    }

    /// Decode a bundle, copying the proof out of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::check_size(bytes)?;
        let proof = Bytes::copy_from_slice(&bytes[HAP_FIXED_SIZE..]);
        Self::decode_fixed(bytes, proof)
    }

    /// Decode a bundle, sharing the proof with `bytes` instead of copying it
    pub fn decode_shared(bytes: Bytes) -> Result<Self> {
        Self::check_size(&bytes)?;
        let proof = bytes.slice(HAP_FIXED_SIZE..);
        Self::decode_fixed(&bytes, proof)
    }

    fn decode_fixed(bytes: &[u8], proof: Bytes) -> Result<Self> {
        let block_header = BlockHeader::read_from(bytes, 0)?;
        let nonce2 = codec::get_u32(bytes, NONCE2_OFFSET)?;

        let announcements = (0..NUM_ANNS)
            .map(|i| Announcement::read_from(bytes, HAP_PREFIX_SIZE + i * ANNOUNCEMENT_SIZE))
            .collect::<Result<Vec<_>>>()?;
        let announcements: [Announcement; NUM_ANNS] = announcements
            .try_into()
            .map_err(|v: Vec<Announcement>| Error::size_mismatch("announcements", NUM_ANNS, v.len()))?;

        Ok(Self {
            block_header,
            nonce2,
            announcements,
            proof,
        })
    }

    /// Encode to bytes
    ///
    /// Fails only when the proof is too long for a 32-bit length field.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let proof_len = self.proof_len_u32()?;
        let mut out = vec![0u8; HAP_FIXED_SIZE + self.proof.len()];

        self.block_header.write_to(&mut out, 0)?;
        codec::put_u32(&mut out, NONCE2_OFFSET, self.nonce2)?;
        codec::put_u32(&mut out, PROOF_LEN_OFFSET, proof_len)?;
        for (i, ann) in self.announcements.iter().enumerate() {
            ann.write_to(&mut out, HAP_PREFIX_SIZE + i * ANNOUNCEMENT_SIZE)?;
        }
        codec::put_bytes(&mut out, HAP_FIXED_SIZE, &self.proof)?;
        Ok(out)
    }

    /// Length of the encoded bundle
    pub fn encoded_len(&self) -> usize {
        HAP_FIXED_SIZE + self.proof.len()
    }

    /// The trailing proof
    pub fn proof(&self) -> &Bytes {
        &self.proof
    }

    /// Replace the proof; `proofLen` follows automatically
    pub fn set_proof(&mut self, proof: impl Into<Bytes>) {
        self.proof = proof.into();
    }

    /// Length of the trailing proof in bytes
    pub fn proof_len(&self) -> usize {
        self.proof.len()
    }

    fn proof_len_u32(&self) -> Result<u32> {
        u32::try_from(self.proof.len()).map_err(|_| {
            Error::invalid_field(
                "proof_len",
                format!("{} bytes does not fit in 32 bits", self.proof.len()),
            )
        })
    }

    /// Hex of the encoded bundle
    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.encode()?))
    }

    /// Decode from a hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::decode(&hex::decode(s)?)
    }
}

impl fmt::Debug for HeaderAndProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderAndProof")
            .field("block_header", &self.block_header)
            .field("nonce2", &self.nonce2)
            .field("announcements", &self.announcements)
            .field("proof_len", &self.proof.len())
            .finish()
    }
}

impl fmt::Display for HeaderAndProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeaderAndProof(nonce={}, nonce2={}, proof_len={})",
            self.block_header.nonce,
            self.nonce2,
            self.proof.len()
        )
    }
}

mod bytes_hex {
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(proof: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(proof))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Bytes::from).map_err(de::Error::custom)
    }
}
