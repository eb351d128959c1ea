//! Compact difficulty encoding (`workBits`)
//!
//! The compact form is the Bitcoin `nBits` encoding: the high byte is a base-256
//! exponent, the low 23 bits a mantissa and bit 23 a sign flag. Expansion is
//! provided for inspection and for producers; nothing in this crate compares a
//! hash against a target.

use crate::error::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007F_FFFF;

/// A 256-bit target, stored big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Target(pub [u8; 32]);

impl Target {
    /// Create a Target from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the target as big-endian bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check whether the target is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    fn to_biguint(self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    fn from_biguint(value: &BigUint) -> Result<Self> {
        let raw = value.to_bytes_be();
        if raw.len() > 32 {
            return Err(Error::invalid_field(
                "target",
                format!("{} bytes exceeds 256 bits", raw.len()),
            ));
        }
        let mut bytes = [0u8; 32];
        bytes[32 - raw.len()..].copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compact difficulty as carried in `workBits` and `annLeastWorkTarget`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkBits(pub u32);

impl WorkBits {
    /// Create a new WorkBits value
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw compact value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Base-256 exponent
    pub const fn exponent(self) -> u32 {
        self.0 >> 24
    }

    /// 23-bit mantissa
    pub const fn mantissa(self) -> u32 {
        self.0 & MANTISSA_MASK
    }

    /// Whether the sign bit is set with a non-zero mantissa
    pub const fn is_negative(self) -> bool {
        self.0 & SIGN_BIT != 0 && self.mantissa() != 0
    }

    /// Whether the expanded value would not fit in 256 bits
    pub const fn is_overflow(self) -> bool {
        let size = self.exponent();
        let word = self.mantissa();
        word != 0 && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32))
    }

    /// Expand to a 256-bit target
    pub fn to_target(self) -> Result<Target> {
        if self.is_negative() {
            return Err(Error::invalid_field(
                "work_bits",
                format!("{:#010x} encodes a negative target", self.0),
            ));
        }
        if self.is_overflow() {
            return Err(Error::invalid_field(
                "work_bits",
                format!("{:#010x} overflows 256 bits", self.0),
            ));
        }

        let size = self.exponent();
        let word = BigUint::from(self.mantissa());
        let value = if size <= 3 {
            word >> (8 * (3 - size) as usize)
        } else {
            word << (8 * (size - 3) as usize)
        };
        Target::from_biguint(&value)
    }

    /// Compress a target into its canonical compact form
    pub fn from_target(target: &Target) -> Self {
        let value = target.to_biguint();
        if value.is_zero() {
            return Self(0);
        }

        let mut size = value.to_bytes_be().len() as u32;
        let mut compact: u32 = if size <= 3 {
            let low = value.iter_u32_digits().next().unwrap_or(0);
            low << (8 * (3 - size))
        } else {
            let shifted: BigUint = &value >> (8 * (size - 3) as usize);
            shifted.iter_u32_digits().next().unwrap_or(0)
        };

        // A set sign bit would flip the meaning, move one byte into the exponent
        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }
        Self(compact | (size << 24))
    }

    /// The weakest of a set of compact difficulties (the largest target)
    ///
    /// Returns `None` for an empty set or when any member does not expand.
    pub fn least_work<I>(bits: I) -> Option<Self>
    where
        I: IntoIterator<Item = WorkBits>,
    {
        let mut least: Option<(Target, WorkBits)> = None;
        for b in bits {
            let target = b.to_target().ok()?;
            match least {
                Some((t, _)) if t >= target => {}
                _ => least = Some((target, b)),
            }
        }
        least.map(|(_, b)| b)
    }
}

impl fmt::Display for WorkBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl From<u32> for WorkBits {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<WorkBits> for u32 {
    fn from(bits: WorkBits) -> Self {
        bits.0
    }
}
