//! 16-byte find record: a `(ptr, size)` pair

use crate::core::codec;
use crate::core::constants::FIND_SIZE;
use crate::error::Result;
use serde::{Deserialize, Serialize};

const PTR_OFFSET: usize = 0;
const SIZE_OFFSET: usize = 8;

/// Location of an item inside an external table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Find {
    pub ptr: u64,
    pub size: u64,
}

impl Find {
    /// Encoded size in bytes
    pub const SIZE: usize = FIND_SIZE;

    /// Decode from exactly [`Find::SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::expect_len("find", bytes, Self::SIZE)?;
        Ok(Self {
            ptr: codec::get_u64(bytes, PTR_OFFSET)?,
            size: codec::get_u64(bytes, SIZE_OFFSET)?,
        })
    }

    fn write_to(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        codec::put_u64(buf, offset + PTR_OFFSET, self.ptr)?;
        codec::put_u64(buf, offset + SIZE_OFFSET, self.size)
    }

    /// Encode into exactly [`Find::SIZE`] bytes
    pub fn encode(&self) -> [u8; FIND_SIZE] {
        let mut out = [0u8; FIND_SIZE];
        let written = self.write_to(&mut out, 0);
        debug_assert!(written.is_ok());
        out
    }

    /// Encode into a caller-supplied buffer of exactly [`Find::SIZE`] bytes
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        codec::expect_len("find", buf, Self::SIZE)?;
        self.write_to(buf, 0)
    }
}
