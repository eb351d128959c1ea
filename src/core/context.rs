//! Validation context: opaque scratch memory for the external evaluator
//!
//! The buffer is owned by exactly one evaluation at a time. It is not `Clone`
//! and is handed to evaluators as `&mut`, so two evaluations can never share
//! one. Use [`crate::utils::memory::ContextPool`] to keep one buffer per
//! concurrent evaluation.

use crate::core::constants::{CONTEXT_SIZE, CONTEXT_WORDS};
use std::fmt;

/// 8192-byte scratch region (2048 32-bit words)
#[repr(C)]
pub struct ValidationContext {
    progbuf: [u32; CONTEXT_WORDS],
}

impl ValidationContext {
    /// Size in bytes
    pub const SIZE: usize = CONTEXT_SIZE;

    /// Number of 32-bit words
    pub const WORDS: usize = CONTEXT_WORDS;

    /// Allocate a zeroed context on the heap
    pub fn boxed() -> Box<Self> {
        Box::new(Self::default())
    }

    /// The program buffer as words
    pub fn words(&self) -> &[u32; CONTEXT_WORDS] {
        &self.progbuf
    }

    /// Mutable access to the program buffer
    pub fn words_mut(&mut self) -> &mut [u32; CONTEXT_WORDS] {
        &mut self.progbuf
    }

    /// The program buffer as raw bytes in native word order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.progbuf)
    }

    /// Mutable raw byte view
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.progbuf)
    }

    /// Zero the whole buffer
    pub fn reset(&mut self) {
        self.progbuf.fill(0);
    }

    /// Whether every word is zero
    pub fn is_zeroed(&self) -> bool {
        self.progbuf.iter().all(|w| *w == 0)
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            progbuf: [0; CONTEXT_WORDS],
        }
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("size", &Self::SIZE)
            .field("zeroed", &self.is_zeroed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_size() {
        assert_eq!(std::mem::size_of::<ValidationContext>(), 8192);
        assert_eq!(std::mem::align_of::<ValidationContext>(), 4);
        assert_eq!(ValidationContext::SIZE, 8192);
        assert_eq!(ValidationContext::boxed().as_bytes().len(), 8192);
    }

    #[test]
    fn test_context_reset() {
        let mut ctx = ValidationContext::boxed();
        assert!(ctx.is_zeroed());

        ctx.words_mut()[2047] = 0xFFFF_FFFF;
        ctx.as_bytes_mut()[0] = 1;
        assert!(!ctx.is_zeroed());
        assert_eq!(ctx.as_bytes()[8191], 0xFF);

        ctx.reset();
        assert!(ctx.is_zeroed());
    }
}
