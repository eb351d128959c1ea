//! # PacketCrypt Wire
//!
//! Binary layouts of the PacketCrypt proof-of-work records and a structural
//! validator that checks untrusted buffers before anything interprets them.
//!
//! ## Records
//!
//! - **Block header** (80 bytes) with compact difficulty bits
//! - **Announcement header** (88 bytes) and **announcement** (1024 bytes)
//! - **Header and proof** bundle: header, nonce2, four announcements and a
//!   variable-length proof
//! - **Coinbase commitment** (48 bytes) tagged with a fixed magic
//! - **Validation context**, an 8 KiB scratch buffer for the external evaluator
//!
//! All multi-byte integers are little-endian. Decoding never reads past the
//! end of a buffer and never accepts trailing bytes.

#![warn(
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications,
    clippy::all
)]
#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod evaluator;
pub mod utils;
pub mod validator;

pub use crate::error::{Error, Result};
pub use crate::config::Config;
pub use crate::core::{
    AnnounceHeader, Announcement, BlockHeader, CoinbaseCommitment, HeaderAndProof, ValidationContext,
    WorkBits,
};
pub use evaluator::{PowEvaluator, Verifier};
pub use utils::logging::Provenance;
pub use utils::memory::ContextPool;
pub use validator::{Record, RecordKind, StructuralValidator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::Config,
        core::{
            AnnounceHeader, Announcement, BlockHeader, CoinbaseCommitment, Find, HeaderAndProof,
            SoftNonce, Target, ValidationContext, WorkBits,
        },
        error::{Error, ErrorKind, Result},
        evaluator::{Evaluation, PowEvaluator, Verifier},
        utils::{logging::Provenance, memory::ContextPool},
        validator::{Record, RecordKind, StructuralValidator},
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
