//! Structural validation of raw input
//!
//! The validator is the gate every externally supplied buffer passes before
//! any cryptographic or consensus check. It looks at size and shape only:
//! exact lengths of fixed records, the declared total of a header-and-proof
//! bundle and the coinbase magic. A record is either accepted whole or
//! rejected with one error; there is no partial acceptance.

use crate::core::{
    AnnounceHeader, Announcement, BlockHeader, CoinbaseCommitment, Find, HeaderAndProof,
};
use crate::config::ValidatorConfig;
use crate::core::codec;
use crate::error::{Error, ErrorKind, Result};
use crate::utils::logging::Provenance;
use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The record kinds the validator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// 80-byte block header
    BlockHeader,
    /// 88-byte announcement header
    AnnounceHeader,
    /// 1024-byte announcement
    Announcement,
    /// Variable-length header-and-proof bundle
    HeaderAndProof,
    /// 48-byte coinbase commitment
    Coinbase,
    /// 16-byte find record
    Find,
}

impl RecordKind {
    /// Get all record kinds
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::BlockHeader,
            RecordKind::AnnounceHeader,
            RecordKind::Announcement,
            RecordKind::HeaderAndProof,
            RecordKind::Coinbase,
            RecordKind::Find,
        ]
    }

    /// Stable name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::BlockHeader => "block-header",
            RecordKind::AnnounceHeader => "announce-header",
            RecordKind::Announcement => "announcement",
            RecordKind::HeaderAndProof => "header-and-proof",
            RecordKind::Coinbase => "coinbase",
            RecordKind::Find => "find",
        }
    }

    /// Encoded size for fixed records, `None` for the bundle
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            RecordKind::BlockHeader => Some(BlockHeader::SIZE),
            RecordKind::AnnounceHeader => Some(AnnounceHeader::SIZE),
            RecordKind::Announcement => Some(Announcement::SIZE),
            RecordKind::HeaderAndProof => None,
            RecordKind::Coinbase => Some(CoinbaseCommitment::SIZE),
            RecordKind::Find => Some(Find::SIZE),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RecordKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::config(format!("Unknown record kind: {}", s)))
    }
}

/// A decoded record of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "kebab-case")]
pub enum Record {
    BlockHeader(BlockHeader),
    AnnounceHeader(AnnounceHeader),
    Announcement(Box<Announcement>),
    HeaderAndProof(Box<HeaderAndProof>),
    Coinbase(CoinbaseCommitment),
    Find(Find),
}

impl Record {
    /// The kind of this record
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::BlockHeader(_) => RecordKind::BlockHeader,
            Record::AnnounceHeader(_) => RecordKind::AnnounceHeader,
            Record::Announcement(_) => RecordKind::Announcement,
            Record::HeaderAndProof(_) => RecordKind::HeaderAndProof,
            Record::Coinbase(_) => RecordKind::Coinbase,
            Record::Find(_) => RecordKind::Find,
        }
    }

    /// Encode back to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Record::BlockHeader(r) => r.encode().to_vec(),
            Record::AnnounceHeader(r) => r.encode().to_vec(),
            Record::Announcement(r) => r.encode().to_vec(),
            Record::HeaderAndProof(r) => r.encode()?,
            Record::Coinbase(r) => r.encode().to_vec(),
            Record::Find(r) => r.encode().to_vec(),
        })
    }
}

#[derive(Default)]
struct Counters {
    accepted: AtomicU64,
    rejected: [AtomicU64; ErrorKind::STRUCTURAL.len()],
}

/// Snapshot of validator counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub accepted: u64,
    pub size_mismatch: u64,
    pub truncated: u64,
    pub trailing_bytes: u64,
    pub bad_magic: u64,
    pub buffer_too_small: u64,
}

impl ValidationStats {
    /// Total number of rejected buffers
    pub fn rejected(&self) -> u64 {
        self.size_mismatch + self.truncated + self.trailing_bytes + self.bad_magic + self.buffer_too_small
    }
}

/// Size and shape gatekeeper for raw input
///
/// Cloning is cheap and clones share counters and the thread pool.
#[derive(Clone, Default)]
pub struct StructuralValidator {
    counters: Arc<Counters>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl StructuralValidator {
    /// Create a validator using the global rayon pool for batches
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with a dedicated pool of `threads` workers
    ///
    /// Zero threads means the global rayon pool.
    pub fn with_threads(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Ok(Self::new());
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("validator-{}", i))
            .build()
            .map_err(|e| Error::config(format!("Failed to build validator thread pool: {}", e)))?;
        Ok(Self {
            counters: Arc::default(),
            pool: Some(Arc::new(pool)),
        })
    }

    /// Create a validator sized by configuration
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        Self::with_threads(config.threads)
    }

    /// Check size and shape without building a record
    pub fn check(&self, kind: RecordKind, bytes: &[u8]) -> Result<()> {
        let Some(size) = kind.fixed_size() else {
            return HeaderAndProof::check_size(bytes).map(|_| ());
        };
        codec::expect_len(kind.as_str(), bytes, size)?;

        if kind == RecordKind::Coinbase {
            let magic = codec::get_u32(bytes, 0)?;
            if magic != CoinbaseCommitment::MAGIC {
                return Err(Error::bad_magic(CoinbaseCommitment::MAGIC, magic));
            }
        }
        Ok(())
    }

    /// Decode a record of the given kind
    pub fn decode(&self, kind: RecordKind, bytes: &[u8]) -> Result<Record> {
        Ok(match kind {
            RecordKind::BlockHeader => Record::BlockHeader(BlockHeader::decode(bytes)?),
            RecordKind::AnnounceHeader => Record::AnnounceHeader(AnnounceHeader::decode(bytes)?),
            RecordKind::Announcement => Record::Announcement(Box::new(Announcement::decode(bytes)?)),
            RecordKind::HeaderAndProof => {
                Record::HeaderAndProof(Box::new(HeaderAndProof::decode(bytes)?))
            }
            RecordKind::Coinbase => Record::Coinbase(CoinbaseCommitment::decode(bytes)?),
            RecordKind::Find => Record::Find(Find::decode(bytes)?),
        })
    }

    /// Decode input from a known source, counting and logging the verdict
    ///
    /// Rejections are logged at `warn` with the error kind and provenance; the
    /// input is discarded and the error returned to the caller.
    pub fn validate_from(
        &self,
        kind: RecordKind,
        bytes: &[u8],
        provenance: &Provenance,
    ) -> Result<Record> {
        self.observe(kind, bytes, provenance, |b| self.decode(kind, b))
    }

    /// Decode a header-and-proof bundle from a known source
    ///
    /// Counted and logged exactly like [`validate_from`](Self::validate_from).
    pub fn validate_bundle_from(
        &self,
        bytes: &[u8],
        provenance: &Provenance,
    ) -> Result<HeaderAndProof> {
        self.observe(RecordKind::HeaderAndProof, bytes, provenance, HeaderAndProof::decode)
    }

    fn observe<T>(
        &self,
        kind: RecordKind,
        bytes: &[u8],
        provenance: &Provenance,
        decode: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<T> {
        let span = provenance.span("validate");
        let _enter = span.enter();

        let verdict = decode(bytes);
        self.record(&verdict);
        match &verdict {
            Ok(_) => debug!(kind = %kind, len = bytes.len(), "Accepted record"),
            Err(e) => warn!(
                kind = %kind,
                len = bytes.len(),
                category = e.category(),
                error = %e,
                source = %provenance,
                "Discarding malformed record"
            ),
        }
        verdict
    }

    /// Check many independent buffers in parallel
    ///
    /// Results are in input order and identical to checking sequentially.
    pub fn validate_batch<B>(&self, kind: RecordKind, buffers: &[B]) -> Vec<Result<()>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.run(|| {
            buffers
                .par_iter()
                .map(|b| {
                    let verdict = self.check(kind, b.as_ref());
                    self.record(&verdict);
                    verdict
                })
                .collect()
        })
    }

    /// Decode many independent buffers in parallel
    pub fn decode_batch<B>(&self, kind: RecordKind, buffers: &[B]) -> Vec<Result<Record>>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.run(|| {
            buffers
                .par_iter()
                .map(|b| {
                    let verdict = self.decode(kind, b.as_ref());
                    self.record(&verdict);
                    verdict
                })
                .collect()
        })
    }

    /// Current counters
    pub fn stats(&self) -> ValidationStats {
        let rejected = |k: usize| self.counters.rejected[k].load(Ordering::Relaxed);
        ValidationStats {
            accepted: self.counters.accepted.load(Ordering::Relaxed),
            size_mismatch: rejected(0),
            truncated: rejected(1),
            trailing_bytes: rejected(2),
            bad_magic: rejected(3),
            buffer_too_small: rejected(4),
        }
    }

    fn run<T: Send>(&self, job: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    fn record<T>(&self, verdict: &Result<T>) {
        match verdict {
            Ok(_) => {
                self.counters.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                if let Some(i) = ErrorKind::STRUCTURAL.iter().position(|k| *k == e.kind()) {
                    self.counters.rejected[i].fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

impl fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("stats", &self.stats())
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}
