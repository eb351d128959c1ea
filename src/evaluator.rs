//! Seam to the external proof-of-work evaluator
//!
//! The evaluator itself lives outside this crate. It receives a block header,
//! the four announcements of a bundle and a validation context it may mutate
//! freely for the duration of one call.

use crate::config::Config;
use crate::core::constants::NUM_ANNS;
use crate::core::{Announcement, BlockHeader, HeaderAndProof, ValidationContext};
use crate::error::Result;
use crate::utils::logging::Provenance;
use crate::utils::memory::ContextPool;
use crate::validator::StructuralValidator;
use serde::Serialize;
use tracing::debug;

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Whether the proof of work is valid
    pub valid: bool,
    /// Work value derived by the evaluator
    pub work: u64,
}

impl Evaluation {
    /// A passing evaluation
    pub fn pass(work: u64) -> Self {
        Self { valid: true, work }
    }

    /// A failing evaluation
    pub fn fail() -> Self {
        Self {
            valid: false,
            work: 0,
        }
    }
}

/// External proof-of-work evaluator
pub trait PowEvaluator: Send + Sync {
    /// Evaluate one block header against its announcements
    ///
    /// `ctx` is exclusively owned by this call.
    fn evaluate(
        &self,
        header: &BlockHeader,
        announcements: &[Announcement; NUM_ANNS],
        ctx: &mut ValidationContext,
    ) -> Result<Evaluation>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Evaluate a decoded bundle with a context taken from `pool`
pub fn evaluate_bundle<E>(evaluator: &E, pool: &ContextPool, bundle: &HeaderAndProof) -> Result<Evaluation>
where
    E: PowEvaluator + ?Sized,
{
    let mut ctx = pool.acquire();
    let outcome = evaluator.evaluate(&bundle.block_header, &bundle.announcements, &mut ctx)?;
    debug!(
        evaluator = evaluator.name(),
        valid = outcome.valid,
        work = outcome.work,
        "Evaluated bundle"
    );
    Ok(outcome)
}

/// Structurally validate raw bundle bytes, then evaluate them
///
/// Malformed input never reaches the evaluator.
pub fn evaluate_raw<E>(
    evaluator: &E,
    pool: &ContextPool,
    validator: &StructuralValidator,
    bytes: &[u8],
    provenance: &Provenance,
) -> Result<Evaluation>
where
    E: PowEvaluator + ?Sized,
{
    let bundle = validator.validate_bundle_from(bytes, provenance)?;
    evaluate_bundle(evaluator, pool, &bundle)
}

/// An evaluator bundled with the validator and context pool it runs behind
pub struct Verifier<E> {
    evaluator: E,
    validator: StructuralValidator,
    pool: ContextPool,
}

impl<E: PowEvaluator> Verifier<E> {
    /// Build the validator and pool from configuration
    pub fn from_config(evaluator: E, config: &Config) -> Result<Self> {
        Ok(Self {
            evaluator,
            validator: StructuralValidator::from_config(&config.validator)?,
            pool: ContextPool::from_config(&config.pool),
        })
    }

    /// Validate raw bundle bytes from `provenance`, then evaluate them
    pub fn verify(&self, bytes: &[u8], provenance: &Provenance) -> Result<Evaluation> {
        evaluate_raw(&self.evaluator, &self.pool, &self.validator, bytes, provenance)
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn validator(&self) -> &StructuralValidator {
        &self.validator
    }

    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use crate::core::WorkBits;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fills the context, then passes when every announcement has the block's parent height
    struct Recording {
        calls: AtomicUsize,
    }

    impl PowEvaluator for Recording {
        fn evaluate(
            &self,
            header: &BlockHeader,
            announcements: &[Announcement; NUM_ANNS],
            ctx: &mut ValidationContext,
        ) -> Result<Evaluation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(ctx.is_zeroed());
            ctx.words_mut().fill(header.nonce);
            let ok = announcements
                .iter()
                .all(|a| a.header.parent_block_height == header.time_seconds);
            Ok(if ok { Evaluation::pass(4) } else { Evaluation::fail() })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn bundle(height: u32) -> HeaderAndProof {
        let mut ann = Announcement::default();
        ann.header.parent_block_height = height;
        ann.header.work_bits = WorkBits::new(0x2000ffff);
        let header = BlockHeader {
            time_seconds: 77,
            nonce: 0xFEED,
            ..Default::default()
        };
        HeaderAndProof::new(header, 0, [ann.clone(), ann.clone(), ann.clone(), ann], vec![1, 2, 3])
    }

    #[test]
    fn test_evaluate_bundle() {
        let evaluator = Recording {
            calls: AtomicUsize::new(0),
        };
        let pool = ContextPool::new(1);

        assert_eq!(evaluate_bundle(&evaluator, &pool, &bundle(77)).unwrap(), Evaluation::pass(4));
        assert_eq!(evaluate_bundle(&evaluator, &pool, &bundle(1)).unwrap(), Evaluation::fail());
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 2);
        // The context went back to the pool zeroed
        assert!(pool.acquire().is_zeroed());
    }

    #[test]
    fn test_malformed_input_never_evaluated() {
        let evaluator = Recording {
            calls: AtomicUsize::new(0),
        };
        let pool = ContextPool::new(1);
        let validator = StructuralValidator::new();
        let prov = Provenance::for_peer("test").with_connection(1);

        let mut bytes = bundle(77).encode().unwrap();
        let outcome = evaluate_raw(&evaluator, &pool, &validator, &bytes, &prov).unwrap();
        assert!(outcome.valid);

        bytes.push(0);
        let err = evaluate_raw(&evaluator, &pool, &validator, &bytes, &prov).unwrap_err();
        assert!(err.is_structural());
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rejected_bundle_is_counted() {
        let evaluator = Recording {
            calls: AtomicUsize::new(0),
        };
        let pool = ContextPool::new(1);
        let validator = StructuralValidator::new();
        let prov = Provenance::for_peer("test");

        let bytes = bundle(77).encode().unwrap();
        let err = evaluate_raw(&evaluator, &pool, &validator, &bytes[..bytes.len() - 1], &prov)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncated);
        assert_eq!(validator.stats().truncated, 1);
        assert_eq!(validator.stats().accepted, 0);
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_verifier_from_config() {
        let config = Config::from_args(&Args {
            pool_capacity: Some(7),
            threads: Some(2),
            ..Default::default()
        })
        .unwrap();
        let verifier = Verifier::from_config(
            Recording {
                calls: AtomicUsize::new(0),
            },
            &config,
        )
        .unwrap();
        assert_eq!(verifier.pool().capacity(), 7);
        assert_eq!(verifier.pool().available(), 7);

        let prov = Provenance::for_peer("test").with_connection(2);
        let bytes = bundle(77).encode().unwrap();
        assert_eq!(verifier.verify(&bytes, &prov).unwrap(), Evaluation::pass(4));
        assert!(verifier.verify(&bytes[..90], &prov).unwrap_err().is_structural());

        assert_eq!(verifier.evaluator().calls.load(Ordering::SeqCst), 1);
        assert_eq!(verifier.validator().stats().accepted, 1);
        assert_eq!(verifier.pool().stats().pool_hits, 1);
    }

    #[test]
    fn test_dyn_evaluator() {
        let evaluator: Box<dyn PowEvaluator> = Box::new(Recording {
            calls: AtomicUsize::new(0),
        });
        let pool = ContextPool::new(0);
        let outcome = evaluate_bundle(evaluator.as_ref(), &pool, &bundle(77)).unwrap();
        assert_eq!(outcome.work, 4);
    }
}
