//! Pool of validation contexts
//!
//! Each concurrent evaluation takes its own buffer from the pool and gives it
//! back, zeroed, when the guard is dropped. A buffer is never handed to two
//! live guards, and the pool never keeps more than `capacity` idle buffers.

use crate::config::PoolConfig;
use crate::core::ValidationContext;
use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

struct Shared {
    queue: SegQueue<Box<ValidationContext>>,
    capacity: usize,
    // Idle slots claimed, always >= queue.len()
    idle: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Pool of independently owned [`ValidationContext`] buffers
#[derive(Clone)]
pub struct ContextPool {
    shared: Arc<Shared>,
}

impl ContextPool {
    /// Create a pool with `capacity` pre-allocated contexts
    pub fn new(capacity: usize) -> Self {
        let queue = SegQueue::new();
        for _ in 0..capacity {
            queue.push(ValidationContext::boxed());
        }

        Self {
            shared: Arc::new(Shared {
                queue,
                capacity,
                idle: AtomicUsize::new(capacity),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Create a pool sized by configuration
    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(config.capacity)
    }

    /// Take a context from the pool, allocating a new one when it is empty
    pub fn acquire(&self) -> PooledContext {
        let ctx = match self.shared.queue.pop() {
            Some(ctx) => {
                self.shared.idle.fetch_sub(1, Ordering::AcqRel);
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                ctx
            }
            None => {
                self.shared.misses.fetch_add(1, Ordering::Relaxed);
                debug!("ContextPool: allocating new validation context");
                ValidationContext::boxed()
            }
        };

        PooledContext {
            ctx: Some(ctx),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of idle contexts
    pub fn available(&self) -> usize {
        self.shared.queue.len()
    }

    /// Maximum number of idle contexts kept
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Snapshot of pool usage
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            pool_hits: self.shared.hits.load(Ordering::Relaxed),
            pool_misses: self.shared.misses.load(Ordering::Relaxed),
            available: self.available(),
        }
    }
}

impl std::fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPool")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}

/// Exclusive handle to a pooled context, returned to the pool on drop
pub struct PooledContext {
    ctx: Option<Box<ValidationContext>>,
    shared: Arc<Shared>,
}

impl PooledContext {
    /// Take ownership of the context (it will not return to the pool)
    pub fn into_inner(mut self) -> Box<ValidationContext> {
        self.ctx.take().unwrap_or_else(ValidationContext::boxed)
    }
}

impl Drop for PooledContext {
    fn drop(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.reset();
            let capacity = self.shared.capacity;
            let claimed = self
                .shared
                .idle
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < capacity).then_some(n + 1)
                });
            if claimed.is_ok() {
                self.shared.queue.push(ctx);
            }
        }
    }
}

impl std::ops::Deref for PooledContext {
    type Target = ValidationContext;

    fn deref(&self) -> &Self::Target {
        // Only `into_inner` and `drop` take the box, both consume the guard
        self.ctx.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl std::ops::DerefMut for PooledContext {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx.as_deref_mut().unwrap_or_else(|| unreachable!())
    }
}

/// Pool usage statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Acquisitions served from the pool
    pub pool_hits: u64,
    /// Acquisitions that had to allocate
    pub pool_misses: u64,
    /// Idle contexts at snapshot time
    pub available: usize,
}

impl PoolStats {
    /// Get pool hit rate
    pub fn pool_hit_rate(&self) -> f64 {
        let total = self.pool_hits + self.pool_misses;
        if total == 0 {
            0.0
        } else {
            self.pool_hits as f64 / total as f64
        }
    }
}
