//! One-shot sequences and their materialization.
//!
//! A `OneShotSequence` wraps a source that can only be drained once (an
//! iterator over a stream, a generator of canned values). The materializer
//! drains it on first use and memoizes the result by handle identity, so the
//! same values can be re-read from any branch of any later sample.

use crate::cache::BoundedCache;
use crate::error::GenerationError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a one-shot sequence. Never compared structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceHandle(u64);

impl SequenceHandle {
    fn next() -> Self {
        SequenceHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

type Source<T> = Box<dyn Iterator<Item = T> + Send>;

/// A sequence that can be drained exactly once.
pub struct OneShotSequence<T> {
    handle: SequenceHandle,
    source: Mutex<Option<Source<T>>>,
}

impl<T> OneShotSequence<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self {
            handle: SequenceHandle::next(),
            source: Mutex::new(Some(Box::new(items.into_iter()))),
        }
    }

    pub fn handle(&self) -> SequenceHandle {
        self.handle
    }

    pub fn is_drained(&self) -> bool {
        self.source.lock().is_none()
    }
}

impl<T> fmt::Debug for OneShotSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneShotSequence")
            .field("handle", &self.handle)
            .field("drained", &self.is_drained())
            .finish()
    }
}

/// Drains one-shot sequences into shared, reusable slices.
pub struct SequenceMaterializer<T> {
    cache: BoundedCache<SequenceHandle, Arc<[T]>>,
}

impl<T> SequenceMaterializer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Reusable contents of `sequence`, draining it on first use.
    ///
    /// Fails with `SequenceExhausted` if the sequence was already drained but its
    /// materialized form has since been evicted.
    pub fn materialize(&self, sequence: &OneShotSequence<T>) -> Result<Arc<[T]>, GenerationError> {
        let handle = sequence.handle();
        if let Some(items) = self.cache.get(&handle) {
            return Ok(items);
        }

        // Hold the source while re-checking so concurrent callers drain once.
        let mut source = sequence.source.lock();
        if let Some(items) = self.cache.get(&handle) {
            return Ok(items);
        }
        let drained = source
            .take()
            .ok_or(GenerationError::SequenceExhausted(handle.id()))?;
        let items: Arc<[T]> = drained.collect::<Vec<_>>().into();
        debug!(
            handle = handle.id(),
            len = items.len(),
            "Materialized one-shot sequence"
        );
        self.cache.put(handle, Arc::clone(&items));
        Ok(items)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
