//! Prepared Source Cache
//!
//! Preparing an event source (compiling a grammar) is far heavier than
//! running it. The cache keeps recently used prepared sources keyed by
//! grammar text and hands them out as `Arc`s, ready for
//! `Annotator::from_shared`.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use crate::error::Result;

/// Default number of prepared sources kept
pub const DEFAULT_CAPACITY: usize = 16;

/// LRU cache of prepared event sources
pub struct SourceCache<S> {
    entries: Mutex<LruCache<String, Arc<S>>>,
}

impl<S> SourceCache<S> {
    /// Cache keeping at most `capacity` sources (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SourceCache {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The prepared source for `grammar`, preparing it on a miss
    ///
    /// The lock is held while preparing, so concurrent callers asking for
    /// the same grammar prepare it once. A failed preparation is not cached.
    pub fn get_or_prepare<F>(&self, grammar: &str, prepare: F) -> Result<Arc<S>>
    where
        F: FnOnce(&str) -> Result<S>,
    {
        let mut entries = self.lock();
        if let Some(source) = entries.get(grammar) {
            return Ok(Arc::clone(source));
        }
        log::debug!("preparing event source for a {} byte grammar", grammar.len());
        let source = Arc::new(prepare(grammar)?);
        entries.put(grammar.to_string(), Arc::clone(&source));
        Ok(source)
    }

    /// The cached source for `grammar`, if any
    pub fn get(&self, grammar: &str) -> Option<Arc<S>> {
        self.lock().get(grammar).cloned()
    }

    /// Number of cached sources
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every cached source
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<S>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S> Default for SourceCache<S> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
