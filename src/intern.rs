//! Deduplicating pool for extracted task names.
//!
//! A trace contains the same handful of task names millions of times. The
//! pool maps byte-identical content to one canonical, cheaply-clonable
//! handle so the event-model builder can compare names by pointer and the
//! extracted strings outlive the per-line token buffers.
//!
//! # Thread Safety
//!
//! The pool uses `DashMap` for lock-free concurrent interning. DashMap's
//! sharded locking keeps contention low when many worker threads intern
//! the same busy task names. The canonicalization invariant holds under
//! races: whichever insert lands first, every caller gets a clone of the
//! stored key.

use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::PARSE_ERROR_NAME;
use crate::TASKNAME_MAXLEN;

/// Canonical handle to an interned task name. Byte-identical content yields
/// pointer-equal handles for the lifetime of the pool.
pub type InternedName = Arc<str>;

/// Default bound on the number of distinct names a pool will hold.
pub const DEFAULT_POOL_CAPACITY: usize = 65536;

/// Run-scoped string interning pool. Created once per trace load; interned
/// names are never individually freed.
pub struct NamePool {
    names: DashMap<Arc<str>, ()>,
    capacity: usize,
    placeholder: InternedName,
}

impl NamePool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Create a pool holding at most `capacity` distinct names, the
    /// placeholder included.
    pub fn with_capacity(capacity: usize) -> Self {
        let pool = Self {
            names: DashMap::new(),
            capacity,
            placeholder: Arc::from(PARSE_ERROR_NAME),
        };
        // Pre-intern the placeholder so a task genuinely named like it
        // still resolves to one canonical handle.
        pool.names.insert(pool.placeholder.clone(), ());
        pool
    }

    /// Intern a name, returning its canonical handle.
    ///
    /// Returns `None` for over-length content and when the pool is full;
    /// callers substitute [`NamePool::placeholder`] rather than failing the
    /// whole parse. Lookups of already-interned content still succeed on a
    /// full pool.
    pub fn intern(&self, name: &str) -> Option<InternedName> {
        if name.len() > TASKNAME_MAXLEN {
            return None;
        }
        if let Some(existing) = self.names.get(name) {
            return Some(existing.key().clone());
        }
        if self.names.len() >= self.capacity {
            return None;
        }
        // Two threads can race to insert the same content; the entry API
        // keeps the first key, so both get the same canonical handle.
        let entry = self.names.entry(Arc::from(name)).or_insert(());
        Some(entry.key().clone())
    }

    /// The non-null name substituted when extraction or interning fails.
    pub fn placeholder(&self) -> InternedName {
        self.placeholder.clone()
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_idempotent() {
        let pool = NamePool::new();
        let a = pool.intern("bash").unwrap();
        let b = pool.intern("bash").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_intern_distinct_content() {
        let pool = NamePool::new();
        let a = pool.intern("bash").unwrap();
        let b = pool.intern("sshd").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(&*a, "bash");
        assert_eq!(&*b, "sshd");
    }

    #[test]
    fn test_intern_rejects_over_length() {
        let pool = NamePool::new();
        let long = "x".repeat(TASKNAME_MAXLEN + 1);
        assert!(pool.intern(&long).is_none());
    }

    #[test]
    fn test_full_pool_still_resolves_known_names() {
        // Capacity 2: the placeholder plus one name.
        let pool = NamePool::with_capacity(2);
        let a = pool.intern("bash").unwrap();
        assert!(pool.intern("sshd").is_none());
        let b = pool.intern("bash").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_placeholder_is_canonical() {
        let pool = NamePool::new();
        let ph = pool.placeholder();
        assert_eq!(&*ph, PARSE_ERROR_NAME);
        let interned = pool.intern(PARSE_ERROR_NAME).unwrap();
        assert!(Arc::ptr_eq(&ph, &interned));
    }

    #[test]
    fn test_concurrent_interning_same_content() {
        use std::thread;

        let pool = Arc::new(NamePool::new());
        let mut handles = vec![];
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                (0..100)
                    .map(|i| pool.intern(&format!("task{}", i % 10)).unwrap())
                    .collect::<Vec<_>>()
            }));
        }
        let results: Vec<Vec<InternedName>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Every thread resolved "task0" to the same canonical handle.
        let canonical = pool.intern("task0").unwrap();
        for per_thread in &results {
            assert!(Arc::ptr_eq(&per_thread[0], &canonical));
        }
        // 10 distinct names plus the placeholder.
        assert_eq!(pool.len(), 11);
    }
}
