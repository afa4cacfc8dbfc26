//! Name Interning Pool
//!
//! Element and attribute names repeat heavily in grammar output (every
//! `word` nonterminal carries the same name), so each arena stores them once
//! and nodes refer to them by id.
//!
//! Uses hash-based lookup to avoid storing duplicate string data.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// String interning pool for names
///
/// Memory layout:
/// - `entries`: (offset, len) into `data` for each interned string ID
/// - `data`: concatenated name bytes
/// - `hash_index`: hash -> list of IDs (handles rare collisions)
#[derive(Debug, Clone)]
pub struct NamePool {
    entries: Vec<(u32, u32)>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl NamePool {
    /// Create a new empty pool
    pub fn new() -> Self {
        let mut pool = NamePool {
            entries: Vec::with_capacity(64),
            data: String::with_capacity(512),
            hash_index: HashMap::new(),
        };
        // Entry 0 is reserved for the empty name
        pool.entries.push((0, 0));
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a name, returning its id
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            for &id in ids {
                if self.get(id) == Some(s) {
                    return id;
                }
            }
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);

        let id = self.entries.len() as u32;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);

        id
    }

    /// Look up an already interned name without adding it
    pub fn lookup(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return Some(0);
        }
        self.hash_index
            .get(&Self::compute_hash(s))?
            .iter()
            .copied()
            .find(|&id| self.get(id) == Some(s))
    }

    /// Get a name by id
    pub fn get(&self, id: u32) -> Option<&str> {
        let &(offset, len) = self.entries.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Number of distinct names, including the reserved empty name
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing but the reserved entry is stored
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}
