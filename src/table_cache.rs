//! Memo of tables known not to exist
//!
//! Linting may run on every keystroke, so lookups against a metadata store
//! are remembered. Inserts are idempotent and nothing is ever removed;
//! concurrent writers at worst repeat a lookup.

use std::collections::HashSet;
use std::sync::{OnceLock, RwLock};

/// Set of `schema.name` keys, shared between lint runs
pub trait TableExistenceCache: Send + Sync {
    fn has(&self, key: &str) -> bool;
    fn insert(&self, key: String);
}

#[derive(Debug, Default)]
pub struct MissingTableCache {
    keys: RwLock<HashSet<String>>,
}

impl MissingTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TableExistenceCache for MissingTableCache {
    fn has(&self, key: &str) -> bool {
        // A poisoned lock only means a writer panicked mid-insert; the set is still usable
        match self.keys.read() {
            Ok(keys) => keys.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }

    fn insert(&self, key: String) {
        match self.keys.write() {
            Ok(mut keys) => {
                keys.insert(key);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key);
            }
        }
    }
}

static GLOBAL_MISSING_TABLES: OnceLock<MissingTableCache> = OnceLock::new();

/// Process-wide cache for callers that do not bring their own
pub fn global_missing_table_cache() -> &'static MissingTableCache {
    GLOBAL_MISSING_TABLES.get_or_init(MissingTableCache::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_insert_is_idempotent() {
        let cache = MissingTableCache::new();
        assert!(!cache.has("db.t"));
        cache.insert("db.t".to_string());
        cache.insert("db.t".to_string());
        assert!(cache.has("db.t"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_inserts() {
        let cache = Arc::new(MissingTableCache::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for table in 0..50 {
                        cache.insert(format!("db.t{}", (table + worker) % 50));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
    }

    #[test]
    fn test_global_cache_is_shared() {
        let key = "global_cache_test.some_table".to_string();
        global_missing_table_cache().insert(key.clone());
        assert!(global_missing_table_cache().has(&key));
    }
}
