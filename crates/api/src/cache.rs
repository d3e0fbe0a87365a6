use dashmap::DashMap;
use normalize::Normalized;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Normalization results keyed by a hash of the raw request body.
#[derive(Clone)]
pub struct ResultCache {
    results: Arc<DashMap<String, Normalized>>,
    max_entries: usize,
}

impl ResultCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            results: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn set(&self, body: &[u8], normalized: Normalized) {
        if self.max_entries == 0 {
            return;
        }
        if self.results.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self.results.iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.results.remove(&key);
            }
        }
        let key = self.hash_body(body);
        self.results.insert(key, normalized);
    }

    pub fn get(&self, body: &[u8]) -> Option<Normalized> {
        let key = self.hash_body(body);
        self.results.get(&key).map(|r| r.value().clone())
    }

    fn hash_body(&self, body: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(body);
        hex::encode(hasher.finalize())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            results_cached: self.results.len(),
            max_entries: self.max_entries,
        }
    }

    pub fn clear(&self) {
        self.results.clear();
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub results_cached: usize,
    pub max_entries: usize,
}
