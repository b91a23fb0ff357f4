//! Global cache of compiled specifications.
//!
//! Compilation happens once per specification identity; queries only look
//! up values and compose relations. Identity is the hex-encoded SHA-256 of
//! the canonical JSON of everything that affects compilation output. The
//! cache is write-once per key: a racing double-compile may build an
//! equivalent value, but the first insert wins and a partially-built
//! compile is never published (the Arc is inserted only after full
//! construction).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

use super::CompiledFilter;
use crate::filter_spec::FilterSpec;
use crate::sql_dialect::Dialect;

lazy_static! {
    static ref COMPILED: Mutex<HashMap<String, Arc<CompiledFilter>>> = Mutex::new(HashMap::new());
}

static HITS: AtomicU64 = AtomicU64::new(0);
static MISSES: AtomicU64 = AtomicU64::new(0);

/// Cache key for a (specification, dialect) pair.
pub fn fingerprint(spec: &FilterSpec, dialect: Dialect) -> String {
    let canonical = serde_json::json!({
        "spec": spec,
        "dialect": dialect,
    });
    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn get(key: &str) -> Option<Arc<CompiledFilter>> {
    let cache = COMPILED.lock().unwrap();
    match cache.get(key) {
        Some(compiled) => {
            HITS.fetch_add(1, Ordering::Relaxed);
            Some(Arc::clone(compiled))
        }
        None => {
            MISSES.fetch_add(1, Ordering::Relaxed);
            None
        }
    }
}

/// Insert under write-once discipline: if a racing compile already
/// published an entry for `key`, that entry wins and is returned.
pub fn insert(key: String, compiled: Arc<CompiledFilter>) -> Arc<CompiledFilter> {
    let mut cache = COMPILED.lock().unwrap();
    Arc::clone(cache.entry(key).or_insert(compiled))
}

/// Drop every cached compilation. Intended for tests.
pub fn clear() {
    COMPILED.lock().unwrap().clear();
}

/// Cache observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub fn metrics() -> CacheMetrics {
    CacheMetrics {
        hits: HITS.load(Ordering::Relaxed),
        misses: MISSES.load(Ordering::Relaxed),
        entries: COMPILED.lock().unwrap().len(),
    }
}
