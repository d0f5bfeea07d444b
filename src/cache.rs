//! Process-wide store of cleaned tables.
//!
//! Entries are keyed by a random UUID that is never reused. Without a TTL (the default) an entry
//! lives until it is cleared. With a TTL, expired entries read as absent and are dropped by
//! [`TableCache::purge_expired`]; no background thread runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::profiling::TableMetadata;
use crate::types::Table;

/// Shared handle to a cache.
pub type SharedTableCache = Arc<TableCache>;

/// A cached clean table with its metadata.
#[derive(Debug)]
pub struct CacheEntry {
    pub table: Table,
    pub metadata: TableMetadata,
    pub source_path: PathBuf,
    pub created_at: DateTime<Utc>,
    inserted: Instant,
}

/// Keyed store safe for concurrent readers and interleaved single-key writers.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
    ttl: Option<Duration>,
}

impl TableCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn shared(ttl: Option<Duration>) -> SharedTableCache {
        Arc::new(Self::new(ttl))
    }

    /// Store a table and return its fresh identifier.
    pub fn put(
        &self,
        table: Table,
        metadata: TableMetadata,
        source_path: impl Into<PathBuf>,
    ) -> String {
        let entry = Arc::new(CacheEntry {
            table,
            metadata,
            source_path: source_path.into(),
            created_at: Utc::now(),
            inserted: Instant::now(),
        });

        let mut entries = self.entries.write();
        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };
        entries.insert(id.clone(), entry);
        info!(table_id = %id, cached = entries.len(), "cached table");
        id
    }

    /// Look up an entry. Expired entries read as absent.
    pub fn get(&self, id: &str) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read();
        entries
            .get(id)
            .filter(|e| !self.is_expired(e, Instant::now()))
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Remove one entry; a no-op when `id` is unknown.
    pub fn clear(&self, id: &str) {
        if self.entries.write().remove(id).is_some() {
            info!(table_id = %id, "cleared cached table");
        }
    }

    pub fn clear_all(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "cleared table cache");
    }

    /// Drop expired entries and return how many were removed. Always 0 without a TTL.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !self.is_expired(e, now));
        let purged = before - entries.len();
        if purged > 0 {
            info!(purged, "purged expired tables");
        }
        purged
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.inserted) >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::profiling::{profile_table, InferenceThresholds};
    use crate::types::Value;

    fn entry_parts() -> (Table, TableMetadata) {
        let t = Table::new(vec!["n".into()], vec![vec![Value::Int64(1)]]);
        let meta = profile_table(&t, &["csv".into()], &InferenceThresholds::default());
        (t, meta)
    }

    #[test]
    fn put_get_clear() {
        let cache = TableCache::default();
        let (t, m) = entry_parts();
        let id = cache.put(t.clone(), m, "uploads/a.csv");
        let entry = cache.get(&id).unwrap();
        assert_eq!(entry.table, t);
        assert_eq!(entry.source_path, PathBuf::from("uploads/a.csv"));
        assert!(Uuid::parse_str(&id).is_ok());

        cache.clear(&id);
        assert!(cache.get(&id).is_none());
        // Clearing again is harmless.
        cache.clear(&id);
        cache.clear("never-issued");
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn mutations_log_at_info() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let cache = TableCache::default();
            let (t, m) = entry_parts();
            let id = cache.put(t, m, "x.csv");
            cache.clear(&id);
            cache.clear_all();
        });

        let logged = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
        assert!(logged.contains("cached table"));
        assert!(logged.contains("cleared cached table"));
        assert!(logged.contains("cleared table cache"));
    }

    #[test]
    fn identifiers_are_unique_and_clear_all_empties() {
        let cache = TableCache::default();
        let ids: HashSet<String> = (0..50)
            .map(|_| {
                let (t, m) = entry_parts();
                cache.put(t, m, "x.csv")
            })
            .collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(cache.len(), 50);
        cache.clear_all();
        assert!(cache.is_empty());
        assert!(ids.iter().all(|id| !cache.contains(id)));
    }

    #[test]
    fn held_entry_survives_clear() {
        let cache = TableCache::default();
        let (t, m) = entry_parts();
        let id = cache.put(t, m, "x.csv");
        let held = cache.get(&id).unwrap();
        cache.clear_all();
        assert_eq!(held.table.row_count(), 1);
    }

    #[test]
    fn ttl_expires_lazily() {
        let cache = TableCache::new(Some(Duration::ZERO));
        let (t, m) = entry_parts();
        let id = cache.put(t, m, "x.csv");
        assert!(cache.get(&id).is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_ttl_never_purges() {
        let cache = TableCache::default();
        let (t, m) = entry_parts();
        cache.put(t, m, "x.csv");
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_puts_and_reads() {
        let cache = TableCache::shared(None);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let (t, m) = entry_parts();
                    let id = cache.put(t, m, "x.csv");
                    assert!(cache.contains(&id));
                    id
                })
            })
            .collect();
        let ids: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(cache.len(), 8);
    }
}
