use crate::inventory::snapshot::StoredInventory;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub loads: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64) / (total as f64)
        }
    }
}

/// Decoded inventories keyed by name, with LRU eviction.
pub struct RecordCache {
    cache: LruCache<String, StoredInventory>,
    stats: CacheStats,
}

impl RecordCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        RecordCache {
            cache: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached record, or decodes one with `load` on a miss.
    /// `Ok(None)` from `load` is not cached.
    pub fn get_or_load<E>(
        &mut self,
        name: &str,
        load: impl FnOnce() -> Result<Option<StoredInventory>, E>,
    ) -> Result<Option<StoredInventory>, E> {
        if let Some(cached) = self.cache.get(name) {
            self.stats.hits += 1;
            return Ok(Some(cached.clone()));
        }

        self.stats.misses += 1;
        let Some(record) = load()? else {
            return Ok(None);
        };
        self.insert(record.clone());
        self.stats.loads += 1;
        Ok(Some(record))
    }

    pub fn insert(&mut self, record: StoredInventory) {
        let name = record.name.clone();
        if let Some((evicted, _)) = self.cache.push(name.clone(), record) {
            if evicted != name {
                self.stats.evictions += 1;
            }
        }
    }

    pub fn invalidate(&mut self, name: &str) {
        self.cache.pop(name);
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::snapshot::CharacterSnapshot;

    fn record(name: &str) -> StoredInventory {
        StoredInventory::new(name, "author", CharacterSnapshot::default())
    }

    fn load_ok(name: &str) -> Result<Option<StoredInventory>, String> {
        Ok(Some(record(name)))
    }

    #[test]
    fn first_access_misses_then_hits() {
        let mut cache = RecordCache::new(4);
        assert!(cache.is_empty());
        cache.get_or_load("Kit", || load_ok("Kit")).expect("load");
        cache.get_or_load("Kit", || Err("must not reload".to_string())).expect("hit");
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_records_are_not_cached() {
        let mut cache = RecordCache::new(4);
        let loaded = cache
            .get_or_load("Ghost", || Ok::<_, String>(None))
            .expect("load");
        assert_eq!(loaded, None);
        assert!(cache.is_empty());
    }

    #[test]
    fn eviction_is_counted() {
        let mut cache = RecordCache::new(3);
        for index in 0..5 {
            let name = format!("Kit {}", index);
            cache.get_or_load(&name, || load_ok(&name)).expect("load");
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 2);
        cache.insert(record("Kit 4"));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn invalidate_forces_reload() {
        let mut cache = RecordCache::new(2);
        cache.get_or_load("Kit", || load_ok("Kit")).expect("load");
        cache.invalidate("Kit");
        cache.get_or_load("Kit", || load_ok("Kit")).expect("reload");
        assert_eq!(cache.stats().loads, 2);
    }

    #[test]
    fn hit_rate_calculation() {
        let mut cache = RecordCache::new(2);
        assert_eq!(cache.stats().hit_rate(), 0.0);
        cache.get_or_load("Kit", || load_ok("Kit")).expect("load");
        for _ in 0..10 {
            cache.get_or_load("Kit", || load_ok("Kit")).expect("hit");
        }
        assert!((cache.stats().hit_rate() - 0.909).abs() < 0.01);
    }

    #[test]
    fn zero_capacity_still_holds_one_record() {
        let mut cache = RecordCache::new(0);
        cache.insert(record("Kit"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
