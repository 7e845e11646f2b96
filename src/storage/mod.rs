use crate::{error::Result, models::Resolution};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub prompt: String,
    pub resolution: Resolution,
}

impl CacheKey {
    pub fn new(prompt: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            prompt: prompt.into(),
            resolution,
        }
    }
}

type Slot = Arc<OnceCell<Arc<Vec<u8>>>>;

#[derive(Default)]
struct Entries {
    slots: HashMap<CacheKey, Slot>,
    /// Front is least recently used.
    order: VecDeque<CacheKey>,
}

impl Entries {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }

    fn remove(&mut self, key: &CacheKey) {
        self.slots.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// Bounded LRU of generated image bytes keyed by exact prompt and resolution.
///
/// Concurrent callers for one key share a single in-flight generation. Only
/// successful results are kept.
pub struct GenerationCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl GenerationCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .slots
                    .values()
                    .filter(|slot| slot.initialized())
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.slots.clear();
            entries.order.clear();
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<u8>>> {
        let mut entries = self.entries.lock().ok()?;
        let value = entries.slots.get(key)?.get().cloned()?;
        entries.touch(key);
        Some(value)
    }

    /// Return the cached bytes for `key`, or run `generate` once to produce them.
    pub async fn get_or_generate<F, Fut>(&self, key: CacheKey, generate: F) -> Result<Arc<Vec<u8>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        if self.capacity == 0 {
            return generate().await.map(Arc::new);
        }

        let slot = self.slot_for(&key);
        let result = slot
            .get_or_try_init(|| async move { generate().await.map(Arc::new) })
            .await
            .cloned();

        if result.is_err() {
            self.forget_if_empty(&key, &slot);
        }
        result
    }

    fn slot_for(&self, key: &CacheKey) -> Slot {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(slot) = entries.slots.get(key).cloned() {
            entries.touch(key);
            return slot;
        }

        // Slots still being filled are never evicted, so the cache may run
        // over capacity while every entry is in flight.
        while entries.order.len() >= self.capacity {
            let victim = entries.order.iter().position(|k| {
                entries
                    .slots
                    .get(k)
                    .map_or(true, |slot| slot.initialized())
            });
            let Some(evicted) = victim.and_then(|pos| entries.order.remove(pos)) else {
                break;
            };
            log::debug!("Evicting cached image for prompt '{}'", evicted.prompt);
            entries.slots.remove(&evicted);
        }

        let slot: Slot = Arc::new(OnceCell::new());
        entries.slots.insert(key.clone(), slot.clone());
        entries.order.push_back(key.clone());
        slot
    }

    fn forget_if_empty(&self, key: &CacheKey, slot: &Slot) {
        if let Ok(mut entries) = self.entries.lock() {
            let same_slot = entries
                .slots
                .get(key)
                .map_or(false, |current| Arc::ptr_eq(current, slot));
            if same_slot && !slot.initialized() {
                entries.remove(key);
            }
        }
    }
}
