use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::entities::asset::AssetLocation;

/// One derivative width of one asset. Both encodings are produced together,
/// so the format is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SynthesisKey {
    pub location: AssetLocation,
    pub width: u32,
}

/// Registry of per-key async mutexes.
///
/// Entries are created on demand and dropped again once the last holder
/// releases them, so the map only ever contains keys with work in flight.
#[derive(Clone, Default)]
pub struct SynthesisLocks {
    map: Arc<DashMap<SynthesisKey, Arc<Mutex<()>>>>,
}

/// Held while a synthesis runs. Dropping it releases the key.
pub struct SynthesisPermit {
    key: SynthesisKey,
    guard: Option<OwnedMutexGuard<()>>,
    map: Arc<DashMap<SynthesisKey, Arc<Mutex<()>>>>,
}

impl SynthesisLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_lock(&self, key: &SynthesisKey) -> Arc<Mutex<()>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        match self.map.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let lock = Arc::new(Mutex::new(()));
                entry.insert(lock.clone());
                lock
            }
        }
    }

    /// Waits until no other task holds `key`.
    pub async fn acquire(&self, key: SynthesisKey) -> SynthesisPermit {
        let lock = self.get_lock(&key);
        let guard = lock.lock_owned().await;

        SynthesisPermit {
            key,
            guard: Some(guard),
            map: self.map.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.map.len()
    }
}

impl Drop for SynthesisPermit {
    fn drop(&mut self) {
        // Release first so the map holds the only remaining reference when idle.
        self.guard.take();
        self.map.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
