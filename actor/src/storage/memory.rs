//! In-memory replay store for tests.

use anyhow::{anyhow, Result};
use std::sync::{Mutex, MutexGuard};

use super::{ReplayStore, TrainingExample};

#[derive(Debug, Default)]
pub struct InMemoryReplayStore {
    examples: Mutex<Vec<TrainingExample>>,
}

impl InMemoryReplayStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<TrainingExample>>> {
        self.examples
            .lock()
            .map_err(|e| anyhow!("Replay store lock poisoned: {}", e))
    }
}

impl ReplayStore for InMemoryReplayStore {
    fn store_episode(&self, _episode_id: &str, examples: &[TrainingExample]) -> Result<()> {
        self.lock()?.extend_from_slice(examples);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn load_all(&self) -> Result<Vec<TrainingExample>> {
        Ok(self.lock()?.clone())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::example;
    use std::sync::Arc;

    #[test]
    fn test_store_and_count() {
        let store = InMemoryReplayStore::new();
        assert_eq!(store.count().unwrap(), 0);

        store
            .store_episode("ep-0", &[example("ep-0", 0, 1.0), example("ep-0", 1, -1.0)])
            .unwrap();
        store.store_episode("ep-1", &[example("ep-1", 0, 1.0)]).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        let all = store.load_all().unwrap();
        assert_eq!(all[1].outcome, -1.0);
        assert_eq!(all[2].episode_id, "ep-1");
    }

    #[test]
    fn test_clear() {
        let store = InMemoryReplayStore::new();
        store.store_episode("ep-0", &[example("ep-0", 0, 1.0)]).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(InMemoryReplayStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let id = format!("ep-{i}");
                    let batch: Vec<_> = (0..10).map(|s| example(&id, s, 1.0)).collect();
                    store.store_episode(&id, &batch).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.count().unwrap(), 40);
    }
}
