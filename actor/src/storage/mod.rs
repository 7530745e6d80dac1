//! Training sink for completed episodes.
//!
//! Every completed self-play episode becomes a batch of [`TrainingExample`]s,
//! one per action, which are handed to a [`ReplayStore`]. The JSON lines file
//! written by [`JsonlReplayStore`] is what an external trainer consumes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use actor::storage::{create_replay_store, ReplayStore};
//!
//! let store = create_replay_store(Path::new("./data/replay.jsonl"))?;
//! store.store_episode("actor-1-ep-0", &examples)?;
//! ```

mod jsonl;
#[cfg(test)]
mod memory;

pub(crate) use jsonl::REPLAY_FILE_NAME;
pub use jsonl::JsonlReplayStore;
#[cfg(test)]
pub use memory::InMemoryReplayStore;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded decision with its final outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub episode_id: String,
    /// Index of the action within its episode
    pub step: u32,
    /// Encoded neutral observation, `4 * size * size` values
    pub observation: Vec<f32>,
    /// Visit distribution from the search, `size * size` values
    pub policy: Vec<f32>,
    /// +1 if the acting side went on to win, -1 otherwise
    pub outcome: f32,
}

/// Abstract interface for replay storage.
///
/// Implementations must be thread-safe: episodes finishing on different
/// workers may store concurrently.
pub trait ReplayStore: Send + Sync {
    /// Append all examples of one episode.
    fn store_episode(&self, episode_id: &str, examples: &[TrainingExample]) -> Result<()>;

    /// Get the total number of examples stored
    fn count(&self) -> Result<usize>;

    /// Read back every stored example, oldest first
    #[allow(dead_code)] // Used in tests
    fn load_all(&self) -> Result<Vec<TrainingExample>>;

    /// Remove all examples
    #[allow(dead_code)] // Used in tests
    fn clear(&self) -> Result<()>;
}

/// Open the JSON lines replay store at `path`, creating missing directories.
pub fn create_replay_store(path: &Path) -> Result<Box<dyn ReplayStore>> {
    let store = JsonlReplayStore::open(path)?;
    Ok(Box::new(store))
}

#[cfg(test)]
pub(crate) fn example(episode_id: &str, step: u32, outcome: f32) -> TrainingExample {
    TrainingExample {
        episode_id: episode_id.to_string(),
        step,
        observation: vec![0.0; 4 * 9],
        policy: vec![1.0 / 9.0; 9],
        outcome,
    }
}
