//! JSON lines replay store.
//!
//! One `serde_json` object per line, appended under a mutex so concurrent
//! episodes never interleave partial lines.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::{ReplayStore, TrainingExample};

pub(crate) const REPLAY_FILE_NAME: &str = "replay.jsonl";

#[derive(Debug)]
pub struct JsonlReplayStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonlReplayStore {
    /// Open (or create) the file at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open replay file {}", path.display()))?;

        info!(path = %path.display(), "Replay store opened");
        Ok(Self {
            path,
            writer: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|e| anyhow!("Replay file lock poisoned: {}", e))
    }
}

impl ReplayStore for JsonlReplayStore {
    fn store_episode(&self, episode_id: &str, examples: &[TrainingExample]) -> Result<()> {
        let _guard = self.lock()?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for example in examples {
            serde_json::to_writer(&mut writer, example)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        debug!(episode_id, examples = examples.len(), "Stored episode");
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let _guard = self.lock()?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn load_all(&self) -> Result<Vec<TrainingExample>> {
        let _guard = self.lock()?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut examples = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let example = serde_json::from_str(&line).with_context(|| {
                format!("Malformed replay line {} in {}", index + 1, self.path.display())
            })?;
            examples.push(example);
        }
        Ok(examples)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        File::create(&self.path)?;
        Ok(())
    }
}
