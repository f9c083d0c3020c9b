use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub song_id: String,
    pub best_score: u64,
    pub clear_count: u32,
    /// Unix time in milliseconds.
    pub last_played_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    pub cleared: usize,
    pub total: usize,
}

pub trait ProgressStore {
    fn load(&self) -> Result<Vec<Progress>, StageError>;
    fn save(&mut self, records: &[Progress]) -> Result<(), StageError>;
}

#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Vec<Progress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Vec<Progress>, StageError> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[Progress]) -> Result<(), StageError> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// Keeps progress as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    path: PathBuf,
}

impl JsonFileProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn load(&self) -> Result<Vec<Progress>, StageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No progress file at {}", self.path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, records: &[Progress]) -> Result<(), StageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(records)?)?;
        Ok(())
    }
}

/// Per-song progress loaded from a store. Changes stay in memory until
/// [`ProgressBook::flush`].
pub struct ProgressBook<S: ProgressStore> {
    store: S,
    records: BTreeMap<String, Progress>,
    dirty: bool,
}

impl<S: ProgressStore> ProgressBook<S> {
    pub fn open(store: S) -> Result<Self, StageError> {
        let records = store
            .load()?
            .into_iter()
            .map(|p| (p.song_id.clone(), p))
            .collect::<BTreeMap<_, _>>();
        info!("Loaded progress for {} songs", records.len());
        Ok(Self {
            store,
            records,
            dirty: false,
        })
    }

    pub fn get(&self, song_id: &str) -> Option<&Progress> {
        self.records.get(song_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Progress> {
        self.records.values()
    }

    pub fn record(
        &mut self,
        song_id: &str,
        score: u64,
        cleared: bool,
        played_at_ms: u64,
    ) -> &Progress {
        self.dirty = true;
        let entry = self
            .records
            .entry(song_id.to_string())
            .or_insert_with(|| Progress {
                song_id: song_id.to_string(),
                best_score: 0,
                clear_count: 0,
                last_played_ms: 0,
            });
        entry.best_score = entry.best_score.max(score);
        if cleared {
            entry.clear_count += 1;
        }
        entry.last_played_ms = played_at_ms;
        entry
    }

    /// `total` is the catalog size, since unplayed songs have no record.
    pub fn overall(&self, total: usize) -> OverallProgress {
        OverallProgress {
            cleared: self.records.values().filter(|p| p.clear_count > 0).count(),
            total,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn flush(&mut self) -> Result<(), StageError> {
        if !self.dirty {
            return Ok(());
        }
        let records: Vec<Progress> = self.records.values().cloned().collect();
        self.store.save(&records)?;
        self.dirty = false;
        debug!("Flushed progress for {} songs", records.len());
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
