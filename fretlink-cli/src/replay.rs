use anyhow::{Context, Result};
use fretlink_stage::Hand;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One recorded camera frame: the hands tracked at `timestamp_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub hands: Vec<Hand>,
}

/// Recorded hand samples played back against the tick clock.
#[derive(Debug, Default)]
pub struct HandReplay {
    frames: Vec<HandFrame>,
    cursor: usize,
}

impl HandReplay {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open hand samples {}", path.display()))?;
        Self::from_jsonl(BufReader::new(file))
            .with_context(|| format!("Failed to read hand samples {}", path.display()))
    }

    /// One JSON frame per line; blank lines are skipped.
    pub fn from_jsonl(reader: impl BufRead) -> Result<Self> {
        let mut frames = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: HandFrame = serde_json::from_str(&line)
                .with_context(|| format!("line {}", index + 1))?;
            frames.push(frame);
        }
        frames.sort_by_key(|f| f.timestamp_ms);

        Ok(Self { frames, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames.last().map_or(0, |f| f.timestamp_ms)
    }

    /// Hands of the latest frame recorded at or before `now_ms`. Before the
    /// first frame no hand is visible.
    pub fn frame_at(&mut self, now_ms: u64) -> &[Hand] {
        while self
            .frames
            .get(self.cursor + 1)
            .is_some_and(|next| next.timestamp_ms <= now_ms)
        {
            self.cursor += 1;
        }

        match self.frames.get(self.cursor) {
            Some(frame) if frame.timestamp_ms <= now_ms => &frame.hands,
            _ => &[],
        }
    }
}
