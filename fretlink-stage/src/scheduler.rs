use fretlink_core::{ChordChart, FretState, chord_shape};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteTarget {
    pub chord: String,
    /// Fingering for `chord`, when it is a known shape.
    pub shape: Option<FretState>,
}

impl NoteTarget {
    pub fn chord(name: &str) -> Self {
        Self {
            chord: name.to_string(),
            shape: chord_shape(name).map(|s| s.frets),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NoteState {
    Pending,
    Hit,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub spawn_time_ms: u64,
    /// When the note reaches the hit line.
    pub target_time_ms: u64,
    pub target: NoteTarget,
    pub state: NoteState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerTick {
    Spawned(Note),
    /// Next entry is still in the future.
    Waiting,
    /// The chart is exhausted. Reported exactly once.
    Completed,
    /// Nothing left to do.
    Idle,
}

/// Walks a chord chart against playback time, one note per tick at most.
///
/// Chart timestamps are the times notes reach the hit line. Each note is
/// spawned `travel_ms` earlier so it is pending while an early strum can
/// still claim it.
pub struct NoteScheduler {
    chart: ChordChart,
    cursor: usize,
    travel_ms: u64,
    completed: bool,
}

impl NoteScheduler {
    pub fn new(chart: ChordChart, travel_ms: u64) -> Self {
        Self {
            chart,
            cursor: 0,
            travel_ms,
            completed: false,
        }
    }

    pub fn chart(&self) -> &ChordChart {
        &self.chart
    }

    /// Number of notes spawned so far.
    pub fn spawned(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chart.len()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tick(&mut self, elapsed_ms: u64) -> SchedulerTick {
        if self.completed {
            return SchedulerTick::Idle;
        }

        let Some(entry) = self.chart.get(self.cursor) else {
            self.completed = true;
            info!("Chart exhausted after {} notes", self.cursor);
            return SchedulerTick::Completed;
        };

        if entry.timestamp.saturating_sub(self.travel_ms) > elapsed_ms {
            return SchedulerTick::Waiting;
        }

        let note = Note {
            id: self.cursor as u64,
            spawn_time_ms: elapsed_ms,
            target_time_ms: entry.timestamp,
            target: NoteTarget::chord(&entry.chord),
            state: NoteState::Pending,
        };
        self.cursor += 1;
        debug!(
            "Spawned note {} ({}) for {}ms",
            note.id, note.target.chord, note.target_time_ms
        );
        SchedulerTick::Spawned(note)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.completed = false;
    }
}
