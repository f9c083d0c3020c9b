use crate::config::JudgmentConfig;
use crate::gesture::StrumEvent;
use crate::scheduler::{Note, NoteState};
use fretlink_core::{FretState, detect_chord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rating {
    Perfect,
    Great,
    Miss,
}

impl Rating {
    pub fn is_hit(&self) -> bool {
        !matches!(self, Rating::Miss)
    }
}

/// Outcome for one note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub note: Note,
    pub rating: Rating,
    /// Strum time minus target time; zero for misses.
    pub offset_ms: i64,
    pub at_ms: u64,
    /// Remote fret state at the moment of the strum, if one was known.
    pub frets: Option<FretState>,
    /// Whether `frets` forms the note's chord. Does not affect scoring.
    pub fingering_matched: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub last_rating: Option<Rating>,
    pub last_rating_at_ms: Option<u64>,
}

impl ScoreState {
    fn apply(&mut self, rating: Rating, points: u64, at_ms: u64) {
        if rating.is_hit() {
            self.score = self.score.saturating_add(points);
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        } else {
            self.combo = 0;
        }
        self.last_rating = Some(rating);
        self.last_rating_at_ms = Some(at_ms);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentStats {
    pub hits: u32,
    pub perfects: u32,
    pub misses: u32,
}

pub struct JudgmentEngine {
    config: JudgmentConfig,
    pending: Vec<Note>,
    score: ScoreState,
    stats: JudgmentStats,
}

impl JudgmentEngine {
    pub fn new(config: JudgmentConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            score: ScoreState::default(),
            stats: JudgmentStats::default(),
        }
    }

    pub fn config(&self) -> &JudgmentConfig {
        &self.config
    }

    pub fn push(&mut self, note: Note) {
        self.pending.push(note);
    }

    pub fn pending(&self) -> &[Note] {
        &self.pending
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn stats(&self) -> JudgmentStats {
        self.stats
    }

    /// Credits the strum to the pending note closest to it within the hit
    /// window. The earliest note wins a tie. `None` when nothing is in reach.
    pub fn strum(&mut self, strum: &StrumEvent, frets: Option<FretState>) -> Option<Judgment> {
        let now = strum.timestamp_ms;
        let window = self.config.hit_window_ms;

        let (index, distance) = self
            .pending
            .iter()
            .enumerate()
            .map(|(i, note)| (i, note.target_time_ms.abs_diff(now)))
            .filter(|(_, distance)| *distance <= window)
            .min_by_key(|(i, distance)| (*distance, *i))?;

        let mut note = self.pending.remove(index);
        note.state = NoteState::Hit;

        let (rating, points) =
            if distance as f64 <= window as f64 * self.config.perfect_ratio {
                (Rating::Perfect, self.config.perfect_points)
            } else {
                (Rating::Great, self.config.great_points)
            };

        self.score.apply(rating, points, now);
        self.stats.hits += 1;
        if rating == Rating::Perfect {
            self.stats.perfects += 1;
        }

        let fingering_matched =
            frets.is_some_and(|f| detect_chord(&f) == Some(note.target.chord.as_str()));
        let offset_ms = now as i64 - note.target_time_ms as i64;
        debug!(
            "{:?} on note {} ({}) offset {}ms, combo {}",
            rating, note.id, note.target.chord, offset_ms, self.score.combo
        );

        Some(Judgment {
            note,
            rating,
            offset_ms,
            at_ms: now,
            frets,
            fingering_matched,
        })
    }

    /// Turns every pending note whose window has closed into a miss.
    pub fn expire(&mut self, now_ms: u64) -> Vec<Judgment> {
        let window = self.config.hit_window_ms;
        let (expired, pending): (Vec<Note>, Vec<Note>) = self
            .pending
            .drain(..)
            .partition(|note| now_ms > note.target_time_ms + window);
        self.pending = pending;

        expired
            .into_iter()
            .map(|mut note| {
                note.state = NoteState::Missed;
                self.score.apply(Rating::Miss, 0, now_ms);
                self.stats.misses += 1;
                info!("Missed note {} ({})", note.id, note.target.chord);
                Judgment {
                    note,
                    rating: Rating::Miss,
                    offset_ms: 0,
                    at_ms: now_ms,
                    frets: None,
                    fingering_matched: false,
                }
            })
            .collect()
    }

    /// The last rating, while it is still on screen.
    pub fn visible_rating(&self, now_ms: u64) -> Option<Rating> {
        let at = self.score.last_rating_at_ms?;
        (now_ms.saturating_sub(at) < self.config.rating_display_ms)
            .then_some(self.score.last_rating)
            .flatten()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.score = ScoreState::default();
        self.stats = JudgmentStats::default();
    }
}
