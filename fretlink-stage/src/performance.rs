use crate::config::StageConfig;
use crate::gesture::{GestureDetector, Hand, StrumEvent};
use crate::judgment::{Judgment, JudgmentEngine, Rating, ScoreState};
use crate::scheduler::{Note, NoteScheduler, SchedulerTick};
use fretlink_core::{ChordChart, FretState};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Option<Note>,
    pub strum: Option<StrumEvent>,
    pub judgments: Vec<Judgment>,
    /// Set on the single tick where the song finished.
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub score: u64,
    pub max_combo: u32,
    pub notes: u32,
    pub hits: u32,
    pub perfects: u32,
    pub misses: u32,
    pub completed: bool,
}

impl PerformanceSummary {
    /// A run clears when the song finished and at least half its notes were hit.
    pub fn cleared(&self) -> bool {
        self.completed && self.hits * 2 >= self.notes
    }

    pub fn accuracy(&self) -> f64 {
        if self.notes == 0 {
            return 0.0;
        }
        f64::from(self.hits) / f64::from(self.notes)
    }
}

/// One play-through of a chart: the frame-tick context.
pub struct Performance {
    gesture: GestureDetector,
    scheduler: NoteScheduler,
    judgment: JudgmentEngine,
    completed: bool,
}

impl Performance {
    pub fn new(chart: ChordChart, config: StageConfig) -> Self {
        let travel_ms = config.judgment.travel_ms;
        Self {
            gesture: GestureDetector::new(config.gesture),
            scheduler: NoteScheduler::new(chart, travel_ms),
            judgment: JudgmentEngine::new(config.judgment),
            completed: false,
        }
    }

    /// Advances the frame at `now_ms` playback time with the hands seen in
    /// this frame and the latest remote fret state, if the channel is open.
    pub fn tick(&mut self, now_ms: u64, hands: &[Hand], frets: Option<FretState>) -> TickReport {
        let mut report = TickReport::default();
        if self.completed {
            return report;
        }

        report.strum = self.gesture.sample_hands(now_ms, hands);

        if let SchedulerTick::Spawned(note) = self.scheduler.tick(now_ms) {
            self.judgment.push(note.clone());
            report.spawned = Some(note);
        }

        if let Some(strum) = &report.strum {
            if let Some(judgment) = self.judgment.strum(strum, frets) {
                report.judgments.push(judgment);
            }
        }

        report.judgments.extend(self.judgment.expire(now_ms));

        if self.scheduler.is_completed() && self.judgment.pending().is_empty() {
            self.completed = true;
            report.completed = true;
            let summary = self.summary();
            info!(
                "Performance finished: score {} ({} / {} hit, max combo {})",
                summary.score, summary.hits, summary.notes, summary.max_combo
            );
        }

        report
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn score(&self) -> &ScoreState {
        self.judgment.score()
    }

    pub fn visible_rating(&self, now_ms: u64) -> Option<Rating> {
        self.judgment.visible_rating(now_ms)
    }

    pub fn pending(&self) -> &[Note] {
        self.judgment.pending()
    }

    pub fn hand_in_zone(&self) -> bool {
        self.gesture.hand_in_zone()
    }

    pub fn summary(&self) -> PerformanceSummary {
        let score = self.judgment.score();
        let stats = self.judgment.stats();
        PerformanceSummary {
            score: score.score,
            max_combo: score.max_combo,
            notes: self.scheduler.chart().len() as u32,
            hits: stats.hits,
            perfects: stats.perfects,
            misses: stats.misses,
            completed: self.completed,
        }
    }
}
