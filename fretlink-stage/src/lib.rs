//! Frame-tick side of a performance: turns hand samples into strums, walks the
//! chord chart and scores strums against the notes it spawns.

mod config;
mod error;
mod gesture;
mod judgment;
mod performance;
mod progress;
mod scheduler;

pub use config::{GestureConfig, JudgmentConfig, StageConfig, StrumZone};
pub use error::StageError;
pub use gesture::{GestureDetector, Hand, Point, StrumDirection, StrumEvent};
pub use judgment::{Judgment, JudgmentEngine, JudgmentStats, Rating, ScoreState};
pub use performance::{Performance, PerformanceSummary, TickReport};
pub use progress::{
    JsonFileProgressStore, MemoryProgressStore, OverallProgress, Progress, ProgressBook,
    ProgressStore,
};
pub use scheduler::{Note, NoteScheduler, NoteState, NoteTarget, SchedulerTick};
