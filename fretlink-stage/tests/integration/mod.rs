pub mod performance_tests;

use fretlink_core::{Song, builtin_songs};
use fretlink_stage::{Performance, StageConfig};
use tracing::Level;

use crate::utils::{CANVAS_HEIGHT, CANVAS_WIDTH};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn builtin_song(id: &str) -> Song {
    builtin_songs()
        .into_iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| panic!("no built-in song {id}"))
}

pub fn create_test_performance(song: &Song) -> Performance {
    Performance::new(
        song.chord_chart.clone(),
        StageConfig::for_canvas(CANVAS_WIDTH, CANVAS_HEIGHT),
    )
}
