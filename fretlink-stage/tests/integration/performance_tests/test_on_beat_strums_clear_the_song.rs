use fretlink_core::{builtin_songs, chord_shape};
use fretlink_stage::{MemoryProgressStore, ProgressBook, Rating};

use crate::integration::{builtin_song, create_test_performance, init_tracing};
use crate::utils::{HandScript, TICK_MS, play};

#[test]
fn test_on_beat_strums_clear_the_song() {
    init_tracing();

    let song = builtin_song("c-practice");
    let targets: Vec<u64> = song.chord_chart.entries().iter().map(|e| e.timestamp).collect();
    let c_shape = chord_shape("C").unwrap().frets;

    let mut performance = create_test_performance(&song);
    let judgments = play(
        &mut performance,
        // The first note sits at t=0, before the hand has a previous sample.
        &HandScript::strumming_at(targets.iter().map(|t| t + TICK_MS).collect()),
        Some(c_shape),
        20_000,
    );

    assert!(performance.is_complete());
    assert_eq!(judgments.len(), targets.len());
    for (judgment, target) in judgments.iter().zip(&targets) {
        assert_eq!(judgment.rating, Rating::Perfect);
        assert_eq!(judgment.note.target_time_ms, *target);
        assert_eq!(judgment.offset_ms, 16);
        assert!(judgment.fingering_matched);
    }

    let summary = performance.summary();
    assert_eq!(summary.score, 1000 * targets.len() as u64);
    assert_eq!(summary.max_combo, targets.len() as u32);
    assert_eq!(summary.misses, 0);
    assert!(summary.cleared());

    let mut book = ProgressBook::open(MemoryProgressStore::new()).unwrap();
    book.record(&song.id, summary.score, summary.cleared(), 1_000);
    book.flush().unwrap();

    let progress = book.get(&song.id).unwrap();
    assert_eq!(progress.best_score, summary.score);
    assert_eq!(progress.clear_count, 1);
    assert_eq!(book.overall(builtin_songs().len()).cleared, 1);
}
