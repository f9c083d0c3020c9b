use fretlink_stage::Rating;

use crate::integration::{builtin_song, create_test_performance, init_tracing};
use crate::utils::{HandScript, play};

#[test]
fn test_early_strums_are_credited() {
    init_tracing();

    let song = builtin_song("c-practice");
    let targets: Vec<u64> = song.chord_chart.entries().iter().map(|e| e.timestamp).collect();

    // Every note after the first is strummed 48ms ahead of the beat.
    let strums = targets[1..].iter().map(|t| t - 48).collect();
    let mut performance = create_test_performance(&song);
    let judgments = play(
        &mut performance,
        &HandScript::strumming_at(strums),
        None,
        20_000,
    );

    assert_eq!(judgments.len(), targets.len());
    assert_eq!(judgments[0].rating, Rating::Miss);
    for (judgment, target) in judgments[1..].iter().zip(&targets[1..]) {
        assert_eq!(judgment.rating, Rating::Great);
        assert_eq!(judgment.note.target_time_ms, *target);
        assert_eq!(judgment.offset_ms, -48);
    }

    let summary = performance.summary();
    assert_eq!(summary.hits, targets.len() as u32 - 1);
    assert_eq!(summary.score, 500 * (targets.len() as u64 - 1));
    assert!(summary.cleared());
}
