use crate::model::chart::ChordChart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub difficulty: Difficulty,
    pub bpm: u32,
    pub chord_chart: ChordChart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_url: Option<String>,
}

impl Song {
    pub fn total_chords(&self) -> usize {
        self.chord_chart.len()
    }
}

fn song(
    id: &str,
    title: &str,
    difficulty: Difficulty,
    bpm: u32,
    chart: &[(u64, &str)],
) -> Song {
    Song {
        id: id.to_owned(),
        title: title.to_owned(),
        artist: "Public Domain".to_owned(),
        difficulty,
        bpm,
        chord_chart: ChordChart::from_pairs(chart),
        bgm_url: None,
    }
}

/// Practice catalog shipped with the binary.
pub fn builtin_songs() -> Vec<Song> {
    vec![
        song(
            "c-practice",
            "C chord drill",
            Difficulty::Easy,
            50,
            &[
                (0, "C"),
                (2400, "C"),
                (4800, "C"),
                (7200, "C"),
                (9600, "C"),
                (12000, "C"),
                (14400, "C"),
                (16800, "C"),
            ],
        ),
        song(
            "c-am-practice",
            "C to Am drill",
            Difficulty::Easy,
            55,
            &[
                (0, "C"),
                (2182, "C"),
                (4364, "Am"),
                (6545, "Am"),
                (8727, "C"),
                (10909, "C"),
                (13091, "Am"),
                (15273, "Am"),
            ],
        ),
        song(
            "twinkle-easy",
            "Twinkle Twinkle",
            Difficulty::Easy,
            60,
            &[
                (0, "C"),
                (2000, "G"),
                (4000, "C"),
                (6000, "G"),
                (8000, "F"),
                (10000, "C"),
                (12000, "C"),
                (14000, "C"),
                (16000, "C"),
                (18000, "C"),
                (20000, "G"),
                (22000, "C"),
                (26000, "C"),
                (30000, "C"),
            ],
        ),
        song(
            "amazing-grace-medium",
            "Amazing Grace",
            Difficulty::Medium,
            72,
            &[
                (0, "G"),
                (1667, "Em"),
                (3333, "C"),
                (5000, "D"),
                (6667, "G"),
                (8333, "G"),
                (10000, "Em"),
                (11667, "C"),
                (13333, "D"),
                (15000, "G"),
                (16667, "D"),
            ],
        ),
        song(
            "folk-hard",
            "Folk Medley",
            Difficulty::Hard,
            95,
            &[
                (0, "Am"),
                (1263, "G"),
                (2526, "C"),
                (3789, "F"),
                (5053, "G"),
                (6316, "Am"),
                (7579, "Em"),
                (8842, "Dm"),
                (10105, "Am"),
                (11368, "G"),
            ],
        ),
    ]
}
