use crate::model::fret::FretState;

/// Fingering of a named chord, one fret per string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordShape {
    pub name: &'static str,
    pub frets: FretState,
}

const fn shape(name: &'static str, frets: [u8; 6]) -> ChordShape {
    ChordShape {
        name,
        frets: FretState::new(frets),
    }
}

pub const CHORD_SHAPES: [ChordShape; 9] = [
    shape("C", [0, 1, 0, 2, 3, 0]),
    shape("G", [3, 0, 0, 0, 2, 3]),
    shape("D", [2, 3, 2, 0, 0, 0]),
    shape("Am", [0, 1, 2, 2, 0, 0]),
    shape("E", [0, 2, 2, 1, 0, 0]),
    shape("A", [0, 0, 2, 2, 2, 0]),
    shape("Dm", [2, 3, 2, 0, 1, 0]),
    shape("Em", [0, 2, 2, 0, 0, 0]),
    shape("F", [1, 3, 3, 2, 1, 1]),
];

pub fn chord_shape(name: &str) -> Option<&'static ChordShape> {
    CHORD_SHAPES.iter().find(|s| s.name == name)
}

/// Names the first chord whose fret multiset matches `frets`.
///
/// Comparison ignores string order; open strings in a shape match anything.
pub fn detect_chord(frets: &FretState) -> Option<&'static str> {
    let mut played = *frets.frets();
    played.sort_unstable();

    CHORD_SHAPES
        .iter()
        .find(|shape| {
            let mut wanted = *shape.frets.frets();
            wanted.sort_unstable();
            wanted
                .iter()
                .zip(played.iter())
                .all(|(w, p)| *w == 0 || w == p)
        })
        .map(|shape| shape.name)
}
