use crate::error::CoreError;
use crate::utils::STRING_COUNT;
use serde::{Deserialize, Serialize};

/// Controller finger positions, one fret per string (0 = open).
///
/// Sent opportunistically; the latest value fully describes intent.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FretState([u8; STRING_COUNT]);

impl FretState {
    pub const fn new(frets: [u8; STRING_COUNT]) -> Self {
        Self(frets)
    }

    pub const fn open() -> Self {
        Self([0; STRING_COUNT])
    }

    pub fn frets(&self) -> &[u8; STRING_COUNT] {
        &self.0
    }

    pub fn fret(&self, string: usize) -> Option<u8> {
        self.0.get(string).copied()
    }

    pub fn is_pressed(&self, string: usize) -> bool {
        self.fret(string).is_some_and(|f| f > 0)
    }

    /// Returns a copy with one string moved to `fret`; out-of-range strings are ignored.
    pub fn with_fret(mut self, string: usize, fret: u8) -> Self {
        if let Some(slot) = self.0.get_mut(string) {
            *slot = fret;
        }
        self
    }

    pub fn validate(self, max_fret: u8) -> Result<Self, CoreError> {
        for (string, &fret) in self.0.iter().enumerate() {
            if fret > max_fret {
                return Err(CoreError::FretOutOfRange {
                    string,
                    fret,
                    max: max_fret,
                });
            }
        }
        Ok(self)
    }
}

impl From<[u8; STRING_COUNT]> for FretState {
    fn from(frets: [u8; STRING_COUNT]) -> Self {
        Self(frets)
    }
}
