use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    /// Offset from playback start, in milliseconds.
    pub timestamp: u64,
    pub chord: String,
}

impl ChartEntry {
    pub fn new(timestamp: u64, chord: impl Into<String>) -> Self {
        Self {
            timestamp,
            chord: chord.into(),
        }
    }
}

/// Time-ordered chord events of one song. Timestamps never decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChartEntry>", into = "Vec<ChartEntry>")]
pub struct ChordChart(Vec<ChartEntry>);

impl ChordChart {
    pub fn new(entries: Vec<ChartEntry>) -> Result<Self, CoreError> {
        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(CoreError::UnorderedChart { index: index + 1 });
        }
        Ok(Self(entries))
    }

    pub(crate) fn from_pairs(pairs: &[(u64, &str)]) -> Self {
        let mut entries: Vec<ChartEntry> = pairs
            .iter()
            .map(|(ts, chord)| ChartEntry::new(*ts, *chord))
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Self(entries)
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&ChartEntry> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.0.last().map(|e| e.timestamp)
    }
}

impl TryFrom<Vec<ChartEntry>> for ChordChart {
    type Error = CoreError;

    fn try_from(entries: Vec<ChartEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ChordChart> for Vec<ChartEntry> {
    fn from(chart: ChordChart) -> Self {
        chart.0
    }
}
