use crate::config::GestureConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One tracked hand: 21 landmarks in the usual hand-pose layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub landmarks: Vec<Point>,
}

impl Hand {
    pub const WRIST: usize = 0;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_TIP: usize = 16;

    pub fn new(landmarks: Vec<Point>) -> Self {
        Self { landmarks }
    }

    pub fn wrist(&self) -> Option<Point> {
        self.landmarks.get(Self::WRIST).copied()
    }

    /// Mean of the index, middle and ring fingertips.
    pub fn fingertip_centroid(&self) -> Option<Point> {
        let tips = [Self::INDEX_TIP, Self::MIDDLE_TIP, Self::RING_TIP]
            .map(|i| self.landmarks.get(i).copied());
        let [Some(a), Some(b), Some(c)] = tips else {
            return None;
        };
        Some(Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrumDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrumEvent {
    pub timestamp_ms: u64,
    pub direction: StrumDirection,
    /// Vertical travel between the two samples that produced the strum.
    pub velocity: f32,
}

/// Turns a stream of hand samples into discrete strums.
///
/// A strum needs the fingertip centroid to cross the zone midline between two
/// consecutive in-zone samples, faster than the velocity threshold, and at
/// least `debounce_ms` after the previous strum. Leaving the zone forgets the
/// previous sample, so re-entering never counts as a crossing.
pub struct GestureDetector {
    config: GestureConfig,
    previous_y: Option<f32>,
    last_strum_ms: Option<u64>,
}

impl GestureDetector {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            previous_y: None,
            last_strum_ms: None,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether the last accepted sample was inside the zone.
    pub fn hand_in_zone(&self) -> bool {
        self.previous_y.is_some()
    }

    pub fn reset(&mut self) {
        self.previous_y = None;
        self.last_strum_ms = None;
    }

    /// Picks the strumming hand: wrist below the face line, smallest wrist x.
    pub fn select_hand<'a>(&self, hands: &'a [Hand]) -> Option<&'a Hand> {
        hands
            .iter()
            .filter_map(|hand| hand.wrist().map(|wrist| (hand, wrist)))
            .filter(|(_, wrist)| self.config.min_wrist_y.is_none_or(|min| wrist.y > min))
            .min_by(|(_, a), (_, b)| a.x.total_cmp(&b.x))
            .map(|(hand, _)| hand)
    }

    pub fn sample_hands(&mut self, now_ms: u64, hands: &[Hand]) -> Option<StrumEvent> {
        let centroid = self.select_hand(hands).and_then(Hand::fingertip_centroid);
        self.sample(now_ms, centroid)
    }

    /// Feeds one frame. `None` means no hand was tracked; that keeps the
    /// previous sample and never produces a strum.
    pub fn sample(&mut self, now_ms: u64, centroid: Option<Point>) -> Option<StrumEvent> {
        let point = centroid?;

        if !self.config.zone.contains(point.x, point.y) {
            self.previous_y = None;
            return None;
        }

        let previous = self.previous_y.replace(point.y)?;
        let displacement = point.y - previous;
        let speed = displacement.abs();

        let mid = self.config.zone.mid_y();
        let crossed = (previous < mid && point.y >= mid) || (previous > mid && point.y <= mid);
        if !crossed || speed <= self.config.velocity_threshold {
            return None;
        }

        if let Some(last) = self.last_strum_ms {
            if now_ms.saturating_sub(last) < self.config.debounce_ms {
                debug!("Strum at {}ms suppressed by debounce", now_ms);
                return None;
            }
        }

        self.last_strum_ms = Some(now_ms);
        let direction = if displacement > 0.0 {
            StrumDirection::Down
        } else {
            StrumDirection::Up
        };
        debug!("Strum {:?} at {}ms (speed {:.1})", direction, now_ms, speed);

        Some(StrumEvent {
            timestamp_ms: now_ms,
            direction,
            velocity: speed,
        })
    }
}
