use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub judgment: JudgmentConfig,
    pub gesture: GestureConfig,
}

impl StageConfig {
    pub fn for_canvas(width: f32, height: f32) -> Self {
        Self {
            judgment: JudgmentConfig::default(),
            gesture: GestureConfig::for_canvas(width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgmentConfig {
    /// Half-width of the window in which a strum may claim a note.
    pub hit_window_ms: u64,
    /// Fraction of the window that still counts as PERFECT.
    pub perfect_ratio: f64,
    pub perfect_points: u64,
    pub great_points: u64,
    /// How long the last rating stays visible.
    pub rating_display_ms: u64,
    /// How long before its chart time a note appears. Must cover the hit
    /// window for early strums to count.
    pub travel_ms: u64,
}

impl Default for JudgmentConfig {
    fn default() -> Self {
        Self {
            hit_window_ms: 120,
            perfect_ratio: 0.28,
            perfect_points: 1000,
            great_points: 500,
            rating_display_ms: 500,
            travel_ms: 1000,
        }
    }
}

/// Axis-aligned rectangle in camera/canvas coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrumZone {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl StrumZone {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.width && y > self.y && y < self.y + self.height
    }

    /// The horizontal line a hand has to cross to strum.
    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

impl Default for StrumZone {
    fn default() -> Self {
        GestureConfig::for_canvas(1280.0, 720.0).zone
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub zone: StrumZone,
    /// Minimum vertical travel between two samples for a crossing to count.
    pub velocity_threshold: f32,
    pub debounce_ms: u64,
    /// Hands whose wrist sits above this line are ignored (usually a face).
    pub min_wrist_y: Option<f32>,
}

impl GestureConfig {
    /// Zone at waist height on the right-hand side, as laid out on a `width` x `height` canvas.
    pub fn for_canvas(width: f32, height: f32) -> Self {
        Self {
            zone: StrumZone {
                x: width - 650.0,
                y: height * 0.65,
                width: 600.0,
                height: height * 0.3,
            },
            velocity_threshold: 18.0,
            debounce_ms: 150,
            min_wrist_y: Some(height * 0.55),
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::for_canvas(1280.0, 720.0)
    }
}
