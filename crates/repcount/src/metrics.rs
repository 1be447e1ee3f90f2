//! Read-only view handed to the hosting UI after every processed frame.

use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceBand;
use crate::reps::Phase;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub count: u32,
    pub phase: Phase,
    /// Body straight and in plank.
    pub is_in_position: bool,
    pub form_feedback: Vec<String>,
    pub confidence: u8,
}

impl MetricsSnapshot {
    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }
}

/// Share of the target reached, capped at 100.
pub fn progress_percent(count: u32, target: u32) -> f64 {
    if target == 0 {
        return 100.0;
    }
    (f64::from(count) / f64::from(target) * 100.0).min(100.0)
}

/// `m:ss`, minutes unpadded.
pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
