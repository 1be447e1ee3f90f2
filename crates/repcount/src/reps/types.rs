//! State carried between frames and the events a step can emit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in a repetition cycle the tracked motion currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Up,
    Down,
    Transition,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Up => "up",
            Phase::Down => "down",
            Phase::Transition => "transition",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only memory the analysis core keeps across frames.
///
/// `in_down_position` and `completed_down_this_cycle` are raised together on a
/// down entry and cleared together when the matching rep is counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub in_down_position: bool,
    pub completed_down_this_cycle: bool,
    pub count: u32,
    pub phase: Phase,
}

/// What a single step did, beyond setting the phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepEvent {
    None,
    EnteredDown,
    Counted { count: u32 },
}
