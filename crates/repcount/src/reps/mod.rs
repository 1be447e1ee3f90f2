//! Repetition state machine over the averaged elbow angle.
//!
//! Purpose
//! - Turn a scalar joint-angle signal into phase transitions and a rep count,
//!   one sample at a time, with no look-ahead.
//! - Keep the state an explicit value (`EngineState`) advanced by one pure
//!   function so sequences of literal angles can be tested directly.
//!
//! Hysteresis
//! - A rep is an excursion strictly below `down_deg` followed by a sample
//!   strictly above `up_deg`. Wobbling inside `[down_deg, up_deg]` never counts.
//!
//! Layout: `types.rs` (state, phase, events) and `step.rs` (transition function).

mod step;
mod types;

pub use types::{EngineState, Phase, RepEvent};
