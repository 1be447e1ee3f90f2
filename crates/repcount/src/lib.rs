//! Real-time repetition counting and form scoring over pose landmark streams.
//!
//! One frame at a time, the pipeline runs
//! frame → `landmarks` (validation) → `geometry` → `form` → {`confidence`, `reps`}
//! → `session`, and exposes a read-only `MetricsSnapshot`.
//!
//! API Policy
//! - The analysis core is pure: `reps::EngineState::step` and `engine::step` take a
//!   state value and return the next one. `Engine` and `Session` only own that value.
//! - Nothing here performs I/O; pose estimation and rendering live elsewhere.

pub mod config;
pub mod confidence;
pub mod engine;
pub mod form;
pub mod geometry;
pub mod landmarks;
pub mod metrics;
pub mod reps;
pub mod session;
pub mod shared;
pub mod synth;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::config::{ConfigError, EngineCfg, FormBands, RepThresholds, SessionCfg};
    pub use crate::confidence::{confidence_score, ConfidenceBand};
    pub use crate::engine::{step, Engine, FrameOutcome};
    pub use crate::form::{evaluate, FormFeedback, FormSignals};
    pub use crate::landmarks::{FrameRejection, JointRole, Landmark, LandmarkFrame, PoseJoints};
    pub use crate::metrics::{format_duration, MetricsSnapshot};
    pub use crate::reps::{EngineState, Phase, RepEvent};
    pub use crate::session::{CompletionEvent, Session, SessionState};
    pub use crate::shared::{SharedSession, Ticker};
    pub use nalgebra::Vector2 as Vec2;
}
