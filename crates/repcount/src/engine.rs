//! One synchronous pass per frame: validate → form → confidence → reps → snapshot.

use tracing::debug;

use crate::config::EngineCfg;
use crate::confidence::confidence_score;
use crate::form::{evaluate, feedback, FormSignals};
use crate::landmarks::{FrameRejection, LandmarkFrame, PoseJoints};
use crate::metrics::MetricsSnapshot;
use crate::reps::{EngineState, RepEvent};

/// Result of feeding one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Processed(RepEvent),
    /// Skipped whole; state and snapshot are untouched.
    Rejected(FrameRejection),
}

impl FrameOutcome {
    pub fn counted(&self) -> bool {
        matches!(self, FrameOutcome::Processed(RepEvent::Counted { .. }))
    }
}

/// Pure frame step: `(state, frame) -> (state', metrics)`.
///
/// Returns the rejection instead when the frame is incomplete; callers keep
/// their previous state and snapshot in that case.
pub fn step(
    state: EngineState,
    frame: &LandmarkFrame,
    cfg: &EngineCfg,
) -> Result<(EngineState, MetricsSnapshot, FormSignals, RepEvent), FrameRejection> {
    let joints = PoseJoints::from_frame(frame, cfg)?;
    let signals = evaluate(&joints, &cfg.form);
    let confidence = confidence_score(&signals);
    let (next, event) = state.step(signals.elbow_angle_avg, &cfg.reps);
    let snapshot = MetricsSnapshot {
        count: next.count,
        phase: next.phase,
        is_in_position: signals.is_in_position(),
        form_feedback: feedback(&signals)
            .into_iter()
            .map(|f| f.message().to_string())
            .collect(),
        confidence,
    };
    Ok((next, snapshot, signals, event))
}

/// Owns the engine state and the most recent snapshot.
#[derive(Clone, Debug)]
pub struct Engine {
    cfg: EngineCfg,
    state: EngineState,
    snapshot: MetricsSnapshot,
    last_signals: Option<FormSignals>,
}

impl Engine {
    pub fn new(cfg: EngineCfg) -> Self {
        Self {
            cfg,
            state: EngineState::default(),
            snapshot: MetricsSnapshot::default(),
            last_signals: None,
        }
    }

    pub fn cfg(&self) -> &EngineCfg {
        &self.cfg
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    /// Signals of the last accepted frame, if any.
    pub fn last_signals(&self) -> Option<&FormSignals> {
        self.last_signals.as_ref()
    }

    pub fn process(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        match step(self.state, frame, &self.cfg) {
            Ok((state, snapshot, signals, event)) => {
                if let RepEvent::Counted { count } = event {
                    debug!(count, elbow = signals.elbow_angle_avg, "rep counted");
                }
                self.state = state;
                self.snapshot = snapshot;
                self.last_signals = Some(signals);
                FrameOutcome::Processed(event)
            }
            Err(reason) => {
                debug!(%reason, "frame skipped");
                FrameOutcome::Rejected(reason)
            }
        }
    }

    /// Back to count 0, phase up, empty snapshot.
    pub fn reset(&mut self) {
        self.state.reset();
        self.snapshot = MetricsSnapshot::default();
        self.last_signals = None;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineCfg::default())
    }
}
