//! Tracking session: lifecycle, elapsed time, and the one-shot completion event.
//!
//! Two independent inputs drive a session: frames (irregular, may pause for
//! any length of time) and `tick` (nominally 1 Hz). Both take `&mut self`, so a
//! single owner serializes them; see `shared` for the threaded wrapper.
//!
//! Completion
//! - The first processed frame with `count >= target_reps` marks the session
//!   completed and freezes `final_duration`.
//! - The event is delivered after `presentation_delay_secs` ticks (immediately
//!   when zero), exactly once per tracking session.
//! - `reset` cancels an undelivered event (its count no longer exists); `stop`
//!   flushes it, since the target was genuinely reached.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, SessionCfg};
use crate::engine::{Engine, FrameOutcome};
use crate::landmarks::LandmarkFrame;
use crate::metrics::{progress_percent, MetricsSnapshot};
use crate::reps::EngineState;

/// Delivered once when the target is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub reps_completed: u32,
    pub duration_seconds: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub started: bool,
    pub elapsed_seconds: u64,
    pub target_reps: u32,
    pub completed: bool,
    pub final_duration: Option<u64>,
}

#[derive(Clone, Copy, Debug)]
struct PendingCompletion {
    event: CompletionEvent,
    ticks_left: u32,
}

/// What happened to one frame handed to the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// `None` while the session is not started.
    pub outcome: Option<FrameOutcome>,
    pub completion: Option<CompletionEvent>,
}

#[derive(Clone, Debug)]
pub struct Session {
    cfg: SessionCfg,
    engine: Engine,
    state: SessionState,
    pending: Option<PendingCompletion>,
}

impl Session {
    /// Validate `cfg` and build an idle session.
    pub fn new(cfg: SessionCfg) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self::with_valid_cfg(cfg))
    }

    fn with_valid_cfg(cfg: SessionCfg) -> Self {
        Self {
            engine: Engine::new(cfg.engine),
            state: SessionState {
                target_reps: cfg.target_reps,
                ..SessionState::default()
            },
            cfg,
            pending: None,
        }
    }

    pub fn cfg(&self) -> &SessionCfg {
        &self.cfg
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Metrics of the most recently processed frame.
    pub fn snapshot(&self) -> &MetricsSnapshot {
        self.engine.snapshot()
    }

    pub fn is_active(&self) -> bool {
        self.state.started
    }

    /// True while a completion event waits out its presentation delay.
    pub fn has_pending_completion(&self) -> bool {
        self.pending.is_some()
    }

    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.snapshot().count, self.state.target_reps)
    }

    /// Begin tracking. Calling again while started has no effect.
    pub fn start(&mut self) {
        if self.state.started {
            return;
        }
        self.clear();
        self.state.started = true;
        info!(target_reps = self.state.target_reps, "session started");
    }

    /// End tracking and discard state. A pending completion is returned now.
    pub fn stop(&mut self) -> Option<CompletionEvent> {
        if !self.state.started {
            return None;
        }
        let flushed = self.pending.take().map(|p| p.event);
        info!(
            count = self.snapshot().count,
            elapsed = self.state.elapsed_seconds,
            flushed = flushed.is_some(),
            "session stopped"
        );
        self.clear();
        flushed
    }

    /// Zero the count and the clock; an undelivered completion is dropped.
    pub fn reset(&mut self) {
        let started = self.state.started;
        if self.pending.is_some() {
            debug!("pending completion cancelled by reset");
        }
        self.clear();
        self.state.started = started;
        info!(started, "session reset");
    }

    fn clear(&mut self) {
        self.engine.reset();
        self.pending = None;
        self.state = SessionState {
            target_reps: self.cfg.target_reps,
            ..SessionState::default()
        };
    }

    /// One timer tick (nominally one second).
    pub fn tick(&mut self) -> Option<CompletionEvent> {
        if self.state.started && !self.state.completed {
            self.state.elapsed_seconds += 1;
        }
        let pending = self.pending.as_mut()?;
        pending.ticks_left = pending.ticks_left.saturating_sub(1);
        if pending.ticks_left > 0 {
            return None;
        }
        let event = self.pending.take().map(|p| p.event);
        if let Some(ev) = event {
            info!(reps = ev.reps_completed, duration = ev.duration_seconds, "completion delivered");
        }
        event
    }

    /// Run one frame through the engine and check the target.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameReport {
        if !self.state.started {
            return FrameReport {
                outcome: None,
                completion: None,
            };
        }
        let outcome = self.engine.process(frame);
        let count = self.snapshot().count;
        let mut completion = None;
        let processed = matches!(outcome, FrameOutcome::Processed(_));
        if processed && count >= self.state.target_reps && !self.state.completed {
            self.state.completed = true;
            self.state.final_duration = Some(self.state.elapsed_seconds);
            let event = CompletionEvent {
                reps_completed: count,
                duration_seconds: self.state.elapsed_seconds,
            };
            info!(
                reps = count,
                duration = event.duration_seconds,
                delay = self.cfg.presentation_delay_secs,
                "target reached"
            );
            if self.cfg.presentation_delay_secs == 0 {
                completion = Some(event);
            } else {
                self.pending = Some(PendingCompletion {
                    event,
                    ticks_left: self.cfg.presentation_delay_secs,
                });
            }
        }
        FrameReport {
            outcome: Some(outcome),
            completion,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_valid_cfg(SessionCfg::default())
    }
}
