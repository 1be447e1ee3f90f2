//! Offline replay of a recorded landmark stream through a tracking session.
//!
//! The session clock is driven from frame numbers: one tick per `fps` frames.
//! After the last frame, ticks continue until a delayed completion has been
//! delivered.

use repcount::config::{ConfigError, SessionCfg};
use repcount::engine::FrameOutcome;
use repcount::landmarks::LandmarkFrame;
use repcount::metrics::{format_duration, MetricsSnapshot};
use repcount::session::{CompletionEvent, Session};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub frames_total: usize,
    pub frames_rejected: usize,
    pub reps: u32,
    pub target_reps: u32,
    pub elapsed_seconds: u64,
    /// `elapsed_seconds` as `m:ss`.
    pub elapsed: String,
    pub progress_percent: f64,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayOutput {
    pub summary: ReplaySummary,
    pub completion: Option<CompletionEvent>,
    /// Snapshot after every input frame; a rejected frame repeats the previous one.
    pub frames: Vec<MetricsSnapshot>,
}

pub fn replay(
    frames: &[LandmarkFrame],
    cfg: SessionCfg,
    fps: u32,
) -> Result<ReplayOutput, ConfigError> {
    let fps = fps.max(1) as usize;
    let mut session = Session::new(cfg)?;
    session.start();

    let mut completion = None;
    let mut rejected = 0;
    let mut snapshots = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        if i > 0 && i % fps == 0 {
            completion = completion.or(session.tick());
        }
        let report = session.process_frame(frame);
        if let Some(FrameOutcome::Rejected(_)) = report.outcome {
            rejected += 1;
        }
        completion = completion.or(report.completion);
        snapshots.push(session.snapshot().clone());
    }
    while completion.is_none() && session.has_pending_completion() {
        completion = session.tick();
    }

    let state = session.state();
    let elapsed_seconds = state.final_duration.unwrap_or(state.elapsed_seconds);
    let summary = ReplaySummary {
        frames_total: frames.len(),
        frames_rejected: rejected,
        reps: session.snapshot().count,
        target_reps: state.target_reps,
        elapsed_seconds,
        elapsed: format_duration(elapsed_seconds),
        progress_percent: session.progress_percent(),
        completed: state.completed,
    };
    tracing::info!(
        reps = summary.reps,
        rejected,
        elapsed = %summary.elapsed,
        completed = summary.completed,
        "replay finished"
    );
    Ok(ReplayOutput {
        summary,
        completion,
        frames: snapshots,
    })
}
