//! Thread-safe session owner.
//!
//! Frames (from the pose thread) and the 1 Hz ticker (a background thread) both
//! lock the same mutex for their whole pass, so a tick can never land in the
//! middle of a frame and `reset`/`stop` commit before the next frame starts.
//!
//! The ticker schedules against fixed `Instant` deadlines, so lock waits and
//! late wakeups do not accumulate into a slow clock. It waits on a stop channel,
//! so stopping never blocks for the rest of a period.

use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::{ConfigError, SessionCfg};
use crate::landmarks::LandmarkFrame;
use crate::metrics::MetricsSnapshot;
use crate::session::{CompletionEvent, FrameReport, Session, SessionState};

#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
    events: Sender<CompletionEvent>,
}

impl SharedSession {
    /// Validates `cfg`; returns the handle plus the receiving end for completion events.
    pub fn new(cfg: SessionCfg) -> Result<(Self, Receiver<CompletionEvent>), ConfigError> {
        let session = Session::new(cfg)?;
        let (tx, rx) = mpsc::channel();
        Ok((
            Self {
                inner: Arc::new(Mutex::new(session)),
                events: tx,
            },
            rx,
        ))
    }

    fn emit(&self, event: Option<CompletionEvent>) {
        if let Some(ev) = event {
            // The host may have dropped the receiver; nothing to do then.
            if self.events.send(ev).is_err() {
                debug!("completion receiver gone");
            }
        }
    }

    pub fn start(&self) {
        self.inner.lock().start();
    }

    pub fn stop(&self) {
        let flushed = self.inner.lock().stop();
        self.emit(flushed);
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn tick(&self) {
        let ev = self.inner.lock().tick();
        self.emit(ev);
    }

    pub fn process_frame(&self, frame: &LandmarkFrame) -> FrameReport {
        let report = self.inner.lock().process_frame(frame);
        self.emit(report.completion);
        report
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().snapshot().clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    /// Run `tick` every `period` on a background thread until the ticker is stopped.
    pub fn spawn_ticker(&self, period: Duration) -> Ticker {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let session = self.clone();
        let handle = thread::spawn(move || {
            let mut schedule = TickSchedule::new(Instant::now(), period);
            loop {
                match stop_rx.recv_timeout(schedule.wait(Instant::now())) {
                    Err(RecvTimeoutError::Timeout) => {
                        schedule.advance();
                        session.tick();
                    }
                    // Explicit stop or the `Ticker` was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Ticker {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }
}

/// Fixed-rate deadlines: the n-th tick is due at `start + n * period`.
#[derive(Clone, Copy, Debug)]
struct TickSchedule {
    next: Instant,
    period: Duration,
}

impl TickSchedule {
    fn new(start: Instant, period: Duration) -> Self {
        Self {
            next: start + period,
            period,
        }
    }

    /// Time left until the next deadline; zero when it has already passed.
    fn wait(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    fn advance(&mut self) {
        self.next += self.period;
    }
}

/// Background 1 Hz driver. Stops and joins on `stop` or drop.
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            // A send error only means the thread already exited.
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                debug!("ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{pose_frame, PoseParams};

    fn cfg(target: u32, delay: u32) -> SessionCfg {
        SessionCfg {
            target_reps: target,
            presentation_delay_secs: delay,
            ..SessionCfg::default()
        }
    }

    #[test]
    fn events_arrive_on_channel_once() {
        let (s, rx) = SharedSession::new(cfg(1, 0)).unwrap();
        s.start();
        for a in [170.0, 80.0, 170.0, 80.0, 170.0] {
            s.process_frame(&pose_frame(&PoseParams::plank(a)));
        }
        let ev = rx.try_recv().expect("one completion");
        assert_eq!(ev.reps_completed, 1);
        assert!(rx.try_recv().is_err());
        assert_eq!(s.snapshot().count, 2);
    }

    #[test]
    fn ticker_and_frames_interleave_safely() {
        let (s, rx) = SharedSession::new(cfg(3, 1)).unwrap();
        s.start();
        let mut ticker = s.spawn_ticker(Duration::from_millis(2));

        let worker = {
            let s = s.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    for a in [170.0, 120.0, 80.0, 120.0, 170.0] {
                        s.process_frame(&pose_frame(&PoseParams::plank(a)));
                    }
                }
            })
        };
        worker.join().unwrap();

        let ev = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("delivered by ticker");
        assert_eq!(ev.reps_completed, 3);
        ticker.stop();
        assert!(rx.try_recv().is_err());
        assert!(s.state().completed);
        assert_eq!(s.state().final_duration, Some(ev.duration_seconds));
    }

    #[test]
    fn stop_flushes_to_channel() {
        let (s, rx) = SharedSession::new(cfg(1, 10)).unwrap();
        s.start();
        for a in [170.0, 80.0, 170.0] {
            s.process_frame(&pose_frame(&PoseParams::plank(a)));
        }
        assert!(rx.try_recv().is_err());
        s.stop();
        assert_eq!(rx.try_recv().unwrap().reps_completed, 1);
        assert_eq!(s.snapshot().count, 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = cfg(1, 0);
        bad.engine.reps.down_deg = 150.0;
        bad.engine.reps.up_deg = 100.0;
        assert!(SharedSession::new(bad).is_err());
        assert!(matches!(
            SharedSession::new(cfg(0, 0)),
            Err(ConfigError::ZeroTarget)
        ));
    }

    #[test]
    fn ticker_stops_without_waiting_out_the_period() {
        let (s, _rx) = SharedSession::new(cfg(5, 0)).unwrap();
        s.start();
        let mut ticker = s.spawn_ticker(Duration::from_secs(2));
        thread::sleep(Duration::from_millis(50));
        let t0 = Instant::now();
        ticker.stop();
        assert!(t0.elapsed() < Duration::from_millis(500), "{:?}", t0.elapsed());
        assert_eq!(s.state().elapsed_seconds, 0);

        let dropped = s.spawn_ticker(Duration::from_secs(2));
        let t0 = Instant::now();
        drop(dropped);
        assert!(t0.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn schedule_keeps_fixed_deadlines() {
        let period = Duration::from_millis(1000);
        let t0 = Instant::now();
        let mut sched = TickSchedule::new(t0, period);
        assert_eq!(sched.wait(t0), period);

        // A wakeup 300 ms late shortens the following wait instead of shifting it.
        sched.advance();
        assert_eq!(sched.wait(t0 + Duration::from_millis(1300)), Duration::from_millis(700));

        // Falling more than a period behind makes the next tick due at once.
        assert_eq!(sched.wait(t0 + Duration::from_millis(2500)), Duration::ZERO);
        sched.advance();
        assert_eq!(sched.wait(t0 + Duration::from_millis(2500)), Duration::from_millis(500));
    }
}
