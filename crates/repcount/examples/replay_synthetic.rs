//! Print the metrics of a synthetic push-up set, one line per counted rep.
//!
//! Usage:
//!   cargo run -p repcount --example replay_synthetic -- [reps] [seed]
//!
//! Frames are fed at a nominal 30 fps; every 30th frame ticks the session clock.

use repcount::config::SessionCfg;
use repcount::metrics::format_duration;
use repcount::session::Session;
use repcount::synth::{generate, PushupStreamCfg};

const FPS: usize = 30;

fn main() {
    let mut args = std::env::args().skip(1);
    let reps: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2025);

    let cfg = PushupStreamCfg {
        reps,
        noise: 0.002,
        dropout: 0.05,
        ..PushupStreamCfg::default()
    };
    let stream = match generate(cfg, seed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("replay_synthetic: {e}");
            return;
        }
    };

    let mut session = match Session::new(SessionCfg {
        target_reps: reps.max(1),
        ..SessionCfg::default()
    }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("replay_synthetic: {e}");
            return;
        }
    };
    session.start();
    for (i, frame) in stream.frames.iter().enumerate() {
        if i > 0 && i % FPS == 0 {
            if let Some(ev) = session.tick() {
                println!("done: {} reps in {}", ev.reps_completed, format_duration(ev.duration_seconds));
            }
        }
        let report = session.process_frame(frame);
        if report.outcome.is_some_and(|o| o.counted()) {
            let s = session.snapshot();
            println!(
                "rep {:>2} at {}  confidence {:>3} ({:?})  feedback {:?}",
                s.count,
                format_duration(session.state().elapsed_seconds),
                s.confidence,
                s.confidence_band(),
                s.form_feedback
            );
        }
        if let Some(ev) = report.completion {
            println!("done: {} reps in {}", ev.reps_completed, format_duration(ev.duration_seconds));
        }
    }
    // Trailing ticks deliver a completion still waiting out its delay.
    while session.has_pending_completion() {
        if let Some(ev) = session.tick() {
            println!("done: {} reps in {}", ev.reps_completed, format_duration(ev.duration_seconds));
        }
    }
}
