use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use repcount::config::SessionCfg;
use repcount::synth::{generate, PushupStreamCfg};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod frames;
mod provenance;
mod replay;

#[derive(Parser)]
#[command(name = "repcount")]
#[command(about = "Offline push-up counting over recorded or synthetic pose landmarks")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Replay a landmark stream through a session and write per-frame metrics
    Replay {
        /// Frames as long-format .csv/.parquet or .jsonl
        #[arg(long)]
        input: PathBuf,
        /// Overrides `target_reps` from --config
        #[arg(long)]
        target: Option<u32>,
        /// Frames per session-clock second
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Session config as JSON; missing fields take defaults
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate a seeded synthetic push-up set
    Synth {
        #[arg(long, default_value_t = 10)]
        reps: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 30)]
        frames_per_rep: u32,
        /// Uniform coordinate jitter amplitude
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        /// Probability of an occluded frame
        #[arg(long, default_value_t = 0.0)]
        dropout: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Replay {
            input,
            target,
            fps,
            config,
            out,
        } => run_replay(&input, target, fps, config.as_deref(), &out),
        Action::Synth {
            reps,
            seed,
            frames_per_rep,
            noise,
            dropout,
            out,
        } => {
            let cfg = PushupStreamCfg {
                reps,
                frames_per_rep,
                noise,
                dropout,
                ..PushupStreamCfg::default()
            };
            run_synth(cfg, seed, &out)
        }
        Action::Report => report(),
    }
}

fn load_session_cfg(config: Option<&Path>, target: Option<u32>) -> Result<SessionCfg> {
    let mut cfg = match config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SessionCfg::from_json_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SessionCfg::default(),
    };
    if let Some(t) = target {
        cfg.target_reps = t;
    }
    cfg.validate().context("invalid session config")?;
    Ok(cfg)
}

fn run_replay(
    input: &Path,
    target: Option<u32>,
    fps: u32,
    config: Option<&Path>,
    out: &Path,
) -> Result<()> {
    ensure!(fps > 0, "--fps must be positive");
    let cfg = load_session_cfg(config, target)?;
    tracing::info!(input = %input.display(), target = cfg.target_reps, fps, "replay");
    let frames = frames::load(input)?;
    let output = replay::replay(&frames, cfg, fps)?;

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(out, serde_json::to_vec_pretty(&output)?)
        .with_context(|| format!("writing {}", out.display()))?;

    let payload = provenance::Payload::new(json!({
        "command": "replay",
        "fps": fps,
        "session": cfg,
        "summary": output.summary,
    }))
    .with_input(input);
    provenance::write_sidecar(out, payload)?;
    println!("{}", serde_json::to_string_pretty(&output.summary)?);
    Ok(())
}

fn run_synth(cfg: PushupStreamCfg, seed: u64, out: &Path) -> Result<()> {
    tracing::info!(reps = cfg.reps, seed, out = %out.display(), "synth");
    let stream = generate(cfg, seed)?;
    frames::save(out, &stream.frames)?;
    let payload = provenance::Payload::new(json!({
        "command": "synth",
        "replay": stream.replay,
        "frames": stream.frames.len(),
    }));
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

fn report() -> Result<()> {
    let mut obj = provenance::header();
    obj["defaults"] = serde_json::to_value(SessionCfg::default())?;
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn synth_then_replay_end_to_end() {
        let dir = tempdir().unwrap();
        let frames_path = dir.path().join("set.csv");
        let cfg = PushupStreamCfg {
            reps: 3,
            noise: 0.001,
            ..PushupStreamCfg::default()
        };
        run_synth(cfg, 9, &frames_path).unwrap();
        assert!(dir.path().join("set.provenance.json").exists());

        let out = dir.path().join("out/metrics.json");
        run_replay(&frames_path, Some(3), 30, None, &out).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["summary"]["reps"], 3);
        assert_eq!(doc["completion"]["reps_completed"], 3);
        assert!(dir.path().join("out/metrics.provenance.json").exists());
    }

    #[test]
    fn config_file_and_target_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"target_reps": 4, "presentation_delay_secs": 0}"#).unwrap();
        let cfg = load_session_cfg(Some(&path), None).unwrap();
        assert_eq!(cfg.target_reps, 4);
        assert_eq!(cfg.presentation_delay_secs, 0);
        let cfg = load_session_cfg(Some(&path), Some(12)).unwrap();
        assert_eq!(cfg.target_reps, 12);
        assert!(load_session_cfg(None, Some(0)).is_err());
    }

    #[test]
    fn replay_rejects_zero_fps() {
        let dir = tempdir().unwrap();
        let err = run_replay(
            &dir.path().join("none.jsonl"),
            None,
            0,
            None,
            &dir.path().join("o.json"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("fps"));
    }
}
