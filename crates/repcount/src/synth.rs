//! Synthetic push-up landmark streams.
//!
//! Purpose
//! - Reproducible input for tests, benches, and the CLI `synth` command without
//!   a camera or pose model.
//! - Every stream carries the seed and params that regenerate it bit-for-bit.
//!
//! Model
//! - Side view, subject facing left, hands on the floor below the shoulders.
//!   The elbow angle is exact by construction (isosceles arm, law of cosines);
//!   the shoulder height follows from it and the body pivots about the toes.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::landmarks::{
    Landmark, LandmarkFrame, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE,
    POSE_LANDMARK_COUNT, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

const FLOOR_Y: f64 = 0.8;
const SHOULDER_X: f64 = 0.3;
const TOE_X: f64 = 0.9;
const ARM_SEGMENT: f64 = 0.12;
/// Apparent left/right separation in a near-side view.
const SIDE_OFFSET: f64 = 0.06;
const VISIBILITY: f64 = 0.99;

/// Pose knobs for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseParams {
    /// Interior elbow angle, degrees in `(0, 180]`.
    pub elbow_deg: f64,
    /// Extra downward hip displacement (positive sags, negative pikes).
    pub hip_sag: f64,
    /// Upward head displacement relative to a neutral neck.
    pub head_lift: f64,
    /// Wrist spacing as a multiple of shoulder spacing.
    pub hand_ratio: f64,
}

impl PoseParams {
    /// Clean plank with the given elbow angle.
    pub fn plank(elbow_deg: f64) -> Self {
        Self {
            elbow_deg,
            hip_sag: 0.0,
            head_lift: 0.0,
            hand_ratio: 1.0,
        }
    }
}

fn put(out: &mut [Landmark], idx: usize, p: Vector2<f64>) {
    out[idx] = Landmark::with_visibility(p.x, p.y, VISIBILITY);
}

/// Build one complete 33-point frame.
pub fn pose_frame(p: &PoseParams) -> LandmarkFrame {
    let theta = p.elbow_deg.clamp(1.0, 180.0).to_radians();
    let reach = 2.0 * ARM_SEGMENT * (theta / 2.0).sin();
    // Angle of the upper arm away from the downward vertical, toward the feet.
    let alpha = std::f64::consts::FRAC_PI_2 - theta / 2.0;

    let shoulder_mid = Vector2::new(SHOULDER_X, FLOOR_Y - reach);
    let toe = Vector2::new(TOE_X, FLOOR_Y);
    let hip_mid = shoulder_mid + (toe - shoulder_mid) * 0.55 + Vector2::new(0.0, p.hip_sag);
    let knee_mid = shoulder_mid + (toe - shoulder_mid) * 0.8;
    let head = shoulder_mid + Vector2::new(-0.08, 0.02 - p.head_lift);

    let mut lms = vec![Landmark::with_visibility(head.x, head.y, VISIBILITY); POSE_LANDMARK_COUNT];
    put(&mut lms, NOSE, head);

    let half = SIDE_OFFSET / 2.0;
    let hand_half = half * p.hand_ratio;
    for (sign, s_idx, e_idx, w_idx, h_idx, k_idx) in [
        (1.0, LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_HIP, LEFT_KNEE),
        (-1.0, RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_HIP, RIGHT_KNEE),
    ] {
        let off = Vector2::new(0.0, sign * half);
        let shoulder = shoulder_mid + off;
        let elbow = shoulder + Vector2::new(alpha.sin(), alpha.cos()) * ARM_SEGMENT;
        // Hand spacing moves forearm and elbow sideways; the angle is exact only at ratio 1.
        let hand_shift = Vector2::new(0.0, sign * (hand_half - half));
        put(&mut lms, s_idx, shoulder);
        put(&mut lms, e_idx, elbow + hand_shift);
        put(&mut lms, w_idx, shoulder + Vector2::new(0.0, reach) + hand_shift);
        put(&mut lms, h_idx, hip_mid + off);
        put(&mut lms, k_idx, knee_mid + off);
    }
    LandmarkFrame::new(lms)
}

/// Parameters of a generated push-up set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PushupStreamCfg {
    pub reps: u32,
    /// Frames for one top → bottom → top sweep.
    pub frames_per_rep: u32,
    /// Frames held at the top before the first and after the last rep.
    pub hold_frames: u32,
    pub top_deg: f64,
    pub bottom_deg: f64,
    /// Uniform coordinate jitter amplitude.
    pub noise: f64,
    /// Probability that a frame arrives occluded (10 landmarks only).
    pub dropout: f64,
}

impl Default for PushupStreamCfg {
    fn default() -> Self {
        Self {
            reps: 10,
            frames_per_rep: 30,
            hold_frames: 15,
            top_deg: 170.0,
            bottom_deg: 70.0,
            noise: 0.0,
            dropout: 0.0,
        }
    }
}

#[derive(Debug)]
pub enum SynthError {
    InvalidParams { reason: String },
}

impl SynthError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SynthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams { reason } => write!(f, "invalid synth params: {reason}"),
        }
    }
}

impl std::error::Error for SynthError {}

impl PushupStreamCfg {
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.frames_per_rep < 4 {
            return Err(SynthError::invalid("frames_per_rep must be >= 4"));
        }
        if !(self.top_deg.is_finite() && self.bottom_deg.is_finite()) {
            return Err(SynthError::invalid("angles must be finite"));
        }
        if !(0.0 < self.bottom_deg && self.bottom_deg < self.top_deg && self.top_deg <= 180.0) {
            return Err(SynthError::invalid("need 0 < bottom_deg < top_deg <= 180"));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(SynthError::invalid("noise must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return Err(SynthError::invalid("dropout must be in [0, 1]"));
        }
        Ok(())
    }

    /// Noise-free elbow angle for every frame, occlusions ignored.
    pub fn angle_profile(&self) -> Vec<f64> {
        let n = self.frames_per_rep as usize;
        let mid = (self.top_deg + self.bottom_deg) / 2.0;
        let amp = (self.top_deg - self.bottom_deg) / 2.0;
        let mut out = Vec::with_capacity(self.reps as usize * n + 2 * self.hold_frames as usize);
        out.extend(std::iter::repeat(self.top_deg).take(self.hold_frames as usize));
        for _ in 0..self.reps {
            for i in 0..n {
                let t = i as f64 / n as f64;
                out.push(mid + amp * (std::f64::consts::TAU * t).cos());
            }
        }
        out.extend(std::iter::repeat(self.top_deg).take(self.hold_frames.max(1) as usize));
        out
    }
}

/// Seed plus params; enough to regenerate a stream exactly.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedReplay {
    pub seed: u64,
    pub cfg: PushupStreamCfg,
}

#[derive(Clone, Debug)]
pub struct SyntheticStream {
    pub frames: Vec<LandmarkFrame>,
    pub replay: SeedReplay,
}

/// Generate a push-up set.
pub fn generate(cfg: PushupStreamCfg, seed: u64) -> Result<SyntheticStream, SynthError> {
    cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(seed);
    let frames = cfg
        .angle_profile()
        .into_iter()
        .map(|deg| {
            let mut frame = pose_frame(&PoseParams::plank(deg));
            if cfg.noise > 0.0 {
                for lm in &mut frame.landmarks {
                    lm.x += rng.gen_range(-cfg.noise..=cfg.noise);
                    lm.y += rng.gen_range(-cfg.noise..=cfg.noise);
                }
            }
            if cfg.dropout > 0.0 && rng.gen_bool(cfg.dropout) {
                frame.landmarks.truncate(10);
            }
            frame
        })
        .collect();
    Ok(SyntheticStream {
        frames,
        replay: SeedReplay { seed, cfg },
    })
}

/// Rebuild the frames of an earlier `generate` call.
pub fn regenerate(replay: &SeedReplay) -> Result<Vec<LandmarkFrame>, SynthError> {
    generate(replay.cfg, replay.seed).map(|s| s.frames)
}
