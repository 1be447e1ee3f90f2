//! Tunable thresholds for one exercise type.
//!
//! Defaults are the push-up constants. Everything here is plain data with serde
//! support so a host can retune the engine from a JSON file without touching the
//! state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hysteresis band of the repetition state machine, in degrees of elbow angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepThresholds {
    /// Strictly below this the subject is "down".
    pub down_deg: f64,
    /// Strictly above this the subject is "up".
    pub up_deg: f64,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            down_deg: 90.0,
            up_deg: 140.0,
        }
    }
}

/// Open interval `(lo, hi)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn contains_open(&self, v: f64) -> bool {
        v > self.lo && v < self.hi
    }
}

/// Posture bands used by the form evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormBands {
    /// Shoulder–hip–knee angle considered a straight body.
    pub body_straight_deg: Band,
    /// Wrist distance over shoulder distance considered shoulder-width hands.
    pub hand_ratio: Band,
}

impl Default for FormBands {
    fn default() -> Self {
        Self {
            body_straight_deg: Band::new(160.0, 200.0),
            hand_ratio: Band::new(0.8, 1.5),
        }
    }
}

/// Per-frame analysis configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineCfg {
    pub reps: RepThresholds,
    pub form: FormBands,
    /// Required joints with a visibility score below this reject the frame.
    pub min_visibility: f64,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            reps: RepThresholds::default(),
            form: FormBands::default(),
            min_visibility: 0.5,
        }
    }
}

/// Session-level configuration: target and completion presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    pub target_reps: u32,
    /// Ticks (seconds) between reaching the target and delivering the completion event.
    pub presentation_delay_secs: u32,
    pub engine: EngineCfg,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            target_reps: 10,
            presentation_delay_secs: 2,
            engine: EngineCfg::default(),
        }
    }
}

/// Configuration rejected by `validate`.
#[derive(Debug)]
pub enum ConfigError {
    NonFinite { field: &'static str },
    InvertedThresholds { down_deg: f64, up_deg: f64 },
    EmptyBand { field: &'static str, lo: f64, hi: f64 },
    VisibilityOutOfRange { value: f64 },
    ZeroTarget,
    Parse { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::InvertedThresholds { down_deg, up_deg } => write!(
                f,
                "down threshold ({down_deg}°) must be below up threshold ({up_deg}°)"
            ),
            Self::EmptyBand { field, lo, hi } => {
                write!(f, "{field} band ({lo}, {hi}) is empty")
            }
            Self::VisibilityOutOfRange { value } => {
                write!(f, "min_visibility {value} outside [0, 1]")
            }
            Self::ZeroTarget => write!(f, "target_reps must be at least 1"),
            Self::Parse { reason } => write!(f, "invalid config JSON: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_band(field: &'static str, band: &Band) -> Result<(), ConfigError> {
    if !(band.lo.is_finite() && band.hi.is_finite()) {
        return Err(ConfigError::NonFinite { field });
    }
    if band.lo >= band.hi {
        return Err(ConfigError::EmptyBand {
            field,
            lo: band.lo,
            hi: band.hi,
        });
    }
    Ok(())
}

impl RepThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.down_deg.is_finite() && self.up_deg.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "rep thresholds",
            });
        }
        if self.down_deg >= self.up_deg {
            return Err(ConfigError::InvertedThresholds {
                down_deg: self.down_deg,
                up_deg: self.up_deg,
            });
        }
        Ok(())
    }
}

impl EngineCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.reps.validate()?;
        check_band("body_straight_deg", &self.form.body_straight_deg)?;
        check_band("hand_ratio", &self.form.hand_ratio)?;
        if !self.min_visibility.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "min_visibility",
            });
        }
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(ConfigError::VisibilityOutOfRange {
                value: self.min_visibility,
            });
        }
        Ok(())
    }
}

impl SessionCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_reps == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        self.engine.validate()
    }

    /// Parse and validate; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: SessionCfg = serde_json::from_str(s).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}
