//! Landmark frames and the fixed joint layout (MediaPipe Pose, 33 points).
//!
//! A frame is either complete for every `JointRole` or rejected whole; the form
//! evaluator never sees partial input.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineCfg;

/// Number of landmarks produced per frame by the pose model.
pub const POSE_LANDMARK_COUNT: usize = 33;

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;

/// A single keypoint in normalized image space (origin top-left, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            visibility: Some(visibility),
        }
    }
}

/// One tick of pose output. Indices follow the constants in this module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub landmarks: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

impl From<Vec<Landmark>> for LandmarkFrame {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }
}

/// Joints the form evaluator reads from every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointRole {
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

impl JointRole {
    pub const ALL: [JointRole; 11] = [
        JointRole::Head,
        JointRole::LeftShoulder,
        JointRole::RightShoulder,
        JointRole::LeftElbow,
        JointRole::RightElbow,
        JointRole::LeftWrist,
        JointRole::RightWrist,
        JointRole::LeftHip,
        JointRole::RightHip,
        JointRole::LeftKnee,
        JointRole::RightKnee,
    ];

    /// Landmark index in the 33-point layout. The head reference point is the nose.
    pub fn index(self) -> usize {
        match self {
            Self::Head => NOSE,
            Self::LeftShoulder => LEFT_SHOULDER,
            Self::RightShoulder => RIGHT_SHOULDER,
            Self::LeftElbow => LEFT_ELBOW,
            Self::RightElbow => RIGHT_ELBOW,
            Self::LeftWrist => LEFT_WRIST,
            Self::RightWrist => RIGHT_WRIST,
            Self::LeftHip => LEFT_HIP,
            Self::RightHip => RIGHT_HIP,
            Self::LeftKnee => LEFT_KNEE,
            Self::RightKnee => RIGHT_KNEE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
        }
    }
}

/// Why a frame was skipped. Expected and recurring (occlusion), never fatal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameRejection {
    TooFewLandmarks { got: usize },
    NonFiniteJoint { joint: JointRole },
    LowVisibility { joint: JointRole, visibility: f64 },
}

impl fmt::Display for FrameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewLandmarks { got } => {
                write!(f, "frame has {got} landmarks, need {POSE_LANDMARK_COUNT}")
            }
            Self::NonFiniteJoint { joint } => {
                write!(f, "{} has non-finite coordinates", joint.name())
            }
            Self::LowVisibility { joint, visibility } => {
                write!(f, "{} visibility {visibility:.2} too low", joint.name())
            }
        }
    }
}

/// The validated joint positions of one frame, clamped to `[0, 1]²`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseJoints {
    pub head: Vector2<f64>,
    pub left_shoulder: Vector2<f64>,
    pub right_shoulder: Vector2<f64>,
    pub left_elbow: Vector2<f64>,
    pub right_elbow: Vector2<f64>,
    pub left_wrist: Vector2<f64>,
    pub right_wrist: Vector2<f64>,
    pub left_hip: Vector2<f64>,
    pub right_hip: Vector2<f64>,
    pub left_knee: Vector2<f64>,
    pub right_knee: Vector2<f64>,
}

impl PoseJoints {
    /// Extract every required joint or reject the whole frame.
    pub fn from_frame(frame: &LandmarkFrame, cfg: &EngineCfg) -> Result<Self, FrameRejection> {
        if frame.len() < POSE_LANDMARK_COUNT {
            return Err(FrameRejection::TooFewLandmarks { got: frame.len() });
        }
        let pick = |joint: JointRole| -> Result<Vector2<f64>, FrameRejection> {
            let lm = frame.landmarks[joint.index()];
            if !(lm.x.is_finite() && lm.y.is_finite()) {
                return Err(FrameRejection::NonFiniteJoint { joint });
            }
            if let Some(v) = lm.visibility {
                if v.is_nan() || v < cfg.min_visibility {
                    return Err(FrameRejection::LowVisibility {
                        joint,
                        visibility: v,
                    });
                }
            }
            Ok(Vector2::new(lm.x.clamp(0.0, 1.0), lm.y.clamp(0.0, 1.0)))
        };
        Ok(Self {
            head: pick(JointRole::Head)?,
            left_shoulder: pick(JointRole::LeftShoulder)?,
            right_shoulder: pick(JointRole::RightShoulder)?,
            left_elbow: pick(JointRole::LeftElbow)?,
            right_elbow: pick(JointRole::RightElbow)?,
            left_wrist: pick(JointRole::LeftWrist)?,
            right_wrist: pick(JointRole::RightWrist)?,
            left_hip: pick(JointRole::LeftHip)?,
            right_hip: pick(JointRole::RightHip)?,
            left_knee: pick(JointRole::LeftKnee)?,
            right_knee: pick(JointRole::RightKnee)?,
        })
    }

    pub fn get(&self, joint: JointRole) -> Vector2<f64> {
        match joint {
            JointRole::Head => self.head,
            JointRole::LeftShoulder => self.left_shoulder,
            JointRole::RightShoulder => self.right_shoulder,
            JointRole::LeftElbow => self.left_elbow,
            JointRole::RightElbow => self.right_elbow,
            JointRole::LeftWrist => self.left_wrist,
            JointRole::RightWrist => self.right_wrist,
            JointRole::LeftHip => self.left_hip,
            JointRole::RightHip => self.right_hip,
            JointRole::LeftKnee => self.left_knee,
            JointRole::RightKnee => self.right_knee,
        }
    }
}
