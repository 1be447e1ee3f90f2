//! Posture signals for one validated frame.
//!
//! Precondition for the plank check: side-on camera with the subject roughly
//! horizontal, so "below" in image y means closer to the floor. Other camera
//! placements are not modelled.

use serde::{Deserialize, Serialize};

use crate::config::FormBands;
use crate::geometry::{angle, distance, midpoint};
use crate::landmarks::PoseJoints;

/// Derived posture indicators. Recomputed every frame; carries no state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormSignals {
    pub is_body_straight: bool,
    pub is_hand_position_good: bool,
    pub is_in_plank_position: bool,
    /// Mean of the left and right elbow angles, degrees.
    pub elbow_angle_avg: f64,
    /// Shoulder–hip–knee angle at the hip midpoint, degrees.
    pub body_angle: f64,
    /// Wrist spacing over shoulder spacing; `None` when the shoulders coincide.
    pub hand_ratio: Option<f64>,
}

impl FormSignals {
    pub fn is_in_position(&self) -> bool {
        self.is_body_straight && self.is_in_plank_position
    }
}

/// A failing posture check, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormFeedback {
    KeepBodyStraight,
    AdjustHandPosition,
    GetIntoPlank,
}

impl FormFeedback {
    pub fn message(self) -> &'static str {
        match self {
            Self::KeepBodyStraight => "keep body straight",
            Self::AdjustHandPosition => "adjust hand position to shoulder width",
            Self::GetIntoPlank => "get into plank position",
        }
    }
}

/// Evaluate posture for one frame.
pub fn evaluate(j: &PoseJoints, bands: &FormBands) -> FormSignals {
    let left_elbow = angle(j.left_shoulder, j.left_elbow, j.left_wrist);
    let right_elbow = angle(j.right_shoulder, j.right_elbow, j.right_wrist);
    let elbow_angle_avg = (left_elbow + right_elbow) / 2.0;

    let shoulder_mid = midpoint(j.left_shoulder, j.right_shoulder);
    let hip_mid = midpoint(j.left_hip, j.right_hip);
    let knee_mid = midpoint(j.left_knee, j.right_knee);

    let body_angle = angle(shoulder_mid, hip_mid, knee_mid);
    let is_body_straight = bands.body_straight_deg.contains_open(body_angle);

    let shoulder_width = distance(j.left_shoulder, j.right_shoulder);
    let hand_ratio = if shoulder_width > 0.0 {
        Some(distance(j.left_wrist, j.right_wrist) / shoulder_width)
    } else {
        None
    };
    let is_hand_position_good = hand_ratio.is_some_and(|r| bands.hand_ratio.contains_open(r));

    let is_in_plank_position = j.left_wrist.y > j.left_shoulder.y
        && j.right_wrist.y > j.right_shoulder.y
        && j.head.y > shoulder_mid.y;

    FormSignals {
        is_body_straight,
        is_hand_position_good,
        is_in_plank_position,
        elbow_angle_avg,
        body_angle,
        hand_ratio,
    }
}

/// One entry per failing check, always in the same order.
pub fn feedback(signals: &FormSignals) -> Vec<FormFeedback> {
    let mut out = Vec::with_capacity(3);
    if !signals.is_body_straight {
        out.push(FormFeedback::KeepBodyStraight);
    }
    if !signals.is_hand_position_good {
        out.push(FormFeedback::AdjustHandPosition);
    }
    if !signals.is_in_plank_position {
        out.push(FormFeedback::GetIntoPlank);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{vector, Vector2};

    /// Side-view plank, arms straight, hands at shoulder width.
    fn plank() -> PoseJoints {
        PoseJoints {
            head: vector![0.20, 0.52],
            left_shoulder: vector![0.30, 0.50],
            right_shoulder: vector![0.30, 0.40],
            left_elbow: vector![0.30, 0.60],
            right_elbow: vector![0.30, 0.50],
            left_wrist: vector![0.30, 0.70],
            right_wrist: vector![0.30, 0.60],
            left_hip: vector![0.60, 0.50],
            right_hip: vector![0.60, 0.40],
            left_knee: vector![0.85, 0.50],
            right_knee: vector![0.85, 0.40],
        }
    }

    #[test]
    fn good_plank_passes_every_check() {
        let s = evaluate(&plank(), &FormBands::default());
        assert!(s.is_body_straight, "body angle {}", s.body_angle);
        assert!(s.is_hand_position_good, "ratio {:?}", s.hand_ratio);
        assert!(s.is_in_plank_position);
        assert!(s.is_in_position());
        assert!((s.elbow_angle_avg - 180.0).abs() < 1e-9);
        assert!(feedback(&s).is_empty());
    }

    #[test]
    fn sagging_hips_fail_straightness() {
        let mut j = plank();
        j.left_hip.y = 0.75;
        j.right_hip.y = 0.65;
        let s = evaluate(&j, &FormBands::default());
        assert!(!s.is_body_straight);
        assert_eq!(feedback(&s), vec![FormFeedback::KeepBodyStraight]);
    }

    #[test]
    fn wide_hands_fail_hand_check() {
        let mut j = plank();
        j.left_wrist = vector![0.30, 0.75];
        j.right_wrist = vector![0.30, 0.55];
        let s = evaluate(&j, &FormBands::default());
        assert!((s.hand_ratio.unwrap() - 2.0).abs() < 1e-9);
        assert!(!s.is_hand_position_good);
    }

    #[test]
    fn coincident_shoulders_fail_hand_check() {
        let mut j = plank();
        j.right_shoulder = j.left_shoulder;
        let s = evaluate(&j, &FormBands::default());
        assert_eq!(s.hand_ratio, None);
        assert!(!s.is_hand_position_good);
    }

    #[test]
    fn standing_subject_gets_all_feedback_in_order() {
        // Upright: wrists above shoulders (arms raised), head above shoulders, hips bent.
        let j = PoseJoints {
            head: vector![0.5, 0.1],
            left_shoulder: vector![0.45, 0.3],
            right_shoulder: vector![0.55, 0.3],
            left_elbow: vector![0.45, 0.2],
            right_elbow: vector![0.55, 0.2],
            left_wrist: vector![0.2, 0.1],
            right_wrist: vector![0.8, 0.1],
            left_hip: vector![0.45, 0.6],
            right_hip: vector![0.55, 0.6],
            left_knee: vector![0.7, 0.6],
            right_knee: vector![0.8, 0.6],
        };
        let s = evaluate(&j, &FormBands::default());
        assert_eq!(
            feedback(&s),
            vec![
                FormFeedback::KeepBodyStraight,
                FormFeedback::AdjustHandPosition,
                FormFeedback::GetIntoPlank,
            ]
        );
        assert_eq!(
            FormFeedback::AdjustHandPosition.message(),
            "adjust hand position to shoulder width"
        );
    }

    #[test]
    fn collapsed_pose_is_not_straight() {
        let p = Vector2::new(0.5, 0.5);
        let j = PoseJoints {
            head: p,
            left_shoulder: p,
            right_shoulder: p,
            left_elbow: p,
            right_elbow: p,
            left_wrist: p,
            right_wrist: p,
            left_hip: p,
            right_hip: p,
            left_knee: p,
            right_knee: p,
        };
        let s = evaluate(&j, &FormBands::default());
        assert_eq!(s.body_angle, 0.0);
        assert!(!s.is_body_straight);
        assert!(!s.is_in_plank_position);
        assert_eq!(s.elbow_angle_avg, 0.0);
    }
}
