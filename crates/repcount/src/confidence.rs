//! Per-frame confidence score. Unsmoothed: adjacent frames may differ by a full step.

use serde::{Deserialize, Serialize};

use crate::form::FormSignals;

pub const BODY_STRAIGHT_POINTS: u8 = 30;
pub const HAND_POSITION_POINTS: u8 = 30;
pub const PLANK_POINTS: u8 = 40;

/// Every value `confidence_score` can return.
pub const ATTAINABLE: [u8; 6] = [0, 30, 40, 60, 70, 100];

/// `30·straight + 30·hands + 40·plank`, in `[0, 100]`.
pub fn confidence_score(signals: &FormSignals) -> u8 {
    let mut score = 0;
    if signals.is_body_straight {
        score += BODY_STRAIGHT_POINTS;
    }
    if signals.is_hand_position_good {
        score += HAND_POSITION_POINTS;
    }
    if signals.is_in_plank_position {
        score += PLANK_POINTS;
    }
    score
}

/// Coarse label for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBand {
    Good,
    Fair,
    Poor,
}

impl ConfidenceBand {
    pub fn of(score: u8) -> Self {
        match score {
            80.. => Self::Good,
            60..=79 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(straight: bool, hands: bool, plank: bool) -> FormSignals {
        FormSignals {
            is_body_straight: straight,
            is_hand_position_good: hands,
            is_in_plank_position: plank,
            elbow_angle_avg: 180.0,
            body_angle: 180.0,
            hand_ratio: Some(1.0),
        }
    }

    #[test]
    fn every_combination_is_attainable() {
        let expected = [
            ((false, false, false), 0),
            ((true, false, false), 30),
            ((false, true, false), 30),
            ((false, false, true), 40),
            ((true, true, false), 60),
            ((true, false, true), 70),
            ((false, true, true), 70),
            ((true, true, true), 100),
        ];
        for ((s, h, p), want) in expected {
            let got = confidence_score(&signals(s, h, p));
            assert_eq!(got, want, "straight={s} hands={h} plank={p}");
            assert!(ATTAINABLE.contains(&got));
        }
    }

    #[test]
    fn bands() {
        assert_eq!(ConfidenceBand::of(100), ConfidenceBand::Good);
        assert_eq!(ConfidenceBand::of(80), ConfidenceBand::Good);
        assert_eq!(ConfidenceBand::of(70), ConfidenceBand::Fair);
        assert_eq!(ConfidenceBand::of(60), ConfidenceBand::Fair);
        assert_eq!(ConfidenceBand::of(40), ConfidenceBand::Poor);
        assert_eq!(ConfidenceBand::of(0), ConfidenceBand::Poor);
    }
}
