//! Property tests for the repetition state machine and frame pipeline.

use proptest::prelude::*;
use repcount::confidence::ATTAINABLE;
use repcount::config::{EngineCfg, RepThresholds};
use repcount::engine::Engine;
use repcount::geometry::angle;
use repcount::landmarks::{Landmark, LandmarkFrame};
use repcount::reps::{EngineState, Phase};
use repcount::Vec2;

/// Independent statement of the counting rule: arm below 90, fire above 140.
fn oracle_count(angles: &[f64]) -> u32 {
    let mut armed = false;
    let mut count = 0;
    for &a in angles {
        if a < 90.0 {
            armed = true;
        } else if a > 140.0 && armed {
            count += 1;
            armed = false;
        }
    }
    count
}

fn angle_seq() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=180.0, 0..300)
}

proptest! {
    #[test]
    fn count_matches_excursion_oracle(angles in angle_seq()) {
        let end = EngineState::default().run(angles.iter().copied(), &RepThresholds::default());
        prop_assert_eq!(end.count, oracle_count(&angles));
    }

    #[test]
    fn count_never_decreases(angles in angle_seq()) {
        let th = RepThresholds::default();
        let mut state = EngineState::default();
        for a in angles {
            let (next, _) = state.step(a, &th);
            prop_assert!(next.count >= state.count);
            prop_assert!(next.count <= state.count + 1);
            // Flags move together.
            prop_assert_eq!(next.in_down_position, next.completed_down_this_cycle);
            state = next;
        }
    }

    #[test]
    fn band_confined_tail_is_inert(
        prefix in angle_seq(),
        band in prop::collection::vec(90.0f64..=140.0, 1..200),
    ) {
        let th = RepThresholds::default();
        let before = EngineState::default().run(prefix, &th);
        let mut state = before;
        for a in band {
            state = state.step(a, &th).0;
            prop_assert_eq!(state.phase, Phase::Transition);
            prop_assert_eq!(state.count, before.count);
            prop_assert_eq!(state.in_down_position, before.in_down_position);
        }
    }

    #[test]
    fn reset_always_returns_to_rest(angles in angle_seq()) {
        let mut state = EngineState::default().run(angles, &RepThresholds::default());
        state.reset();
        prop_assert_eq!(state, EngineState::default());
    }

    #[test]
    fn angle_is_bounded_for_any_input(
        ax in any::<f64>(), ay in any::<f64>(),
        bx in any::<f64>(), by in any::<f64>(),
        cx in any::<f64>(), cy in any::<f64>(),
    ) {
        let deg = angle(Vec2::new(ax, ay), Vec2::new(bx, by), Vec2::new(cx, cy));
        prop_assert!((0.0..=180.0).contains(&deg), "got {}", deg);
    }

    #[test]
    fn arbitrary_frames_never_panic_and_score_is_attainable(
        pts in prop::collection::vec((any::<f64>(), any::<f64>(), prop::option::of(0.0f64..=1.0)), 0..40),
    ) {
        let frame = LandmarkFrame::new(
            pts.into_iter()
                .map(|(x, y, v)| Landmark { x, y, visibility: v })
                .collect(),
        );
        let mut engine = Engine::new(EngineCfg::default());
        engine.process(&frame);
        let snap = engine.snapshot();
        prop_assert!(ATTAINABLE.contains(&snap.confidence));
        prop_assert!(snap.count <= 1);
        prop_assert!(snap.form_feedback.len() <= 3);
    }
}
