use crate::config::RepThresholds;

use super::types::{EngineState, Phase, RepEvent};

impl EngineState {
    /// Advance by one angle sample.
    ///
    /// Precedence (first match wins):
    /// 1. below `down` and not yet down → enter down.
    /// 2. above `up` while a down excursion is open → count the rep, back to up.
    /// 3. inside `[down, up]` → transition, flags untouched.
    /// 4. otherwise hold: down if still below `down`, else up.
    ///
    /// A non-finite angle leaves the state unchanged.
    pub fn step(self, angle_deg: f64, th: &RepThresholds) -> (EngineState, RepEvent) {
        if !angle_deg.is_finite() {
            return (self, RepEvent::None);
        }
        let mut next = self;
        let is_down = angle_deg < th.down_deg;
        let is_up = angle_deg > th.up_deg;

        if is_down && !self.in_down_position {
            next.in_down_position = true;
            next.completed_down_this_cycle = true;
            next.phase = Phase::Down;
            return (next, RepEvent::EnteredDown);
        }
        if is_up && self.in_down_position && self.completed_down_this_cycle {
            next.count = self.count.saturating_add(1);
            next.in_down_position = false;
            next.completed_down_this_cycle = false;
            next.phase = Phase::Up;
            return (next, RepEvent::Counted { count: next.count });
        }
        next.phase = if !is_down && !is_up {
            Phase::Transition
        } else if is_down {
            Phase::Down
        } else {
            Phase::Up
        };
        (next, RepEvent::None)
    }

    /// Fold a whole sequence; handy for replay and tests.
    pub fn run<I>(self, angles: I, th: &RepThresholds) -> EngineState
    where
        I: IntoIterator<Item = f64>,
    {
        angles
            .into_iter()
            .fold(self, |state, a| state.step(a, th).0)
    }

    /// Back to the initial rest state regardless of history.
    pub fn reset(&mut self) {
        *self = EngineState::default();
    }
}
