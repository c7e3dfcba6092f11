//! Opponent policies.

use crate::battle::state::{Action, BattleSide};
use crate::combatant::Combatant;
use ordered_float::OrderedFloat;
use schema::{MoveCategory, ShapeType};

/// Score given to a healing move once the user drops below the heal threshold.
const HEAL_PRIORITY_SCORE: f64 = 10_000.0;
const HEAL_THRESHOLD: f64 = 0.4;

/// Anything that can pick an action from the observable state.
pub trait Behavior {
    /// Decide this round's action for `own` facing `opponent`.
    fn choose_action(&self, own: &Combatant, opponent: &Combatant) -> Action;

    /// Pick a replacement after the active combatant fainted. The default
    /// sends in the first living reserve.
    fn choose_replacement(&self, side: &BattleSide, _opponent: Option<&Combatant>) -> Option<Action> {
        side.switch_targets()
            .first()
            .map(|&roster_index| Action::Switch { roster_index })
    }
}

/// Greedy move picker: `power * effectiveness * STAB`, with healing preferred
/// at low HP. Ties go to the lower move index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    /// Score a single move slot; `None` if the slot is empty, out of PP or unknown.
    pub fn score_move(&self, own: &Combatant, opponent: &Combatant, move_index: usize) -> Option<f64> {
        let instance = own.move_at(move_index).filter(|m| m.pp > 0)?;
        let data = instance.data().ok()?;

        if data.heal_fraction.is_some() && own.hp_fraction() < HEAL_THRESHOLD {
            return Some(HEAL_PRIORITY_SCORE);
        }
        if data.category == MoveCategory::Status {
            return Some(0.0);
        }

        let effectiveness = ShapeType::type_effectiveness(data.move_type, opponent.shape_type);
        let stab = if data.move_type == own.shape_type { 1.5 } else { 1.0 };
        Some(data.power as f64 * effectiveness * stab)
    }
}

impl Behavior for ScoringAI {
    fn choose_action(&self, own: &Combatant, opponent: &Combatant) -> Action {
        let mut best: Option<(usize, OrderedFloat<f64>)> = None;
        for move_index in 0..own.moves.len() {
            let Some(score) = self.score_move(own, opponent, move_index) else {
                continue;
            };
            let score = OrderedFloat(score);
            // strictly greater keeps the first-seen index on ties
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((move_index, score));
            }
        }
        let move_index = best.map_or(0, |(index, _)| index);
        Action::Move { move_index }
    }

    /// Prefer the reserve whose best move hits the current opponent hardest.
    fn choose_replacement(&self, side: &BattleSide, opponent: Option<&Combatant>) -> Option<Action> {
        let targets = side.switch_targets();
        let Some(opponent) = opponent else {
            return targets.first().map(|&roster_index| Action::Switch { roster_index });
        };

        let mut best: Option<(usize, OrderedFloat<f64>)> = None;
        for roster_index in targets {
            let candidate = &side.roster[roster_index];
            let score = (0..candidate.moves.len())
                .filter_map(|i| self.score_move(candidate, opponent, i))
                .map(OrderedFloat)
                .max()
                .unwrap_or(OrderedFloat(0.0));
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((roster_index, score));
            }
        }
        best.map(|(roster_index, _)| Action::Switch { roster_index })
    }
}
