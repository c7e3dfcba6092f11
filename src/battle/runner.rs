use crate::battle::ai::Behavior;
use crate::battle::engine::resolve_turn;
use crate::battle::state::{Action, BattleEvent, BattleState, GameState, Side, TurnRng};
use crate::errors::{ActionError, BattleResult};
use tracing::{debug, info, warn};

/// Result of executing a round (plus any replacement the opponent made after it).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub events: Vec<BattleEvent>,
    pub new_game_state: GameState,
    pub battle_ended: bool,
    pub winner: Option<Side>,
}

/// Single-player battle: the local player is side A, an opponent policy drives
/// side B. Opponent replacements are made automatically.
#[derive(Debug)]
pub struct LocalBattle<B: Behavior> {
    battle_state: BattleState,
    opponent: B,
    rng: TurnRng,
    accumulated_events: Vec<BattleEvent>,
}

impl<B: Behavior> LocalBattle<B> {
    pub fn new(battle_state: BattleState, opponent: B, rng: TurnRng) -> Self {
        info!(battle_id = %battle_state.battle_id, "local battle created");
        Self {
            battle_state,
            opponent,
            rng,
            accumulated_events: Vec::new(),
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.battle_state
    }

    /// Every event produced so far, in order.
    pub fn history(&self) -> &[BattleEvent] {
        &self.accumulated_events
    }

    pub fn is_finished(&self) -> bool {
        self.battle_state.game_state.is_over()
    }

    pub fn winner(&self) -> Option<Side> {
        match self.battle_state.game_state {
            GameState::SideAWin => Some(Side::A),
            GameState::SideBWin => Some(Side::B),
            _ => None,
        }
    }

    /// What the local player may submit right now.
    pub fn valid_actions(&self) -> Vec<Action> {
        let game_state = self.battle_state.game_state;
        let side = self.battle_state.side(Side::A);
        if game_state.is_over() {
            Vec::new()
        } else if game_state.is_replacement_phase() {
            if game_state.awaits_replacement_from(Side::A) {
                side.valid_replacements()
            } else {
                Vec::new()
            }
        } else {
            side.valid_actions()
        }
    }

    /// Submit the player's action, let the opponent answer, and resolve.
    pub fn submit_action(&mut self, action: Action) -> BattleResult<ExecutionResult> {
        let game_state = self.battle_state.game_state;
        if game_state.is_over() {
            return Err(ActionError::NotAccepted("the battle is over".to_string()).into());
        }
        if game_state.is_replacement_phase() && !game_state.awaits_replacement_from(Side::A) {
            return Err(ActionError::NotAccepted("waiting on the opponent's replacement".to_string()).into());
        }

        self.battle_state.queue_action(Side::A, action)?;
        self.queue_opponent_action()?;

        let mut events = resolve_turn(&mut self.battle_state, &mut self.rng).into_events();
        events.extend(self.settle_opponent_replacement()?);
        debug!(count = events.len(), game_state = ?self.battle_state.game_state, "round executed");

        self.accumulated_events.extend(events.iter().cloned());
        let battle_ended = self.is_finished();
        if battle_ended {
            info!(winner = ?self.winner(), "local battle finished");
        }
        Ok(ExecutionResult {
            events,
            new_game_state: self.battle_state.game_state,
            battle_ended,
            winner: self.winner(),
        })
    }

    fn queue_opponent_action(&mut self) -> BattleResult<()> {
        let game_state = self.battle_state.game_state;
        let action = if game_state.is_replacement_phase() {
            if !game_state.awaits_replacement_from(Side::B) {
                return Ok(());
            }
            self.opponent
                .choose_replacement(self.battle_state.side(Side::B), self.battle_state.active(Side::A))
        } else {
            match (self.battle_state.active(Side::B), self.battle_state.active(Side::A)) {
                (Some(own), Some(foe)) => Some(self.opponent.choose_action(own, foe)),
                _ => None,
            }
        };
        let side = self.battle_state.side(Side::B);
        let legal = if game_state.is_replacement_phase() {
            side.valid_replacements()
        } else {
            side.valid_actions()
        };
        let action = match action {
            Some(action) if legal.contains(&action) => Some(action),
            wanted => {
                let fallback = legal.first().copied();
                if wanted.is_some() {
                    warn!(?wanted, ?fallback, "opponent policy picked an illegal action");
                }
                fallback
            }
        };
        if let Some(action) = action {
            self.battle_state.queue_action(Side::B, action)?;
        }
        Ok(())
    }

    /// If only the opponent owes a replacement, make it now so the player is
    /// never asked to wait on it.
    fn settle_opponent_replacement(&mut self) -> BattleResult<Vec<BattleEvent>> {
        if self.battle_state.game_state != GameState::WaitingForSideBReplacement {
            return Ok(Vec::new());
        }
        self.queue_opponent_action()?;
        Ok(resolve_turn(&mut self.battle_state, &mut self.rng).into_events())
    }
}
