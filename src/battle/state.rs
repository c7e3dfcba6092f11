use crate::combatant::{Combatant, StatusCondition};
use crate::errors::{ActionError, ActionResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::{ItemKey, StatusType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::{debug, warn};

/// One of the two absolute battle positions. The session host always plays `A`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "side A"),
            Side::B => write!(f, "side B"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Action {
    // Position in the active combatant's move list.
    Move { move_index: usize },
    // Position in the side's roster.
    Switch { roster_index: usize },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Copy)]
pub enum GameState {
    WaitingForActions,
    TurnInProgress,
    WaitingForSideAReplacement,
    WaitingForSideBReplacement,
    WaitingForBothReplacements,
    SideAWin,
    SideBWin,
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(self, GameState::SideAWin | GameState::SideBWin | GameState::Draw)
    }

    pub fn is_replacement_phase(&self) -> bool {
        matches!(
            self,
            GameState::WaitingForSideAReplacement
                | GameState::WaitingForSideBReplacement
                | GameState::WaitingForBothReplacements
        )
    }

    /// Whether `side` has to send in a replacement before play continues.
    pub fn awaits_replacement_from(&self, side: Side) -> bool {
        match self {
            GameState::WaitingForBothReplacements => true,
            GameState::WaitingForSideAReplacement => side == Side::A,
            GameState::WaitingForSideBReplacement => side == Side::B,
            _ => false,
        }
    }
}

/// What a round (or replacement phase) left the battle needing next.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    /// These sides have a fainted active combatant and a living reserve.
    ForcedSwitch(Vec<Side>),
    /// The winner, or `None` for a draw.
    GameOver(Option<Side>),
}

impl From<&RoundOutcome> for GameState {
    fn from(outcome: &RoundOutcome) -> Self {
        match outcome {
            RoundOutcome::Continue => GameState::WaitingForActions,
            RoundOutcome::ForcedSwitch(sides) => {
                match (sides.contains(&Side::A), sides.contains(&Side::B)) {
                    (true, true) => GameState::WaitingForBothReplacements,
                    (true, false) => GameState::WaitingForSideAReplacement,
                    (false, true) => GameState::WaitingForSideBReplacement,
                    (false, false) => GameState::WaitingForActions,
                }
            }
            RoundOutcome::GameOver(Some(Side::A)) => GameState::SideAWin,
            RoundOutcome::GameOver(Some(Side::B)) => GameState::SideBWin,
            RoundOutcome::GameOver(None) => GameState::Draw,
        }
    }
}

/// One observable sub-step of resolution.
///
/// `Damage`, `Heal`, `StatusApplied`, `StatusCured`, `StatusDamage`, `Faint` and
/// `SwitchAnimation` change state and must be applied in order by any mirror.
/// `Log`, `AttackAnimation` and `ItemConsumed` are for display only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind")]
pub enum BattleEvent {
    Log { message: String },
    AttackAnimation { attacker: Side },
    Damage { target: Side, amount: u16 },
    Heal { target: Side, amount: u16 },
    StatusApplied { target: Side, status: StatusType },
    StatusCured { target: Side },
    StatusDamage { target: Side, amount: u16, status: StatusType },
    Faint { target: Side },
    SwitchAnimation { side: Side, new_active_index: usize },
    ItemConsumed { target: Side, item: ItemKey },
}

impl BattleEvent {
    pub fn log(message: impl Into<String>) -> Self {
        BattleEvent::Log {
            message: message.into(),
        }
    }

    /// True for the kinds a mirror has to apply.
    pub fn mutates_state(&self) -> bool {
        !matches!(
            self,
            BattleEvent::Log { .. } | BattleEvent::AttackAnimation { .. } | BattleEvent::ItemConsumed { .. }
        )
    }
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEvent::Log { message } => write!(f, "{}", message),
            BattleEvent::AttackAnimation { attacker } => write!(f, "[attack] {}", attacker),
            BattleEvent::Damage { target, amount } => write!(f, "[damage] {} -{}", target, amount),
            BattleEvent::Heal { target, amount } => write!(f, "[heal] {} +{}", target, amount),
            BattleEvent::StatusApplied { target, status } => {
                write!(f, "[status] {} afflicted with {}", target, status)
            }
            BattleEvent::StatusCured { target } => write!(f, "[status] {} cured", target),
            BattleEvent::StatusDamage { target, amount, status } => {
                write!(f, "[{}] {} -{}", status, target, amount)
            }
            BattleEvent::Faint { target } => write!(f, "[faint] {}", target),
            BattleEvent::SwitchAnimation { side, new_active_index } => {
                write!(f, "[switch] {} -> slot {}", side, new_active_index)
            }
            BattleEvent::ItemConsumed { target, item } => write!(f, "[item] {} used {}", target, item),
        }
    }
}

/// Ordered log of everything a resolution produced.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.push(BattleEvent::log(message));
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Just the human-readable log lines, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                BattleEvent::Log { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print the log lines only, as a player would read them.
    pub fn print_formatted(&self) {
        for message in self.messages() {
            println!("  {}", message);
        }
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {}", event)?;
        }
        Ok(())
    }
}

/// Source of every random draw the resolver makes.
///
/// Scripted outcomes are consumed first (clamped into each draw's range); once
/// they run out the seeded generator takes over, and a purely scripted rng
/// falls back to a fixed neutral value.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
    source: Option<StdRng>,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            outcomes,
            index: 0,
            source: None,
        }
    }

    pub fn new_random() -> Self {
        Self {
            outcomes: Vec::new(),
            index: 0,
            source: Some(StdRng::from_os_rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            outcomes: Vec::new(),
            index: 0,
            source: Some(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&mut self, reason: &str, low: u8, high: u8, neutral: u8) -> u8 {
        let value = if let Some(&scripted) = self.outcomes.get(self.index) {
            self.index += 1;
            scripted.clamp(low, high)
        } else if let Some(source) = self.source.as_mut() {
            source.random_range(low..=high)
        } else {
            warn!(reason, neutral, "TurnRng exhausted, using neutral outcome");
            neutral
        };
        debug!(reason, value, "rng");
        value
    }

    /// A percentage roll in `1..=100`.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        self.draw(reason, 1, 100, 100)
    }

    /// True with probability `chance`%. Certain and impossible chances draw nothing.
    pub fn chance(&mut self, chance: u8, reason: &str) -> bool {
        if chance == 0 {
            false
        } else if chance >= 100 {
            true
        } else {
            self.next_outcome(reason) <= chance
        }
    }

    /// The damage random factor as a percentage in `85..=100`.
    pub fn damage_roll(&mut self) -> u8 {
        self.draw("Damage Roll", 85, 100, 100)
    }

    /// Fair coin used to break exact speed ties. `true` means side A moves first.
    pub fn coin_flip(&mut self) -> bool {
        self.draw("Speed Tie", 1, 100, 1) <= 50
    }

    /// How long a freshly applied dormancy lasts.
    pub fn dormant_turns(&mut self) -> u8 {
        self.draw("Dormant Duration", 2, 4, 2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSide {
    pub player_id: String,
    pub player_name: String,
    pub roster: Vec<Combatant>,
    pub active_index: usize,
}

impl BattleSide {
    pub fn new(player_id: impl Into<String>, player_name: impl Into<String>, roster: Vec<Combatant>) -> Self {
        let active_index = roster.iter().position(|c| !c.is_fainted()).unwrap_or(0);
        Self {
            player_id: player_id.into(),
            player_name: player_name.into(),
            roster,
            active_index,
        }
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.roster.get(self.active_index)
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        self.roster.get_mut(self.active_index)
    }

    /// All members are at 0 HP (an empty roster counts as defeated).
    pub fn all_fainted(&self) -> bool {
        self.roster.iter().all(|c| c.is_fainted())
    }

    pub fn active_fainted(&self) -> bool {
        self.active().map_or(true, |c| c.is_fainted())
    }

    /// Roster slots that can legally be switched in.
    pub fn switch_targets(&self) -> Vec<usize> {
        self.roster
            .iter()
            .enumerate()
            .filter(|(i, c)| *i != self.active_index && !c.is_fainted())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn validate_switch(&self, roster_index: usize) -> ActionResult<()> {
        let target = self
            .roster
            .get(roster_index)
            .ok_or(ActionError::InvalidRosterIndex(roster_index))?;
        if roster_index == self.active_index {
            return Err(ActionError::SwitchTargetActive(roster_index));
        }
        if target.is_fainted() {
            return Err(ActionError::SwitchTargetFainted(roster_index));
        }
        Ok(())
    }

    /// Check an action against this side's current state.
    ///
    /// A move with no PP is only accepted when every move is exhausted and no
    /// switch is possible, so a side is never left without a legal action.
    pub fn validate_action(&self, action: &Action) -> ActionResult<()> {
        match *action {
            Action::Switch { roster_index } => self.validate_switch(roster_index),
            Action::Move { move_index } => {
                let active = self
                    .active()
                    .filter(|c| !c.is_fainted())
                    .ok_or_else(|| ActionError::NotAccepted("active combatant has fainted".to_string()))?;
                let instance = active
                    .move_at(move_index)
                    .ok_or(ActionError::InvalidMoveIndex(move_index))?;
                if instance.pp == 0 && (!active.usable_move_indices().is_empty() || !self.switch_targets().is_empty()) {
                    return Err(ActionError::NoPpRemaining(move_index));
                }
                Ok(())
            }
        }
    }

    /// Every action `validate_action` would accept.
    pub fn valid_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(active) = self.active().filter(|c| !c.is_fainted()) {
            for move_index in active.usable_move_indices() {
                actions.push(Action::Move { move_index });
            }
        }
        for roster_index in self.switch_targets() {
            actions.push(Action::Switch { roster_index });
        }
        if actions.is_empty() && !self.active_fainted() {
            actions.push(Action::Move { move_index: 0 });
        }
        actions
    }

    /// Legal actions while this side is forced to replace a fainted active.
    pub fn valid_replacements(&self) -> Vec<Action> {
        self.switch_targets()
            .into_iter()
            .map(|roster_index| Action::Switch { roster_index })
            .collect()
    }
}

/// The subset of state every event mirror can reproduce exactly.
#[derive(Serialize)]
struct MirrorView {
    active: [usize; 2],
    hp: Vec<Vec<u16>>,
    status: Vec<Vec<Option<StatusType>>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub battle_id: String,
    pub sides: [BattleSide; 2],
    pub turn_number: u32,
    pub game_state: GameState,
    pub action_queue: [Option<Action>; 2],
}

impl BattleState {
    pub fn new(id: impl Into<String>, side_a: BattleSide, side_b: BattleSide) -> Self {
        Self {
            battle_id: id.into(),
            sides: [side_a, side_b],
            turn_number: 1,
            game_state: GameState::WaitingForActions,
            action_queue: [None, None],
        }
    }

    pub fn side(&self, side: Side) -> &BattleSide {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BattleSide {
        &mut self.sides[side.index()]
    }

    pub fn active(&self, side: Side) -> Option<&Combatant> {
        self.side(side).active()
    }

    pub fn active_mut(&mut self, side: Side) -> Option<&mut Combatant> {
        self.side_mut(side).active_mut()
    }

    /// Validate and store a side's action for the coming resolution.
    /// A later submission for the same side replaces the earlier one.
    pub fn queue_action(&mut self, side: Side, action: Action) -> ActionResult<()> {
        if self.game_state.is_over() {
            return Err(ActionError::NotAccepted("the battle is over".to_string()));
        }
        if self.game_state.is_replacement_phase() {
            if !self.game_state.awaits_replacement_from(side) {
                return Err(ActionError::NotAccepted(format!("{} has no replacement to make", side)));
            }
            if !matches!(action, Action::Switch { .. }) {
                return Err(ActionError::NotAccepted("a replacement must be a switch".to_string()));
            }
        }
        self.side(side).validate_action(&action)?;
        self.action_queue[side.index()] = Some(action);
        Ok(())
    }

    /// Whether every side that owes an action has queued one.
    pub fn ready_for_turn_resolution(&self) -> bool {
        if self.game_state.is_over() {
            return false;
        }
        Side::BOTH.iter().all(|&side| {
            let owes = if self.game_state.is_replacement_phase() {
                self.game_state.awaits_replacement_from(side)
            } else {
                true
            };
            !owes || self.action_queue[side.index()].is_some()
        })
    }

    /// Classify the battle after a round: game over beats forced switches.
    pub fn assess(&self) -> RoundOutcome {
        let a_out = self.side(Side::A).all_fainted();
        let b_out = self.side(Side::B).all_fainted();
        match (a_out, b_out) {
            (true, true) => return RoundOutcome::GameOver(None),
            (true, false) => return RoundOutcome::GameOver(Some(Side::B)),
            (false, true) => return RoundOutcome::GameOver(Some(Side::A)),
            (false, false) => {}
        }
        let needs: Vec<Side> = Side::BOTH
            .into_iter()
            .filter(|&side| self.side(side).active_fainted())
            .collect();
        if needs.is_empty() {
            RoundOutcome::Continue
        } else {
            RoundOutcome::ForcedSwitch(needs)
        }
    }

    /// Apply one event to this state the way a mirror would.
    ///
    /// Display-only kinds are ignored. Out-of-range switch targets are skipped
    /// with a warning rather than trusted.
    pub fn apply_event(&mut self, event: &BattleEvent) {
        match *event {
            BattleEvent::Damage { target, amount } | BattleEvent::StatusDamage { target, amount, .. } => {
                if let Some(c) = self.active_mut(target) {
                    c.take_damage(amount);
                }
            }
            BattleEvent::Heal { target, amount } => {
                if let Some(c) = self.active_mut(target) {
                    c.heal(amount);
                }
            }
            BattleEvent::StatusApplied { target, status } => {
                if let Some(c) = self.active_mut(target) {
                    c.status = Some(StatusCondition::from_kind(status, 1));
                }
            }
            BattleEvent::StatusCured { target } => {
                if let Some(c) = self.active_mut(target) {
                    c.status = None;
                }
            }
            BattleEvent::Faint { target } => {
                if let Some(c) = self.active_mut(target) {
                    c.set_hp(0);
                }
            }
            BattleEvent::SwitchAnimation { side, new_active_index } => {
                let battle_side = self.side_mut(side);
                if new_active_index < battle_side.roster.len() {
                    battle_side.active_index = new_active_index;
                } else {
                    warn!(%side, new_active_index, "ignoring switch to a slot outside the roster");
                }
            }
            BattleEvent::Log { .. } | BattleEvent::AttackAnimation { .. } | BattleEvent::ItemConsumed { .. } => {}
        }
    }

    pub fn apply_events(&mut self, events: &[BattleEvent]) {
        for event in events {
            self.apply_event(event);
        }
    }

    /// Fingerprint of the event-visible state (active slots, HP, status kinds).
    ///
    /// Host and guest compute the same value after applying the same events.
    pub fn digest(&self) -> u64 {
        let view = MirrorView {
            active: [self.sides[0].active_index, self.sides[1].active_index],
            hp: self
                .sides
                .iter()
                .map(|s| s.roster.iter().map(|c| c.stats.hp).collect())
                .collect(),
            status: self
                .sides
                .iter()
                .map(|s| s.roster.iter().map(|c| c.status_kind()).collect())
                .collect(),
        };
        let bytes = postcard::to_allocvec(&view).unwrap_or_default();
        let hash = Sha256::digest(&bytes);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash[..8]);
        u64::from_be_bytes(prefix)
    }
}
