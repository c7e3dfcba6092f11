//! Round synchronization between a host and a guest.
//!
//! The host (whoever created the room) is always side A and is the only party
//! that runs the resolver. It buffers one action per side, resolves exactly
//! once when both are present, and ships the event list to the guest. The
//! guest replays that list onto its mirror and never resolves anything.
//!
//! The coordinator does no I/O. Every call returns a [`SessionStep`] holding
//! the messages to put on the wire and the notices to surface upward.

use crate::battle::engine::resolve_turn;
use crate::battle::state::{Action, BattleEvent, BattleSide, BattleState, GameState, Side, TurnRng};
use crate::combatant::Combatant;
use crate::errors::{SessionError, SessionResult};
use crate::session::protocol::WireMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Host,
    Guest,
}

impl SessionRole {
    /// The battle position this role plays.
    pub fn side(self) -> Side {
        match self {
            SessionRole::Host => Side::A,
            SessionRole::Guest => Side::B,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Rosters not yet exchanged.
    Lobby,
    AwaitingActions,
    /// One of the two actions for this round is in.
    AwaitingOpponent,
    Resolving,
    Distributing,
    /// At least one side must replace a fainted active combatant.
    ForcedSwitch,
    GameOver,
    /// The channel is gone. Terminal.
    Disconnected,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Lobby => "lobby",
            SessionPhase::AwaitingActions => "awaiting actions",
            SessionPhase::AwaitingOpponent => "awaiting opponent",
            SessionPhase::Resolving => "resolving",
            SessionPhase::Distributing => "distributing",
            SessionPhase::ForcedSwitch => "forced switch",
            SessionPhase::GameOver => "game over",
            SessionPhase::Disconnected => "disconnected",
        };
        write!(f, "{}", name)
    }
}

impl From<GameState> for SessionPhase {
    fn from(game_state: GameState) -> Self {
        match game_state {
            GameState::WaitingForActions => SessionPhase::AwaitingActions,
            GameState::TurnInProgress => SessionPhase::Resolving,
            GameState::WaitingForSideAReplacement
            | GameState::WaitingForSideBReplacement
            | GameState::WaitingForBothReplacements => SessionPhase::ForcedSwitch,
            GameState::SideAWin | GameState::SideBWin | GameState::Draw => SessionPhase::GameOver,
        }
    }
}

/// Something the layer above should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    BattleStarted,
    OpponentRosterUpdated,
    /// The host has buffered the guest's action for this round.
    OpponentActed,
    RoundResolved {
        events: Vec<BattleEvent>,
        game_state: GameState,
    },
    Restarted,
    Disconnected,
}

/// Output of one coordinator call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStep {
    pub outbound: Vec<WireMessage>,
    pub notices: Vec<SessionNotice>,
}

impl SessionStep {
    /// Whether this step finished a round (or a restart replaced it).
    pub fn closes_round(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, SessionNotice::RoundResolved { .. } | SessionNotice::Restarted))
    }
}

#[derive(Debug)]
pub struct SessionCoordinator {
    role: SessionRole,
    room_id: String,
    phase: SessionPhase,
    local_roster: Vec<Combatant>,
    remote_roster: Option<Vec<Combatant>>,
    handshake_sent: bool,
    battle: Option<BattleState>,
    // host only
    rng: Option<TurnRng>,
}

fn enter(phase: &mut SessionPhase, next: SessionPhase) {
    if *phase != next {
        info!(from = %phase, to = %next, "session phase");
        *phase = next;
    }
}

impl SessionCoordinator {
    /// The room creator. Resolves every round with `rng`.
    pub fn host(room_id: impl Into<String>, roster: Vec<Combatant>, rng: TurnRng) -> Self {
        Self::with_role(SessionRole::Host, room_id.into(), roster, Some(rng))
    }

    pub fn guest(room_id: impl Into<String>, roster: Vec<Combatant>) -> Self {
        Self::with_role(SessionRole::Guest, room_id.into(), roster, None)
    }

    fn with_role(role: SessionRole, room_id: String, roster: Vec<Combatant>, rng: Option<TurnRng>) -> Self {
        Self {
            role,
            room_id,
            phase: SessionPhase::Lobby,
            local_roster: roster,
            remote_roster: None,
            handshake_sent: false,
            battle: None,
            rng,
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn local_side(&self) -> Side {
        self.role.side()
    }

    /// The authoritative state on the host, the mirror on the guest.
    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    /// Actions the local side may submit right now.
    pub fn valid_actions(&self) -> Vec<Action> {
        let Some(battle) = self.battle.as_ref() else {
            return Vec::new();
        };
        let side = self.local_side();
        match self.phase {
            SessionPhase::AwaitingActions | SessionPhase::AwaitingOpponent => battle.side(side).valid_actions(),
            SessionPhase::ForcedSwitch if battle.game_state.awaits_replacement_from(side) => {
                battle.side(side).valid_replacements()
            }
            _ => Vec::new(),
        }
    }

    /// Whether the local side owes an action this round and has not given one.
    pub fn awaiting_local_action(&self) -> bool {
        let Some(battle) = self.battle.as_ref() else {
            return false;
        };
        let side = self.local_side();
        let owes = match self.phase {
            SessionPhase::AwaitingActions | SessionPhase::AwaitingOpponent => true,
            SessionPhase::ForcedSwitch => battle.game_state.awaits_replacement_from(side),
            _ => false,
        };
        owes && battle.action_queue[side.index()].is_none()
    }

    /// The channel is up: announce our roster.
    pub fn open(&mut self) -> SessionResult<SessionStep> {
        self.ensure_connected()?;
        let mut step = SessionStep::default();
        self.send_handshake(&mut step);
        self.maybe_start(&mut step);
        Ok(step)
    }

    /// Submit the local side's action for the current round. A second
    /// submission before the round resolves replaces the first.
    pub fn submit_action(&mut self, action: Action) -> SessionResult<SessionStep> {
        self.ensure_connected()?;
        match self.phase {
            SessionPhase::Lobby => return Err(SessionError::HandshakeIncomplete),
            SessionPhase::AwaitingActions | SessionPhase::AwaitingOpponent | SessionPhase::ForcedSwitch => {}
            other => return Err(SessionError::NotAcceptingActions(other.to_string())),
        }
        let side = self.local_side();
        let battle = self.battle.as_mut().ok_or(SessionError::HandshakeIncomplete)?;
        if self.phase == SessionPhase::ForcedSwitch && !battle.game_state.awaits_replacement_from(side) {
            return Err(SessionError::NotAcceptingActions(self.phase.to_string()));
        }
        battle.queue_action(side, action)?;
        debug!(role = ?self.role, ?action, "local action buffered");

        let mut step = SessionStep::default();
        match self.role {
            SessionRole::Host => self.try_resolve(&mut step),
            SessionRole::Guest => {
                step.outbound.push(WireMessage::Action { action });
                if self.phase == SessionPhase::AwaitingActions {
                    enter(&mut self.phase, SessionPhase::AwaitingOpponent);
                }
            }
        }
        Ok(step)
    }

    /// React to one message from the peer.
    pub fn handle_message(&mut self, message: WireMessage) -> SessionResult<SessionStep> {
        self.ensure_connected()?;
        let mut step = SessionStep::default();
        match message {
            WireMessage::Handshake { roster } => self.receive_handshake(roster, &mut step)?,
            WireMessage::Action { action } => self.receive_action(action, &mut step)?,
            WireMessage::TurnResult { events, digest } => self.receive_turn_result(events, digest, &mut step)?,
            WireMessage::Restart => {
                self.reset()?;
                step.notices.push(SessionNotice::Restarted);
            }
        }
        Ok(step)
    }

    /// Start over from the handshake rosters and tell the peer to do the same.
    pub fn restart(&mut self) -> SessionResult<SessionStep> {
        self.ensure_connected()?;
        self.reset()?;
        Ok(SessionStep {
            outbound: vec![WireMessage::Restart],
            notices: vec![SessionNotice::Restarted],
        })
    }

    /// The channel was torn down. Nothing further is resolved.
    pub fn handle_disconnect(&mut self) -> SessionStep {
        let mut step = SessionStep::default();
        if self.phase != SessionPhase::Disconnected {
            warn!(room = %self.room_id, phase = %self.phase, "peer disconnected");
            enter(&mut self.phase, SessionPhase::Disconnected);
            step.notices.push(SessionNotice::Disconnected);
        }
        step
    }

    fn ensure_connected(&self) -> SessionResult<()> {
        if self.phase == SessionPhase::Disconnected {
            Err(SessionError::Disconnected)
        } else {
            Ok(())
        }
    }

    fn send_handshake(&mut self, step: &mut SessionStep) {
        step.outbound.push(WireMessage::Handshake {
            roster: self.local_roster.clone(),
        });
        self.handshake_sent = true;
    }

    fn receive_handshake(&mut self, roster: Vec<Combatant>, step: &mut SessionStep) -> SessionResult<()> {
        if roster.is_empty() || roster.iter().all(Combatant::is_fainted) {
            return Err(SessionError::UnexpectedMessage("handshake without a usable roster".to_string()));
        }
        debug!(members = roster.len(), "opponent roster received");
        self.remote_roster = Some(roster);
        step.notices.push(SessionNotice::OpponentRosterUpdated);
        if !self.handshake_sent {
            self.send_handshake(step);
        }
        self.maybe_start(step);
        Ok(())
    }

    /// Leave the lobby once both rosters have crossed the wire.
    fn maybe_start(&mut self, step: &mut SessionStep) {
        if self.phase != SessionPhase::Lobby || !self.handshake_sent {
            return;
        }
        if let Some(battle) = self.fresh_battle() {
            info!(room = %self.room_id, role = ?self.role, "battle started");
            self.battle = Some(battle);
            enter(&mut self.phase, SessionPhase::AwaitingActions);
            step.notices.push(SessionNotice::BattleStarted);
        }
    }

    fn fresh_battle(&self) -> Option<BattleState> {
        let remote = self.remote_roster.clone()?;
        let local = self.local_roster.clone();
        let (host_roster, guest_roster) = match self.role {
            SessionRole::Host => (local, remote),
            SessionRole::Guest => (remote, local),
        };
        Some(BattleState::new(
            self.room_id.clone(),
            BattleSide::new("host", "Host", host_roster),
            BattleSide::new("guest", "Guest", guest_roster),
        ))
    }

    fn reset(&mut self) -> SessionResult<()> {
        if self.phase == SessionPhase::Lobby {
            return Err(SessionError::HandshakeIncomplete);
        }
        self.battle = self.fresh_battle();
        enter(&mut self.phase, SessionPhase::AwaitingActions);
        info!(room = %self.room_id, "session restarted");
        Ok(())
    }

    fn receive_action(&mut self, action: Action, step: &mut SessionStep) -> SessionResult<()> {
        if self.role == SessionRole::Guest {
            return Err(SessionError::UnexpectedMessage("the host does not send actions".to_string()));
        }
        match self.phase {
            SessionPhase::Lobby => return Err(SessionError::HandshakeIncomplete),
            SessionPhase::AwaitingActions | SessionPhase::AwaitingOpponent | SessionPhase::ForcedSwitch => {}
            other => return Err(SessionError::NotAcceptingActions(other.to_string())),
        }
        let remote = self.local_side().opponent();
        let battle = self.battle.as_mut().ok_or(SessionError::HandshakeIncomplete)?;
        if battle.game_state.is_replacement_phase() && !battle.game_state.awaits_replacement_from(remote) {
            warn!(?action, "opponent acted during a replacement it does not owe; ignoring");
            return Ok(());
        }
        if let Err(error) = battle.queue_action(remote, action) {
            // Still counts as the opponent's move; the resolver turns it into a no-op.
            warn!(%error, ?action, "opponent sent an illegal action");
            battle.action_queue[remote.index()] = Some(action);
        }
        step.notices.push(SessionNotice::OpponentActed);
        self.try_resolve(step);
        Ok(())
    }

    /// Host: resolve if every owed action is in, then publish the result.
    fn try_resolve(&mut self, step: &mut SessionStep) {
        let (Some(battle), Some(rng)) = (self.battle.as_mut(), self.rng.as_mut()) else {
            return;
        };
        if !battle.ready_for_turn_resolution() {
            if self.phase == SessionPhase::AwaitingActions {
                enter(&mut self.phase, SessionPhase::AwaitingOpponent);
            }
            return;
        }

        enter(&mut self.phase, SessionPhase::Resolving);
        let events = resolve_turn(battle, rng).into_events();
        enter(&mut self.phase, SessionPhase::Distributing);
        step.outbound.push(WireMessage::TurnResult {
            events: events.clone(),
            digest: Some(battle.digest()),
        });
        step.notices.push(SessionNotice::RoundResolved {
            events,
            game_state: battle.game_state,
        });
        enter(&mut self.phase, SessionPhase::from(battle.game_state));
    }

    fn receive_turn_result(&mut self, events: Vec<BattleEvent>, digest: Option<u64>, step: &mut SessionStep) -> SessionResult<()> {
        if self.role == SessionRole::Host {
            return Err(SessionError::UnexpectedMessage("the guest does not resolve rounds".to_string()));
        }
        let side = self.local_side();
        let battle = self.battle.as_mut().ok_or(SessionError::HandshakeIncomplete)?;

        enter(&mut self.phase, SessionPhase::Distributing);
        let replacement_round = battle.game_state.is_replacement_phase();
        let submitted = std::mem::take(&mut battle.action_queue)[side.index()];
        // PP is not carried by events; spend it when our own attack shows up.
        if let Some(Action::Move { move_index }) = submitted {
            if events.contains(&BattleEvent::AttackAnimation { attacker: side }) {
                if let Some(instance) = battle.active_mut(side).and_then(|c| c.moves.get_mut(move_index)) {
                    instance.use_move();
                }
            }
        }

        battle.apply_events(&events);
        if !replacement_round {
            battle.turn_number += 1;
        }
        battle.game_state = GameState::from(&battle.assess());
        enter(&mut self.phase, SessionPhase::from(battle.game_state));

        if let Some(expected) = digest {
            let actual = battle.digest();
            if actual != expected {
                warn!(turn = battle.turn_number, expected, actual, "mirror diverged from host");
                return Err(SessionError::Desynchronized {
                    turn: battle.turn_number,
                    expected,
                    actual,
                });
            }
        }
        step.notices.push(SessionNotice::RoundResolved {
            events,
            game_state: battle.game_state,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::create_combatant;
    use pretty_assertions::assert_eq;
    use schema::SpeciesKey;

    fn roster(prefix: &str, species: &[SpeciesKey]) -> Vec<Combatant> {
        species
            .iter()
            .map(|&s| create_combatant(s, 50, prefix, None, None).unwrap())
            .collect()
    }

    fn pair(seed: u64) -> (SessionCoordinator, SessionCoordinator) {
        let host = SessionCoordinator::host(
            "ROOM",
            roster("host", &[SpeciesKey::Triangle, SpeciesKey::Square]),
            TurnRng::from_seed(seed),
        );
        let guest = SessionCoordinator::guest("ROOM", roster("guest", &[SpeciesKey::Circle, SpeciesKey::Kite]));
        (host, guest)
    }

    /// Deliver every outbound message to `to`, returning what it sends back.
    fn deliver(step: SessionStep, to: &mut SessionCoordinator) -> Vec<SessionStep> {
        step.outbound
            .into_iter()
            .map(|message| to.handle_message(message).unwrap())
            .collect()
    }

    fn connected(seed: u64) -> (SessionCoordinator, SessionCoordinator) {
        let (mut host, mut guest) = pair(seed);
        let hello = host.open().unwrap();
        for reply in deliver(hello, &mut guest) {
            deliver(reply, &mut host);
        }
        (host, guest)
    }

    #[test]
    fn test_handshake_leaves_lobby_on_both_sides() {
        let (mut host, mut guest) = pair(1);
        assert_eq!(host.phase(), SessionPhase::Lobby);
        assert_eq!(
            host.submit_action(Action::Move { move_index: 0 }),
            Err(SessionError::HandshakeIncomplete)
        );

        let hello = host.open().unwrap();
        assert_eq!(hello.outbound.len(), 1);
        assert_eq!(host.phase(), SessionPhase::Lobby);

        let replies = deliver(hello, &mut guest);
        assert_eq!(guest.phase(), SessionPhase::AwaitingActions);
        assert!(replies[0].notices.contains(&SessionNotice::BattleStarted));
        assert_eq!(replies[0].outbound.len(), 1);

        for reply in replies {
            deliver(reply, &mut host);
        }
        assert_eq!(host.phase(), SessionPhase::AwaitingActions);
        assert_eq!(host.battle().unwrap().digest(), guest.battle().unwrap().digest());
        assert_eq!(host.battle().unwrap().side(Side::A).roster[0].species, SpeciesKey::Triangle);
        assert_eq!(guest.battle().unwrap().side(Side::B).roster[0].species, SpeciesKey::Circle);
    }

    #[test]
    fn test_repeated_handshake_only_replaces_the_stored_roster() {
        let (mut host, _guest) = connected(1);
        let before = host.battle().unwrap().digest();
        let step = host
            .handle_message(WireMessage::Handshake {
                roster: roster("guest", &[SpeciesKey::Star]),
            })
            .unwrap();
        assert!(step.outbound.is_empty());
        assert_eq!(step.notices, vec![SessionNotice::OpponentRosterUpdated]);
        assert_eq!(host.phase(), SessionPhase::AwaitingActions);
        assert_eq!(host.battle().unwrap().digest(), before);
        assert_eq!(host.battle().unwrap().side(Side::B).roster[0].species, SpeciesKey::Circle);
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        let (mut host, _) = pair(1);
        assert!(matches!(
            host.handle_message(WireMessage::Handshake { roster: Vec::new() }),
            Err(SessionError::UnexpectedMessage(_))
        ));
        assert_eq!(host.phase(), SessionPhase::Lobby);
    }

    #[test]
    fn test_host_resolves_once_both_actions_are_in() {
        let (mut host, mut guest) = connected(5);

        let host_step = host.submit_action(Action::Move { move_index: 0 }).unwrap();
        assert!(host_step.outbound.is_empty());
        assert_eq!(host.phase(), SessionPhase::AwaitingOpponent);

        let guest_step = guest.submit_action(Action::Move { move_index: 0 }).unwrap();
        assert_eq!(guest.phase(), SessionPhase::AwaitingOpponent);
        assert_eq!(
            guest_step.outbound,
            vec![WireMessage::Action {
                action: Action::Move { move_index: 0 }
            }]
        );

        let results = deliver(guest_step, &mut host);
        assert_eq!(results.len(), 1);
        assert!(results[0].closes_round());
        assert!(matches!(
            results[0].outbound.as_slice(),
            [WireMessage::TurnResult { digest: Some(_), .. }]
        ));
        assert_eq!(host.battle().unwrap().turn_number, 2);
        assert_eq!(host.battle().unwrap().action_queue, [None, None]);

        let applied = deliver(results.into_iter().next().unwrap(), &mut guest);
        assert!(applied[0].closes_round());
        assert_eq!(guest.battle().unwrap().turn_number, 2);
        assert_eq!(guest.battle().unwrap().digest(), host.battle().unwrap().digest());
        assert_eq!(guest.phase(), host.phase());
    }

    #[test]
    fn test_last_submission_wins() {
        let (mut host, _guest) = connected(5);
        host.handle_message(WireMessage::Action {
            action: Action::Move { move_index: 0 },
        })
        .unwrap();
        // the host has not chosen yet, so nothing resolves
        assert_eq!(host.phase(), SessionPhase::AwaitingOpponent);
        host.handle_message(WireMessage::Action {
            action: Action::Move { move_index: 2 },
        })
        .unwrap();
        assert_eq!(
            host.battle().unwrap().action_queue[1],
            Some(Action::Move { move_index: 2 })
        );
    }

    #[test]
    fn test_guest_spends_its_own_pp() {
        let (mut host, mut guest) = connected(9);
        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let guest_step = guest.submit_action(Action::Move { move_index: 1 }).unwrap();
        let result = deliver(guest_step, &mut host).into_iter().next().unwrap();
        deliver(result, &mut guest);

        let host_view = &host.battle().unwrap().side(Side::B).roster[0].moves[1];
        let guest_view = &guest.battle().unwrap().side(Side::B).roster[0].moves[1];
        assert_eq!(guest_view.pp, host_view.pp);
    }

    #[test]
    fn test_tampered_digest_is_detected() {
        let (mut host, mut guest) = connected(3);
        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let guest_step = guest.submit_action(Action::Move { move_index: 0 }).unwrap();
        let mut result = deliver(guest_step, &mut host).into_iter().next().unwrap();
        if let Some(WireMessage::TurnResult { digest, .. }) = result.outbound.first_mut() {
            *digest = digest.map(|d| d ^ 1);
        }
        let message = result.outbound.remove(0);
        assert!(matches!(
            guest.handle_message(message),
            Err(SessionError::Desynchronized { turn: 2, .. })
        ));
    }

    #[test]
    fn test_roles_reject_foreign_messages() {
        let (mut host, mut guest) = connected(3);
        assert!(matches!(
            host.handle_message(WireMessage::TurnResult {
                events: Vec::new(),
                digest: None
            }),
            Err(SessionError::UnexpectedMessage(_))
        ));
        assert!(matches!(
            guest.handle_message(WireMessage::Action {
                action: Action::Move { move_index: 0 }
            }),
            Err(SessionError::UnexpectedMessage(_))
        ));
    }

    #[test]
    fn test_illegal_remote_action_is_a_no_op() {
        let (mut host, _guest) = connected(3);
        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let step = host
            .handle_message(WireMessage::Action {
                action: Action::Move { move_index: 9 },
            })
            .unwrap();
        let Some(SessionNotice::RoundResolved { events, .. }) = step.notices.last() else {
            panic!("round should resolve");
        };
        assert!(events.iter().any(|e| matches!(e, BattleEvent::Log { message } if message.contains("hesitated"))));
    }

    #[test]
    fn test_restart_restores_handshake_rosters() {
        let (mut host, mut guest) = connected(11);
        let start = host.battle().unwrap().digest();
        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let guest_step = guest.submit_action(Action::Move { move_index: 0 }).unwrap();
        let result = deliver(guest_step, &mut host).into_iter().next().unwrap();
        deliver(result, &mut guest);
        assert_ne!(host.battle().unwrap().digest(), start);

        let restart = host.restart().unwrap();
        assert_eq!(restart.outbound, vec![WireMessage::Restart]);
        let replies = deliver(restart, &mut guest);
        assert_eq!(replies[0].notices, vec![SessionNotice::Restarted]);

        assert_eq!(host.battle().unwrap().digest(), start);
        assert_eq!(guest.battle().unwrap().digest(), start);
        assert_eq!(host.battle().unwrap().turn_number, 1);
        assert_eq!(guest.phase(), SessionPhase::AwaitingActions);
    }

    #[test]
    fn test_disconnect_is_terminal() {
        let (mut host, _guest) = connected(3);
        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let step = host.handle_disconnect();
        assert_eq!(step.notices, vec![SessionNotice::Disconnected]);
        assert_eq!(host.phase(), SessionPhase::Disconnected);
        assert_eq!(
            host.submit_action(Action::Move { move_index: 1 }),
            Err(SessionError::Disconnected)
        );
        assert_eq!(host.handle_message(WireMessage::Restart), Err(SessionError::Disconnected));
        assert!(host.handle_disconnect().notices.is_empty());
        assert!(host.valid_actions().is_empty());
    }

    #[test]
    fn test_forced_switch_flows_through_actions() {
        let (mut host, mut guest) = connected(2);
        // leave the guest's lead a single hit from fainting
        let weaken = |c: &mut SessionCoordinator| {
            if let Some(battle) = c.battle.as_mut() {
                battle.sides[1].roster[0].stats.hp = 1;
            }
        };
        weaken(&mut host);
        weaken(&mut guest);

        host.submit_action(Action::Move { move_index: 0 }).unwrap();
        let guest_step = guest.submit_action(Action::Move { move_index: 0 }).unwrap();
        let result = deliver(guest_step, &mut host).into_iter().next().unwrap();
        deliver(result, &mut guest);

        assert_eq!(host.phase(), SessionPhase::ForcedSwitch);
        assert_eq!(guest.phase(), SessionPhase::ForcedSwitch);
        assert!(!host.awaiting_local_action());
        assert!(guest.awaiting_local_action());
        assert!(matches!(
            host.submit_action(Action::Move { move_index: 0 }),
            Err(SessionError::NotAcceptingActions(_))
        ));
        assert_eq!(guest.valid_actions(), vec![Action::Switch { roster_index: 1 }]);

        let switch = guest.submit_action(Action::Switch { roster_index: 1 }).unwrap();
        let result = deliver(switch, &mut host).into_iter().next().unwrap();
        assert!(result.closes_round());
        deliver(result, &mut guest);

        assert_eq!(host.phase(), SessionPhase::AwaitingActions);
        assert_eq!(guest.phase(), SessionPhase::AwaitingActions);
        assert_eq!(guest.battle().unwrap().side(Side::B).active_index, 1);
        assert_eq!(guest.battle().unwrap().turn_number, host.battle().unwrap().turn_number);
    }
}
