//! Async pump that connects a [`SessionCoordinator`] to a [`Transport`].

use crate::battle::ai::Behavior;
use crate::battle::state::{Action, GameState};
use crate::errors::{SessionError, SessionResult};
use crate::session::coordinator::{SessionCoordinator, SessionNotice, SessionPhase, SessionStep};
use crate::session::protocol::WireMessage;
use crate::session::transport::Transport;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SessionDriver<T: Transport> {
    coordinator: SessionCoordinator,
    transport: T,
    recv_timeout: Duration,
}

impl<T: Transport> SessionDriver<T> {
    pub fn new(coordinator: SessionCoordinator, transport: T) -> Self {
        Self {
            coordinator,
            transport,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }

    /// How long to wait on the peer before giving up with `SessionError::Timeout`.
    pub fn with_timeout(mut self, recv_timeout: Duration) -> Self {
        self.recv_timeout = recv_timeout;
        self
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.coordinator
    }

    pub fn into_coordinator(self) -> SessionCoordinator {
        self.coordinator
    }

    /// Exchange rosters and wait until the battle starts.
    pub async fn connect(&mut self) -> SessionResult<Vec<SessionNotice>> {
        let step = self.coordinator.open()?;
        let mut notices = self.flush(step).await?;
        while self.coordinator.phase() == SessionPhase::Lobby {
            notices.extend(self.pump_once().await?);
        }
        Ok(notices)
    }

    /// Submit the local action and wait for the round it belongs to.
    pub async fn submit(&mut self, action: Action) -> SessionResult<Vec<SessionNotice>> {
        let step = self.coordinator.submit_action(action)?;
        let closed = step.closes_round();
        let mut notices = self.flush(step).await?;
        if !closed {
            notices.extend(self.wait_for_round().await?);
        }
        Ok(notices)
    }

    /// Process peer messages until a round resolves or the session restarts.
    pub async fn wait_for_round(&mut self) -> SessionResult<Vec<SessionNotice>> {
        let mut notices = Vec::new();
        loop {
            let received = self.pump_once().await?;
            let done = received
                .iter()
                .any(|n| matches!(n, SessionNotice::RoundResolved { .. } | SessionNotice::Restarted));
            notices.extend(received);
            if done {
                return Ok(notices);
            }
        }
    }

    pub async fn restart(&mut self) -> SessionResult<Vec<SessionNotice>> {
        let step = self.coordinator.restart()?;
        self.flush(step).await
    }

    /// Play until the battle ends, asking `policy` for every local decision.
    pub async fn play_out<B: Behavior>(&mut self, policy: &B, max_rounds: usize) -> SessionResult<GameState> {
        for _ in 0..max_rounds {
            match self.coordinator.phase() {
                SessionPhase::GameOver => break,
                SessionPhase::Disconnected => return Err(SessionError::Disconnected),
                _ => {}
            }
            match self.choose(policy) {
                Some(action) => self.submit(action).await?,
                None => self.wait_for_round().await?,
            };
        }
        self.coordinator
            .battle()
            .map(|battle| battle.game_state)
            .ok_or(SessionError::HandshakeIncomplete)
    }

    fn choose<B: Behavior>(&self, policy: &B) -> Option<Action> {
        if !self.coordinator.awaiting_local_action() {
            return None;
        }
        let battle = self.coordinator.battle()?;
        let side = self.coordinator.local_side();
        let legal = self.coordinator.valid_actions();
        let wanted = if battle.game_state.is_replacement_phase() {
            policy.choose_replacement(battle.side(side), battle.active(side.opponent()))
        } else {
            match (battle.active(side), battle.active(side.opponent())) {
                (Some(own), Some(foe)) => Some(policy.choose_action(own, foe)),
                _ => None,
            }
        };
        match wanted {
            Some(action) if legal.contains(&action) => Some(action),
            _ => legal.first().copied(),
        }
    }

    async fn pump_once(&mut self) -> SessionResult<Vec<SessionNotice>> {
        let message = self.receive().await?;
        debug!(kind = message.kind(), role = ?self.coordinator.role(), "message in");
        let step = self.coordinator.handle_message(message)?;
        self.flush(step).await
    }

    async fn receive(&mut self) -> SessionResult<WireMessage> {
        match timeout(self.recv_timeout, self.transport.recv()).await {
            Err(_) => {
                warn!(timeout = ?self.recv_timeout, phase = %self.coordinator.phase(), "peer went quiet");
                Err(SessionError::Timeout)
            }
            Ok(Err(SessionError::Disconnected)) => {
                self.coordinator.handle_disconnect();
                Err(SessionError::Disconnected)
            }
            Ok(result) => result,
        }
    }

    async fn flush(&mut self, step: SessionStep) -> SessionResult<Vec<SessionNotice>> {
        for message in &step.outbound {
            if let Err(error) = self.transport.send(message).await {
                if error == SessionError::Disconnected {
                    self.coordinator.handle_disconnect();
                }
                return Err(error);
            }
        }
        Ok(step.notices)
    }
}
