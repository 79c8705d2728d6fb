//! Session coordinator.
//!
//! Turns pairings into registered sessions, routes inbound moves to the
//! right session, schedules bot replies and fires the finish hooks
//! (result persistence and analytics).

use std::sync::Arc;

use super::{
    SessionId, broadcaster,
    config::MatchConfig,
    game_session::{GameSession, Transition},
    participant::Participant,
    registry::SessionRegistry,
};
use crate::{
    analytics::{EventPublisher, GameEvent},
    db::{GameRepository, GameResult},
    game::{MoveError, MoveRecord, MoveResult, Outcome, PlayerNumber},
};

/// Session manager shared by the transport and the matchmaker
pub struct SessionManager {
    /// Live and finished sessions
    registry: SessionRegistry,

    /// Result storage
    repository: Arc<dyn GameRepository>,

    /// Analytics publisher
    events: Arc<dyn EventPublisher>,

    /// Timing and naming configuration
    config: MatchConfig,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// # Arguments
    ///
    /// * `registry` - Session registry, shared with anything that looks sessions up
    /// * `repository` - Where finished games are persisted
    /// * `events` - Where analytics events are published
    /// * `config` - Match configuration
    pub fn new(
        registry: SessionRegistry,
        repository: Arc<dyn GameRepository>,
        events: Arc<dyn EventPublisher>,
        config: MatchConfig,
    ) -> Self {
        Self {
            registry,
            repository,
            events,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &Arc<dyn GameRepository> {
        &self.repository
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Seat a pairing in a new session
    ///
    /// Registers the session, attaches it to both participants, sends the
    /// `game_start` announcements and the initial board. The session lock is
    /// held throughout, so no move can be applied before the initial
    /// messages are queued.
    ///
    /// # Returns
    ///
    /// * `Arc<GameSession>` - The registered session
    pub async fn create_session(
        self: &Arc<Self>,
        player_one: Arc<Participant>,
        player_two: Arc<Participant>,
    ) -> Arc<GameSession> {
        let session = Arc::new(GameSession::new(player_one, player_two));

        {
            let state = session.lock().await;

            self.registry.register(session.clone()).await;
            for participant in session.participants() {
                participant.attach_session(session.id()).await;
            }

            broadcaster::announce_start(&session);
            broadcaster::publish(&session, &state.snapshot());
        }

        log::info!(
            "Session {} started: {} vs {}",
            session.id(),
            session.player_one().name(),
            session.player_two().name()
        );

        self.events.publish(GameEvent::started(
            session.id(),
            session.player_one().name(),
            session.player_two().name(),
        ));

        if session.bot_seat() == Some(PlayerNumber::One) {
            self.schedule_bot_move(session.id());
        }

        session
    }

    /// Apply a move from `participant` to its current session
    ///
    /// # Arguments
    ///
    /// * `participant` - Sender of the move
    /// * `column` - Requested column, not yet range-checked
    ///
    /// # Returns
    ///
    /// * `MoveResult<Transition>` - The accepted transition, or why the move was ignored
    pub async fn submit_move(
        self: &Arc<Self>,
        participant: &Participant,
        column: i64,
    ) -> MoveResult<Transition> {
        let result = self.try_submit_move(participant, column).await;

        match &result {
            Ok(transition) => {
                log::info!(
                    "{} dropped in column {} (row {})",
                    participant.name(),
                    transition.applied.column,
                    transition.applied.row
                );
            }
            Err(e) => {
                log::warn!("Ignored move from {} (column {}): {}", participant.name(), column, e);
            }
        }

        result
    }

    async fn try_submit_move(
        self: &Arc<Self>,
        participant: &Participant,
        column: i64,
    ) -> MoveResult<Transition> {
        let session_id = participant
            .session_id()
            .await
            .ok_or(MoveError::NoActiveSession)?;
        let session = self
            .registry
            .find(session_id)
            .await
            .ok_or(MoveError::SessionNotFound(session_id))?;

        let transition = session.submit_move(participant.id(), column).await?;
        self.after_transition(&session, &transition);
        Ok(transition)
    }

    /// Let the bot of `session_id` play, if it is still its turn.
    ///
    /// The session is re-fetched from the registry and re-validated under
    /// its lock; a finished or no-longer-bot-turn session is left alone.
    pub async fn play_bot_move(self: &Arc<Self>, session_id: SessionId) -> Option<Transition> {
        let Some(session) = self.registry.find(session_id).await else {
            log::debug!("Bot reply skipped, session {} is gone", session_id);
            return None;
        };

        match session.play_bot_turn().await {
            Ok(Some((decision, transition))) => {
                log::info!(
                    "Bot {} dropped in column {} ({}) in session {}",
                    session.participant(transition.applied.player).name(),
                    decision.column,
                    decision.reason,
                    session_id
                );
                self.after_transition(&session, &transition);
                Some(transition)
            }
            Ok(None) => {
                log::debug!("Bot reply skipped, not its turn in session {}", session_id);
                None
            }
            Err(e) => {
                log::warn!("Bot move rejected in session {}: {}", session_id, e);
                None
            }
        }
    }

    fn after_transition(self: &Arc<Self>, session: &Arc<GameSession>, transition: &Transition) {
        if let (Some(outcome), Some(moves)) = (transition.applied.outcome, &transition.final_moves) {
            self.record_finish(session, outcome, moves.clone());
        }

        if transition.bot_to_move {
            self.schedule_bot_move(session.id());
        }
    }

    fn schedule_bot_move(self: &Arc<Self>, session_id: SessionId) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(manager.config.bot_move_delay).await;
            manager.play_bot_move(session_id).await;
        });
    }

    fn record_finish(&self, session: &GameSession, outcome: Outcome, moves: Vec<MoveRecord>) {
        let player_one = session.player_one();
        let player_two = session.player_two();

        match outcome {
            Outcome::Winner(seat) => log::info!(
                "Session {} finished after {} moves, winner {}",
                session.id(),
                moves.len(),
                session.participant(seat).name()
            ),
            Outcome::Draw => log::info!("Session {} finished in a draw", session.id()),
        }

        let result = GameResult {
            session_id: session.id(),
            player_one: player_one.name().to_string(),
            player_two: player_two.name().to_string(),
            player_one_is_bot: player_one.is_bot(),
            player_two_is_bot: player_two.is_bot(),
            outcome,
            moves,
        };
        let repository = Arc::clone(&self.repository);
        tokio::spawn(async move {
            if let Err(e) = repository.save_result(&result).await {
                log::error!("Failed to save result of session {}: {}", result.session_id, e);
            }
        });

        self.events.publish(GameEvent::finished(
            session.id(),
            player_one.name(),
            player_two.name(),
            outcome,
            session.started_at(),
        ));
    }
}
