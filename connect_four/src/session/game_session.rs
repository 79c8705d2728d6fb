//! Per-game state machine.
//!
//! A session starts `Active` with player one to move and ends `Finished`
//! with a winner or a draw. Every accepted transition is published to both
//! seats while the session lock is still held, so participants observe
//! snapshots in the order the transitions were applied.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{
    SessionId,
    broadcaster::{self, DeliveryReport},
    participant::{Participant, ParticipantId},
};
use crate::{
    bot::{BotDecision, BotDecisionMaker},
    game::{Board, MoveError, MoveRecord, MoveResult, Outcome, PlayerNumber, StateSnapshot},
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Finished(Outcome),
}

/// An accepted drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub player: PlayerNumber,
    pub column: usize,
    pub row: usize,
    /// Set when this drop ended the game.
    pub outcome: Option<Outcome>,
}

/// Mutable part of a session: board, turn, status and move log.
#[derive(Debug, Clone)]
pub struct SessionState {
    board: Board,
    current_turn: PlayerNumber,
    status: SessionStatus,
    moves: Vec<MoveRecord>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            board: Board::new(),
            current_turn: PlayerNumber::One,
            status: SessionStatus::Active,
            moves: Vec::new(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> PlayerNumber {
        self.current_turn
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            SessionStatus::Active => None,
            SessionStatus::Finished(outcome) => Some(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, SessionStatus::Finished(_))
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(&self.board, self.current_turn, self.outcome())
    }

    /// Fails unless the session is active and it is `mover`'s turn.
    pub fn ensure_turn(&self, mover: PlayerNumber) -> MoveResult<()> {
        if self.is_finished() {
            return Err(MoveError::GameOver);
        }

        if mover != self.current_turn {
            return Err(MoveError::NotYourTurn {
                expected: self.current_turn,
                actual: mover,
            });
        }

        Ok(())
    }

    /// Apply a drop for `mover`.
    ///
    /// # Errors
    ///
    /// * `MoveError::GameOver` - session is finished
    /// * `MoveError::NotYourTurn` - `mover` is not the current-turn player
    /// * `MoveError::ColumnOutOfRange` / `MoveError::ColumnFull` - illegal drop
    ///
    /// State is unchanged on error. On a win the turn marker stays on the
    /// winner; on a draw (full board) it stays on the last mover.
    pub fn apply_move(&mut self, mover: PlayerNumber, column: usize) -> MoveResult<AppliedMove> {
        self.ensure_turn(mover)?;

        let row = self.board.drop_piece(column, mover)?;
        self.moves.push(MoveRecord {
            column,
            player: mover,
            timestamp: Utc::now(),
        });

        let outcome = if self.board.has_four_in_row(mover) {
            Some(Outcome::Winner(mover))
        } else if self.board.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => self.status = SessionStatus::Finished(outcome),
            None => self.current_turn = mover.other(),
        }

        Ok(AppliedMove {
            player: mover,
            column,
            row,
            outcome,
        })
    }
}

/// Result of an accepted transition, as seen by the coordinator.
#[derive(Debug, Clone)]
pub struct Transition {
    pub applied: AppliedMove,
    pub snapshot: StateSnapshot,
    /// Move log, present only when the session just finished.
    pub final_moves: Option<Vec<MoveRecord>>,
    /// The game goes on and the next turn belongs to a bot.
    pub bot_to_move: bool,
    pub delivery: DeliveryReport,
}

/// One two-player game.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    player_one: Arc<Participant>,
    player_two: Arc<Participant>,
    started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl GameSession {
    /// Seat two participants; `player_one` moves first.
    pub fn new(player_one: Arc<Participant>, player_two: Arc<Participant>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_one,
            player_two,
            started_at: Utc::now(),
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn player_one(&self) -> &Arc<Participant> {
        &self.player_one
    }

    pub fn player_two(&self) -> &Arc<Participant> {
        &self.player_two
    }

    pub fn participant(&self, seat: PlayerNumber) -> &Arc<Participant> {
        match seat {
            PlayerNumber::One => &self.player_one,
            PlayerNumber::Two => &self.player_two,
        }
    }

    pub fn participants(&self) -> [&Arc<Participant>; 2] {
        [&self.player_one, &self.player_two]
    }

    /// Seat of a participant in this session.
    pub fn seat_of(&self, participant: ParticipantId) -> Option<PlayerNumber> {
        if self.player_one.id() == participant {
            Some(PlayerNumber::One)
        } else if self.player_two.id() == participant {
            Some(PlayerNumber::Two)
        } else {
            None
        }
    }

    /// Seat held by a bot, if any.
    pub fn bot_seat(&self) -> Option<PlayerNumber> {
        [PlayerNumber::One, PlayerNumber::Two]
            .into_iter()
            .find(|&seat| self.participant(seat).is_bot())
    }

    /// Lock the mutable state. Hold the guard only for short, non-blocking work.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn is_finished(&self) -> bool {
        self.state.lock().await.is_finished()
    }

    /// Apply a move sent by a human participant and publish the new state.
    pub async fn submit_move(&self, participant: ParticipantId, column: i64) -> MoveResult<Transition> {
        let seat = self.seat_of(participant).ok_or(MoveError::NotInSession)?;

        let mut state = self.state.lock().await;
        state.ensure_turn(seat)?;
        let column = usize::try_from(column).map_err(|_| MoveError::ColumnOutOfRange(column))?;
        self.transition(&mut state, seat, column)
    }

    /// Let the bot play if it is its turn.
    ///
    /// Re-checks the terminal flag and the turn marker under the lock, so a
    /// stale scheduled reply is a no-op (`Ok(None)`).
    pub async fn play_bot_turn(&self) -> MoveResult<Option<(BotDecision, Transition)>> {
        let Some(seat) = self.bot_seat() else {
            return Ok(None);
        };

        let mut state = self.state.lock().await;
        if state.is_finished() || state.current_turn() != seat {
            return Ok(None);
        }

        let Some(decision) = BotDecisionMaker::new(seat).decide(state.board()) else {
            return Ok(None);
        };

        let transition = self.transition(&mut state, seat, decision.column)?;
        Ok(Some((decision, transition)))
    }

    fn transition(
        &self,
        state: &mut SessionState,
        seat: PlayerNumber,
        column: usize,
    ) -> MoveResult<Transition> {
        let applied = state.apply_move(seat, column)?;
        let snapshot = state.snapshot();
        let delivery = broadcaster::publish(self, &snapshot);

        let final_moves = applied.outcome.map(|_| state.moves().to_vec());
        let bot_to_move = applied.outcome.is_none() && self.participant(state.current_turn()).is_bot();

        Ok(Transition {
            applied,
            snapshot,
            final_moves,
            bot_to_move,
            delivery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{COLS, ROWS};
    use crate::session::participant::Connection;
    use PlayerNumber::{One, Two};

    #[test]
    fn test_new_state_is_active_with_player_one() {
        let state = SessionState::new();
        assert_eq!(state.current_turn(), One);
        assert_eq!(state.status(), SessionStatus::Active);
        assert!(state.moves().is_empty());
    }

    #[test]
    fn test_turn_alternates_on_accepted_moves() {
        let mut state = SessionState::new();
        let columns = [0, 1, 2, 0, 1, 2, 4];
        for (n, &column) in columns.iter().enumerate() {
            let mover = state.current_turn();
            state.apply_move(mover, column).unwrap();
            let expected = if (n + 1) % 2 == 0 { One } else { Two };
            assert_eq!(state.current_turn(), expected);
        }
        assert_eq!(state.moves().len(), columns.len());
    }

    #[test]
    fn test_wrong_turn_rejected_without_change() {
        let mut state = SessionState::new();
        let err = state.apply_move(Two, 3).unwrap_err();
        assert_eq!(
            err,
            MoveError::NotYourTurn {
                expected: One,
                actual: Two
            }
        );
        assert_eq!(state.board().piece_count(), 0);
        assert!(state.moves().is_empty());
    }

    #[test]
    fn test_full_column_rejected_without_turn_flip() {
        let mut state = SessionState::new();
        for _ in 0..ROWS {
            let mover = state.current_turn();
            state.apply_move(mover, 5).unwrap();
        }
        let mover = state.current_turn();
        assert_eq!(state.apply_move(mover, 5), Err(MoveError::ColumnFull(5)));
        assert_eq!(state.current_turn(), mover);
        assert_eq!(state.moves().len(), ROWS);
    }

    #[test]
    fn test_vertical_win_finishes_session() {
        let mut state = SessionState::new();
        for column in [3, 0, 3, 1, 3, 6] {
            let mover = state.current_turn();
            state.apply_move(mover, column).unwrap();
        }
        let applied = state.apply_move(One, 3).unwrap();

        assert_eq!(applied.outcome, Some(Outcome::Winner(One)));
        assert_eq!(state.status(), SessionStatus::Finished(Outcome::Winner(One)));
        assert_eq!(state.current_turn(), One);

        let snapshot = state.snapshot();
        assert!(snapshot.game_over);
        assert_eq!(snapshot.winner, 1);
    }

    #[test]
    fn test_finished_session_rejects_moves() {
        let mut state = SessionState::new();
        for column in [0, 6, 0, 6, 0, 6, 0] {
            let mover = state.current_turn();
            state.apply_move(mover, column).unwrap();
        }
        assert!(state.is_finished());
        assert_eq!(state.apply_move(Two, 6), Err(MoveError::GameOver));
        assert_eq!(state.moves().len(), 7);
    }

    #[test]
    fn test_full_board_without_four_is_a_draw() {
        // Column order that fills the grid with no four-in-a-row for either side.
        let mut order = Vec::new();
        for pair in [[0, 1], [2, 3], [4, 5]] {
            for _ in 0..3 {
                order.extend_from_slice(&pair);
            }
            for _ in 0..3 {
                order.extend_from_slice(&[pair[1], pair[0]]);
            }
        }
        order.extend(std::iter::repeat_n(6, ROWS));
        assert_eq!(order.len(), ROWS * COLS);

        let mut state = SessionState::new();
        let mut last = None;
        for column in order {
            let mover = state.current_turn();
            last = Some(state.apply_move(mover, column).unwrap());
        }

        assert_eq!(last.unwrap().outcome, Some(Outcome::Draw));
        assert_eq!(state.status(), SessionStatus::Finished(Outcome::Draw));
        assert_eq!(state.snapshot().winner, 0);
    }

    fn human(name: &str) -> (Arc<Participant>, tokio::sync::mpsc::Receiver<crate::session::ServerMessage>) {
        let (connection, rx) = Connection::channel();
        (Arc::new(Participant::human(name, connection)), rx)
    }

    #[tokio::test]
    async fn test_submit_move_resolves_seat_and_broadcasts() {
        let (alice, mut alice_rx) = human("alice");
        let (bob, mut bob_rx) = human("bob");
        let session = GameSession::new(alice.clone(), bob.clone());

        let transition = session.submit_move(alice.id(), 2).await.unwrap();
        assert_eq!(transition.applied.player, One);
        assert_eq!(transition.delivery.delivered, 2);
        assert!(!transition.bot_to_move);
        assert!(alice_rx.try_recv().is_ok());
        assert!(bob_rx.try_recv().is_ok());

        let err = session.submit_move(alice.id(), 2).await.unwrap_err();
        assert!(matches!(err, MoveError::NotYourTurn { .. }));
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_submit_move_rejects_strangers_and_negative_columns() {
        let (alice, _alice_rx) = human("alice");
        let (bob, _bob_rx) = human("bob");
        let (carol, _carol_rx) = human("carol");
        let session = GameSession::new(alice.clone(), bob);

        assert_eq!(
            session.submit_move(carol.id(), 0).await.unwrap_err(),
            MoveError::NotInSession
        );
        assert_eq!(
            session.submit_move(alice.id(), -1).await.unwrap_err(),
            MoveError::ColumnOutOfRange(-1)
        );
        assert_eq!(session.snapshot().await.board, Board::new().to_grid());
    }

    #[tokio::test]
    async fn test_bot_turn_is_noop_when_not_its_turn() {
        let (alice, _alice_rx) = human("alice");
        let bot = Arc::new(Participant::bot("Bot"));
        let session = GameSession::new(alice.clone(), bot);

        assert!(session.play_bot_turn().await.unwrap().is_none());

        let transition = session.submit_move(alice.id(), 0).await.unwrap();
        assert!(transition.bot_to_move);
        assert_eq!(transition.delivery.delivered, 1);
        assert_eq!(transition.delivery.skipped, 1);

        let (decision, transition) = session.play_bot_turn().await.unwrap().unwrap();
        assert_eq!(decision.column, 3);
        assert_eq!(transition.applied.player, Two);
        assert!(!transition.bot_to_move);

        assert!(session.play_bot_turn().await.unwrap().is_none());
    }
}
