//! Fan-out of session state to the seated participants.
//!
//! Delivery is best-effort and never blocks: a closed or backlogged
//! connection is logged and skipped, and the other seat still receives the
//! message.

use super::{
    game_session::GameSession,
    messages::{GameStart, ServerMessage},
    participant::{DeliveryError, Participant},
};
use crate::game::{PlayerNumber, StateSnapshot};

/// Per-broadcast delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Messages handed to a connection
    pub delivered: usize,
    /// Bot seats, which have no connection
    pub skipped: usize,
    /// Connections that were closed or backlogged
    pub failed: usize,
}

impl DeliveryReport {
    fn record(&mut self, participant: &Participant, result: Result<(), DeliveryError>) {
        match result {
            Ok(()) => self.delivered += 1,
            Err(DeliveryError::NoConnection) => self.skipped += 1,
            Err(e) => {
                self.failed += 1;
                log::warn!("Failed to deliver to {} ({}): {}", participant.name(), participant.id(), e);
            }
        }
    }
}

/// Send a `board_update` with `snapshot` to every human seat of `session`.
pub fn publish(session: &GameSession, snapshot: &StateSnapshot) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for participant in session.participants() {
        if participant.is_bot() {
            report.skipped += 1;
            continue;
        }
        let result = participant.deliver(ServerMessage::BoardUpdate(snapshot.clone()));
        report.record(participant, result);
    }

    report
}

/// Send each human seat its `game_start` announcement.
pub fn announce_start(session: &GameSession) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for seat in [PlayerNumber::One, PlayerNumber::Two] {
        let participant = session.participant(seat);
        if participant.is_bot() {
            report.skipped += 1;
            continue;
        }
        let message = ServerMessage::GameStart(GameStart {
            game_id: session.id(),
            opponent: session.participant(seat.other()).name().to_string(),
            player_number: seat,
        });
        let result = participant.deliver(message);
        report.record(participant, result);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Board;
    use crate::session::participant::Connection;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_announce_start_tells_each_seat_its_opponent() {
        let (alice_conn, mut alice_rx) = Connection::channel();
        let (bob_conn, mut bob_rx) = Connection::channel();
        let alice = Arc::new(Participant::human("alice", alice_conn));
        let bob = Arc::new(Participant::human("bob", bob_conn));
        let session = GameSession::new(alice, bob);

        let report = announce_start(&session);
        assert_eq!(report.delivered, 2);

        let ServerMessage::GameStart(start) = alice_rx.recv().await.unwrap() else {
            panic!("expected game_start");
        };
        assert_eq!(start.opponent, "bob");
        assert_eq!(start.player_number, PlayerNumber::One);
        assert_eq!(start.game_id, session.id());

        let ServerMessage::GameStart(start) = bob_rx.recv().await.unwrap() else {
            panic!("expected game_start");
        };
        assert_eq!(start.opponent, "alice");
        assert_eq!(start.player_number, PlayerNumber::Two);
    }

    #[tokio::test]
    async fn test_publish_skips_bot_and_survives_closed_peer() {
        let (alice_conn, alice_rx) = Connection::channel();
        let alice = Arc::new(Participant::human("alice", alice_conn));
        let bot = Arc::new(Participant::bot("Bot"));
        let session = GameSession::new(alice, bot);
        drop(alice_rx);

        let snapshot = StateSnapshot::new(&Board::new(), PlayerNumber::One, None);
        let report = publish(&session, &snapshot);
        assert_eq!(
            report,
            DeliveryReport {
                delivered: 0,
                skipped: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_publish_reaches_remaining_seat_when_one_fails() {
        let (alice_conn, alice_rx) = Connection::channel();
        let (bob_conn, mut bob_rx) = Connection::channel();
        let alice = Arc::new(Participant::human("alice", alice_conn));
        let bob = Arc::new(Participant::human("bob", bob_conn));
        let session = GameSession::new(alice, bob);
        drop(alice_rx);

        let snapshot = StateSnapshot::new(&Board::new(), PlayerNumber::One, None);
        let report = publish(&session, &snapshot);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(bob_rx.recv().await, Some(ServerMessage::BoardUpdate(snapshot)));
    }
}
