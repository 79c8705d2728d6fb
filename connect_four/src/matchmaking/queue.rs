//! FIFO waiting list of participants.
//!
//! Every read and write goes through one mutex, so enqueue, pairing and
//! removal never observe a torn queue, and a participant taken out by one
//! pairing cannot be taken out again by another.

use std::{collections::VecDeque, sync::Arc};
use tokio::sync::Mutex;

use crate::session::{Participant, ParticipantId};

/// A pairing produced by the queue.
#[derive(Debug, Clone)]
pub enum Pairing {
    /// Two queued humans, oldest first.
    Humans(Arc<Participant>, Arc<Participant>),
    /// A lone participant whose grace period ran out.
    Solo(Arc<Participant>),
}

/// Matchmaking queue
#[derive(Debug, Default)]
pub struct MatchmakingQueue {
    waiting: Mutex<VecDeque<Arc<Participant>>>,
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. A participant already queued is not added twice.
    ///
    /// # Returns
    ///
    /// * `usize` - Queue length after the call
    pub async fn enqueue(&self, participant: Arc<Participant>) -> usize {
        let mut waiting = self.waiting.lock().await;
        if waiting.iter().any(|p| p.id() == participant.id()) {
            log::warn!("{} is already queued", participant.name());
        } else {
            waiting.push_back(participant);
        }
        waiting.len()
    }

    /// The queue's only pairing operation
    ///
    /// Pairs the two oldest entries if at least two are waiting. Otherwise,
    /// when `grace_expired` names the only entry, that participant is
    /// dequeued for a bot game. A trigger that was already paired or
    /// removed does nothing.
    ///
    /// # Arguments
    ///
    /// * `grace_expired` - Participant whose grace timer fired, `None` on join
    pub async fn dequeue_pair_or_bot(&self, grace_expired: Option<ParticipantId>) -> Option<Pairing> {
        let mut waiting = self.waiting.lock().await;

        if let Some(pairing) = Self::pop_pair(&mut waiting) {
            return Some(pairing);
        }

        match (waiting.front(), grace_expired) {
            (Some(only), Some(trigger)) if only.id() == trigger => waiting.pop_front().map(Pairing::Solo),
            _ => None,
        }
    }

    /// Drop a participant who left while queued. No-op if already gone.
    ///
    /// # Returns
    ///
    /// * `bool` - Whether the participant was still queued
    pub async fn remove(&self, participant: ParticipantId) -> bool {
        let mut waiting = self.waiting.lock().await;
        let before = waiting.len();
        waiting.retain(|p| p.id() != participant);
        waiting.len() != before
    }

    pub async fn contains(&self, participant: ParticipantId) -> bool {
        self.waiting.lock().await.iter().any(|p| p.id() == participant)
    }

    pub async fn len(&self) -> usize {
        self.waiting.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.waiting.lock().await.is_empty()
    }

    fn pop_pair(waiting: &mut VecDeque<Arc<Participant>>) -> Option<Pairing> {
        if waiting.len() < 2 {
            return None;
        }
        let first = waiting.pop_front()?;
        let second = waiting.pop_front()?;
        Some(Pairing::Humans(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Connection;

    fn participant(name: &str) -> Arc<Participant> {
        let (connection, _rx) = Connection::channel();
        Arc::new(Participant::human(name, connection))
    }

    #[tokio::test]
    async fn test_pairs_two_oldest_first() {
        let queue = MatchmakingQueue::new();
        let a = participant("a");
        let b = participant("b");
        let c = participant("c");
        for p in [&a, &b, &c] {
            queue.enqueue(p.clone()).await;
        }

        let Some(Pairing::Humans(first, second)) = queue.dequeue_pair_or_bot(None).await else {
            panic!("expected a human pairing");
        };
        assert_eq!(first.id(), a.id());
        assert_eq!(second.id(), b.id());
        assert_eq!(queue.len().await, 1);
        assert!(queue.contains(c.id()).await);
    }

    #[tokio::test]
    async fn test_single_entry_does_not_pair() {
        let queue = MatchmakingQueue::new();
        queue.enqueue(participant("a")).await;
        assert!(queue.dequeue_pair_or_bot(None).await.is_none());
        assert_eq!(queue.len().await, 1);
    }

    #[tokio::test]
    async fn test_grace_check_pairs_lone_trigger_once() {
        let queue = MatchmakingQueue::new();
        let a = participant("a");
        queue.enqueue(a.clone()).await;

        let Some(Pairing::Solo(solo)) = queue.dequeue_pair_or_bot(Some(a.id())).await else {
            panic!("expected a solo pairing");
        };
        assert_eq!(solo.id(), a.id());
        assert!(queue.dequeue_pair_or_bot(Some(a.id())).await.is_none());
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_grace_check_ignores_other_lone_entry() {
        let queue = MatchmakingQueue::new();
        let a = participant("a");
        let b = participant("b");
        queue.enqueue(b.clone()).await;

        assert!(queue.dequeue_pair_or_bot(Some(a.id())).await.is_none());
        assert!(queue.contains(b.id()).await);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let queue = MatchmakingQueue::new();
        let a = participant("a");
        queue.enqueue(a.clone()).await;

        assert!(queue.remove(a.id()).await);
        assert!(!queue.remove(a.id()).await);
        assert!(queue.dequeue_pair_or_bot(Some(a.id())).await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_ignored() {
        let queue = MatchmakingQueue::new();
        let a = participant("a");
        assert_eq!(queue.enqueue(a.clone()).await, 1);
        assert_eq!(queue.enqueue(a).await, 1);
    }
}
