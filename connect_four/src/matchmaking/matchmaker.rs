//! Join/leave entry point for matchmaking.

use std::sync::Arc;

use super::queue::{MatchmakingQueue, Pairing};
use crate::session::{GameSession, Participant, ParticipantId, SessionManager};

/// Matchmaker owning the waiting queue and its grace timers
pub struct Matchmaker {
    queue: MatchmakingQueue,
    sessions: Arc<SessionManager>,
}

impl Matchmaker {
    /// Create a new matchmaker
    ///
    /// # Arguments
    ///
    /// * `sessions` - Session manager that receives the pairings
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self {
            queue: MatchmakingQueue::new(),
            sessions,
        }
    }

    pub fn queue(&self) -> &MatchmakingQueue {
        &self.queue
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Queue a participant and pair immediately if someone is waiting
    ///
    /// A grace timer is started for every join. When it fires and the
    /// participant is still waiting alone, it gets a bot opponent.
    ///
    /// # Returns
    ///
    /// * `Option<Arc<GameSession>>` - Session created by this join, if any
    pub async fn join(self: &Arc<Self>, participant: Arc<Participant>) -> Option<Arc<GameSession>> {
        if !participant.is_bot() {
            let repository = Arc::clone(self.sessions.repository());
            let name = participant.name().to_string();
            tokio::spawn(async move {
                if let Err(e) = repository.register_player(&name).await {
                    log::error!("Failed to register player {}: {}", name, e);
                }
            });
        }

        let waiting = self.queue.enqueue(participant.clone()).await;
        log::info!("{} joined matchmaking ({} waiting)", participant.name(), waiting);

        let session = match self.queue.dequeue_pair_or_bot(None).await {
            Some(pairing) => Some(self.start(pairing).await),
            None => None,
        };

        self.schedule_grace_check(participant.id());
        session
    }

    /// Remove a participant who disconnected while waiting
    ///
    /// Seated participants are unaffected; their session keeps running.
    pub async fn leave(&self, participant: ParticipantId) -> bool {
        let removed = self.queue.remove(participant).await;
        if removed {
            log::info!("Participant {} left matchmaking", participant);
        }
        removed
    }

    /// Grace-period check for `trigger`
    ///
    /// Safe to run any number of times: once `trigger` has been paired or
    /// removed, further checks do nothing.
    pub async fn check_grace(&self, trigger: ParticipantId) -> Option<Arc<GameSession>> {
        let pairing = self.queue.dequeue_pair_or_bot(Some(trigger)).await?;
        Some(self.start(pairing).await)
    }

    fn schedule_grace_check(self: &Arc<Self>, trigger: ParticipantId) {
        let matchmaker = Arc::clone(self);
        let grace_period = self.sessions.config().grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace_period).await;
            matchmaker.check_grace(trigger).await;
        });
    }

    async fn start(&self, pairing: Pairing) -> Arc<GameSession> {
        match pairing {
            Pairing::Humans(first, second) => {
                log::info!("Paired {} with {}", first.name(), second.name());
                self.sessions.create_session(first, second).await
            }
            Pairing::Solo(human) => {
                let bot = Arc::new(Participant::bot(self.sessions.config().bot_name.clone()));
                log::info!("No opponent for {}, pairing with {}", human.name(), bot.name());
                self.sessions.create_session(human, bot).await
            }
        }
    }
}
