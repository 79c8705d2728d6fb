/// Integration tests for matchmaking
///
/// These tests cover FIFO pairing, the grace-period bot fallback and the
/// rule that a participant is never both queued and seated.
use std::{sync::Arc, time::Duration};

use connect_four::{
    analytics::NoopEventPublisher,
    db::MemoryGameRepository,
    matchmaking::{Matchmaker, MatchmakingQueue, Pairing},
    session::{Connection, MatchConfig, Participant, SessionManager, SessionRegistry},
};

fn matchmaker(grace_period: Duration) -> Arc<Matchmaker> {
    let sessions = SessionManager::new(
        SessionRegistry::new(),
        Arc::new(MemoryGameRepository::new()),
        Arc::new(NoopEventPublisher),
        MatchConfig {
            grace_period,
            ..Default::default()
        },
    );
    Arc::new(Matchmaker::new(Arc::new(sessions)))
}

fn player(name: &str) -> Arc<Participant> {
    let (connection, _rx) = Connection::channel();
    Arc::new(Participant::human(name, connection))
}

#[tokio::test]
async fn test_fifo_pairing_leaves_third_queued() {
    let queue = MatchmakingQueue::new();
    let (a, b, c) = (player("a"), player("b"), player("c"));
    queue.enqueue(a.clone()).await;
    queue.enqueue(b.clone()).await;
    queue.enqueue(c.clone()).await;

    match queue.dequeue_pair_or_bot(None).await {
        Some(Pairing::Humans(first, second)) => {
            assert_eq!(first.name(), "a");
            assert_eq!(second.name(), "b");
        }
        other => panic!("unexpected pairing: {other:?}"),
    }
    assert_eq!(queue.len().await, 1);
    assert!(queue.contains(c.id()).await);
}

#[tokio::test(start_paused = true)]
async fn test_three_joins_seat_first_two() {
    let matchmaker = matchmaker(Duration::from_secs(10));
    let (a, b, c) = (player("a"), player("b"), player("c"));

    assert!(matchmaker.join(a.clone()).await.is_none());
    let session = matchmaker.join(b.clone()).await.unwrap();
    assert!(matchmaker.join(c.clone()).await.is_none());

    assert_eq!(session.player_one().id(), a.id());
    assert_eq!(session.player_two().id(), b.id());
    assert_eq!(c.session_id().await, None);

    // Never both queued and seated.
    for seated in [&a, &b] {
        assert!(!matchmaker.queue().contains(seated.id()).await);
        assert_eq!(seated.session_id().await, Some(session.id()));
    }
    assert!(matchmaker.queue().contains(c.id()).await);
}

#[tokio::test(start_paused = true)]
async fn test_grace_period_pairs_lone_player_with_bot_once() {
    let matchmaker = matchmaker(Duration::from_secs(10));
    let alice = player("alice");
    matchmaker.join(alice.clone()).await;

    tokio::time::sleep(Duration::from_secs(11)).await;

    let session_id = alice.session_id().await.expect("paired with a bot");
    assert!(matchmaker.queue().is_empty().await);
    assert_eq!(matchmaker.sessions().registry().len().await, 1);

    // A late check for the same participant does nothing.
    assert!(matchmaker.check_grace(alice.id()).await.is_none());
    assert_eq!(alice.session_id().await, Some(session_id));
    assert_eq!(matchmaker.sessions().registry().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_second_player_pairs_before_grace_expires() {
    let matchmaker = matchmaker(Duration::from_secs(10));
    let alice = player("alice");
    let bob = player("bob");

    matchmaker.join(alice.clone()).await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    let session = matchmaker.join(bob.clone()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert!(!session.player_two().is_bot());
    assert_eq!(matchmaker.sessions().registry().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_grace_checks_pair_once() {
    let matchmaker = matchmaker(Duration::from_secs(10));
    let alice = player("alice");
    matchmaker.queue().enqueue(alice.clone()).await;

    let checks: Vec<_> = (0..8)
        .map(|_| {
            let matchmaker = matchmaker.clone();
            let id = alice.id();
            tokio::spawn(async move { matchmaker.check_grace(id).await.is_some() })
        })
        .collect();

    let mut paired = 0;
    for check in checks {
        if check.await.unwrap() {
            paired += 1;
        }
    }
    assert_eq!(paired, 1);
    assert_eq!(matchmaker.sessions().registry().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_disconnected_player_never_paired() {
    let matchmaker = matchmaker(Duration::from_secs(10));
    let alice = player("alice");
    let bob = player("bob");

    matchmaker.join(alice.clone()).await;
    matchmaker.leave(alice.id()).await;
    matchmaker.join(bob.clone()).await;

    assert_eq!(alice.session_id().await, None);
    assert!(bob.session_id().await.is_none());

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(alice.session_id().await, None);
    let session = matchmaker
        .sessions()
        .registry()
        .find(bob.session_id().await.unwrap())
        .await
        .unwrap();
    assert!(session.player_two().is_bot());
}
