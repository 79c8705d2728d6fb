//! Result storage and player statistics.
//!
//! The game engine only talks to [`GameRepository`]; the PostgreSQL and
//! in-memory implementations are interchangeable behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{DbError, DbResult},
    timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout},
};
use crate::{
    game::{MoveRecord, Outcome, PlayerNumber},
    session::SessionId,
};

/// A finished game, as handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub session_id: SessionId,
    pub player_one: String,
    pub player_two: String,
    pub player_one_is_bot: bool,
    pub player_two_is_bot: bool,
    pub outcome: Outcome,
    pub moves: Vec<MoveRecord>,
}

/// Per-player counter touched by a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatColumn {
    Wins,
    Losses,
    Draws,
}

impl StatColumn {
    fn as_column(self) -> &'static str {
        match self {
            StatColumn::Wins => "wins",
            StatColumn::Losses => "losses",
            StatColumn::Draws => "draws",
        }
    }
}

impl GameResult {
    fn seat(&self, seat: PlayerNumber) -> (&str, bool) {
        match seat {
            PlayerNumber::One => (&self.player_one, self.player_one_is_bot),
            PlayerNumber::Two => (&self.player_two, self.player_two_is_bot),
        }
    }

    /// Winner's display name, empty on a draw.
    pub fn winner_name(&self) -> &str {
        match self.outcome {
            Outcome::Winner(seat) => self.seat(seat).0,
            Outcome::Draw => "",
        }
    }

    /// Counter increments for the human seats. Bot seats are never updated.
    pub fn stat_updates(&self) -> Vec<(&str, StatColumn)> {
        let column_for = |seat: PlayerNumber| match self.outcome {
            Outcome::Winner(winner) if winner == seat => StatColumn::Wins,
            Outcome::Winner(_) => StatColumn::Losses,
            Outcome::Draw => StatColumn::Draws,
        };

        [PlayerNumber::One, PlayerNumber::Two]
            .into_iter()
            .filter_map(|seat| {
                let (name, is_bot) = self.seat(seat);
                (!is_bot).then(|| (name, column_for(seat)))
            })
            .collect()
    }
}

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub name: String,
    pub wins: i64,
    pub losses: i64,
    /// wins / (wins + losses), 0 without decided games
    pub win_rate: f64,
}

impl LeaderboardEntry {
    fn new(id: i64, name: String, wins: i64, losses: i64) -> Self {
        Self {
            id,
            name,
            wins,
            losses,
            win_rate: ratio(wins, wins + losses),
        }
    }
}

/// Aggregate statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub username: String,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    /// wins / (wins + losses + draws), 0 without games
    pub win_rate: f64,
}

impl PlayerStats {
    fn new(username: String, wins: i64, losses: i64, draws: i64) -> Self {
        Self {
            username,
            wins,
            losses,
            draws,
            win_rate: ratio(wins, wins + losses + draws),
        }
    }
}

fn ratio(part: i64, total: i64) -> f64 {
    if total > 0 {
        part as f64 / total as f64
    } else {
        0.0
    }
}

/// Storage for players and finished games
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Create a stats row for a human player if none exists
    async fn register_player(&self, username: &str) -> DbResult<()>;

    /// Store a finished game and update the players' counters
    async fn save_result(&self, result: &GameResult) -> DbResult<()>;

    /// Top players by wins
    async fn leaderboard(&self, limit: i64) -> DbResult<Vec<LeaderboardEntry>>;

    /// Statistics for one player
    async fn player_stats(&self, username: &str) -> DbResult<PlayerStats>;

    /// Check the backing store is reachable
    async fn health_check(&self) -> DbResult<()>;
}

/// PostgreSQL implementation of `GameRepository`
#[derive(Debug, Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn register_player(&self, username: &str) -> DbResult<()> {
        with_default_timeout(
            sqlx::query("INSERT INTO players (username) VALUES ($1) ON CONFLICT (username) DO NOTHING")
                .bind(username)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn save_result(&self, result: &GameResult) -> DbResult<()> {
        let moves = serde_json::to_string(&result.moves)?;
        let updates = result.stat_updates();

        with_timeout(DEFAULT_TRANSACTION_TIMEOUT, async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO games (id, player1, player2, winner, moves) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(result.session_id.to_string())
            .bind(&result.player_one)
            .bind(&result.player_two)
            .bind(result.winner_name())
            .bind(&moves)
            .execute(&mut *tx)
            .await?;

            for (username, column) in &updates {
                let column = column.as_column();
                // Creates the row when registration has not landed yet.
                sqlx::query(&format!(
                    "INSERT INTO players (username, {column}) VALUES ($1, 1) \
                     ON CONFLICT (username) DO UPDATE SET {column} = players.{column} + 1"
                ))
                .bind(*username)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await
        })
        .await?;

        Ok(())
    }

    async fn leaderboard(&self, limit: i64) -> DbResult<Vec<LeaderboardEntry>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, username, wins, losses FROM players ORDER BY wins DESC, id ASC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| LeaderboardEntry::new(r.get("id"), r.get("username"), r.get("wins"), r.get("losses")))
            .collect())
    }

    async fn player_stats(&self, username: &str) -> DbResult<PlayerStats> {
        let row = with_default_timeout(
            sqlx::query("SELECT wins, losses, draws FROM players WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| DbError::PlayerNotFound(username.to_string()))?;

        Ok(PlayerStats::new(
            username.to_string(),
            row.get("wins"),
            row.get("losses"),
            row.get("draws"),
        ))
    }

    async fn health_check(&self) -> DbResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PlayerRow {
    id: i64,
    wins: i64,
    losses: i64,
    draws: i64,
}

#[derive(Debug, Default)]
struct MemoryStore {
    players: HashMap<String, PlayerRow>,
    games: Vec<GameResult>,
    next_id: i64,
}

impl MemoryStore {
    /// Row for `username`, inserted with zeroed counters if missing.
    fn player_row(&mut self, username: &str) -> &mut PlayerRow {
        let next_id = &mut self.next_id;
        self.players.entry(username.to_string()).or_insert_with(|| {
            *next_id += 1;
            PlayerRow {
                id: *next_id,
                wins: 0,
                losses: 0,
                draws: 0,
            }
        })
    }
}

/// In-memory implementation of `GameRepository` for development and tests
#[derive(Debug, Default)]
pub struct MemoryGameRepository {
    store: RwLock<MemoryStore>,
}

impl MemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every game saved so far, oldest first.
    pub async fn saved_games(&self) -> Vec<GameResult> {
        self.store.read().await.games.clone()
    }
}

#[async_trait]
impl GameRepository for MemoryGameRepository {
    async fn register_player(&self, username: &str) -> DbResult<()> {
        self.store.write().await.player_row(username);
        Ok(())
    }

    async fn save_result(&self, result: &GameResult) -> DbResult<()> {
        let mut store = self.store.write().await;

        for (username, column) in result.stat_updates() {
            let row = store.player_row(username);
            match column {
                StatColumn::Wins => row.wins += 1,
                StatColumn::Losses => row.losses += 1,
                StatColumn::Draws => row.draws += 1,
            }
        }

        store.games.push(result.clone());
        Ok(())
    }

    async fn leaderboard(&self, limit: i64) -> DbResult<Vec<LeaderboardEntry>> {
        let store = self.store.read().await;

        let mut entries: Vec<_> = store
            .players
            .iter()
            .map(|(name, row)| LeaderboardEntry::new(row.id, name.clone(), row.wins, row.losses))
            .collect();
        entries.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.id.cmp(&b.id)));
        entries.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(entries)
    }

    async fn player_stats(&self, username: &str) -> DbResult<PlayerStats> {
        let store = self.store.read().await;
        let row = store
            .players
            .get(username)
            .ok_or_else(|| DbError::PlayerNotFound(username.to_string()))?;

        Ok(PlayerStats::new(username.to_string(), row.wins, row.losses, row.draws))
    }

    async fn health_check(&self) -> DbResult<()> {
        Ok(())
    }
}
