//! Bot decision-making: win, block, center, then first legal column.

use crate::game::{Board, CENTER_COLUMN, PlayerNumber};

/// Which rule picked the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Dropping here completes four for the bot.
    Win,
    /// Dropping here denies the opponent an immediate four.
    Block,
    /// Nothing forced, center column is open.
    Center,
    /// Fallback: lowest-indexed open column.
    FirstLegal,
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionReason::Win => write!(f, "win"),
            DecisionReason::Block => write!(f, "block"),
            DecisionReason::Center => write!(f, "center"),
            DecisionReason::FirstLegal => write!(f, "first-legal"),
        }
    }
}

/// Column chosen by the bot and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotDecision {
    pub column: usize,
    pub reason: DecisionReason,
}

/// Fixed three-tier heuristic opponent.
///
/// Candidate moves are simulated on copies of the board; the board passed
/// in is never mutated.
///
/// # Examples
///
/// ```
/// use connect_four::bot::{BotDecisionMaker, DecisionReason};
/// use connect_four::game::Board;
///
/// let bot = BotDecisionMaker::default();
/// let decision = bot.decide(&Board::new()).unwrap();
/// assert_eq!(decision.column, 3);
/// assert_eq!(decision.reason, DecisionReason::Center);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BotDecisionMaker {
    mark: PlayerNumber,
}

impl Default for BotDecisionMaker {
    /// The bot is always seated as player two.
    fn default() -> Self {
        Self::new(PlayerNumber::Two)
    }
}

impl BotDecisionMaker {
    pub fn new(mark: PlayerNumber) -> Self {
        Self { mark }
    }

    pub fn mark(&self) -> PlayerNumber {
        self.mark
    }

    /// Pick a column for the bot.
    ///
    /// Returns `None` only when the board is full, which callers rule out by
    /// invoking the bot on active sessions only.
    pub fn decide(&self, board: &Board) -> Option<BotDecision> {
        if let Some(column) = winning_column(board, self.mark) {
            return Some(BotDecision {
                column,
                reason: DecisionReason::Win,
            });
        }

        if let Some(column) = winning_column(board, self.mark.other()) {
            return Some(BotDecision {
                column,
                reason: DecisionReason::Block,
            });
        }

        if board.is_column_open(CENTER_COLUMN) {
            return Some(BotDecision {
                column: CENTER_COLUMN,
                reason: DecisionReason::Center,
            });
        }

        board.legal_columns().next().map(|column| BotDecision {
            column,
            reason: DecisionReason::FirstLegal,
        })
    }
}

/// Column choice for the default bot seat (player two).
pub fn choose_column(board: &Board) -> Option<usize> {
    BotDecisionMaker::default()
        .decide(board)
        .map(|decision| decision.column)
}

/// Lowest-indexed open column where a drop by `mark` makes four in a row.
fn winning_column(board: &Board, mark: PlayerNumber) -> Option<usize> {
    board.legal_columns().find(|&column| {
        let mut trial = *board;
        trial.drop_piece(column, mark).is_ok() && trial.has_four_in_row(mark)
    })
}
