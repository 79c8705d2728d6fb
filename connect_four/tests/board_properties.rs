/// Property-based tests for the drop grid and win detection
///
/// These tests check drop placement, rejection of illegal drops and the
/// win detector against a brute-force reference over random boards.
use connect_four::bot::BotDecisionMaker;
use connect_four::game::{Board, COLS, MoveError, PlayerNumber, ROWS};
use proptest::prelude::*;

fn mark_strategy() -> impl Strategy<Value = PlayerNumber> {
    prop_oneof![Just(PlayerNumber::One), Just(PlayerNumber::Two)]
}

// Random sequence of (column, mark) drops; illegal ones are skipped when building.
fn drops_strategy() -> impl Strategy<Value = Vec<(usize, PlayerNumber)>> {
    prop::collection::vec((0..COLS, mark_strategy()), 0..=ROWS * COLS)
}

fn build(drops: &[(usize, PlayerNumber)]) -> Board {
    let mut board = Board::new();
    for &(column, mark) in drops {
        let _ = board.drop_piece(column, mark);
    }
    board
}

// Reference check: look for four equal cells starting at every cell in every direction.
fn brute_force_four(board: &Board, mark: PlayerNumber) -> bool {
    let directions: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
    for row in 0..ROWS as isize {
        for column in 0..COLS as isize {
            for (dr, dc) in directions {
                let all = (0..4).all(|k| {
                    let r = row + dr * k;
                    let c = column + dc * k;
                    r >= 0
                        && c >= 0
                        && (r as usize) < ROWS
                        && (c as usize) < COLS
                        && board.cell(r as usize, c as usize) == Some(mark)
                });
                if all {
                    return true;
                }
            }
        }
    }
    false
}

proptest! {
    #[test]
    fn test_drop_fills_lowest_empty_row(drops in drops_strategy(), column in 0..COLS, mark in mark_strategy()) {
        let board = build(&drops);
        prop_assume!(board.is_column_open(column));

        let expected_row = (0..ROWS).rev().find(|&row| board.cell(row, column).is_none()).unwrap();
        let mut after = board;
        let row = after.drop_piece(column, mark).unwrap();

        prop_assert_eq!(row, expected_row);
        prop_assert_eq!(after.cell(row, column), Some(mark));
        for r in 0..ROWS {
            for c in 0..COLS {
                if (r, c) != (row, column) {
                    prop_assert_eq!(after.cell(r, c), board.cell(r, c));
                }
            }
        }
    }

    #[test]
    fn test_full_column_rejected_without_change(drops in drops_strategy(), column in 0..COLS, mark in mark_strategy()) {
        let mut board = build(&drops);
        while board.is_column_open(column) {
            board.drop_piece(column, PlayerNumber::One).unwrap();
        }

        let before = board;
        prop_assert_eq!(board.drop_piece(column, mark), Err(MoveError::ColumnFull(column)));
        prop_assert_eq!(board, before);
    }

    #[test]
    fn test_out_of_range_rejected_without_change(drops in drops_strategy(), column in COLS..100usize) {
        let mut board = build(&drops);
        let before = board;
        prop_assert!(matches!(board.drop_piece(column, PlayerNumber::One), Err(MoveError::ColumnOutOfRange(_))));
        prop_assert_eq!(board, before);
    }

    #[test]
    fn test_win_detector_matches_reference(drops in drops_strategy()) {
        let board = build(&drops);
        for mark in [PlayerNumber::One, PlayerNumber::Two] {
            prop_assert_eq!(board.has_four_in_row(mark), brute_force_four(&board, mark));
        }
    }

    #[test]
    fn test_bot_always_picks_open_column(drops in drops_strategy()) {
        let board = build(&drops);
        prop_assume!(!board.is_full());

        let decision = BotDecisionMaker::default().decide(&board).unwrap();
        prop_assert!(board.is_column_open(decision.column));
    }
}

#[test]
fn test_empty_board_has_no_four() {
    let board = Board::new();
    assert!(!board.has_four_in_row(PlayerNumber::One));
    assert!(!board.has_four_in_row(PlayerNumber::Two));
}

#[test]
fn test_three_in_a_row_is_not_a_win() {
    let mut board = Board::new();
    for column in 0..3 {
        board.drop_piece(column, PlayerNumber::One).unwrap();
    }
    assert!(!board.has_four_in_row(PlayerNumber::One));
    board.drop_piece(3, PlayerNumber::One).unwrap();
    assert!(board.has_four_in_row(PlayerNumber::One));
}
