//! Fixed 6x7 drop grid and four-in-a-row detection.

use super::{entities::PlayerNumber, errors::MoveError};

/// Number of rows in the grid.
pub const ROWS: usize = 6;

/// Number of columns in the grid.
pub const COLS: usize = 7;

/// Column the bot prefers when nothing forces its hand.
pub const CENTER_COLUMN: usize = COLS / 2;

/// Length of a winning run.
const RUN: usize = 4;

/// Row/column steps for the four scan directions: horizontal, vertical,
/// down-right diagonal and down-left diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Connect Four grid. Row 0 is the top, row `ROWS - 1` the bottom.
///
/// The only mutation is [`Board::drop_piece`], which fills the lowest
/// empty cell of a column; filled cells are never overwritten.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Board {
    cells: [[Option<PlayerNumber>; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<PlayerNumber> {
        self.cells[row][column]
    }

    /// A column accepts drops while its top cell is empty.
    pub fn is_column_open(&self, column: usize) -> bool {
        column < COLS && self.cells[0][column].is_none()
    }

    /// Open columns in ascending order.
    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLS).filter(|&column| self.is_column_open(column))
    }

    pub fn is_full(&self) -> bool {
        self.legal_columns().next().is_none()
    }

    /// Drop a piece into `column` and return the row it landed in.
    ///
    /// # Errors
    ///
    /// * `MoveError::ColumnOutOfRange` - column is outside `0..COLS`
    /// * `MoveError::ColumnFull` - the column's top cell is occupied
    ///
    /// The board is left untouched on error.
    pub fn drop_piece(&mut self, column: usize, mark: PlayerNumber) -> Result<usize, MoveError> {
        if column >= COLS {
            return Err(MoveError::ColumnOutOfRange(column as i64));
        }

        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][column].is_none())
            .ok_or(MoveError::ColumnFull(column))?;

        self.cells[row][column] = Some(mark);
        Ok(row)
    }

    /// Whether `mark` owns four consecutive cells in a row, column or either
    /// diagonal.
    pub fn has_four_in_row(&self, mark: PlayerNumber) -> bool {
        (0..ROWS).any(|row| {
            (0..COLS).any(|column| {
                DIRECTIONS
                    .iter()
                    .any(|&(dr, dc)| self.run_from(row, column, dr, dc, mark))
            })
        })
    }

    fn run_from(&self, row: usize, column: usize, dr: isize, dc: isize, mark: PlayerNumber) -> bool {
        (0..RUN as isize).all(|step| {
            let r = row as isize + dr * step;
            let c = column as isize + dc * step;
            (0..ROWS as isize).contains(&r)
                && (0..COLS as isize).contains(&c)
                && self.cells[r as usize][c as usize] == Some(mark)
        })
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Wire representation: 0 for empty, otherwise the player number.
    pub fn to_grid(&self) -> [[u8; COLS]; ROWS] {
        let mut grid = [[0u8; COLS]; ROWS];
        for (row, cells) in self.cells.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                grid[row][column] = cell.map_or(0, PlayerNumber::as_u8);
            }
        }
        grid
    }
}
