//! Connect 4 board for the dropline engine
//!
//! Connect 4 is a two-player connection game where players drop colored discs
//! into a 7-column, 6-row vertically suspended grid. The objective is to be
//! the first to form a horizontal, vertical, or diagonal line of four discs.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! # Usage
//!
//! ```rust
//! use engine_core::{BoardEngine, Player};
//! use games_connect4::Connect4Board;
//!
//! let mut board = Connect4Board::new();
//! board.apply_move(3, Player::Red).unwrap();
//! assert_eq!(board.pieces(), 1);
//! board.undo_move(3, Player::Red).unwrap();
//! assert_eq!(board, Connect4Board::new());
//! ```

use std::fmt;

use engine_core::{BoardEngine, BoardError, Player};

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Pieces in a row needed to win
pub const CONNECT: usize = 4;

/// Direction vectors: horizontal, vertical, diagonal /, diagonal \
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Connect4 board
///
/// Holds only the grid and per-column heights. Whose turn it is lives with
/// the caller, which passes the mover to every apply/undo.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connect4Board {
    /// Stored in row-major order with row 0 at the bottom
    cells: [Option<Player>; BOARD_SIZE],
    /// Number of pieces in each column (0-6)
    column_heights: [u8; COLS],
}

impl Connect4Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            cells: [None; BOARD_SIZE],
            column_heights: [0; COLS],
        }
    }

    /// Build a board by alternating moves, Red first.
    pub fn from_moves(columns: &[u8]) -> Result<Self, BoardError> {
        let mut board = Self::new();
        let mut player = Player::Red;
        for &column in columns {
            board.apply_move(column, player)?;
            player = player.opponent();
        }
        Ok(board)
    }

    /// Convert column and row to board index
    #[inline]
    fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Piece at (col, row), row 0 at the bottom
    pub fn cell(&self, col: usize, row: usize) -> Option<Player> {
        if col >= COLS || row >= ROWS {
            return None;
        }
        self.cells[Self::pos(col, row)]
    }

    /// Number of pieces in `col`
    pub fn height(&self, col: usize) -> usize {
        self.column_heights.get(col).copied().unwrap_or(0) as usize
    }

    /// Bit-mask representation of legal moves.
    ///
    /// Bits 0-6 correspond to columns 0-6. A bit set to 1 indicates the
    /// column is not full and a piece can be dropped there.
    pub fn legal_moves_mask(&self) -> u8 {
        self.column_heights
            .iter()
            .enumerate()
            .fold(0u8, |mask, (col, &height)| {
                if height < ROWS as u8 {
                    mask | (1u8 << col)
                } else {
                    mask
                }
            })
    }

    /// Length of the run through (col, row) along (dc, dr), counting the cell itself.
    fn run_length(&self, col: usize, row: usize, dc: i32, dr: i32) -> usize {
        let Some(player) = self.cell(col, row) else {
            return 0;
        };

        let mut count = 1;
        for sign in [1, -1] {
            let (mut c, mut r) = (col as i32 + sign * dc, row as i32 + sign * dr);
            while c >= 0 && c < COLS as i32 && r >= 0 && r < ROWS as i32 {
                if self.cells[Self::pos(c as usize, r as usize)] != Some(player) {
                    break;
                }
                count += 1;
                c += sign * dc;
                r += sign * dr;
            }
        }
        count
    }

    /// Check if the piece at (col, row) completes a line of four
    fn wins_at(&self, col: usize, row: usize) -> bool {
        DIRECTIONS
            .iter()
            .any(|&(dc, dr)| self.run_length(col, row, dc, dr) >= CONNECT)
    }

    fn check_column(&self, column: u8) -> Result<usize, BoardError> {
        let col = column as usize;
        if col >= COLS {
            return Err(BoardError::ColumnOutOfRange {
                column,
                width: COLS,
            });
        }
        Ok(col)
    }
}

impl Default for Connect4Board {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardEngine for Connect4Board {
    fn winner(&self) -> Option<Player> {
        for col in 0..COLS {
            for row in 0..self.height(col) {
                if self.wins_at(col, row) {
                    return self.cell(col, row);
                }
            }
        }
        None
    }

    fn legal_moves(&self) -> Vec<u8> {
        let mask = self.legal_moves_mask();
        (0..COLS as u8).filter(|&col| mask & (1 << col) != 0).collect()
    }

    fn apply_move(&mut self, column: u8, player: Player) -> Result<(), BoardError> {
        let col = self.check_column(column)?;
        let row = self.column_heights[col] as usize;
        if row >= ROWS {
            return Err(BoardError::ColumnFull(column));
        }

        self.cells[Self::pos(col, row)] = Some(player);
        self.column_heights[col] += 1;
        Ok(())
    }

    fn undo_move(&mut self, column: u8, player: Player) -> Result<(), BoardError> {
        let col = self.check_column(column)?;
        let height = self.column_heights[col] as usize;
        if height == 0 {
            return Err(BoardError::ColumnEmpty(column));
        }

        let pos = Self::pos(col, height - 1);
        match self.cells[pos] {
            Some(found) if found == player => {
                self.cells[pos] = None;
                self.column_heights[col] -= 1;
                Ok(())
            }
            Some(found) => Err(BoardError::WrongPlayer {
                column,
                expected: player,
                found,
            }),
            // Heights and cells disagree; report it as an empty column.
            None => Err(BoardError::ColumnEmpty(column)),
        }
    }

    fn width(&self) -> usize {
        COLS
    }

    fn pieces(&self) -> usize {
        self.column_heights.iter().map(|&h| h as usize).sum()
    }
}

impl fmt::Display for Connect4Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let symbol = self.cell(col, row).map(Player::symbol).unwrap_or('.');
                if col > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        let footer: Vec<String> = (0..COLS).map(|c| c.to_string()).collect();
        write!(f, "{}", footer.join(" "))
    }
}
