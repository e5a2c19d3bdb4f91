use crate::error::{LifeError, Result};
use serde::{Deserialize, Serialize};

/// Encoded value of a live cell.
pub const ALIVE: u8 = 0xFF;
/// Encoded value of a dead cell.
pub const DEAD: u8 = 0x00;

pub type Row = Vec<u8>;

/// Coordinate of a live cell. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// A rectangular generation of the automaton.
///
/// Serialized as a plain `rows[][]` byte matrix. Construct through
/// [`Board::from_rows`] (or call [`Board::validate`] after deserializing) so the
/// shape invariants hold before the board reaches the turn loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Board {
    rows: Vec<Row>,
}

impl Board {
    /// Builds a board, rejecting empty, ragged or badly encoded input.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        let board = Self { rows };
        board.validate()?;
        Ok(board)
    }

    /// An all-dead board of the given size.
    pub fn dead(width: usize, height: usize) -> Result<Self> {
        Self::from_rows(vec![vec![DEAD; width]; height])
    }

    /// A dead board with the listed cells set alive.
    pub fn with_alive(width: usize, height: usize, cells: &[Cell]) -> Result<Self> {
        let mut board = Self::dead(width, height)?;
        for cell in cells {
            if cell.x >= width || cell.y >= height {
                return Err(LifeError::Config(format!(
                    "cell ({}, {}) lies outside a {}x{} board",
                    cell.x, cell.y, width, height
                )));
            }
            board.rows[cell.y][cell.x] = ALIVE;
        }
        Ok(board)
    }

    pub fn validate(&self) -> Result<()> {
        let width = match self.rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(LifeError::Config("board is empty".to_string())),
        };

        for (y, row) in self.rows.iter().enumerate() {
            if row.len() != width {
                return Err(LifeError::Config(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            if let Some(x) = row.iter().position(|&c| c != ALIVE && c != DEAD) {
                return Err(LifeError::Config(format!(
                    "cell ({}, {}) has invalid value {:#04x}",
                    x, y, row[x]
                )));
            }
        }

        Ok(())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .map(|&c| c == ALIVE)
            .unwrap_or(false)
    }

    /// Full scan, row-major.
    pub fn alive_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                if c == ALIVE {
                    cells.push(Cell { x, y });
                }
            }
        }
        cells
    }

    pub fn alive_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|&&c| c == ALIVE).count())
            .sum()
    }
}
