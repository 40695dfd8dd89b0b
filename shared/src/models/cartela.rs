//! Cartela Model
//!
//! A cartela is a 5×5 bingo card. `pattern[row][col]`; column `j` holds the
//! band `15j+1 ..= 15j+15`, and the center cell is the free space (`0`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid side length
pub const GRID_SIZE: usize = 5;

/// Value of the free center cell
pub const FREE_SPACE: u8 = 0;

/// Center cell coordinate
pub const CENTER: usize = 2;

/// Highest ball number
pub const MAX_NUMBER: u8 = 75;

/// Validated 5×5 number grid
pub type CartelaGrid = [[u8; GRID_SIZE]; GRID_SIZE];

/// Cartela entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cartela {
    pub cashier_id: String,
    /// Unique per cashier, not globally
    pub cartela_id: u32,
    pub pattern: CartelaGrid,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create cartela payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartelaCreate {
    pub cartela_id: u32,
    pub pattern: Vec<Vec<u8>>,
    pub is_active: Option<bool>,
}

/// Update cartela payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartelaUpdate {
    pub pattern: Option<Vec<Vec<u8>>>,
    pub is_active: Option<bool>,
}

/// Grid rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid must have 5 rows, got {0}")]
    RowCount(usize),

    #[error("row {row} must have 5 cells, got {len}")]
    RowLength { row: usize, len: usize },

    #[error("center cell must be the free space (0), got {0}")]
    CenterNotFree(u8),

    #[error("cell ({row},{col}) = {value} is outside column band {min}-{max}")]
    OutOfBand {
        row: usize,
        col: usize,
        value: u8,
        min: u8,
        max: u8,
    },

    #[error("number {0} appears more than once")]
    DuplicateNumber(u8),
}

/// Inclusive number band for a column
pub fn column_band(col: usize) -> (u8, u8) {
    let min = (col as u8) * 15 + 1;
    (min, min + 14)
}

/// Column a ball number belongs to (B-I-N-G-O)
pub fn column_of(number: u8) -> Option<usize> {
    if (1..=MAX_NUMBER).contains(&number) {
        Some(((number - 1) / 15) as usize)
    } else {
        None
    }
}

/// Check shape, free space, column bands and duplicates; return the fixed grid.
pub fn validate_grid(rows: &[Vec<u8>]) -> Result<CartelaGrid, GridError> {
    if rows.len() != GRID_SIZE {
        return Err(GridError::RowCount(rows.len()));
    }

    let mut grid: CartelaGrid = [[FREE_SPACE; GRID_SIZE]; GRID_SIZE];
    let mut seen = [false; MAX_NUMBER as usize + 1];

    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != GRID_SIZE {
            return Err(GridError::RowLength {
                row,
                len: cells.len(),
            });
        }
        for (col, &value) in cells.iter().enumerate() {
            if row == CENTER && col == CENTER {
                if value != FREE_SPACE {
                    return Err(GridError::CenterNotFree(value));
                }
                continue;
            }

            let (min, max) = column_band(col);
            if value < min || value > max {
                return Err(GridError::OutOfBand {
                    row,
                    col,
                    value,
                    min,
                    max,
                });
            }
            if seen[value as usize] {
                return Err(GridError::DuplicateNumber(value));
            }
            seen[value as usize] = true;
            grid[row][col] = value;
        }
    }

    Ok(grid)
}

impl Cartela {
    /// All 24 numbers on the card (free space excluded)
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.pattern
            .iter()
            .flatten()
            .copied()
            .filter(|&n| n != FREE_SPACE)
    }
}
