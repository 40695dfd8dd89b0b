//! Win Pattern Model

use super::cartela::{CENTER, GRID_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 5×5 mask: `true` cells must be marked for the pattern to match
pub type PatternMask = [[bool; GRID_SIZE]; GRID_SIZE];

/// Win pattern entity (name unique per cashier)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinPattern {
    pub id: String,
    pub cashier_id: String,
    pub name: String,
    pub pattern: PatternMask,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create win pattern payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinPatternCreate {
    pub name: String,
    pub pattern: Vec<Vec<bool>>,
    pub is_active: Option<bool>,
}

/// Update win pattern payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WinPatternUpdate {
    pub name: Option<String>,
    pub pattern: Option<Vec<Vec<bool>>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("mask must have 5 rows, got {0}")]
    RowCount(usize),

    #[error("mask row {row} must have 5 cells, got {len}")]
    RowLength { row: usize, len: usize },

    #[error("mask must require at least one cell")]
    Empty,

    #[error("mask must require a cell other than the free space")]
    FreeSpaceOnly,
}

/// Check the 5×5 shape and return the fixed mask.
pub fn validate_mask(rows: &[Vec<bool>]) -> Result<PatternMask, MaskError> {
    if rows.len() != GRID_SIZE {
        return Err(MaskError::RowCount(rows.len()));
    }
    let mut mask: PatternMask = [[false; GRID_SIZE]; GRID_SIZE];
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != GRID_SIZE {
            return Err(MaskError::RowLength {
                row,
                len: cells.len(),
            });
        }
        mask[row].copy_from_slice(cells);
    }
    if !mask.iter().flatten().any(|&c| c) {
        return Err(MaskError::Empty);
    }
    // 中心格恒为已标记, 只要求中心的图案开局即中
    let outside_center = mask.iter().enumerate().any(|(r, cells)| {
        cells
            .iter()
            .enumerate()
            .any(|(c, &on)| on && (r, c) != (CENTER, CENTER))
    });
    if !outside_center {
        return Err(MaskError::FreeSpaceOnly);
    }
    Ok(mask)
}

impl WinPattern {
    /// Number of cells the pattern requires
    pub fn required_cells(&self) -> usize {
        self.pattern.iter().flatten().filter(|&&c| c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal() -> Vec<Vec<bool>> {
        (0..5).map(|r| (0..5).map(|c| r == c).collect()).collect()
    }

    #[test]
    fn test_valid_mask() {
        let mask = validate_mask(&diagonal()).unwrap();
        assert!(mask[0][0] && mask[4][4]);
        assert!(!mask[0][4]);
    }

    #[test]
    fn test_mask_shape_errors() {
        let mut rows = diagonal();
        rows.truncate(3);
        assert_eq!(validate_mask(&rows), Err(MaskError::RowCount(3)));

        let mut rows = diagonal();
        rows[2].pop();
        assert_eq!(
            validate_mask(&rows),
            Err(MaskError::RowLength { row: 2, len: 4 })
        );
    }

    #[test]
    fn test_empty_mask_rejected() {
        let rows = vec![vec![false; 5]; 5];
        assert_eq!(validate_mask(&rows), Err(MaskError::Empty));
    }

    #[test]
    fn test_free_space_only_mask_rejected() {
        let mut rows = vec![vec![false; 5]; 5];
        rows[2][2] = true;
        assert_eq!(validate_mask(&rows), Err(MaskError::FreeSpaceOnly));

        rows[0][0] = true;
        assert!(validate_mask(&rows).is_ok());
    }
}
