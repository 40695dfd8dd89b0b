//! Catalog registries - per-cashier cartelas and win patterns
//!
//! Every write re-validates the grid or mask. Catalog writes run in their own
//! redb write transaction, so they serialize with game commands and see the
//! live game exactly as the manager last committed it.

mod cartelas;
mod win_patterns;


use crate::storage::{HallStorage, StorageError, classify_storage_error};
use redb::WriteTransaction;
use shared::error::{AppError, ErrorCode};
use shared::models::{GridError, MaskError};
use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cartela {0} not found")]
    CartelaNotFound(u32),

    #[error("Cartela {0} already exists")]
    CartelaExists(u32),

    #[error("Invalid cartela grid: {0}")]
    InvalidGrid(#[from] GridError),

    #[error("Cartela {0} is used by the live game")]
    CartelaInUse(u32),

    #[error("Win pattern {0} not found")]
    PatternNotFound(String),

    #[error("Win pattern '{0}' already exists")]
    PatternNameExists(String),

    #[error("Invalid win pattern: {0}")]
    InvalidPattern(#[from] MaskError),

    #[error("{0}")]
    Validation(String),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::Storage(e) => classify_storage_error(e),
            CatalogError::CartelaNotFound(_) => ErrorCode::CartelaNotFound,
            CatalogError::CartelaExists(_) => ErrorCode::CartelaExists,
            CatalogError::InvalidGrid(_) => ErrorCode::InvalidCartelaGrid,
            CatalogError::CartelaInUse(_) => ErrorCode::CartelaInUse,
            CatalogError::PatternNotFound(_) => ErrorCode::WinPatternNotFound,
            CatalogError::PatternNameExists(_) => ErrorCode::WinPatternNameExists,
            CatalogError::InvalidPattern(_) => ErrorCode::InvalidWinPattern,
            CatalogError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let code = err.code();
        if let CatalogError::Storage(e) = &err {
            tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
        }
        AppError::with_message(code, err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Cartela and win-pattern registries over the hall database
#[derive(Debug, Clone)]
pub struct CatalogService {
    storage: HallStorage,
}

impl CatalogService {
    pub fn new(storage: HallStorage) -> Self {
        Self { storage }
    }

    /// Cartela referenced by the cashier's live game (bet or selection)
    fn ensure_not_in_use(
        &self,
        txn: &WriteTransaction,
        cashier_id: &str,
        cartela_id: u32,
    ) -> CatalogResult<()> {
        if let Some(live) = self.storage.get_live_game_txn(txn, cashier_id)?
            && (live.placed_bet_cartelas.contains(&cartela_id)
                || live.selected_cartelas.contains(&cartela_id))
        {
            return Err(CatalogError::CartelaInUse(cartela_id));
        }
        Ok(())
    }
}
