use crate::games::error::GameError;
use crate::storage::{StorageError, classify_storage_error};
use shared::error::{AppError, ErrorCode};
use shared::game::CommandError;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ManagerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ManagerError::Storage(e) => classify_storage_error(e),
            ManagerError::Game(e) => e.code(),
            ManagerError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string(); // 保留技术细节用于日志/调试
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                CommandError::new(code, message)
            }
            ManagerError::Game(e) => CommandError::new(e.code(), e.to_string()),
            ManagerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal manager error");
                CommandError::new(ErrorCode::InternalError, msg)
            }
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        CommandError::from(err).into()
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
