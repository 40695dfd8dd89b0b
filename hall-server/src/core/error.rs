use thiserror::Error;

use crate::games::ManagerError;
use crate::storage::StorageError;

/// 进程级错误 (启动 / 监听 / 关闭)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("恢复失败: {0}")]
    Recovery(#[from] ManagerError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
