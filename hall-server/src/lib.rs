//! Bingo Hall Server - 游戏会话与结算引擎
//!
//! # 架构概述
//!
//! - **游戏引擎** (`games`): 编号分配、状态机、下注账本、卡片验证、结算归档
//! - **目录** (`catalog`): 卡片与中奖图案
//! - **存储** (`storage`): 嵌入式 redb
//! - **实时同步** (`realtime`): 会话频道、在线状态、WebSocket
//! - **HTTP API** (`api`): REST 接口
//! - **认证** (`auth`): 网关转发的 Principal
//!
//! # 模块结构
//!
//! ```text
//! hall-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # Principal 提取器、身份头中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 卡片 / 中奖图案注册表
//! ├── games/         # 游戏引擎 + GameManager
//! ├── realtime/      # hub、转发器、快照、WebSocket
//! ├── storage/       # redb 表与事务
//! └── utils/         # 日志、时钟
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod games;
pub mod realtime;
pub mod storage;
pub mod utils;

// Re-export 公共类型
pub use catalog::{CatalogError, CatalogService};
pub use core::{Config, Server, ServerState};
pub use games::{GameError, GameManager, ManagerError};
pub use realtime::RealtimeHub;
pub use storage::{HallStorage, StorageError};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    __          ____   __          ____
   / /_  ____ _/ / /  / /_  ____  / __ \
  / __ \/ __ `/ / /  / __ \/ __ \/ / / /
 / / / / /_/ / / /  / /_/ / /_/ / /_/ /
/_/ /_/\__,_/_/_/  /_.___/\____/\____/
    "#
    );
}
