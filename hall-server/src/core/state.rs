use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogService;
use crate::core::Config;
use crate::core::error::Result;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::games::GameManager;
use crate::realtime::{RealtimeHub, forwarder};
use crate::storage::HallStorage;
use crate::utils::time::{SystemClock, parse_timezone};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是大厅服务器的核心状态容器，使用 Arc 实现浅拷贝，
/// 所有服务都可以在线程间安全共享。
///
/// # 组件说明
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 服务器配置 |
/// | manager | Arc<GameManager> | 游戏命令处理 / 查询 |
/// | catalog | CatalogService | 卡片与中奖图案目录 |
/// | hub | RealtimeHub | 会话频道 + 管理员频道 |
/// | started_at | Instant | 启动时刻 (uptime) |
/// | shutdown | CancellationToken | 关闭信号 (WebSocket 连接 + 后台任务) |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub manager: Arc<GameManager>,
    pub catalog: CatalogService,
    pub hub: RealtimeHub,
    pub started_at: Instant,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Assemble a state over an existing manager (tests, embedding)
    pub fn new(config: Config, manager: Arc<GameManager>) -> Self {
        let catalog = CatalogService::new(manager.storage().clone());
        Self {
            config,
            manager,
            catalog,
            hub: RealtimeHub::new(),
            started_at: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化:
    /// 1. 工作目录
    /// 2. 数据库 (work_dir/hall.redb)
    /// 3. GameManager + 启动恢复
    /// 4. 目录服务 / 实时频道
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let tz = parse_timezone(&config.business_timezone);
        let db_path = config.database_path();
        let storage = HallStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Hall database opened");

        let manager = GameManager::with_clock(storage, tz, Arc::new(SystemClock));
        let retired = manager.recover()?;
        let live = manager.live_games()?.len();
        tracing::info!(live_games = live, retired, "Startup recovery finished");

        Ok(Self::new(config.clone(), Arc::new(manager)))
    }

    /// 启动后台任务
    ///
    /// - event_forwarder: GameManager 事件 → RealtimeHub
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let source = self.manager.subscribe();
        let hub = self.hub.clone();
        let shutdown = tasks.shutdown_token();
        tasks.spawn("event_forwarder", TaskKind::Listener, async move {
            forwarder::run(hub, source, shutdown).await;
        });
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
