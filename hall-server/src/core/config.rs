use std::path::PathBuf;
use std::time::Duration;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (hall.redb, 日志) |
/// | HTTP_PORT | 3000 | REST + WebSocket 端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BUSINESS_TIMEZONE | UTC | 游戏编号按此时区换日 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (未设置) | 设置后按天滚动写文件 |
/// | TRUST_IDENTITY_HEADERS | 非生产环境为 true | 信任网关转发的身份头 |
/// | WS_PING_INTERVAL_SECS | 30 | WebSocket 心跳间隔 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/hall HTTP_PORT=8080 BUSINESS_TIMEZONE=Africa/Addis_Ababa cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// IANA 时区名
    pub business_timezone: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub trust_identity_headers: bool,
    pub ws_ping_interval_secs: u64,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let trust_default = environment != "production";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            business_timezone: std::env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty()),
            trust_identity_headers: env_parse("TRUST_IDENTITY_HEADERS").unwrap_or(trust_default),
            ws_ping_interval_secs: env_parse("WS_PING_INTERVAL_SECS")
                .filter(|&s: &u64| s > 0)
                .unwrap_or(30),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS").unwrap_or(30000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS").unwrap_or(10000),
            environment,
        }
    }

    /// 使用自定义工作目录和端口 (测试用)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("hall.redb")
    }

    pub fn ws_ping_interval(&self) -> Duration {
        Duration::from_secs(self.ws_ping_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_and_paths() {
        let config = Config::with_overrides("/tmp/hall", 8080);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/hall/hall.redb"));
        assert!(config.ws_ping_interval_secs > 0);
    }
}
