/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Random v4 UUID as a string, used for bet ids, game instances and events.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 16-char hex token for session keys and display tokens.
pub fn short_token() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..16].to_string()
}
