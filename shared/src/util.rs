/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 去除首尾空白后判断是否为空
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
