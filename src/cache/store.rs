//! 缓存存储抽象
//! 键值 + 过期时间；读取时自动忽略已过期的条目

use std::time::{SystemTime, UNIX_EPOCH};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CssResult;

/// 缓存片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFragment {
    pub key: String,
    pub css_text: String,
    /// 过期时间（Unix秒）
    pub expires_at: u64,
}

impl CachedFragment {
    pub fn new(key: impl Into<String>, css_text: impl Into<String>, ttl_secs: u64, now: u64) -> Self {
        Self {
            key: key.into(),
            css_text: css_text.into(),
            expires_at: now.saturating_add(ttl_secs),
        }
    }

    pub fn is_fresh(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

/// 共享的过期键值存储（外部协作者）
///
/// 多个请求可并发读写同一个键，不加锁保证一致性，最后写入者生效。
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 读取未过期的值；不存在、已过期或读取失败均返回None
    async fn get(&self, key: &str, now: u64) -> Option<String>;

    /// 写入值，`ttl_secs` 秒后过期
    async fn set(&self, key: &str, value: &str, ttl_secs: u64, now: u64) -> CssResult<()>;

    /// 清空全部条目
    async fn clear(&self) -> CssResult<()>;
}

/// 当前Unix时间（秒）
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 缓存键：前缀 + 源URL的md5
pub fn cache_key(prefix: &str, source_url: &str) -> String {
    format!("{}{:x}", prefix, md5::compute(source_url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key("cmp_critical_css_", "https://example.com/a.css");
        let b = cache_key("cmp_critical_css_", "https://example.com/a.css");
        let c = cache_key("cmp_critical_css_", "https://example.com/b.css");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("cmp_critical_css_"));
        assert_eq!(a.len(), "cmp_critical_css_".len() + 32);
    }

    #[test]
    fn test_fragment_expiry_boundary() {
        let fragment = CachedFragment::new("k", "body{}", 100, 1_000);
        assert!(fragment.is_fresh(1_099));
        assert!(!fragment.is_fresh(1_100));
    }
}
