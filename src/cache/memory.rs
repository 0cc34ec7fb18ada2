//! 进程内缓存存储

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{CacheStore, CachedFragment};
use crate::error::CssResult;

/// 内存缓存（进程内多任务共享）
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CachedFragment>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 条目数（含已过期但未覆盖的条目）
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str, now: u64) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|fragment| fragment.is_fresh(now))
            .map(|fragment| fragment.css_text.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64, now: u64) -> CssResult<()> {
        let fragment = CachedFragment::new(key, value, ttl_secs, now);
        self.entries.write().await.insert(key.to_string(), fragment);
        Ok(())
    }

    async fn clear(&self) -> CssResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
