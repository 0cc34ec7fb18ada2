//! 本地文件缓存存储
//! 每个键一个MessagePack文件，跨进程/跨运行共享

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use rmp_serde::{Serializer, from_slice};
use serde::Serialize;
use tracing::{debug, warn};

use super::store::{CacheStore, CachedFragment};
use crate::error::{CriticalCssError, CssResult};

const CACHE_FILE_EXT: &str = "mp";

/// 文件缓存
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// 键 -> 文件路径（非 [A-Za-z0-9_-] 字符替换为 _）
    fn entry_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.{}", file_stem, CACHE_FILE_EXT))
    }

    async fn load_fragment(&self, key: &str) -> CssResult<CachedFragment> {
        let cache_data = tokio::fs::read(self.entry_path(key)).await?;
        let fragment: CachedFragment = from_slice(&cache_data)
            .map_err(|e| CriticalCssError::MsgPackError(format!("decode failed: {}", e)))?;

        // 文件名经过替换，需校验原始键防止碰撞
        if fragment.key != key {
            return Err(CriticalCssError::CacheError(format!(
                "key mismatch: expected {}, found {}",
                key, fragment.key
            )));
        }
        Ok(fragment)
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &str, now: u64) -> Option<String> {
        match self.load_fragment(key).await {
            Ok(fragment) if fragment.is_fresh(now) => Some(fragment.css_text),
            Ok(_) => {
                debug!("Cache entry [{}] expired", key);
                None
            }
            Err(CriticalCssError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Cache entry [{}] unreadable, treating as miss: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64, now: u64) -> CssResult<()> {
        let fragment = CachedFragment::new(key, value, ttl_secs, now);
        let mut cache_data = Vec::new();
        fragment
            .serialize(&mut Serializer::new(&mut cache_data))
            .map_err(|e| CriticalCssError::MsgPackError(format!("encode failed: {}", e)))?;

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        tokio::fs::write(self.entry_path(key), cache_data).await?;
        debug!("Cache entry [{}] written, expires at {}", key, fragment.expires_at);
        Ok(())
    }

    async fn clear(&self) -> CssResult<()> {
        let mut dir = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == CACHE_FILE_EXT) {
                tokio::fs::remove_file(&path).await?;
            }
        }
        Ok(())
    }
}
