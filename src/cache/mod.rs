//! 缓存模块：关键CSS片段的过期键值存储
pub mod store;
pub mod memory;
pub mod file;

// 导出核心接口
pub use self::store::{CacheStore, CachedFragment, cache_key, unix_now};
pub use self::memory::MemoryCacheStore;
pub use self::file::FileCacheStore;
