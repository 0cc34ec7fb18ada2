//! rscritical - 关键CSS提取、缓存与样式表延迟加载引擎

// 导出全局错误类型
pub use self::error::{CriticalCssError, CssResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, ExtractionMode, OptimizerConfig};

// 导出资源模块核心接口
pub use self::asset::{AssetRegistry, HtmlExtractor, StyleRegistry, StylesheetDescriptor, ThemeInfo};

// 导出CSS处理核心接口
pub use self::css::{Classification, CriticalSelectors, CssMinifier, SelectorClassifier, extract_critical};

// 导出缓存与拉取接口
pub use self::cache::{CacheStore, CachedFragment, FileCacheStore, MemoryCacheStore, cache_key, unix_now};
pub use self::fetcher::{HttpFetcher, RemoteFetcher};

// 导出优化模块核心接口
pub use self::optimizer::{
    CriticalCss, DeferredStyle, FetchPriority, HeadBuffer, PageRewriter, RenderSink, StyleRenderer,
};

// 导出工具模块核心接口
pub use self::utils::UrlResolver;

// 声明所有子模块
pub mod config;
pub mod error;
pub mod asset;
pub mod css;
pub mod cache;
pub mod fetcher;
pub mod optimizer;
pub mod utils;
