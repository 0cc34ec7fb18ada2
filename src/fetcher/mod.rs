//! 拉取模块：样式表正文的远程获取（唯一的网络I/O依赖）
pub mod http_fetcher;

// 导出核心接口
pub use self::http_fetcher::{HttpFetcher, RemoteFetcher};
