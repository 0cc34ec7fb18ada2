//! 工具模块
pub mod url_resolver;

// 导出核心接口
pub use self::url_resolver::UrlResolver;
