//! 优化模块：关键CSS编排、渲染输出与首屏媒体优先级
pub mod critical;
pub mod render;
pub mod fetch_priority;
pub mod page_rewriter;

// 导出核心接口
pub use self::critical::CriticalCss;
pub use self::render::{DeferredStyle, HeadBuffer, RenderSink, StyleRenderer};
pub use self::fetch_priority::FetchPriority;
pub use self::page_rewriter::PageRewriter;
