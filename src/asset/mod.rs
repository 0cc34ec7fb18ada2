//! 资源模块：样式表描述、资源注册表与HTML提取
pub mod model;
pub mod html_extractor;

// 导出核心接口
pub use self::model::{AssetRegistry, StyleRegistry, StylesheetDescriptor, ThemeInfo};
pub use self::html_extractor::{HtmlExtractor, StyleLink, is_stylesheet_rel, link_handle};
