//! CSS模块：分类、规则提取与压缩
pub mod classifier;
pub mod extractor;
pub mod minifier;

// 导出核心接口
pub use self::classifier::{Classification, SelectorClassifier};
pub use self::extractor::{CriticalSelectors, extract_critical};
pub use self::minifier::CssMinifier;
