//! 样式表分类器
//! 根据handle与源URL将样式表判定为 关键 / 后台 / 普通

use std::fmt;

use crate::asset::ThemeInfo;
use crate::config::OptimizerConfig;

/// 分类结果（派生值，不存储）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// 整表内联
    Critical,
    /// 永不读取、拉取或输出
    Admin,
    /// 按关键选择器过滤
    Plain,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Classification::Critical => "critical",
            Classification::Admin => "admin",
            Classification::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// 样式表分类器（纯函数，依赖仅来自构造参数与调用参数）
#[derive(Debug, Clone, Default)]
pub struct SelectorClassifier {
    admin_patterns: Vec<String>,
    critical_handle_patterns: Vec<String>,
}

impl SelectorClassifier {
    pub fn new(admin_patterns: Vec<String>, critical_handle_patterns: Vec<String>) -> Self {
        Self {
            admin_patterns,
            critical_handle_patterns,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(
            config.admin_patterns.clone(),
            config.critical_handle_patterns.clone(),
        )
    }

    /// 分类：后台优先，其次关键，其余为普通
    pub fn classify(
        &self,
        handle: &str,
        source_url: Option<&str>,
        theme: Option<&ThemeInfo>,
    ) -> Classification {
        if self.is_admin(handle, source_url) {
            Classification::Admin
        } else if self.is_critical(handle, theme) {
            Classification::Critical
        } else {
            Classification::Plain
        }
    }

    /// handle或源URL包含任一排除子串（区分大小写）
    pub fn is_admin(&self, handle: &str, source_url: Option<&str>) -> bool {
        let hit = |target: &str| {
            self.admin_patterns
                .iter()
                .any(|p| !p.is_empty() && target.contains(p.as_str()))
        };
        hit(handle) || source_url.is_some_and(hit)
    }

    /// handle包含关键子串，或是主题样式本身/主题依赖
    pub fn is_critical(&self, handle: &str, theme: Option<&ThemeInfo>) -> bool {
        self.critical_handle_patterns
            .iter()
            .any(|p| !p.is_empty() && handle.contains(p.as_str()))
            || theme.is_some_and(|t| t.owns(handle))
    }
}
