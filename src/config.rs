//! 全局配置管理,存储所有可配置项

use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::CssResult;

/// 非关键样式表的规则提取模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// 样式表正文出现任一关键选择器即整表输出，否则按规则块提取
    #[default]
    WholeSheetOnHit,
    /// 始终只输出匹配的规则块
    RuleBlocks,
}

/// 全局配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    // 站点根URL，用于补全以 / 开头的样式表路径
    pub site_url: String,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 缓存有效期（单位：秒）
    pub cache_ttl: u64,
    pub cache_key_prefix: String,
    // 后台/定制器样式：handle或URL包含任一子串即排除
    pub admin_patterns: Vec<String>,
    // 主题/页面构建器样式：handle包含任一子串即整表内联
    pub critical_handle_patterns: Vec<String>,
    // 首屏关键选择器（顺序即提取顺序）
    pub critical_selectors: Vec<String>,
    // 固定输出在最前面的基础CSS
    pub base_css: String,
    pub extraction_mode: ExtractionMode,
    // 设置 fetchpriority=high 的图片/视频数量上限
    pub max_priority_images: usize,
    pub max_priority_videos: usize,
    pub style_block_id: String,
    // 是否启用详细日志
    pub verbose: bool,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const DEFAULT_SITE_URL: &str = "http://localhost/";

impl OptimizerConfig {
    /// site_url 仍是内置默认值（未经配置设置）
    pub fn has_default_site_url(&self) -> bool {
        self.site_url == DEFAULT_SITE_URL
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            http_timeout: 30,
            cache_ttl: 86_400,
            cache_key_prefix: "cmp_critical_css_".to_string(),
            admin_patterns: to_strings(&[
                "/wp-admin/",
                "/wp-includes/css/admin-",
                "/wp-includes/css/customize-",
                "/wp-includes/css/dashboard",
                "admin-bar",
                "wp-admin",
                "admin-menu",
                "admin-comments",
                "press-this",
                "admin-customizer",
                "customize-controls",
                "customize-widgets",
                "customize-preview",
                "wp-auth-check",
            ]),
            critical_handle_patterns: to_strings(&[
                "theme",
                "style",
                "main",
                "global-styles",
                "astra",
                "generatepress",
                "kadence",
                "oceanwp",
                "divi",
                "elementor-frontend",
            ]),
            critical_selectors: to_strings(&[
                "body",
                "header",
                ".site-header",
                ".site-logo",
                ".custom-logo",
                ".site-title",
                "nav",
                ".main-navigation",
                "img",
                "h1",
                ".hero",
            ]),
            base_css: "img{max-width:100%;height:auto}\
                       .site-logo img,.custom-logo{max-width:100%;height:auto;display:block}"
                .to_string(),
            extraction_mode: ExtractionMode::WholeSheetOnHit,
            max_priority_images: 3,
            max_priority_videos: 1,
            style_block_id: "cmp-critical-css".to_string(),
            verbose: false,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> OptimizerConfig {
        OptimizerConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }

    /// 从JSON文件加载配置，缺省字段取默认值
    pub fn from_json_file(path: impl AsRef<Path>) -> CssResult<OptimizerConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> CssResult<OptimizerConfig> {
        Ok(serde_json::from_str(content)?)
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: OptimizerConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_url = url.into();
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: u64) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn cache_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.cache_key_prefix = prefix.into();
        self
    }

    pub fn admin_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.admin_patterns = patterns;
        self
    }

    pub fn critical_handle_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.critical_handle_patterns = patterns;
        self
    }

    pub fn critical_selectors(mut self, selectors: Vec<String>) -> Self {
        self.config.critical_selectors = selectors;
        self
    }

    pub fn base_css(mut self, css: impl Into<String>) -> Self {
        self.config.base_css = css.into();
        self
    }

    pub fn extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.config.extraction_mode = mode;
        self
    }

    pub fn max_priority_images(mut self, count: usize) -> Self {
        self.config.max_priority_images = count;
        self
    }

    pub fn max_priority_videos(mut self, count: usize) -> Self {
        self.config.max_priority_videos = count;
        self
    }

    pub fn style_block_id(mut self, id: impl Into<String>) -> Self {
        self.config.style_block_id = id.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> OptimizerConfig {
        self.config
    }
}
