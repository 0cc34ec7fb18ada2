//! 输出渲染
//! 内联 <style> 块、延迟加载的 <link> 标签，以及输出接收器抽象

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SCRIPT_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap()
});
static STYLE_ELEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap()
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

pub const DEFERRED_MEDIA: &str = "print";
pub const DEFERRED_ONLOAD: &str = "this.media='all'";

/// 非关键样式表的延迟加载标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredStyle {
    pub handle: String,
    /// 规范化后的地址；无源地址的样式只做标记不渲染
    pub href: Option<String>,
    pub media: String,
    pub onload: String,
}

impl DeferredStyle {
    pub fn new(handle: impl Into<String>, href: Option<String>) -> Self {
        Self {
            handle: handle.into(),
            href,
            media: DEFERRED_MEDIA.to_string(),
            onload: DEFERRED_ONLOAD.to_string(),
        }
    }
}

/// 渲染接收器（外部协作者）：文档<head>与样式加载属性的写入点
pub trait RenderSink {
    /// 向<head>写入一段HTML
    fn emit_head_style(&mut self, html: &str);
    /// 改写已排队样式表的加载属性
    fn set_style_loading(&mut self, style: &DeferredStyle);
}

/// 内存接收器：收集输出，供CLI与测试使用
#[derive(Debug, Clone, Default)]
pub struct HeadBuffer {
    pub styles: Vec<String>,
    pub deferred: Vec<DeferredStyle>,
}

impl HeadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并为最终的<head>片段：内联样式在前，延迟链接在后
    pub fn to_html(&self) -> String {
        let mut html = self.styles.concat();
        for link in self.deferred.iter().filter_map(StyleRenderer::deferred_link) {
            html.push_str(&link);
        }
        html
    }
}

impl RenderSink for HeadBuffer {
    fn emit_head_style(&mut self, html: &str) {
        self.styles.push(html.to_string());
    }

    fn set_style_loading(&mut self, style: &DeferredStyle) {
        self.deferred.push(style.clone());
    }
}

/// 渲染工具
pub struct StyleRenderer;

impl StyleRenderer {
    /// 单个样式表片段：`/* From <handle> */` 注释头 + CSS
    pub fn fragment(handle: &str, css: &str) -> String {
        let label = html_escape::encode_text(handle).replace("*/", "* /");
        format!("/* From {} */\n{}\n", label, css)
    }

    /// 内联样式块，内容中的HTML标签一律剥离
    pub fn style_block(id: &str, css: &str) -> String {
        format!(
            "\n<style id='{}'>\n{}\n</style>\n",
            html_escape::encode_single_quoted_attribute(id),
            Self::strip_all_tags(css)
        )
    }

    /// 延迟加载链接 + <noscript> 回退（无脚本时立即生效）
    pub fn deferred_link(style: &DeferredStyle) -> Option<String> {
        let href = style.href.as_deref()?;
        let id = html_escape::encode_single_quoted_attribute(&style.handle);
        Some(format!(
            "<link rel='stylesheet' id='{id}-css' href='{href_attr}' media='{media}' onload=\"{onload}\" />\n{noscript}",
            href_attr = html_escape::encode_single_quoted_attribute(href),
            media = html_escape::encode_single_quoted_attribute(&style.media),
            onload = html_escape::encode_double_quoted_attribute(&style.onload),
            noscript = Self::noscript_link(&style.handle, href),
        ))
    }

    /// 无脚本环境下的立即加载回退
    pub fn noscript_link(handle: &str, href: &str) -> String {
        format!(
            "<noscript><link rel='stylesheet' id='{}-css-noscript' href='{}' media='all' /></noscript>\n",
            html_escape::encode_single_quoted_attribute(handle),
            html_escape::encode_single_quoted_attribute(href),
        )
    }

    /// 去除 <script>/<style> 元素（含内容）及全部标签
    pub fn strip_all_tags(text: &str) -> String {
        let without_scripts = SCRIPT_ELEMENT_RE.replace_all(text, "");
        let without_styles = STYLE_ELEMENT_RE.replace_all(&without_scripts, "");
        TAG_RE.replace_all(&without_styles, "").trim().to_string()
    }
}
