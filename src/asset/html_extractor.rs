//! HTML样式表提取器
//! 负责从渲染后的HTML中提取 <link rel="stylesheet"> 并构建资源注册表

use std::cell::RefCell;
use std::collections::HashSet;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::interface::Attribute;
use once_cell::sync::Lazy;
use regex::Regex;
use tendril::StrTendril;

use super::model::{StyleRegistry, StylesheetDescriptor, ThemeInfo};

// 主题主样式表：/themes/<slug>/style.css
static THEME_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/themes/[^/]+/style(?:\.min)?\.css(?:[?#]|$)").unwrap()
});

/// 由 id 属性推导 handle：去掉 WordPress 的 `-css` 后缀；
/// 无 id 时按序号生成 `link-<n>`，不会命中关键/排除模式
pub fn link_handle(id: Option<&str>, index: usize) -> String {
    id.map(|id| id.strip_suffix("-css").unwrap_or(id))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("link-{}", index))
}

/// rel 属性是否声明了 stylesheet
pub fn is_stylesheet_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|rel| rel.eq_ignore_ascii_case("stylesheet"))
}

/// 提取到的样式表链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleLink {
    pub id: Option<String>,
    pub href: String,
}

#[derive(Debug, Default, Clone)]
pub struct HtmlExtractor {
    links: RefCell<Vec<StyleLink>>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        if let Token::TagToken(Tag {
            kind: TagKind::StartTag,
            name,
            attrs,
            ..
        }) = token
        {
            if name.as_ref() == "link" {
                self.extract_stylesheet_link(&attrs);
            }
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 从HTML字符串提取样式表链接
    pub fn extract_links(&self, html: &str) -> Vec<StyleLink> {
        let tokenizer = Tokenizer::new(self.clone(), TokenizerOpts::default());
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink.links.into_inner()
    }

    /// 从HTML字符串构建资源注册表（按文档顺序入队）
    pub fn extract(&self, html: &str) -> StyleRegistry {
        let mut registry = StyleRegistry::new();
        let mut theme: Option<ThemeInfo> = None;
        let mut seen = HashSet::new();

        for (index, link) in self.extract_links(html).into_iter().enumerate() {
            let handle = link_handle(link.id.as_deref(), index);

            // 同名handle保留第一次出现
            if !seen.insert(handle.clone()) {
                continue;
            }

            if theme.is_none() && THEME_STYLE_RE.is_match(&link.href) {
                theme = Some(ThemeInfo::new(handle.clone()));
            }

            registry.add(StylesheetDescriptor::new(handle, Some(&link.href)));
        }

        if let Some(theme) = theme {
            registry.set_theme(theme);
        }
        registry
    }

    /// 提取 rel=stylesheet 的 link
    fn extract_stylesheet_link(&self, attrs: &[Attribute]) {
        let mut is_stylesheet = false;
        let mut href = None;
        let mut id = None;

        for attr in attrs {
            match attr.name.local.as_ref() {
                "rel" => {
                    is_stylesheet = is_stylesheet_rel(&attr.value);
                }
                "href" => href = Some(attr.value.trim().to_string()),
                "id" => id = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let (true, Some(href)) = (is_stylesheet, href) {
            if !href.is_empty() {
                self.links.borrow_mut().push(StyleLink { id, href });
            }
        }
    }
}
