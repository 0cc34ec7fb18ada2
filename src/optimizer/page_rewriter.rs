//! 整页改写
//! 把内联样式写入 <head>，并将页面中非关键样式表的 <link> 改为延迟加载

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings};
use tracing::debug;

use super::render::{DeferredStyle, HeadBuffer, StyleRenderer};
use crate::asset::{is_stylesheet_rel, link_handle};
use crate::error::{CriticalCssError, CssResult};

pub struct PageRewriter;

impl PageRewriter {
    /// 按 HeadBuffer 的结果改写整页HTML
    ///
    /// link 的 handle 推导与 `HtmlExtractor` 一致，同名 handle 只改写第一次出现；
    /// 页面没有 <head> 时内联样式放在文档最前面
    pub fn apply(html: &str, head: &HeadBuffer) -> CssResult<String> {
        let deferred: HashMap<&str, &DeferredStyle> = head
            .deferred
            .iter()
            .map(|style| (style.handle.as_str(), style))
            .collect();
        let inline_styles = head.styles.concat();
        let head_seen = Cell::new(false);
        let mut link_index = 0usize;
        let mut seen = HashSet::new();

        let mut output = Vec::with_capacity(html.len() + inline_styles.len() + 256);
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("head", |el| {
                        head_seen.set(true);
                        if !inline_styles.is_empty() {
                            el.append(&inline_styles, ContentType::Html);
                        }
                        Ok(())
                    }),
                    element!("link[rel][href]", move |el| {
                        let is_stylesheet = el
                            .get_attribute("rel")
                            .is_some_and(|rel| is_stylesheet_rel(&rel));
                        let href = el
                            .get_attribute("href")
                            .map(|href| href.trim().to_string())
                            .unwrap_or_default();
                        if !is_stylesheet || href.is_empty() {
                            return Ok(());
                        }

                        let handle = link_handle(el.get_attribute("id").as_deref(), link_index);
                        link_index += 1;
                        if !seen.insert(handle.clone()) {
                            return Ok(());
                        }

                        if let Some(style) = deferred.get(handle.as_str()) {
                            el.set_attribute("media", &style.media)?;
                            el.set_attribute("onload", &style.onload)?;
                            let fallback = style.href.as_deref().unwrap_or(&href);
                            el.after(
                                &StyleRenderer::noscript_link(&handle, fallback),
                                ContentType::Html,
                            );
                            debug!("Deferred <link> for handle {}", handle);
                        }
                        Ok(())
                    }),
                ],
                ..Settings::default()
            },
            |chunk: &[u8]| output.extend_from_slice(chunk),
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| CriticalCssError::RewriteError(e.to_string()))?;
        rewriter
            .end()
            .map_err(|e| CriticalCssError::RewriteError(e.to_string()))?;

        let mut page =
            String::from_utf8(output).map_err(|e| CriticalCssError::RewriteError(e.to_string()))?;
        if !head_seen.get() {
            page.insert_str(0, &inline_styles);
        }
        Ok(page)
    }
}
