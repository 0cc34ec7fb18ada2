//! 首屏媒体抓取优先级
//! 为前N张图片与前M个视频设置 fetchpriority="high"

use lol_html::html_content::Element;
use lol_html::{element, HtmlRewriter, Settings};
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{CriticalCssError, CssResult};

const FETCH_PRIORITY_ATTR: &str = "fetchpriority";

/// fetchpriority 改写器
#[derive(Debug, Clone, Copy)]
pub struct FetchPriority {
    max_images: usize,
    max_videos: usize,
}

impl Default for FetchPriority {
    fn default() -> Self {
        Self {
            max_images: 3,
            max_videos: 1,
        }
    }
}

impl FetchPriority {
    pub fn new(max_images: usize, max_videos: usize) -> Self {
        Self { max_images, max_videos }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.max_priority_images, config.max_priority_videos)
    }

    /// 改写HTML文档；前N个元素一律设为 high，覆盖已有的 fetchpriority
    pub fn apply(&self, html: &str) -> CssResult<String> {
        let mut images_seen = 0usize;
        let mut videos_seen = 0usize;
        let max_images = self.max_images;
        let max_videos = self.max_videos;

        let mut output = Vec::with_capacity(html.len() + 64);
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("img", move |el| {
                        mark_high_priority(el, &mut images_seen, max_images)
                    }),
                    element!("video", move |el| {
                        mark_high_priority(el, &mut videos_seen, max_videos)
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

        String::from_utf8(output).map_err(|e| CriticalCssError::RewriteError(e.to_string()))
    }
}

fn mark_high_priority(
    el: &mut Element,
    seen: &mut usize,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if *seen >= limit {
        return Ok(());
    }
    *seen += 1;

    el.set_attribute(FETCH_PRIORITY_ATTR, "high")?;
    debug!("Marked <{}> #{} as high fetch priority", el.tag_name(), seen);
    Ok(())
}
