//! 关键CSS编排器
//! 按排队顺序逐个处理样式表：分类 -> 读缓存/拉取 -> 压缩 -> 筛选 -> 拼接，
//! 同时为非关键样式表生成延迟加载标记。

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::render::{DeferredStyle, RenderSink, StyleRenderer};
use crate::asset::AssetRegistry;
use crate::cache::{CacheStore, cache_key};
use crate::config::OptimizerConfig;
use crate::css::{Classification, CriticalSelectors, CssMinifier, SelectorClassifier};
use crate::error::CssResult;
use crate::fetcher::RemoteFetcher;
use crate::utils::UrlResolver;

/// 关键CSS引擎（注册表、缓存与拉取器均由调用方注入）
pub struct CriticalCss {
    config: OptimizerConfig,
    classifier: SelectorClassifier,
    selectors: CriticalSelectors,
    cache: Arc<dyn CacheStore>,
    fetcher: Arc<dyn RemoteFetcher>,
}

impl CriticalCss {
    pub fn new(
        config: OptimizerConfig,
        cache: Arc<dyn CacheStore>,
        fetcher: Arc<dyn RemoteFetcher>,
    ) -> CssResult<Self> {
        let classifier = SelectorClassifier::from_config(&config);
        let selectors = CriticalSelectors::compile(&config.critical_selectors)?;
        Ok(Self {
            config,
            classifier,
            selectors,
            cache,
            fetcher,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// 已注册样式表的当前分类；未注册返回None
    pub fn classify<R: AssetRegistry + ?Sized>(&self, registry: &R, handle: &str) -> Option<Classification> {
        let descriptor = registry.registered_styles().get(handle)?;
        Some(self.classifier.classify(
            handle,
            descriptor.source_url.as_deref(),
            registry.theme(),
        ))
    }

    /// 生成关键CSS文档：基础CSS + 按排队顺序的各样式表片段。
    /// 任何网络或缓存故障只影响对应样式表，不会向上传播。
    pub async fn build_critical_css<R: AssetRegistry + ?Sized>(&self, registry: &R, now: u64) -> String {
        let start = Instant::now();
        let mut document = String::new();
        if !self.config.base_css.is_empty() {
            document.push_str(&self.config.base_css);
            document.push('\n');
        }

        let mut emitted = 0usize;
        for handle in registry.queued_styles() {
            let Some(descriptor) = registry.registered_styles().get(handle) else {
                debug!("Skip [{}]: not registered", handle);
                continue;
            };

            let classification = self.classifier.classify(
                handle,
                descriptor.source_url.as_deref(),
                registry.theme(),
            );
            if classification == Classification::Admin {
                debug!("Skip [{}]: admin stylesheet", handle);
                continue;
            }

            let Some(source_url) = descriptor
                .source_url
                .as_deref()
                .and_then(|src| UrlResolver::resolve(src, &self.config.site_url))
            else {
                debug!("Skip [{}]: no fetchable source", handle);
                continue;
            };

            let Some(body) = self.load_minified_body(handle, &source_url, now).await else {
                continue;
            };

            let fragment = match classification {
                Classification::Critical => body,
                _ => self.selectors.select_critical(&body, self.config.extraction_mode),
            };
            if fragment.is_empty() {
                debug!("Skip [{}]: no critical rules", handle);
                continue;
            }

            document.push_str(&StyleRenderer::fragment(handle, &fragment));
            emitted += 1;
        }

        debug!(
            "Critical CSS built: {} of {} queued stylesheets, {} bytes, took {:?}",
            emitted,
            registry.queued_styles().len(),
            document.len(),
            start.elapsed()
        );
        document
    }

    /// 为排队的、已注册的、非后台且非关键的样式表生成延迟加载标记
    pub fn defer_non_critical<R: AssetRegistry + ?Sized>(&self, registry: &R) -> Vec<DeferredStyle> {
        registry
            .queued_styles()
            .iter()
            .filter_map(|handle| {
                let descriptor = registry.registered_styles().get(handle)?;
                let classification = self.classifier.classify(
                    handle,
                    descriptor.source_url.as_deref(),
                    registry.theme(),
                );
                if classification != Classification::Plain {
                    return None;
                }
                let href = descriptor
                    .source_url
                    .as_deref()
                    .and_then(|src| UrlResolver::resolve(src, &self.config.site_url));
                Some(DeferredStyle::new(handle.clone(), href))
            })
            .collect()
    }

    /// 完整流程：写入内联样式块并改写非关键样式表的加载方式
    pub async fn optimize<R, S>(&self, registry: &R, sink: &mut S, now: u64)
    where
        R: AssetRegistry + ?Sized,
        S: RenderSink + ?Sized,
    {
        let css = self.build_critical_css(registry, now).await;
        if !css.trim().is_empty() {
            sink.emit_head_style(&StyleRenderer::style_block(&self.config.style_block_id, &css));
        }

        for style in self.defer_non_critical(registry) {
            sink.set_style_loading(&style);
        }
    }

    /// 读取压缩后的正文：命中缓存直接复用，否则拉取、压缩并写回缓存
    async fn load_minified_body(&self, handle: &str, source_url: &str, now: u64) -> Option<String> {
        let key = cache_key(&self.config.cache_key_prefix, source_url);
        if let Some(cached) = self.cache.get(&key, now).await {
            debug!("Cache hit [{}] for {}", handle, source_url);
            return Some(cached);
        }

        let raw = match self.fetcher.fetch(source_url).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetch [{}] {} failed, skipping: {}", handle, source_url, e);
                return None;
            }
        };

        let body = CssMinifier::minify(&raw);
        if body.is_empty() {
            debug!("Skip [{}]: empty stylesheet body", handle);
            return None;
        }

        if let Err(e) = self.cache.set(&key, &body, self.config.cache_ttl, now).await {
            warn!("Cache write [{}] failed: {}", handle, e);
        }
        Some(body)
    }
}
