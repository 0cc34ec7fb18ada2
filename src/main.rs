//! rscritical 命令行：对在线页面生成关键CSS与延迟加载标签

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use rscritical::{
    CacheStore, ConfigManager, CriticalCss, FetchPriority, FileCacheStore, HeadBuffer,
    HtmlExtractor, HttpFetcher, MemoryCacheStore, PageRewriter, RemoteFetcher, unix_now,
};

#[derive(Debug, Parser)]
#[command(name = "rscritical", version, about = "Generate critical CSS and deferred stylesheet tags for a page")]
struct Cli {
    /// 目标页面URL
    page_url: String,

    /// JSON配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 站点根URL（未指定且配置未设置时取页面的源）
    #[arg(long)]
    site_url: Option<String>,

    /// 文件缓存目录（不指定则仅使用内存缓存）
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// 清空缓存后再生成
    #[arg(long)]
    clear_cache: bool,

    /// 将改写后的完整页面（fetchpriority、内联样式与延迟加载的 link）写入文件
    #[arg(long)]
    page_out: Option<PathBuf>,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigManager::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigManager::get_default(),
    };
    config.verbose |= cli.verbose;

    let default_level = if config.verbose { "rscritical=debug" } else { "rscritical=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let page_url = Url::parse(&cli.page_url).context("invalid page URL")?;
    if let Some(site_url) = cli.site_url.clone() {
        config.site_url = site_url;
    } else if config.has_default_site_url() {
        config.site_url = page_url.origin().ascii_serialization();
    }

    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let cache: Arc<dyn CacheStore> = match &cli.cache_dir {
        Some(dir) => Arc::new(FileCacheStore::new(dir)),
        None => Arc::new(MemoryCacheStore::new()),
    };
    if cli.clear_cache {
        cache.clear().await.context("failed to clear cache")?;
    }

    let page = fetcher
        .fetch(page_url.as_str())
        .await
        .with_context(|| format!("failed to fetch page {}", page_url))?;
    let registry = HtmlExtractor::new().extract(&page);

    let engine = CriticalCss::new(config.clone(), cache, fetcher)?;
    let mut head = HeadBuffer::new();
    engine.optimize(&registry, &mut head, unix_now()).await;
    let head_html = head.to_html();
    print!("{}", head_html);

    if let Some(path) = &cli.page_out {
        let prioritized = FetchPriority::from_config(&config).apply(&page)?;
        let rewritten = PageRewriter::apply(&prioritized, &head)?;
        std::fs::write(path, rewritten)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
