//! 关键CSS编排器端到端测试（内存缓存 + 计数拉取器）

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rscritical::{
    CacheStore, ConfigManager, CriticalCss, CriticalCssError, CssResult,
    HeadBuffer, MemoryCacheStore, OptimizerConfig, RemoteFetcher, StyleRegistry,
    StylesheetDescriptor, ThemeInfo, cache_key,
};

const BASE: &str = "img{max-width:100%}";
const SITE: &str = "https://site.test";

/// 按URL返回固定正文的拉取器，记录每次调用
#[derive(Default)]
struct FakeFetcher {
    bodies: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl FakeFetcher {
    fn with(bodies: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            bodies: bodies.iter().map(|(u, b)| (u.to_string(), b.to_string())).collect(),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RemoteFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> CssResult<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.offline.load(Ordering::SeqCst) {
            return Err(CriticalCssError::FetchError(format!("{} offline", url)));
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| CriticalCssError::FetchError(format!("{} returned 404", url)))
    }
}

fn config() -> OptimizerConfig {
    ConfigManager::custom()
        .site_url(SITE)
        .admin_patterns(vec!["admin-bar".into(), "/wp-admin/".into()])
        .critical_handle_patterns(vec!["theme".into()])
        .critical_selectors(vec!["body".into(), ".site-logo".into()])
        .base_css(BASE)
        .cache_ttl(86_400)
        .build()
}

fn engine(fetcher: Arc<FakeFetcher>, cache: Arc<MemoryCacheStore>) -> CriticalCss {
    CriticalCss::new(config(), cache, fetcher).unwrap()
}

fn registry(styles: &[(&str, Option<&str>)]) -> StyleRegistry {
    let mut registry = StyleRegistry::new();
    for (handle, src) in styles {
        registry.add(StylesheetDescriptor::new(*handle, *src));
    }
    registry
}

#[tokio::test]
async fn test_admin_stylesheets_are_never_fetched_or_emitted() {
    let fetcher = FakeFetcher::with(&[
        ("https://site.test/admin-bar.css", "body{admin:1}"),
        ("https://site.test/wp-admin/x.css", "body{admin:2}"),
        ("https://site.test/page.css", "body{page:1}"),
    ]);
    let cache = Arc::new(MemoryCacheStore::new());
    let reg = registry(&[
        ("admin-bar", Some("/admin-bar.css")),
        ("dashboard", Some("/wp-admin/x.css")),
        ("page", Some("/page.css")),
    ]);

    let css = engine(fetcher.clone(), cache).build_critical_css(&reg, 0).await;

    assert_eq!(fetcher.calls(), vec!["https://site.test/page.css"]);
    assert!(!css.contains("admin"));
    assert!(css.contains("body{page:1}"));
}

#[tokio::test]
async fn test_critical_stylesheet_emitted_in_full_and_minified() {
    let body = "/* theme */\n.footer {\n\tcolor: red;\n}\n.widget { margin: 0 }";
    let fetcher = FakeFetcher::with(&[("https://site.test/theme.css", body)]);
    let reg = registry(&[("my-theme", Some("/theme.css"))]);

    let css = engine(fetcher, Arc::new(MemoryCacheStore::new()))
        .build_critical_css(&reg, 0)
        .await;

    assert_eq!(
        css,
        format!("{}\n/* From my-theme */\n.footer {{color: red;}}.widget {{ margin: 0 }}\n", BASE)
    );
}

#[tokio::test]
async fn test_output_follows_queue_order() {
    let fetcher = FakeFetcher::with(&[
        ("https://site.test/a.css", "body{a:1}"),
        ("https://site.test/b.css", ".site-logo{b:2}"),
        ("https://site.test/c.css", "c{c:3}"),
    ]);
    let reg = registry(&[
        ("c-theme", Some("/c.css")),
        ("a", Some("/a.css")),
        ("b", Some("/b.css")),
    ]);

    let css = engine(fetcher, Arc::new(MemoryCacheStore::new()))
        .build_critical_css(&reg, 0)
        .await;

    assert_eq!(
        css,
        format!(
            "{}\n/* From c-theme */\nc{{c:3}}\n/* From a */\nbody{{a:1}}\n/* From b */\n.site-logo{{b:2}}\n",
            BASE
        )
    );
}

#[tokio::test]
async fn test_fetch_failure_skips_only_that_handle() {
    let fetcher = FakeFetcher::with(&[
        ("https://site.test/a.css", "body{a:1}"),
        ("https://site.test/c.css", "body{c:1}"),
    ]);
    let cache = Arc::new(MemoryCacheStore::new());
    let reg = registry(&[
        ("a", Some("/a.css")),
        ("broken", Some("/missing.css")),
        ("c", Some("/c.css")),
    ]);

    let css = engine(fetcher.clone(), cache.clone()).build_critical_css(&reg, 0).await;

    assert!(css.contains("/* From a */\nbody{a:1}\n/* From c */\nbody{c:1}\n"));
    assert!(!css.contains("broken"));
    assert_eq!(fetcher.calls().len(), 3);
    // 失败的拉取不写缓存
    let missing_key = cache_key("cmp_critical_css_", "https://site.test/missing.css");
    assert_eq!(cache.get(&missing_key, 0).await, None);
}

#[tokio::test]
async fn test_cache_hit_survives_offline_fetcher() {
    let fetcher = FakeFetcher::with(&[
        ("https://site.test/a.css", "body{a:1}"),
        ("https://site.test/theme.css", ".x{y:z}"),
    ]);
    let cache = Arc::new(MemoryCacheStore::new());
    let engine = engine(fetcher.clone(), cache);
    let reg = registry(&[("a", Some("/a.css")), ("theme", Some("/theme.css"))]);

    let first = engine.build_critical_css(&reg, 1_000).await;
    fetcher.go_offline();
    let second = engine.build_critical_css(&reg, 2_000).await;

    assert_eq!(first, second);
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_expired_fragment_is_refetched() {
    let fetcher = FakeFetcher::with(&[("https://site.test/a.css", "body{a:1}")]);
    let engine = engine(fetcher.clone(), Arc::new(MemoryCacheStore::new()));
    let reg = registry(&[("a", Some("/a.css"))]);

    engine.build_critical_css(&reg, 0).await;
    engine.build_critical_css(&reg, 86_399).await;
    assert_eq!(fetcher.calls().len(), 1);

    engine.build_critical_css(&reg, 86_400).await;
    assert_eq!(fetcher.calls().len(), 2);
}

#[tokio::test]
async fn test_plain_without_critical_rules_is_cached_but_not_emitted() {
    let fetcher = FakeFetcher::with(&[("https://site.test/footer.css", ".footer{x:y}")]);
    let cache = Arc::new(MemoryCacheStore::new());
    let reg = registry(&[("footer", Some("/footer.css"))]);

    let css = engine(fetcher, cache.clone()).build_critical_css(&reg, 0).await;

    assert_eq!(css, format!("{}\n", BASE));
    let key = cache_key("cmp_critical_css_", "https://site.test/footer.css");
    assert_eq!(cache.get(&key, 1).await.as_deref(), Some(".footer{x:y}"));
}

#[tokio::test]
async fn test_classification_is_reevaluated_on_cache_hit() {
    let fetcher = FakeFetcher::with(&[("https://site.test/parent.css", ".footer{x:y}")]);
    let engine = engine(fetcher.clone(), Arc::new(MemoryCacheStore::new()));

    let mut as_theme = registry(&[("parent", Some("/parent.css"))]);
    as_theme.set_theme(ThemeInfo::new("parent"));
    let first = engine.build_critical_css(&as_theme, 0).await;
    assert!(first.contains("/* From parent */\n.footer{x:y}\n"));

    fetcher.go_offline();
    let as_plain = registry(&[("parent", Some("/parent.css"))]);
    let second = engine.build_critical_css(&as_plain, 10).await;
    assert_eq!(second, format!("{}\n", BASE));
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn test_unregistered_sourceless_and_empty_are_skipped() {
    let fetcher = FakeFetcher::with(&[("https://site.test/empty.css", " /* nothing */ \n")]);
    let cache = Arc::new(MemoryCacheStore::new());
    let mut reg = registry(&[("inline-only", None), ("empty-theme", Some("/empty.css"))]);
    reg.enqueue("ghost");

    let css = engine(fetcher.clone(), cache.clone()).build_critical_css(&reg, 0).await;

    assert_eq!(css, format!("{}\n", BASE));
    assert_eq!(fetcher.calls(), vec!["https://site.test/empty.css"]);
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn test_protocol_relative_source_is_fetched_over_https() {
    let fetcher = FakeFetcher::with(&[("https://cdn.test/theme.css", "h2{a:b}")]);
    let reg = registry(&[("cdn-theme", Some("//cdn.test/theme.css"))]);

    let css = engine(fetcher.clone(), Arc::new(MemoryCacheStore::new()))
        .build_critical_css(&reg, 0)
        .await;

    assert_eq!(fetcher.calls(), vec!["https://cdn.test/theme.css"]);
    assert!(css.ends_with("/* From cdn-theme */\nh2{a:b}\n"));
}

#[tokio::test]
async fn test_defer_non_critical_marks_only_plain() {
    let fetcher = FakeFetcher::with(&[]);
    let mut reg = registry(&[
        ("admin-bar", Some("/admin-bar.css")),
        ("child-theme", Some("/child.css")),
        ("fonts", Some("//fonts.test/f.css")),
        ("plugin", Some("/plugin.css")),
        ("no-src", None),
    ]);
    let mut theme = ThemeInfo::new("parent");
    theme.dependencies.insert("fonts".to_string());
    reg.set_theme(theme);
    reg.enqueue("unregistered");

    let deferred = engine(fetcher, Arc::new(MemoryCacheStore::new())).defer_non_critical(&reg);

    let handles: Vec<&str> = deferred.iter().map(|d| d.handle.as_str()).collect();
    assert_eq!(handles, vec!["plugin", "no-src"]);
    assert_eq!(deferred[0].href.as_deref(), Some("https://site.test/plugin.css"));
    assert_eq!(deferred[0].media, "print");
    assert_eq!(deferred[0].onload, "this.media='all'");
    assert_eq!(deferred[1].href, None);
}

#[tokio::test]
async fn test_optimize_writes_style_block_and_deferred_links() {
    let fetcher = FakeFetcher::with(&[
        ("https://site.test/theme.css", "body{margin:0}"),
        ("https://site.test/plugin.css", ".widget{x:y}"),
    ]);
    let reg = registry(&[("theme", Some("/theme.css")), ("plugin", Some("/plugin.css"))]);
    let mut head = HeadBuffer::new();

    engine(fetcher, Arc::new(MemoryCacheStore::new()))
        .optimize(&reg, &mut head, 0)
        .await;

    assert_eq!(head.styles.len(), 1);
    assert!(head.styles[0].starts_with("\n<style id='cmp-critical-css'>\nimg{max-width:100%}\n"));
    assert!(head.styles[0].contains("body{margin:0}"));
    assert!(!head.styles[0].contains(".widget"));

    let html = head.to_html();
    assert!(html.contains("<link rel='stylesheet' id='plugin-css' href='https://site.test/plugin.css' media='print'"));
    assert!(html.contains("<noscript>"));
    assert!(!html.contains("id='theme-css'"));
}
