//! 样式表源URL规范化
//! 协议相对 `//host/x` 补全为 https，根相对 `/path` 拼接到站点URL之后

use url::Url;

/// URL规范化工具
pub struct UrlResolver;

impl UrlResolver {
    /// 返回可拉取的绝对http(s) URL；无法解析或非http(s)协议返回None
    pub fn resolve(source_url: &str, site_url: &str) -> Option<String> {
        let src = source_url.trim();
        if src.is_empty() {
            return None;
        }

        let candidate = if let Some(rest) = src.strip_prefix("//") {
            format!("https://{}", rest)
        } else if src.starts_with('/') {
            // 与站点URL直接拼接，保留子目录安装的路径前缀
            format!("{}{}", site_url.trim_end_matches('/'), src)
        } else {
            match Url::parse(src) {
                Ok(url) => url.to_string(),
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    let base = Url::parse(&format!("{}/", site_url.trim_end_matches('/'))).ok()?;
                    base.join(src).ok()?.to_string()
                }
                Err(_) => return None,
            }
        };

        let url = Url::parse(&candidate).ok()?;
        match url.scheme() {
            "http" | "https" => Some(url.to_string()),
            _ => None,
        }
    }
}
