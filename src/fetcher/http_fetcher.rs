//! 远程样式表拉取器
//! 单次请求、不重试，超时由配置决定

use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{CriticalCssError, CssResult};

const USER_AGENT: &str = "Rscritical/0.1.0";

/// 远程拉取接口（外部协作者）
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// 拉取URL对应的文本内容
    async fn fetch(&self, url: &str) -> CssResult<String>;
}

/// 基于reqwest的HTTP拉取器
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 使用配置中的超时创建
    pub fn new(config: &OptimizerConfig) -> CssResult<Self> {
        Self::with_timeout(Duration::from_secs(config.http_timeout))
    }

    pub fn with_timeout(timeout: Duration) -> CssResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// 复用外部构建的客户端
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> CssResult<String> {
        let start = Instant::now();
        let response = self.client.get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/css,*/*;q=0.1")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CriticalCssError::FetchError(format!(
                "URL {} returned status code {}",
                url, response.status()
            )));
        }

        let body = response.text().await?;
        debug!("Fetched [{}] ({} bytes) in {:?}", url, body.len(), start.elapsed());
        Ok(body)
    }
}
