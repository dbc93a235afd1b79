use crate::collector::{Collector, GatherContext, GatherValue};
use crate::error::{AppError, Result};
use crate::info::GatheredInformation;
use async_trait::async_trait;
use futures::future::try_join_all;
use log;
use std::sync::Arc;

pub const URLS_COLLECTOR_NAME: &str = "urls";

/// Network capability used by the URL collector.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let to_fetch_error = |source| AppError::Fetch {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(to_fetch_error)?;
        log::debug!("GET {} -> {}", url, response.status());
        response.text().await.map_err(to_fetch_error)
    }
}

/// Fetches every URL concurrently and joins the bodies into one `<urls>` block.
#[derive(Clone)]
pub struct UrlsCollector {
    fetcher: Arc<dyn Fetch>,
}

impl Default for UrlsCollector {
    fn default() -> Self {
        Self::new(Arc::new(HttpFetcher::new()))
    }
}

impl UrlsCollector {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    pub async fn collect(&self, urls: &[String]) -> Result<Vec<GatheredInformation>> {
        log::info!("Fetching {} URLs...", urls.len());
        // try_join_all yields results in input order, not completion order.
        let bodies = try_join_all(urls.iter().map(|url| self.fetcher.fetch_text(url))).await?;
        Ok(vec![GatheredInformation::new("urls", bodies.join("\n"))])
    }
}

#[async_trait]
impl Collector for UrlsCollector {
    fn name(&self) -> &str {
        URLS_COLLECTOR_NAME
    }

    fn description(&self) -> &str {
        "Gathers information from URLs"
    }

    async fn gather(
        &self,
        options: &GatherValue,
        _context: &GatherContext,
    ) -> Result<Vec<GatheredInformation>> {
        let urls = options.to_string_list(URLS_COLLECTOR_NAME)?;
        self.collect(&urls).await
    }

    fn parse_options(&self, raw: &str) -> Option<GatherValue> {
        Some(GatherValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(GatherValue::from)
                .collect(),
        ))
    }
}
