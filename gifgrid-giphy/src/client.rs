use gifgrid::Page;
use url::Url;

use crate::wire::{api_error, parse_page};
use crate::{ClientError, GiphyConfig, Result};

const TRENDING_PATH: &str = "v1/gifs/trending";
const SEARCH_PATH: &str = "v1/gifs/search";

/// HTTP client for the GIPHY `trending` and `search` endpoints.
///
/// Cheap to clone; clones share one connection pool. The API key travels in the query string,
/// so request URLs are never logged.
#[derive(Clone, Debug)]
pub struct GiphyClient {
    http: reqwest::Client,
    config: GiphyConfig,
    base: Url,
}

impl GiphyClient {
    pub fn new(config: GiphyConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        let mut base = Url::parse(&config.base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gifgrid-giphy/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::debug!(base_url = %base, timeout = ?config.timeout, "GiphyClient::new");
        Ok(Self { http, config, base })
    }

    pub fn config(&self) -> &GiphyConfig {
        &self.config
    }

    pub fn trending_url(&self, limit: u32, offset: u64) -> Result<Url> {
        self.endpoint(TRENDING_PATH, None, limit, offset)
    }

    pub fn search_url(&self, query: &str, limit: u32, offset: u64) -> Result<Url> {
        self.endpoint(SEARCH_PATH, Some(query), limit, offset)
    }

    fn endpoint(&self, path: &str, query: Option<&str>, limit: u32, offset: u64) -> Result<Url> {
        let mut url = self.base.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.config.api_key);
            if let Some(q) = query {
                pairs.append_pair("q", q);
            }
            pairs.append_pair("limit", &limit.to_string());
            pairs.append_pair("offset", &offset.to_string());
            if let Some(rating) = &self.config.rating {
                pairs.append_pair("rating", rating);
            }
        }
        Ok(url)
    }

    pub async fn trending(&self, limit: u32, offset: u64) -> Result<Page> {
        let url = self.trending_url(limit, offset)?;
        tracing::trace!(endpoint = "trending", limit, offset, "GiphyClient: dispatch");
        self.get_page(url, offset).await
    }

    pub async fn search(&self, query: &str, limit: u32, offset: u64) -> Result<Page> {
        let url = self.search_url(query, limit, offset)?;
        tracing::trace!(endpoint = "search", query, limit, offset, "GiphyClient: dispatch");
        self.get_page(url, offset).await
    }

    async fn get_page(&self, url: Url, offset: u64) -> Result<Page> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let err = api_error(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), offset, error = %err, "GiphyClient: request failed");
            return Err(err);
        }
        let page = parse_page(&body, offset)?;
        tracing::debug!(
            offset = page.pagination.offset,
            count = page.len(),
            total_count = page.pagination.total_count,
            "GiphyClient: page"
        );
        Ok(page)
    }
}
