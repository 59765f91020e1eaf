use async_trait::async_trait;
use gifgrid::{FeedKey, FetchError, FetchRequest, Page};

use crate::GiphyClient;

/// Executes the page requests handed out by the coordinator.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, FetchError>;
}

#[async_trait]
impl PageSource for GiphyClient {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        let result = match &request.key {
            FeedKey::Trending => self.trending(request.limit, request.offset).await,
            FeedKey::Search(query) => self.search(query, request.limit, request.offset).await,
        };
        result.map_err(FetchError::from)
    }
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for std::sync::Arc<S> {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        (**self).fetch_page(request).await
    }
}
