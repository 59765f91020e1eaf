use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::key::FeedMap;
use crate::{
    CoordinatorOptions, Feed, FeedKey, FeedSnapshot, FeedStatus, FetchError, FetchKind,
    FetchRequest, Item, Page,
};

/// Outcome of [`Coordinator::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The page was appended. `items` counts the items that were new to the feed.
    Appended { items: usize },
    /// The request failed within its retry budget. Execute the returned request next; the feed
    /// stays in flight.
    Retry(FetchRequest),
    /// Retries are exhausted. The feed keeps its pages and is marked failed.
    Failed,
    /// The feed that issued the request is gone or was replaced. The result was dropped.
    Stale,
}

/// Owns the paginated feeds (trending plus at most one search) and decides which page
/// requests may be issued.
///
/// The coordinator performs no I/O. Operations that would start a request return a
/// [`FetchRequest`]; the adapter executes it and reports back through [`Self::complete`].
/// At most one request per feed is in flight at any time.
#[derive(Clone, Debug)]
pub struct Coordinator {
    options: CoordinatorOptions,
    feeds: FeedMap<Feed>,
    search: Option<FeedKey>,
    next_generation: u64,

    notify_depth: Cell<usize>,
    notify_pending: RefCell<Vec<FeedKey>>,
}

impl Coordinator {
    pub fn new(options: CoordinatorOptions) -> Self {
        gdebug!(
            page_size = options.page_size,
            max_retries = options.max_retries,
            "Coordinator::new"
        );
        Self {
            options,
            feeds: FeedMap::default(),
            search: None,
            next_generation: 1,
            notify_depth: Cell::new(0),
            notify_pending: RefCell::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Clones the current options, applies `f`, and installs the result.
    ///
    /// A new page size applies to requests issued afterwards.
    pub fn update_options(&mut self, f: impl FnOnce(&mut CoordinatorOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        next.page_size = next.page_size.max(1);
        self.options = next;
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&Coordinator, &FeedKey) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    fn notify_now(&self, key: &FeedKey) {
        if let Some(cb) = &self.options.on_change {
            cb(self, key);
        }
    }

    fn notify(&self, key: &FeedKey) {
        if self.notify_depth.get() > 0 {
            let mut pending = self.notify_pending.borrow_mut();
            if !pending.contains(key) {
                pending.push(key.clone());
            }
            return;
        }
        self.notify_now(key);
    }

    /// Batches multiple updates; `on_change` fires once per touched feed afterwards.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 {
            let pending = core::mem::take(&mut *self.notify_pending.borrow_mut());
            for key in &pending {
                self.notify_now(key);
            }
        }
    }

    fn create_feed(&mut self, key: FeedKey, now_ms: u64) -> &mut Feed {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        gdebug!(feed = %key, generation, "Coordinator: creating feed");
        self.feeds
            .entry(key.clone())
            .or_insert_with(|| Feed::new(key, generation, now_ms))
    }

    /// Makes sure a feed exists for `key`.
    ///
    /// When the feed is created, returns the request for its first page. Ensuring a search key
    /// replaces the current search feed (see [`Self::set_search`]).
    pub fn ensure_feed(&mut self, key: &FeedKey, now_ms: u64) -> Option<FetchRequest> {
        if key.is_search() && self.search.as_ref() != Some(key) {
            self.discard_search();
            self.search = Some(key.clone());
        }
        if self.feeds.contains_key(key) {
            return None;
        }

        let limit = self.options.page_size;
        let request = self.create_feed(key.clone(), now_ms).begin(FetchKind::First, limit);
        gtrace!(feed = %key, offset = request.offset, limit, "Coordinator: first page");
        self.notify(key);
        Some(request)
    }

    /// Switches the search feed to `query`.
    ///
    /// A blank or absent query removes the search feed. Any result still in flight for the
    /// previous query is suppressed when it arrives. Returns the first-page request of a newly
    /// created feed.
    pub fn set_search(&mut self, query: Option<&str>, now_ms: u64) -> Option<FetchRequest> {
        match query.and_then(FeedKey::search) {
            Some(key) => self.ensure_feed(&key, now_ms),
            None => {
                self.discard_search();
                None
            }
        }
    }

    fn discard_search(&mut self) {
        let Some(key) = self.search.take() else {
            return;
        };
        if self.feeds.remove(&key).is_some() {
            gdebug!(feed = %key, "Coordinator: discarding search feed");
            self.notify(&key);
        }
    }

    pub fn search_key(&self) -> Option<&FeedKey> {
        self.search.as_ref()
    }

    /// Requests the next page of `key`.
    ///
    /// No-op (returns `None`) while a request for the feed is in flight, when the feed has no
    /// next page, or after a failure (see [`Self::retry`]).
    pub fn fetch_next_page(&mut self, key: &FeedKey) -> Option<FetchRequest> {
        let limit = self.options.page_size;
        let feed = self.feeds.get_mut(key)?;
        if feed.is_fetching() || feed.status() == FeedStatus::Failed || !feed.has_next_page() {
            return None;
        }
        let request = feed.begin(FetchKind::Next, limit);
        gtrace!(feed = %key, offset = request.offset, limit, "Coordinator: next page");
        self.notify(key);
        Some(request)
    }

    /// Re-issues the request of a failed feed with a fresh retry budget.
    pub fn retry(&mut self, key: &FeedKey) -> Option<FetchRequest> {
        let limit = self.options.page_size;
        let feed = self.feeds.get_mut(key)?;
        if feed.status() != FeedStatus::Failed || feed.is_fetching() {
            return None;
        }
        let kind = if feed.has_fetched() {
            FetchKind::Next
        } else {
            FetchKind::First
        };
        let request = feed.begin(kind, limit);
        gdebug!(feed = %key, offset = request.offset, "Coordinator: manual retry");
        self.notify(key);
        Some(request)
    }

    /// Reports the outcome of a request previously handed out by this coordinator.
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<Page, FetchError>,
        now_ms: u64,
    ) -> Completion {
        let max_retries = self.options.max_retries;
        let Some(feed) = self.feeds.get_mut(&request.key) else {
            gdebug!(feed = %request.key, "Coordinator::complete: feed is gone, dropping result");
            return Completion::Stale;
        };
        if !feed.awaits(request) {
            gdebug!(
                feed = %request.key,
                generation = request.generation,
                current = feed.generation(),
                "Coordinator::complete: stale result"
            );
            return Completion::Stale;
        }

        match result {
            Ok(page) => {
                let items = feed.accept(request, page, now_ms);
                gdebug!(
                    feed = %request.key,
                    offset = request.offset,
                    items,
                    fetched = feed.fetched_count(),
                    has_next_page = feed.has_next_page(),
                    "Coordinator: page appended"
                );
                self.notify(&request.key);
                Completion::Appended { items }
            }
            Err(error) if request.attempt < max_retries => {
                gwarn!(
                    feed = %request.key,
                    offset = request.offset,
                    attempt = request.attempt,
                    %error,
                    "Coordinator: request failed, retrying"
                );
                Completion::Retry(feed.retry(request, error))
            }
            Err(error) => {
                gwarn!(
                    feed = %request.key,
                    offset = request.offset,
                    attempt = request.attempt,
                    %error,
                    "Coordinator: request failed"
                );
                feed.fail(error);
                self.notify(&request.key);
                Completion::Failed
            }
        }
    }

    /// Drops idle feeds whose last successful fetch is at least `stale_after_ms` old.
    ///
    /// Feeds with a request in flight are kept. Returns the number of evicted feeds.
    pub fn evict_stale(&mut self, now_ms: u64) -> usize {
        let stale_after = self.options.stale_after_ms;
        let stale: Vec<FeedKey> = self
            .feeds
            .values()
            .filter(|feed| {
                !feed.is_fetching()
                    && feed.has_fetched()
                    && now_ms.saturating_sub(feed.updated_at_ms()) >= stale_after
            })
            .map(|feed| feed.key().clone())
            .collect();

        for key in &stale {
            self.feeds.remove(key);
            gdebug!(feed = %key, "Coordinator: evicted stale feed");
            self.notify(key);
        }
        stale.len()
    }

    pub fn feed(&self, key: &FeedKey) -> Option<&Feed> {
        self.feeds.get(key)
    }

    pub fn feed_count(&self) -> usize {
        self.feeds.len()
    }

    pub fn status(&self, key: &FeedKey) -> Option<FeedStatus> {
        self.feeds.get(key).map(Feed::status)
    }

    pub fn has_next_page(&self, key: &FeedKey) -> bool {
        self.feeds.get(key).is_some_and(Feed::has_next_page)
    }

    pub fn is_fetching(&self, key: &FeedKey) -> bool {
        self.feeds.get(key).is_some_and(Feed::is_fetching)
    }

    pub fn is_fetching_next_page(&self, key: &FeedKey) -> bool {
        self.feeds.get(key).is_some_and(Feed::is_fetching_next_page)
    }

    pub fn for_each_item<'a>(&'a self, key: &FeedKey, f: impl FnMut(&'a Item)) {
        if let Some(feed) = self.feeds.get(key) {
            feed.for_each_item(f);
        }
    }

    /// The flattened item list of `key` (empty for unknown feeds).
    pub fn items(&self, key: &FeedKey) -> Vec<&Item> {
        self.feeds.get(key).map(Feed::items).unwrap_or_default()
    }

    pub fn snapshot(&self, key: &FeedKey) -> Option<FeedSnapshot> {
        self.feeds.get(key).map(Feed::snapshot)
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorOptions::default())
    }
}
