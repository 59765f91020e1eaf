use gifgrid::sensor::{IntersectionEntry, Visibility};
use gifgrid::{
    CellOptions, ColumnLayout, Completion, Coordinator, CoordinatorOptions, Debounced, FeedKey,
    FeedStatus, FetchError, FetchRequest, ImageCell, Item, LayoutOptions, Page, ScrollTrigger,
    VisibilityOptions, assign_columns,
};
use url::Url;

use crate::PageSource;
use crate::location::{search_param, with_search_param};

/// Shown when a search settled with zero results.
pub const NO_RESULTS_MESSAGE: &str = "No GIFs found. Try searching for something else!";

const LOAD_MORE_LABEL: &str = "Load More";
const LOADING_LABEL: &str = "Loading...";

/// Configuration for [`Gallery`].
#[derive(Clone, Debug)]
pub struct GalleryOptions {
    /// Quiet period before typed search text takes effect.
    pub debounce_ms: u64,
    pub coordinator: CoordinatorOptions,
    pub layout: LayoutOptions,
    /// Options for the sensor watching the end-of-list sentinel.
    pub sentinel: VisibilityOptions,
    pub cell: CellOptions,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            coordinator: CoordinatorOptions::new(20),
            layout: LayoutOptions::responsive(),
            sentinel: VisibilityOptions::default(),
            cell: CellOptions::default(),
        }
    }
}

impl GalleryOptions {
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_coordinator(mut self, coordinator: CoordinatorOptions) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_sentinel(mut self, sentinel: VisibilityOptions) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_cell(mut self, cell: CellOptions) -> Self {
        self.cell = cell;
        self
    }
}

/// Work produced by [`Gallery::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    /// Requests to execute, in order.
    pub requests: Vec<FetchRequest>,
    /// New address to push (without navigating) because the settled query changed.
    pub location: Option<Url>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    /// The active feed has not produced its first page yet.
    Loading,
    Items,
    /// A search settled with zero results; show [`NO_RESULTS_MESSAGE`].
    NoResults,
    /// The last request failed. Items received earlier are still in `columns`.
    ///
    /// `can_retry` is `false` for client errors (bad key, bad request) that a retry will not fix.
    Failed { can_retry: bool },
}

/// The explicit "load more" button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadMore {
    pub label: &'static str,
    pub disabled: bool,
}

/// Everything needed to render one frame of the gallery.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryView<'a> {
    pub state: ViewState,
    /// Items of the active feed, distributed round-robin.
    pub columns: Vec<Vec<&'a Item>>,
    pub has_next_page: bool,
    pub is_fetching_next_page: bool,
    /// Present while the active feed has a next page. Disabled while loading and after a
    /// failure, until [`Gallery::retry`].
    pub load_more: Option<LoadMore>,
    /// A search feed request is in flight (drives the search box spinner).
    pub is_searching: bool,
}

/// The gallery screen: a search box, a column grid of the active feed and a scroll sentinel.
///
/// Like the core types it wraps, the gallery performs no I/O. Every method that may start a
/// fetch returns the [`FetchRequest`]s to execute; results come back through
/// [`Self::complete`]. [`Self::drive`] does both against a [`PageSource`].
///
/// The active feed is the search feed while a non-blank query has settled, trending otherwise.
/// Trending stays cached while a search is shown.
#[derive(Clone, Debug)]
pub struct Gallery {
    options: GalleryOptions,
    coordinator: Coordinator,
    input: String,
    query: Debounced<String>,
    layout: ColumnLayout,
    sentinel: Visibility,
    trigger: ScrollTrigger,
    location: Url,
    outbox: Vec<FetchRequest>,
}

impl Gallery {
    /// Creates the gallery for the page at `location`.
    ///
    /// An existing `search` parameter seeds the query, settled immediately. The first page of
    /// the active feed is requested on the next [`Self::tick`].
    pub fn new(options: GalleryOptions, location: Url, now_ms: u64) -> Self {
        let input = search_param(&location).unwrap_or_default();
        let mut query = Debounced::new(String::new(), options.debounce_ms);
        query.settle_now(input.trim().to_owned());

        let mut gallery = Self {
            coordinator: Coordinator::new(options.coordinator.clone()),
            layout: ColumnLayout::new(options.layout.clone()),
            sentinel: Visibility::new(options.sentinel),
            trigger: ScrollTrigger::new(),
            input,
            query,
            location,
            outbox: Vec::new(),
            options,
        };
        let key = gallery.active_feed();
        tracing::debug!(feed = %key, "Gallery::new");
        gallery.outbox.extend(gallery.coordinator.ensure_feed(&key, now_ms));
        gallery
    }

    pub fn options(&self) -> &GalleryOptions {
        &self.options
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// The text in the search box as typed, including input that has not settled yet.
    pub fn search_text(&self) -> &str {
        &self.input
    }

    /// The trimmed query the gallery is currently showing results for.
    pub fn settled_query(&self) -> &str {
        self.query.settled()
    }

    pub fn active_feed(&self) -> FeedKey {
        FeedKey::search(self.query.settled()).unwrap_or(FeedKey::Trending)
    }

    /// Surrounding whitespace is not part of the query: "cat " settles to the "cat" feed.
    pub fn on_search_input(&mut self, text: &str, now_ms: u64) {
        self.input.clear();
        self.input.push_str(text);
        self.query.set(text.trim().to_owned(), now_ms);
    }

    /// Advances time: settles debounced input and makes sure the active feed is loading.
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        let mut tick = Tick {
            requests: core::mem::take(&mut self.outbox),
            location: None,
        };

        if let Some(query) = self.query.poll(now_ms).cloned() {
            tracing::debug!(query = %query, "Gallery: search settled");
            self.trigger.reset();
            tick.requests
                .extend(self.coordinator.set_search(Some(query.as_str()), now_ms));
            let next = with_search_param(&self.location, &query);
            if next != self.location {
                self.location = next.clone();
                tick.location = Some(next);
            }
        }

        let key = self.active_feed();
        tick.requests.extend(self.coordinator.ensure_feed(&key, now_ms));
        tick
    }

    /// Applies a new container width. Returns `true` when the column count changed.
    pub fn on_resize(&mut self, width: u32) -> bool {
        self.layout.set_width(width)
    }

    /// Feeds an intersection report for the end-of-list sentinel through the sensor configured by
    /// [`GalleryOptions::sentinel`]. Entries below its threshold count as hidden.
    pub fn on_sentinel_intersection(&mut self, entry: IntersectionEntry) -> Option<FetchRequest> {
        self.sentinel.observe(entry);
        let visible = self.sentinel.in_view();
        self.on_sentinel_visibility(visible)
    }

    /// Like [`Self::on_sentinel_intersection`], for hosts that already decided visibility.
    pub fn on_sentinel_visibility(&mut self, visible: bool) -> Option<FetchRequest> {
        let key = self.active_feed();
        self.trigger
            .on_sentinel_visibility(visible, &mut self.coordinator, &key)
    }

    /// The "load more" button was pressed.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        let key = self.active_feed();
        self.coordinator.fetch_next_page(&key)
    }

    /// Re-issues the failed request of the active feed.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        let key = self.active_feed();
        self.coordinator.retry(&key)
    }

    /// The window regained focus: drops stale feeds and reloads the active one if it was among
    /// them.
    pub fn on_focus(&mut self, now_ms: u64) -> Option<FetchRequest> {
        let evicted = self.coordinator.evict_stale(now_ms);
        if evicted == 0 {
            return None;
        }
        tracing::debug!(evicted, "Gallery: evicted stale feeds");
        self.trigger.reset();
        let key = self.active_feed();
        self.coordinator.ensure_feed(&key, now_ms)
    }

    /// Reports the outcome of a request and returns the follow-up requests to execute.
    pub fn complete(
        &mut self,
        request: &FetchRequest,
        result: Result<Page, FetchError>,
        now_ms: u64,
    ) -> Vec<FetchRequest> {
        let mut next = Vec::new();
        match self.coordinator.complete(request, result, now_ms) {
            Completion::Appended { items } => {
                tracing::debug!(feed = %request.key, offset = request.offset, items, "Gallery: page");
            }
            Completion::Retry(retry) => {
                tracing::warn!(
                    feed = %request.key,
                    offset = request.offset,
                    attempt = retry.attempt,
                    "Gallery: retrying request"
                );
                next.push(retry);
            }
            Completion::Failed => {
                let error = self
                    .coordinator
                    .feed(&request.key)
                    .and_then(|feed| feed.last_error())
                    .map(ToString::to_string)
                    .unwrap_or_default();
                tracing::warn!(feed = %request.key, offset = request.offset, %error, "Gallery: request failed");
            }
            Completion::Stale => {
                tracing::trace!(feed = %request.key, offset = request.offset, "Gallery: stale result dropped");
                return next;
            }
        }

        let key = self.active_feed();
        if request.key == key {
            next.extend(self.trigger.on_feed_change(&mut self.coordinator, &key));
        }
        next
    }

    /// Executes `requests` against `source`, following retries and sentinel re-triggers, until
    /// nothing is outstanding. Returns the number of requests executed.
    ///
    /// Requests run one at a time.
    pub async fn drive<S>(
        &mut self,
        source: &S,
        requests: Vec<FetchRequest>,
        mut now_ms: impl FnMut() -> u64,
    ) -> usize
    where
        S: PageSource + ?Sized,
    {
        let mut queue = std::collections::VecDeque::from(requests);
        let mut executed = 0;
        while let Some(request) = queue.pop_front() {
            tracing::trace!(
                feed = %request.key,
                offset = request.offset,
                limit = request.limit,
                attempt = request.attempt,
                "Gallery: dispatch"
            );
            let result = source.fetch_page(&request).await;
            executed += 1;
            queue.extend(self.complete(&request, result, now_ms()));
        }
        executed
    }

    /// Builds the presentation cell for an item of the current view.
    pub fn cell(&self, item: &Item) -> ImageCell {
        ImageCell::new(item, &self.options.cell)
    }

    pub fn is_searching(&self) -> bool {
        let key = self.active_feed();
        key.is_search() && self.coordinator.is_fetching(&key)
    }

    pub fn view(&self) -> GalleryView<'_> {
        let key = self.active_feed();
        let items = self.coordinator.items(&key);
        let has_next_page = self.coordinator.has_next_page(&key);
        let is_fetching_next_page = self.coordinator.is_fetching_next_page(&key);
        let failed = self.coordinator.status(&key) == Some(FeedStatus::Failed);

        let state = match self.coordinator.feed(&key) {
            None => ViewState::Loading,
            Some(feed) if feed.status() == FeedStatus::Failed => ViewState::Failed {
                can_retry: is_retryable(feed.last_error()),
            },
            Some(feed) if !feed.has_fetched() => ViewState::Loading,
            Some(_) if items.is_empty() && key.is_search() => ViewState::NoResults,
            Some(_) => ViewState::Items,
        };

        GalleryView {
            state,
            columns: assign_columns(items, self.layout.column_count()),
            has_next_page,
            is_fetching_next_page,
            load_more: has_next_page.then_some(LoadMore {
                label: if is_fetching_next_page {
                    LOADING_LABEL
                } else {
                    LOAD_MORE_LABEL
                },
                disabled: is_fetching_next_page || failed,
            }),
            is_searching: self.is_searching(),
        }
    }
}

fn is_retryable(error: Option<&FetchError>) -> bool {
    match error {
        Some(FetchError::Api { status, .. }) => !(400..500).contains(status) || *status == 429,
        _ => true,
    }
}
