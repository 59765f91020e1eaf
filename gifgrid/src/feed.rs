use alloc::vec::Vec;

use crate::emitter::ItemEmitter;
use crate::key::IdSet;
use crate::{
    FeedKey, FeedSnapshot, FeedStatus, FetchError, FetchKind, FetchRequest, Item, Page,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InFlight {
    offset: u64,
    attempt: u8,
    kind: FetchKind,
}

/// Accumulated pages for one query identity.
///
/// Pages are append-only and ordered by offset. A feed is never re-keyed: when the query
/// changes, the [`crate::Coordinator`] discards the feed and creates a new one.
#[derive(Clone, Debug)]
pub struct Feed {
    key: FeedKey,
    generation: u64,
    pages: Vec<Page>,
    /// Ids of every admitted item.
    seen: IdSet,
    /// `(page, index)` of each admitted item, in display order.
    order: Vec<(usize, usize)>,
    fetched: u64,
    total_count: Option<u64>,
    exhausted: bool,
    status: FeedStatus,
    in_flight: Option<InFlight>,
    last_error: Option<FetchError>,
    updated_at_ms: u64,
}

impl Feed {
    pub(crate) fn new(key: FeedKey, generation: u64, now_ms: u64) -> Self {
        Self {
            key,
            generation,
            pages: Vec::new(),
            seen: IdSet::default(),
            order: Vec::new(),
            fetched: 0,
            total_count: None,
            exhausted: false,
            status: FeedStatus::Idle,
            in_flight: None,
            last_error: None,
            updated_at_ms: now_ms,
        }
    }

    pub fn key(&self) -> &FeedKey {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Items received so far, duplicates included. This is the next offset to request.
    pub fn fetched_count(&self) -> u64 {
        self.fetched
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn has_fetched(&self) -> bool {
        !self.pages.is_empty()
    }

    pub fn updated_at_ms(&self) -> u64 {
        self.updated_at_ms
    }

    /// `true` iff a page arrived, the last page was not empty, and fewer items than the
    /// server's latest `total_count` have been received.
    pub fn has_next_page(&self) -> bool {
        if self.pages.is_empty() || self.exhausted {
            return false;
        }
        self.total_count.is_some_and(|total| self.fetched < total)
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_fetching_next_page(&self) -> bool {
        matches!(
            self.in_flight,
            Some(InFlight {
                kind: FetchKind::Next,
                ..
            })
        )
    }

    /// Visits the flattened item list in page order, skipping repeated ids.
    pub fn for_each_item<'a>(&'a self, mut f: impl FnMut(&'a Item)) {
        for &(page, index) in &self.order {
            if let Some(item) = self.pages.get(page).and_then(|p| p.items.get(index)) {
                f(item);
            }
        }
    }

    pub fn items(&self) -> Vec<&Item> {
        let mut out = Vec::with_capacity(self.order.len());
        self.for_each_item(|item| out.push(item));
        out
    }

    /// Number of items [`Self::for_each_item`] visits.
    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            key: self.key.clone(),
            status: self.status,
            pages: self.pages.len(),
            fetched: self.fetched,
            total_count: self.total_count,
            has_next_page: self.has_next_page(),
            is_fetching: self.is_fetching(),
            is_fetching_next_page: self.is_fetching_next_page(),
        }
    }

    pub(crate) fn begin(&mut self, kind: FetchKind, limit: u32) -> FetchRequest {
        debug_assert!(self.in_flight.is_none(), "feed already has a request in flight");
        self.in_flight = Some(InFlight {
            offset: self.fetched,
            attempt: 0,
            kind,
        });
        self.status = match kind {
            FetchKind::First => FeedStatus::FetchingFirst,
            FetchKind::Next => FeedStatus::FetchingNext,
        };
        FetchRequest {
            key: self.key.clone(),
            offset: self.fetched,
            limit,
            attempt: 0,
            kind,
            generation: self.generation,
        }
    }

    /// `true` if `request` is exactly the one this feed is waiting for.
    pub(crate) fn awaits(&self, request: &FetchRequest) -> bool {
        request.generation == self.generation
            && self.in_flight
                == Some(InFlight {
                    offset: request.offset,
                    attempt: request.attempt,
                    kind: request.kind,
                })
    }

    pub(crate) fn retry(&mut self, request: &FetchRequest, error: FetchError) -> FetchRequest {
        self.last_error = Some(error);
        let attempt = request.attempt.saturating_add(1);
        self.in_flight = Some(InFlight {
            offset: request.offset,
            attempt,
            kind: request.kind,
        });
        FetchRequest {
            attempt,
            ..request.clone()
        }
    }

    /// Appends a page. Returns the number of items that were new to the feed.
    pub(crate) fn accept(&mut self, request: &FetchRequest, page: Page, now_ms: u64) -> usize {
        if page.pagination.offset != request.offset {
            gwarn!(
                feed = %self.key,
                requested = request.offset,
                reported = page.pagination.offset,
                "Feed::accept: server reported a different offset"
            );
        }

        let page_index = self.pages.len();
        let mut emitter = ItemEmitter::new(&mut self.seen);
        for (index, item) in page.items.iter().enumerate() {
            if emitter.admit(item) {
                self.order.push((page_index, index));
            }
        }
        let fresh = emitter.emitted();
        if fresh < page.items.len() {
            gwarn!(
                feed = %self.key,
                duplicates = page.items.len() - fresh,
                "Feed::accept: page repeats items already in the feed"
            );
        }

        let received = page.items.len() as u64;
        self.fetched = self.fetched.saturating_add(received);
        self.total_count = Some(page.pagination.total_count);
        if received == 0 {
            self.exhausted = true;
        }
        self.pages.push(page);
        self.in_flight = None;
        self.last_error = None;
        self.status = FeedStatus::Settled;
        self.updated_at_ms = now_ms;
        fresh
    }

    pub(crate) fn fail(&mut self, error: FetchError) {
        self.in_flight = None;
        self.last_error = Some(error);
        self.status = FeedStatus::Failed;
    }
}
