use crate::{FeedKey, FeedStatus};

/// A lightweight, serializable snapshot of one feed's pagination state.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedSnapshot {
    pub key: FeedKey,
    pub status: FeedStatus,
    pub pages: usize,
    /// Items received so far (the next offset to request).
    pub fetched: u64,
    /// Server-reported total from the most recent page.
    pub total_count: Option<u64>,
    pub has_next_page: bool,
    pub is_fetching: bool,
    pub is_fetching_next_page: bool,
}

impl FeedSnapshot {
    /// `true` once at least one page arrived.
    pub fn has_fetched(&self) -> bool {
        self.pages > 0
    }
}
