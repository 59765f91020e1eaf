use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Title shown for items whose title is empty.
pub const UNTITLED: &str = "Untitled";

/// One asset variant of an [`Item`] (e.g. the `fixed_width` webp preview).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rendition {
    /// Variant name as reported by the media service (`original`, `fixed_width`, ...).
    pub name: String,
    pub url: String,
    /// MIME-type hint such as `image/webp`.
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

impl Rendition {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        mime: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            mime: mime.into(),
            width,
            height,
        }
    }
}

/// One media record. Immutable once received.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: String,
    pub title: String,
    pub renditions: Vec<Rendition>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            renditions: Vec::new(),
        }
    }

    pub fn with_rendition(mut self, rendition: Rendition) -> Self {
        self.renditions.push(rendition);
        self
    }

    /// The title to display; blank titles render as [`UNTITLED`].
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Looks up a rendition by variant name and MIME type.
    pub fn rendition(&self, name: &str, mime: &str) -> Option<&Rendition> {
        self.renditions
            .iter()
            .find(|r| r.name == name && r.mime == mime)
    }

    pub fn renditions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Rendition> {
        self.renditions.iter().filter(move |r| r.name == name)
    }
}

/// Pagination block of one response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pagination {
    /// 0-based index of the first item of the page within the whole result set.
    pub offset: u64,
    /// Items actually returned.
    pub count: u64,
    /// Total available for the query, according to the server.
    pub total_count: u64,
}

/// One fetch response. Item order is server order and is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}

impl Page {
    pub fn new(items: Vec<Item>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Query identity of a feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedKey {
    Trending,
    Search(String),
}

impl FeedKey {
    /// Returns a search key for the trimmed text, or `None` when nothing is left (a blank
    /// query means "no search").
    pub fn search(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            None
        } else {
            Some(Self::Search(query.into()))
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Trending => None,
            Self::Search(q) => Some(q.as_str()),
        }
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trending => f.write_str("trending"),
            Self::Search(q) => write!(f, "search:{q}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedStatus {
    /// Created, no request issued yet.
    #[default]
    Idle,
    FetchingFirst,
    FetchingNext,
    /// At least one page received and nothing in flight.
    Settled,
    /// The last request failed after exhausting its retries.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FetchKind {
    First,
    Next,
}

/// A page request handed out by the [`crate::Coordinator`].
///
/// The adapter executes it and reports the outcome through
/// [`crate::Coordinator::complete`]. A request is only ever accepted by the feed instance that
/// issued it: `generation` identifies that instance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchRequest {
    pub key: FeedKey,
    pub offset: u64,
    pub limit: u32,
    /// 0 for the first try, incremented per automatic retry.
    pub attempt: u8,
    pub kind: FetchKind,
    pub(crate) generation: u64,
}

impl FetchRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A measured content box, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}
