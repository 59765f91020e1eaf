use alloc::string::String;
use alloc::vec::Vec;

use crate::sensor::{IntersectionEntry, Visibility};
use crate::{CellOptions, Item};

/// Placeholder backgrounds shown until an image has loaded.
pub const PLACEHOLDER_COLORS: [&str; 7] = [
    "#4b5563", // gray-600
    "#dc2626", // red-600
    "#d97706", // amber-600
    "#059669", // emerald-600
    "#0284c7", // sky-600
    "#7c3aed", // violet-600
    "#db2777", // pink-600
];

const PREVIEW_RENDITION: &str = "fixed_width";
const PREVIEW_MIME: &str = "image/webp";
const FULL_RENDITION: &str = "original";
const FULL_MIME: &str = "image/gif";

/// A `<source>`-style alternative offered before the fallback `src`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSource {
    pub srcset: String,
    pub mime: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageView<'a> {
    pub src: &'a str,
    pub alt: &'a str,
    pub sources: &'a [ImageSource],
    /// `false` keeps the image transparent while it loads.
    pub opaque: bool,
    pub reveal_delay_ms: u32,
}

/// What to draw for one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellView<'a> {
    /// Placeholder colour, when the placeholder is showing.
    pub placeholder: Option<&'static str>,
    /// Reserved height while loading; `None` lets the image size the cell.
    pub height: Option<u32>,
    /// Present once the cell has been in view.
    pub image: Option<ImageView<'a>>,
    pub caption: &'a str,
}

/// Placeholder-until-loaded presentation of one [`Item`].
///
/// The real image is only requested once the cell has been in view (a latching visibility
/// sensor); from then on it stays mounted.
#[derive(Clone, Debug)]
pub struct ImageCell {
    id: String,
    src: String,
    alt: String,
    sources: Vec<ImageSource>,
    color: &'static str,
    reveal_delay_ms: u32,
    placeholder_height: u32,
    visibility: Visibility,
    loaded: bool,
    errored: bool,
}

impl ImageCell {
    pub fn new(item: &Item, options: &CellOptions) -> Self {
        let src = item
            .rendition(FULL_RENDITION, FULL_MIME)
            .or_else(|| item.renditions_named(FULL_RENDITION).next())
            .or_else(|| item.renditions.first())
            .map(|r| r.url.clone())
            .unwrap_or_default();
        let sources = item
            .rendition(PREVIEW_RENDITION, PREVIEW_MIME)
            .map(|r| ImageSource {
                srcset: r.url.clone(),
                mime: r.mime.clone(),
            })
            .into_iter()
            .collect();

        let hash = fnv1a(item.id.as_bytes());
        let color = PLACEHOLDER_COLORS[(hash % PLACEHOLDER_COLORS.len() as u64) as usize];
        let reveal_delay_ms = match options.max_reveal_delay_ms {
            0 => 0,
            max => ((hash >> 32) % max as u64) as u32,
        };

        Self {
            id: item.id.clone(),
            src,
            alt: item.display_title().into(),
            sources,
            color,
            reveal_delay_ms,
            placeholder_height: options.placeholder_height,
            visibility: Visibility::new(options.visibility()),
            loaded: false,
            errored: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn in_view(&self) -> bool {
        self.visibility.in_view()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    pub fn placeholder_color(&self) -> &'static str {
        self.color
    }

    /// Feeds an intersection notification. Returns `true` when the cell became visible.
    pub fn on_intersection(&mut self, entry: IntersectionEntry) -> bool {
        self.visibility.observe(entry)
    }

    pub fn on_load(&mut self) {
        self.loaded = true;
    }

    /// The preview sources failed; fall back to `src` alone.
    pub fn on_error(&mut self) {
        self.errored = true;
    }

    /// URL to put on the clipboard for the "copy" action.
    pub fn copy_url(&self) -> &str {
        &self.src
    }

    pub fn view(&self) -> CellView<'_> {
        let in_view = self.visibility.in_view();
        let image = in_view.then(|| ImageView {
            src: &self.src,
            alt: &self.alt,
            sources: if self.errored { &[][..] } else { &self.sources[..] },
            opaque: self.loaded,
            reveal_delay_ms: self.reveal_delay_ms,
        });
        CellView {
            placeholder: (!self.loaded || !in_view).then_some(self.color),
            height: (!self.loaded).then_some(self.placeholder_height),
            image,
            caption: &self.alt,
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
