use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::coordinator::Coordinator;
use crate::FeedKey;

/// A callback fired after a feed's state changes.
///
/// The second argument is the key of the feed that changed.
pub type OnChangeCallback = Arc<dyn Fn(&Coordinator, &FeedKey) + Send + Sync>;

/// Configuration for [`crate::Coordinator`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
pub struct CoordinatorOptions {
    /// Items requested per page (`limit`).
    pub page_size: u32,
    /// Automatic retries of a failed request before the feed is marked failed.
    pub max_retries: u8,
    /// Age after which an idle feed is dropped by `Coordinator::evict_stale`.
    pub stale_after_ms: u64,
    pub on_change: Option<OnChangeCallback>,
}

impl Clone for CoordinatorOptions {
    fn clone(&self) -> Self {
        Self {
            page_size: self.page_size,
            max_retries: self.max_retries,
            stale_after_ms: self.stale_after_ms,
            on_change: self.on_change.clone(),
        }
    }
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self::new(20)
    }
}

impl CoordinatorOptions {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_retries: 1,
            stale_after_ms: 20 * 60 * 1000,
            on_change: None,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u8) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_stale_after_ms(mut self, stale_after_ms: u64) -> Self {
        self.stale_after_ms = stale_after_ms;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Coordinator, &FeedKey) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for CoordinatorOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoordinatorOptions")
            .field("page_size", &self.page_size)
            .field("max_retries", &self.max_retries)
            .field("stale_after_ms", &self.stale_after_ms)
            .finish_non_exhaustive()
    }
}

/// Overrides the minimum column width once the container is at least `min_width` wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Breakpoint {
    pub min_width: u32,
    pub min_column_width: u32,
}

/// Configuration for [`crate::ColumnLayout`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutOptions {
    pub min_column_width: u32,
    pub max_columns: usize,
    /// Space between columns.
    pub gap: u32,
    /// Sorted by `min_width`, ascending.
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::new(150, 4)
    }
}

impl LayoutOptions {
    pub fn new(min_column_width: u32, max_columns: usize) -> Self {
        Self {
            min_column_width,
            max_columns,
            gap: 0,
            breakpoints: Vec::new(),
        }
    }

    /// 150px columns, widening to 220px from 768px on, at most 4 columns.
    pub fn responsive() -> Self {
        Self::new(150, 4).with_breakpoint(768, 220)
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_max_columns(mut self, max_columns: usize) -> Self {
        self.max_columns = max_columns;
        self
    }

    pub fn with_breakpoint(mut self, min_width: u32, min_column_width: u32) -> Self {
        let at = self
            .breakpoints
            .partition_point(|b| b.min_width <= min_width);
        self.breakpoints.insert(
            at,
            Breakpoint {
                min_width,
                min_column_width,
            },
        );
        self
    }

    /// Minimum column width in effect for a container `width`.
    pub fn min_column_width_for(&self, width: u32) -> u32 {
        self.breakpoints
            .iter()
            .rev()
            .find(|b| width >= b.min_width)
            .map_or(self.min_column_width, |b| b.min_column_width)
    }
}

/// Configuration for visibility sensing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibilityOptions {
    /// Minimum intersection ratio (0.0..=1.0) that counts as visible.
    pub threshold: f32,
    /// Margin in pixels grown around the root before intersecting. Applied by the platform.
    pub root_margin: i32,
    /// Latch `true` after the first visible notification and stop observing.
    pub once: bool,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0,
            once: false,
        }
    }
}

impl VisibilityOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_root_margin(mut self, root_margin: i32) -> Self {
        self.root_margin = root_margin;
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}

/// Configuration for [`crate::ImageCell`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellOptions {
    pub threshold: f32,
    /// Height reserved for the placeholder until the image has loaded.
    pub placeholder_height: u32,
    /// Upper bound (exclusive) of the per-item reveal delay.
    pub max_reveal_delay_ms: u32,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            placeholder_height: 200,
            max_reveal_delay_ms: 200,
        }
    }
}

impl CellOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_placeholder_height(mut self, placeholder_height: u32) -> Self {
        self.placeholder_height = placeholder_height;
        self
    }

    pub fn with_max_reveal_delay_ms(mut self, max_reveal_delay_ms: u32) -> Self {
        self.max_reveal_delay_ms = max_reveal_delay_ms;
        self
    }

    pub fn visibility(&self) -> VisibilityOptions {
        VisibilityOptions::default()
            .with_threshold(self.threshold)
            .with_once(true)
    }
}
