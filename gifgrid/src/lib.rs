//! A headless infinite-scroll gallery engine.
//!
//! For a GIPHY-backed client and a ready-made gallery controller, see the `gifgrid-giphy` crate.
//!
//! This crate focuses on the state that sits between a paginated media API and a rendered,
//! column-balanced grid: accumulating pages per query, deciding when (and whether) the next page
//! may be requested, distributing items into columns that stay stable as pages arrive, and
//! revealing images lazily.
//!
//! It is UI-agnostic and performs no I/O. An adapter is expected to provide:
//! - container widths (for the column count)
//! - visibility notifications (for the scroll sentinel and image cells)
//! - timestamps (`now_ms`) for debouncing and staleness
//! - the results of the [`FetchRequest`]s the [`Coordinator`] hands out
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod cell;
mod coordinator;
mod debounce;
mod emitter;
mod error;
mod feed;
mod key;
mod layout;
mod options;
pub mod sensor;
mod state;
mod trigger;
mod types;


pub use cell::{CellView, ImageCell, ImageSource, ImageView, PLACEHOLDER_COLORS};
pub use coordinator::{Completion, Coordinator};
pub use debounce::Debounced;
pub use error::FetchError;
pub use feed::Feed;
pub use layout::{ColumnBuckets, ColumnLayout, ColumnSync, assign_columns, column_count};
pub use options::{
    Breakpoint, CellOptions, CoordinatorOptions, LayoutOptions, OnChangeCallback,
    VisibilityOptions,
};
pub use state::FeedSnapshot;
pub use trigger::{ScrollTrigger, TriggerState};
pub use types::{
    FeedKey, FeedStatus, FetchKind, FetchRequest, Item, Page, Pagination, Rendition, Size,
    UNTITLED,
};
