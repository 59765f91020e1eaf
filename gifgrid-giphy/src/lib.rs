//! GIPHY integration for the `gifgrid` crate.
//!
//! `gifgrid` is I/O-free and UI-agnostic. This crate supplies the pieces a real application
//! needs on top of it:
//!
//! - [`GiphyClient`]: async HTTP client for the `trending` and `search` endpoints
//! - [`PageSource`]: the seam between the coordinator's requests and any backend
//! - [`Gallery`]: a framework-neutral controller for the whole gallery screen (debounced
//!   search, URL reflection, columns, infinite scroll, load more, retry)
//!
//! Rendering stays with the adapter: [`Gallery::view`] returns plain data.
#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod gallery;
pub mod location;
mod source;
pub mod wire;

#[cfg(test)]
mod tests;

pub use client::GiphyClient;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GiphyConfig};
pub use error::{ClientError, Result};
pub use gallery::{
    Gallery, GalleryOptions, GalleryView, LoadMore, NO_RESULTS_MESSAGE, Tick, ViewState,
};
pub use source::PageSource;
