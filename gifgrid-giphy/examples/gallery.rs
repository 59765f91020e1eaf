// Example: load trending (or a search given as the first argument) from GIPHY.
//
// Needs GIPHY_API_KEY in the environment or in a `.env` file. Set RUST_LOG=gifgrid=trace to watch
// the coordinator.
use std::time::Instant;

use gifgrid_giphy::{
    Gallery, GalleryOptions, GiphyClient, GiphyConfig, NO_RESULTS_MESSAGE, ViewState,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = GiphyClient::new(GiphyConfig::from_env()?)?;

    let mut location = Url::parse("https://gallery.local/")?;
    if let Some(query) = std::env::args().nth(1) {
        location.query_pairs_mut().append_pair("search", &query);
    }

    let started = Instant::now();
    let now_ms = move || started.elapsed().as_millis() as u64;

    let mut gallery = Gallery::new(GalleryOptions::default(), location, now_ms());
    gallery.on_resize(1024);

    let tick = gallery.tick(now_ms());
    gallery.drive(&client, tick.requests, now_ms).await;
    if let Some(next) = gallery.load_more() {
        gallery.drive(&client, vec![next], now_ms).await;
    }

    let view = gallery.view();
    match view.state {
        ViewState::NoResults => println!("{NO_RESULTS_MESSAGE}"),
        ViewState::Failed { can_retry } => println!("request failed (can_retry={can_retry})"),
        ViewState::Loading | ViewState::Items => {}
    }
    for (i, column) in view.columns.iter().enumerate() {
        println!("column {i}:");
        for item in column {
            let cell = gallery.cell(item);
            println!("  {:<40} {}", item.display_title(), cell.copy_url());
        }
    }
    if let Some(load_more) = view.load_more {
        println!("[{}]", load_more.label);
    }
    Ok(())
}
