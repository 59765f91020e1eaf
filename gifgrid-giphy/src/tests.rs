use crate::location::{search_param, with_search_param};
use crate::wire::{api_error, parse_page};
use crate::*;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use gifgrid::sensor::IntersectionEntry;
use gifgrid::{
    Coordinator, CoordinatorOptions, FeedKey, FetchError, FetchKind, FetchRequest, Item, Page,
    Pagination, VisibilityOptions,
};
use url::Url;

const FIXTURE: &str = r#"{
  "data": [
    {
      "id": "abc",
      "title": "Dancing Cat",
      "images": {
        "original": {
          "url": "https://media.giphy.com/abc/giphy.gif",
          "webp": "https://media.giphy.com/abc/giphy.webp",
          "mp4": "https://media.giphy.com/abc/giphy.mp4",
          "width": "480",
          "height": "270"
        },
        "fixed_width": {
          "url": "https://media.giphy.com/abc/200w.gif",
          "webp": "https://media.giphy.com/abc/200w.webp",
          "width": "200",
          "height": "113"
        },
        "original_still": { "url": "", "width": "n/a", "height": 270 }
      }
    },
    { "id": "def", "title": "", "images": {} }
  ],
  "meta": { "status": 200, "msg": "OK", "response_id": "r-1" },
  "pagination": { "total_count": 45, "count": 2, "offset": 20 }
}"#;

#[test]
fn parse_page_decodes_items_and_renditions() {
    let page = parse_page(FIXTURE.as_bytes(), 20).unwrap();
    assert_eq!(
        page.pagination,
        Pagination {
            offset: 20,
            count: 2,
            total_count: 45
        }
    );
    assert_eq!(page.len(), 2);

    let cat = &page.items[0];
    assert_eq!(cat.id, "abc");
    assert_eq!(cat.renditions_named("original").count(), 3);
    assert_eq!(cat.renditions_named("fixed_width").count(), 2);
    assert_eq!(cat.renditions_named("original_still").count(), 0);

    let preview = cat.rendition("fixed_width", "image/webp").unwrap();
    assert_eq!(preview.url, "https://media.giphy.com/abc/200w.webp");
    assert_eq!((preview.width, preview.height), (200, 113));
    assert!(cat.rendition("fixed_width", "video/mp4").is_none());

    let untitled = &page.items[1];
    assert!(untitled.renditions.is_empty());
    assert_eq!(untitled.display_title(), "Untitled");

    let cell = gifgrid::ImageCell::new(cat, &gifgrid::CellOptions::default());
    assert_eq!(cell.copy_url(), "https://media.giphy.com/abc/giphy.gif");
}

#[test]
fn missing_pagination_is_a_final_page() {
    let body = br#"{"data":[{"id":"a"},{"id":"b"}],"meta":{"status":200,"msg":"OK"}}"#;
    let page = parse_page(body, 40).unwrap();
    assert_eq!(
        page.pagination,
        Pagination {
            offset: 40,
            count: 2,
            total_count: 42
        }
    );

    let mut c = Coordinator::default();
    let r = c.ensure_feed(&FeedKey::Trending, 0).unwrap();
    c.complete(&r, Ok(parse_page(body, 0).unwrap()), 0);
    assert!(!c.has_next_page(&FeedKey::Trending));
}

#[test]
fn meta_status_error_in_success_body() {
    let body = br#"{"data":[],"meta":{"status":403,"msg":"Forbidden","response_id":""}}"#;
    match parse_page(body, 0) {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected an api error, got {other:?}"),
    }
    assert!(matches!(parse_page(b"not json", 0), Err(ClientError::Decode(_))));
}

#[test]
fn api_error_uses_the_body_message() {
    let cases: [(&[u8], &str); 3] = [
        (br#"{"meta":{"status":401,"msg":"Unauthorized"}}"#, "Unauthorized"),
        (br#"{"message":"Invalid authentication credentials"}"#, "Invalid authentication credentials"),
        (b"  upstream timed out \n", "upstream timed out"),
    ];
    for (body, expected) in cases {
        match api_error(401, body) {
            ClientError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, expected);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

fn pairs(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

#[test]
fn request_urls_carry_key_paging_and_query() {
    let client = GiphyClient::new(GiphyConfig::new("secret").with_rating(Some("pg"))).unwrap();

    let trending = client.trending_url(20, 40).unwrap();
    assert_eq!(trending.path(), "/v1/gifs/trending");
    let q = pairs(&trending);
    assert_eq!(q["api_key"], "secret");
    assert_eq!(q["limit"], "20");
    assert_eq!(q["offset"], "40");
    assert_eq!(q["rating"], "pg");
    assert!(!q.contains_key("q"));

    let search = client.search_url("cats & dogs", 20, 0).unwrap();
    assert_eq!(search.path(), "/v1/gifs/search");
    assert_eq!(pairs(&search)["q"], "cats & dogs");
    assert!(!search.as_str().contains("cats & dogs"));
}

#[test]
fn base_url_path_prefix_is_kept() {
    let config = GiphyConfig::new("k").with_base_url("http://localhost:8080/proxy");
    let client = GiphyClient::new(config).unwrap();
    let url = client.search_url("cat", 10, 0).unwrap();
    assert_eq!(url.path(), "/proxy/v1/gifs/search");
    assert!(!pairs(&url).contains_key("rating"));
}

#[test]
fn client_requires_an_api_key() {
    assert!(matches!(
        GiphyClient::new(GiphyConfig::new("  ")),
        Err(ClientError::MissingApiKey)
    ));
    assert!(matches!(
        GiphyClient::new(GiphyConfig::new("k").with_base_url("not a url")),
        Err(ClientError::InvalidUrl(_))
    ));
}

#[test]
fn config_from_vars() {
    let vars: HashMap<&str, &str> = [
        ("GIPHY_API_KEY", " abc "),
        ("GIPHY_BASE_URL", "http://127.0.0.1:9000"),
    ]
    .into_iter()
    .collect();
    let config = GiphyConfig::from_vars(|name| vars.get(name).map(|v| v.to_string())).unwrap();
    assert_eq!(config.api_key, "abc");
    assert_eq!(config.base_url, "http://127.0.0.1:9000");
    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    assert!(!format!("{config:?}").contains("abc"));

    let missing = GiphyConfig::from_vars(|_| None);
    assert!(matches!(missing, Err(ClientError::MissingApiKey)));
    let blank = GiphyConfig::from_vars(|_| Some(String::new()));
    assert!(matches!(blank, Err(ClientError::MissingApiKey)));
}

#[test]
fn client_errors_map_to_fetch_errors() {
    let api: FetchError = ClientError::Api {
        status: 500,
        message: "boom".into(),
    }
    .into();
    assert_eq!(api, FetchError::api(500, "boom"));

    let decode_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let decode: FetchError = ClientError::Decode(decode_err).into();
    assert!(matches!(decode, FetchError::Decode { .. }));

    let missing: FetchError = ClientError::MissingApiKey.into();
    assert!(matches!(missing, FetchError::Transport { .. }));
}

#[test]
fn location_reflects_the_search_param() {
    let url = Url::parse("https://gallery.test/?theme=dark&search=cat#top").unwrap();
    assert_eq!(search_param(&url).as_deref(), Some("cat"));

    let next = with_search_param(&url, "funny dogs");
    assert_eq!(search_param(&next).as_deref(), Some("funny dogs"));
    assert_eq!(pairs(&next)["theme"], "dark");
    assert_eq!(next.fragment(), Some("top"));

    let cleared = with_search_param(&url, "   ");
    assert_eq!(search_param(&cleared), None);
    assert_eq!(cleared.as_str(), "https://gallery.test/?theme=dark#top");

    let bare = Url::parse("https://gallery.test/?search=cat").unwrap();
    assert_eq!(with_search_param(&bare, "").as_str(), "https://gallery.test/");
}

/// In-memory backend: trending has 45 items, the query "nothing" has none, any other query 30.
#[derive(Default)]
struct FakeSource {
    fail_next: AtomicUsize,
    failure: Option<FetchError>,
    calls: Mutex<Vec<FetchRequest>>,
}

impl FakeSource {
    fn failing(times: usize, failure: FetchError) -> Self {
        Self {
            fail_next: AtomicUsize::new(times),
            failure: Some(failure),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<FetchRequest> {
        self.calls.lock().unwrap().clone()
    }
}

fn total_for(key: &FeedKey) -> u64 {
    match key.query() {
        None => 45,
        Some("nothing") => 0,
        Some(_) => 30,
    }
}

fn fake_page(key: &FeedKey, offset: u64, limit: u32) -> Page {
    let total = total_for(key);
    let end = (offset + limit as u64).min(total);
    let items: Vec<Item> = (offset..end)
        .map(|i| Item::new(format!("{key}-{i}"), format!("{key} #{i}")))
        .collect();
    let count = items.len() as u64;
    Page::new(
        items,
        Pagination {
            offset,
            count,
            total_count: total,
        },
    )
}

#[async_trait::async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<Page, FetchError> {
        self.calls.lock().unwrap().push(request.clone());
        let failing = self
            .fail_next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(self
                .failure
                .clone()
                .unwrap_or_else(|| FetchError::transport("connection reset")));
        }
        Ok(fake_page(&request.key, request.offset, request.limit))
    }
}

fn home() -> Url {
    Url::parse("https://gallery.test/").unwrap()
}

fn item_count(view: &GalleryView<'_>) -> usize {
    view.columns.iter().map(Vec::len).sum()
}

#[tokio::test]
async fn trending_loads_and_scrolls_to_the_end() {
    let source = FakeSource::default();
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    assert_eq!(gallery.view().state, ViewState::Loading);

    let tick = gallery.tick(0);
    assert_eq!(tick.location, None);
    assert_eq!(tick.requests.len(), 1);
    assert_eq!(gallery.drive(&source, tick.requests, || 0).await, 1);

    let view = gallery.view();
    assert_eq!(view.state, ViewState::Items);
    assert_eq!(view.columns.len(), 1);
    assert_eq!(item_count(&view), 20);
    assert_eq!(
        view.load_more,
        Some(LoadMore {
            label: "Load More",
            disabled: false
        })
    );

    assert!(gallery.on_resize(480));
    assert_eq!(gallery.view().columns.len(), 3);

    let next = gallery.on_sentinel_visibility(true).unwrap();
    assert_eq!(next.offset, 20);
    let view = gallery.view();
    assert!(view.is_fetching_next_page);
    assert_eq!(
        view.load_more,
        Some(LoadMore {
            label: "Loading...",
            disabled: true
        })
    );
    assert_eq!(gallery.on_sentinel_visibility(true), None);
    assert_eq!(gallery.load_more(), None);

    // The sentinel stays visible, so the last page follows on its own.
    assert_eq!(gallery.drive(&source, vec![next], || 0).await, 2);
    let view = gallery.view();
    assert_eq!(item_count(&view), 45);
    assert!(!view.has_next_page);
    assert_eq!(view.load_more, None);

    let offsets: Vec<u64> = source.calls().iter().map(|r| r.offset).collect();
    assert_eq!(offsets, vec![0, 20, 40]);
}

#[tokio::test]
async fn debounced_search_updates_location_and_feed() {
    let source = FakeSource::default();
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    let tick = gallery.tick(0);
    gallery.drive(&source, tick.requests, || 0).await;

    gallery.on_search_input("c", 0);
    gallery.on_search_input("ca", 100);
    gallery.on_search_input("cat", 200);
    assert_eq!(gallery.search_text(), "cat");
    assert_eq!(gallery.settled_query(), "");
    assert_eq!(gallery.tick(600), Tick::default());

    let tick = gallery.tick(700);
    let location = tick.location.unwrap();
    assert_eq!(location.as_str(), "https://gallery.test/?search=cat");
    assert_eq!(gallery.location(), &location);
    assert_eq!(tick.requests.len(), 1);
    let request = &tick.requests[0];
    assert_eq!(request.key, FeedKey::search("cat").unwrap());
    assert_eq!((request.offset, request.kind), (0, FetchKind::First));

    let view = gallery.view();
    assert_eq!(view.state, ViewState::Loading);
    assert!(view.is_searching);

    gallery.drive(&source, tick.requests, || 700).await;
    let view = gallery.view();
    assert_eq!(view.state, ViewState::Items);
    assert!(!view.is_searching);
    assert_eq!(item_count(&view), 20);
    assert!(view.columns[0][0].id.starts_with("search:cat"));

    // Clearing the box goes back to the cached trending feed without a request.
    gallery.on_search_input("", 1_000);
    let tick = gallery.tick(1_500);
    assert_eq!(tick.location.unwrap().as_str(), "https://gallery.test/");
    assert!(tick.requests.is_empty());
    assert_eq!(gallery.active_feed(), FeedKey::Trending);
    assert_eq!(item_count(&gallery.view()), 20);
}

#[tokio::test]
async fn padded_search_text_shares_one_feed_and_url() {
    let source = FakeSource::default();
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    let tick = gallery.tick(0);
    gallery.drive(&source, tick.requests, || 0).await;

    gallery.on_search_input("cat ", 0);
    assert_eq!(gallery.search_text(), "cat ");
    let tick = gallery.tick(600);
    let shared = tick.location.unwrap();
    assert_eq!(shared.as_str(), "https://gallery.test/?search=cat");
    assert_eq!(gallery.settled_query(), "cat");
    assert_eq!(tick.requests.len(), 1);
    assert_eq!(tick.requests[0].key, FeedKey::search("cat").unwrap());
    assert_eq!(tick.requests[0].key.query(), Some("cat"));
    gallery.drive(&source, tick.requests, || 600).await;

    // Extra padding is still the same query: no refetch and no new address.
    gallery.on_search_input("  cat  ", 700);
    assert_eq!(gallery.tick(1_300), Tick::default());
    assert_eq!(item_count(&gallery.view()), 20);
    assert_eq!(source.calls().len(), 2);

    let reopened = Gallery::new(GalleryOptions::default(), shared, 0);
    assert_eq!(reopened.active_feed(), gallery.active_feed());
}

#[tokio::test]
async fn seeded_search_without_results() {
    let source = FakeSource::default();
    let url = Url::parse("https://gallery.test/?search=nothing").unwrap();
    let mut gallery = Gallery::new(GalleryOptions::default(), url, 0);
    assert_eq!(gallery.settled_query(), "nothing");
    assert_eq!(gallery.active_feed(), FeedKey::search("nothing").unwrap());

    let tick = gallery.tick(0);
    assert_eq!(tick.location, None);
    gallery.drive(&source, tick.requests, || 0).await;

    let view = gallery.view();
    assert_eq!(view.state, ViewState::NoResults);
    assert_eq!(item_count(&view), 0);
    assert_eq!(view.load_more, None);
    assert_eq!(source.calls()[0].key.query(), Some("nothing"));
}

#[tokio::test]
async fn transient_failure_is_retried_once_then_surfaced() {
    let source = FakeSource::failing(2, FetchError::transport("connection reset"));
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    let tick = gallery.tick(0);
    assert_eq!(gallery.drive(&source, tick.requests, || 0).await, 2);

    let view = gallery.view();
    assert_eq!(view.state, ViewState::Failed { can_retry: true });
    assert_eq!(item_count(&view), 0);
    assert_eq!(source.calls()[1].attempt, 1);

    let retry = gallery.retry().unwrap();
    assert_eq!(retry.offset, 0);
    gallery.drive(&source, vec![retry], || 0).await;
    assert_eq!(gallery.view().state, ViewState::Items);
}

#[tokio::test]
async fn failed_next_page_keeps_items_and_stops_loading() {
    let source = FakeSource::default();
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    let tick = gallery.tick(0);
    gallery.drive(&source, tick.requests, || 0).await;

    let failing = FakeSource::failing(usize::MAX, FetchError::api(401, "Unauthorized"));
    let next = gallery.on_sentinel_visibility(true).unwrap();
    assert_eq!(gallery.drive(&failing, vec![next], || 0).await, 2);

    let view = gallery.view();
    assert_eq!(view.state, ViewState::Failed { can_retry: false });
    assert_eq!(item_count(&view), 20);
    assert_eq!(
        view.load_more,
        Some(LoadMore {
            label: "Load More",
            disabled: true
        })
    );
    assert_eq!(gallery.load_more(), None);
    assert_eq!(gallery.on_sentinel_visibility(true), None);
}

#[test]
fn sentinel_threshold_comes_from_gallery_options() {
    let options =
        GalleryOptions::default().with_sentinel(VisibilityOptions::default().with_threshold(0.5));
    let mut gallery = Gallery::new(options, home(), 0);
    let first = gallery.tick(0).requests.remove(0);
    let page = fake_page(&first.key, first.offset, first.limit);
    assert!(gallery.complete(&first, Ok(page), 0).is_empty());

    assert_eq!(
        gallery.on_sentinel_intersection(IntersectionEntry::visible(0.2)),
        None
    );
    assert!(!gallery.coordinator().is_fetching(&FeedKey::Trending));

    let next = gallery
        .on_sentinel_intersection(IntersectionEntry::visible(0.8))
        .unwrap();
    assert_eq!((next.offset, next.kind), (20, FetchKind::Next));
    assert_eq!(gallery.on_sentinel_intersection(IntersectionEntry::hidden()), None);
}

#[test]
fn switching_queries_drops_the_old_result() {
    let mut gallery = Gallery::new(GalleryOptions::default(), home(), 0);
    let trending = gallery.tick(0).requests.remove(0);
    gallery.complete(&trending, Ok(fake_page(&trending.key, 0, 20)), 0);

    gallery.on_search_input("cat", 0);
    let cat = gallery.tick(500).requests.remove(0);
    gallery.on_search_input("dog", 600);
    let dog = gallery.tick(1_100).requests.remove(0);

    let follow_up = gallery.complete(&cat, Ok(fake_page(&cat.key, 0, 20)), 1_200);
    assert!(follow_up.is_empty());
    assert!(gallery.coordinator().feed(&cat.key).is_none());
    assert_eq!(gallery.view().state, ViewState::Loading);

    gallery.complete(&dog, Ok(fake_page(&dog.key, 0, 20)), 1_300);
    let view = gallery.view();
    assert_eq!(view.state, ViewState::Items);
    assert!(view.columns[0][0].id.starts_with("search:dog"));
}

#[tokio::test]
async fn focus_refetches_stale_feeds() {
    let source = FakeSource::default();
    let options = GalleryOptions::default()
        .with_coordinator(CoordinatorOptions::new(20).with_stale_after_ms(1_000));
    let mut gallery = Gallery::new(options, home(), 0);
    let tick = gallery.tick(0);
    gallery.drive(&source, tick.requests, || 0).await;

    assert_eq!(gallery.on_focus(500), None);
    let refetch = gallery.on_focus(5_000).unwrap();
    assert_eq!((refetch.offset, refetch.key.clone()), (0, FeedKey::Trending));
    assert_eq!(gallery.view().state, ViewState::Loading);

    gallery.drive(&source, vec![refetch], || 5_000).await;
    assert_eq!(item_count(&gallery.view()), 20);
}

#[test]
fn cells_use_gallery_options() {
    let options = GalleryOptions::default()
        .with_cell(gifgrid::CellOptions::default().with_placeholder_height(120));
    let gallery = Gallery::new(options, home(), 0);
    let cell = gallery.cell(&Item::new("x", "t"));
    assert_eq!(cell.view().height, Some(120));
}
