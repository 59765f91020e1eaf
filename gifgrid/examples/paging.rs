// Example: paging a feed through the coordinator with an in-memory "server".
use gifgrid::{Completion, Coordinator, CoordinatorOptions, FeedKey, Item, Page, Pagination};

const TOTAL: u64 = 45;

fn serve(offset: u64, limit: u32) -> Page {
    let end = (offset + limit as u64).min(TOTAL);
    let items = (offset..end)
        .map(|i| Item::new(format!("gif-{i}"), format!("GIF #{i}")))
        .collect::<Vec<_>>();
    let count = items.len() as u64;
    Page::new(
        items,
        Pagination {
            offset,
            count,
            total_count: TOTAL,
        },
    )
}

fn main() {
    let mut c = Coordinator::new(CoordinatorOptions::new(20));
    let key = FeedKey::Trending;

    // The coordinator never performs I/O: it hands out requests and waits for `complete`.
    let mut request = c.ensure_feed(&key, 0);
    while let Some(r) = request {
        let page = serve(r.offset, r.limit);
        match c.complete(&r, Ok(page), 0) {
            Completion::Appended { items } => println!(
                "offset={} appended={items} has_next_page={}",
                r.offset,
                c.has_next_page(&key)
            ),
            other => println!("offset={} -> {other:?}", r.offset),
        }
        request = c.fetch_next_page(&key);
    }

    println!("items={} snapshot={:?}", c.items(&key).len(), c.snapshot(&key));
}
