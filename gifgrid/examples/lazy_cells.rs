// Example: lazy image reveal and the scroll sentinel, driven by the in-memory observer platform.
use std::cell::RefCell;
use std::rc::Rc;

use gifgrid::sensor::fake::FakePlatform;
use gifgrid::sensor::{IntersectionEntry, VisibilitySensor};
use gifgrid::{
    CellOptions, Coordinator, FeedKey, ImageCell, Item, Page, Pagination, Rendition,
    ScrollTrigger, VisibilityOptions,
};

const SENTINEL: u64 = 0;

fn page(offset: u64, n: u64, total_count: u64) -> Page {
    let items = (offset..offset + n)
        .map(|i| {
            Item::new(format!("gif-{i}"), "").with_rendition(Rendition::new(
                "original",
                format!("https://media.example/gif-{i}.gif"),
                "image/gif",
                480,
                270,
            ))
        })
        .collect();
    Page::new(
        items,
        Pagination {
            offset,
            count: n,
            total_count,
        },
    )
}

fn main() {
    let platform = FakePlatform::new();

    let mut cell = ImageCell::new(&page(0, 1, 1).items[0], &CellOptions::default());
    println!("before: {:?}", cell.view());
    cell.on_intersection(IntersectionEntry::visible(0.5));
    cell.on_load();
    println!("after:  {:?}", cell.view());

    let coordinator = Rc::new(RefCell::new(Coordinator::default()));
    let trigger = Rc::new(RefCell::new(ScrollTrigger::new()));
    let key = FeedKey::Trending;
    {
        let mut c = coordinator.borrow_mut();
        if let Some(r) = c.ensure_feed(&key, 0) {
            c.complete(&r, Ok(page(0, 20, 60)), 0);
        }
    }

    let _sentinel = VisibilitySensor::attach_with(
        &platform,
        &SENTINEL,
        VisibilityOptions::default().with_root_margin(200),
        {
            let coordinator = Rc::clone(&coordinator);
            let trigger = Rc::clone(&trigger);
            let key = key.clone();
            move |visible| {
                let mut c = coordinator.borrow_mut();
                if let Some(r) = trigger.borrow_mut().on_sentinel_visibility(visible, &mut c, &key) {
                    println!("sentinel visible: requesting offset={}", r.offset);
                    c.complete(&r, Ok(page(r.offset, 20, 60)), 0);
                }
            }
        },
    );

    platform.show(SENTINEL);
    platform.hide(SENTINEL);
    platform.show(SENTINEL);
    println!("items={}", coordinator.borrow().items(&key).len());
}
