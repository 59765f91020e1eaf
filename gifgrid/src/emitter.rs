use crate::Item;
use crate::key::IdSet;

/// Admits items into a feed's flattened sequence while enforcing the feed contract:
/// every id appears once, in first-seen order.
///
/// A repeated id means the server returned overlapping pages. The repeat is not admitted so the
/// rendered list never shows the same item twice.
pub(crate) struct ItemEmitter<'s> {
    seen: &'s mut IdSet,
    emitted: usize,
}

impl<'s> ItemEmitter<'s> {
    pub(crate) fn new(seen: &'s mut IdSet) -> Self {
        Self { seen, emitted: 0 }
    }

    /// Returns `true` if `item` is new to the feed.
    pub(crate) fn admit(&mut self, item: &Item) -> bool {
        if self.seen.contains(item.id.as_str()) {
            gtrace!(id = %item.id, "ItemEmitter: skipping duplicate item");
            return false;
        }
        self.seen.insert(item.id.clone());
        self.emitted += 1;
        true
    }

    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }
}
