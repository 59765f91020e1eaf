use crate::{Coordinator, FeedKey, FetchRequest};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerState {
    #[default]
    Idle,
    /// A next-page request was issued and has not settled yet.
    Triggering,
}

/// Turns sentinel visibility into next-page requests.
///
/// The sentinel is a marker placed after the last rendered item. The trigger fires only from
/// `Idle`, only while the sentinel is visible, the feed has a next page, and nothing is in
/// flight. It reacts to visibility notifications and to feed changes; it never polls.
///
/// Firing issues the request synchronously, so the feed is already in flight by the time a
/// second notification can arrive.
#[derive(Clone, Debug, Default)]
pub struct ScrollTrigger {
    state: TriggerState,
    sentinel_visible: bool,
}

impl ScrollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn is_sentinel_visible(&self) -> bool {
        self.sentinel_visible
    }

    /// Call when the sentinel's visibility changes.
    pub fn on_sentinel_visibility(
        &mut self,
        visible: bool,
        coordinator: &mut Coordinator,
        key: &FeedKey,
    ) -> Option<FetchRequest> {
        self.sentinel_visible = visible;
        self.evaluate(coordinator, key)
    }

    /// Call when the feed's `has_next_page` / fetching flags may have changed (e.g. after
    /// [`Coordinator::complete`]).
    ///
    /// If the sentinel is still visible after a page lands (short content), the next page is
    /// requested right away.
    pub fn on_feed_change(
        &mut self,
        coordinator: &mut Coordinator,
        key: &FeedKey,
    ) -> Option<FetchRequest> {
        if self.state == TriggerState::Triggering && !coordinator.is_fetching(key) {
            self.state = TriggerState::Idle;
        }
        self.evaluate(coordinator, key)
    }

    /// Forgets any in-progress trigger, e.g. when the displayed feed is switched.
    pub fn reset(&mut self) {
        self.state = TriggerState::Idle;
    }

    fn evaluate(&mut self, coordinator: &mut Coordinator, key: &FeedKey) -> Option<FetchRequest> {
        if self.state != TriggerState::Idle
            || !self.sentinel_visible
            || !coordinator.has_next_page(key)
            || coordinator.is_fetching(key)
        {
            return None;
        }
        let request = coordinator.fetch_next_page(key)?;
        gtrace!(feed = %key, offset = request.offset, "ScrollTrigger: fired");
        self.state = TriggerState::Triggering;
        Some(request)
    }
}
