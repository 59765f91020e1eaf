//! A synchronous, in-memory [`ObserverPlatform`] for tests.
//!
//! Elements are plain `u64` ids. Notifications are delivered only when the test calls
//! [`FakePlatform::intersect`] / [`FakePlatform::resize`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use super::{
    IntersectionCallback, IntersectionEntry, ObserverPlatform, ResizeCallback, Subscription,
};
use crate::{Size, VisibilityOptions};

struct Listener<C> {
    element: u64,
    active: Rc<Cell<bool>>,
    callback: Rc<RefCell<C>>,
}

impl<C> Clone for Listener<C> {
    fn clone(&self) -> Self {
        Self {
            element: self.element,
            active: Rc::clone(&self.active),
            callback: Rc::clone(&self.callback),
        }
    }
}

#[derive(Default)]
struct Registry {
    intersection: Vec<Listener<IntersectionCallback>>,
    resize: Vec<Listener<ResizeCallback>>,
    last_options: Option<VisibilityOptions>,
}

/// Cloning shares the registry, so a test can keep a handle while sensors hold another.
#[derive(Clone, Default)]
pub struct FakePlatform {
    registry: Rc<RefCell<Registry>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `entry` to every active intersection observer of `element`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn intersect(&self, element: u64, entry: IntersectionEntry) -> usize {
        let listeners: Vec<_> = {
            let mut registry = self.registry.borrow_mut();
            registry.intersection.retain(|l| l.active.get());
            registry
                .intersection
                .iter()
                .filter(|l| l.element == element)
                .cloned()
                .collect()
        };
        let mut delivered = 0;
        for listener in listeners {
            if !listener.active.get() {
                continue;
            }
            let mut callback = listener.callback.borrow_mut();
            (*callback)(entry);
            delivered += 1;
        }
        delivered
    }

    pub fn show(&self, element: u64) -> usize {
        self.intersect(element, IntersectionEntry::visible(1.0))
    }

    pub fn hide(&self, element: u64) -> usize {
        self.intersect(element, IntersectionEntry::hidden())
    }

    /// Delivers `size` to every active resize observer of `element`.
    pub fn resize(&self, element: u64, size: Size) -> usize {
        let listeners: Vec<_> = {
            let mut registry = self.registry.borrow_mut();
            registry.resize.retain(|l| l.active.get());
            registry
                .resize
                .iter()
                .filter(|l| l.element == element)
                .cloned()
                .collect()
        };
        let mut delivered = 0;
        for listener in listeners {
            if !listener.active.get() {
                continue;
            }
            let mut callback = listener.callback.borrow_mut();
            (*callback)(size);
            delivered += 1;
        }
        delivered
    }

    /// Active observers (of both kinds) registered for `element`.
    pub fn observer_count(&self, element: u64) -> usize {
        let registry = self.registry.borrow();
        let intersection = registry
            .intersection
            .iter()
            .filter(|l| l.element == element && l.active.get())
            .count();
        let resize = registry
            .resize
            .iter()
            .filter(|l| l.element == element && l.active.get())
            .count();
        intersection + resize
    }

    /// Options passed with the most recent intersection registration.
    pub fn last_options(&self) -> Option<VisibilityOptions> {
        self.registry.borrow().last_options
    }
}

impl ObserverPlatform for FakePlatform {
    type Element = u64;

    fn observe_intersection(
        &self,
        element: &u64,
        options: &VisibilityOptions,
        callback: IntersectionCallback,
    ) -> Subscription {
        let active = Rc::new(Cell::new(true));
        let mut registry = self.registry.borrow_mut();
        registry.last_options = Some(*options);
        registry.intersection.push(Listener {
            element: *element,
            active: Rc::clone(&active),
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription::new(move || active.set(false))
    }

    fn observe_resize(&self, element: &u64, callback: ResizeCallback) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.registry.borrow_mut().resize.push(Listener {
            element: *element,
            active: Rc::clone(&active),
            callback: Rc::new(RefCell::new(callback)),
        });
        Subscription::new(move || active.set(false))
    }
}
