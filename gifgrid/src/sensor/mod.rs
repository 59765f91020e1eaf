//! Visibility and size sensing over a platform-provided observer API.
//!
//! The platform layer (DOM, native toolkit, TUI, ...) implements [`ObserverPlatform`]. Sensors
//! only depend on that trait, so they can be driven headlessly by [`fake::FakePlatform`].
//!
//! Notifications are delivered on the UI thread; sensors are `!Send` and share state through
//! `Rc`.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::{Size, VisibilityOptions};

#[cfg(any(test, feature = "testing"))]
pub mod fake;

/// One intersection notification.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    /// Visible fraction of the target, 0.0..=1.0.
    pub ratio: f32,
}

impl IntersectionEntry {
    pub fn visible(ratio: f32) -> Self {
        Self {
            is_intersecting: true,
            ratio,
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }
}

pub type IntersectionCallback = Box<dyn FnMut(IntersectionEntry)>;
pub type ResizeCallback = Box<dyn FnMut(Size)>;

/// Registration handle returned by [`ObserverPlatform`]. Unsubscribes when dropped.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel (e.g. for platforms without teardown).
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Observer API of the host environment.
///
/// Implementations deliver notifications asynchronously (e.g. from the next frame), never from
/// inside `observe_*`.
pub trait ObserverPlatform {
    type Element: ?Sized;

    fn observe_intersection(
        &self,
        element: &Self::Element,
        options: &VisibilityOptions,
        callback: IntersectionCallback,
    ) -> Subscription;

    fn observe_resize(&self, element: &Self::Element, callback: ResizeCallback) -> Subscription;
}

/// Visibility state machine, independent of any platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    options: VisibilityOptions,
    in_view: bool,
    latched: bool,
}

impl Visibility {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            in_view: false,
            latched: false,
        }
    }

    pub fn options(&self) -> &VisibilityOptions {
        &self.options
    }

    pub fn in_view(&self) -> bool {
        self.in_view
    }

    /// `true` once a `once` sensor has seen the target; it ignores further notifications.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Applies a notification. Returns `true` when `in_view` changed.
    pub fn observe(&mut self, entry: IntersectionEntry) -> bool {
        if self.latched {
            return false;
        }
        let satisfied = entry.is_intersecting && entry.ratio >= self.options.threshold;
        if satisfied && self.options.once {
            self.latched = true;
        }
        if satisfied == self.in_view {
            return false;
        }
        self.in_view = satisfied;
        true
    }
}

/// Tracks whether one element intersects the viewport.
///
/// In `once` mode the sensor unsubscribes itself after the first visible notification and
/// stays `in_view` for good.
pub struct VisibilitySensor {
    state: Rc<RefCell<Visibility>>,
    subscription: Rc<RefCell<Option<Subscription>>>,
}

impl VisibilitySensor {
    pub fn attach<P: ObserverPlatform>(
        platform: &P,
        element: &P::Element,
        options: VisibilityOptions,
    ) -> Self {
        Self::attach_with(platform, element, options, |_| {})
    }

    /// Like [`Self::attach`], calling `on_change(in_view)` after every change.
    pub fn attach_with<P: ObserverPlatform>(
        platform: &P,
        element: &P::Element,
        options: VisibilityOptions,
        mut on_change: impl FnMut(bool) + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(Visibility::new(options)));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let callback = {
            let state = Rc::clone(&state);
            let slot = Rc::clone(&slot);
            Box::new(move |entry: IntersectionEntry| {
                let (changed, in_view, latched) = {
                    let mut s = state.borrow_mut();
                    let changed = s.observe(entry);
                    (changed, s.in_view(), s.is_latched())
                };
                if latched {
                    let done = slot.borrow_mut().take();
                    drop(done);
                }
                if changed {
                    on_change(in_view);
                }
            })
        };

        let subscription = platform.observe_intersection(element, &options, callback);
        if !state.borrow().is_latched() {
            *slot.borrow_mut() = Some(subscription);
        }
        Self {
            state,
            subscription: slot,
        }
    }

    pub fn in_view(&self) -> bool {
        self.state.borrow().in_view()
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    pub fn state(&self) -> Visibility {
        *self.state.borrow()
    }

    /// Stops observing. The last known state is kept.
    pub fn detach(&mut self) {
        let subscription = self.subscription.borrow_mut().take();
        drop(subscription);
    }
}

impl fmt::Debug for VisibilitySensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilitySensor")
            .field("state", &*self.state.borrow())
            .field("observing", &self.is_observing())
            .finish()
    }
}

/// Tracks the content-box size of one element.
pub struct SizeSensor {
    size: Rc<Cell<Size>>,
    subscription: Option<Subscription>,
}

impl SizeSensor {
    pub fn attach<P: ObserverPlatform>(platform: &P, element: &P::Element) -> Self {
        Self::attach_with(platform, element, |_| {})
    }

    /// Like [`Self::attach`], calling `on_change(size)` after every change.
    pub fn attach_with<P: ObserverPlatform>(
        platform: &P,
        element: &P::Element,
        mut on_change: impl FnMut(Size) + 'static,
    ) -> Self {
        let size = Rc::new(Cell::new(Size::default()));
        let callback = {
            let size = Rc::clone(&size);
            Box::new(move |next: Size| {
                if size.replace(next) != next {
                    on_change(next);
                }
            })
        };
        let subscription = platform.observe_resize(element, callback);
        Self {
            size,
            subscription: Some(subscription),
        }
    }

    /// Last reported size; zero until the first notification.
    pub fn size(&self) -> Size {
        self.size.get()
    }

    pub fn width(&self) -> u32 {
        self.size.get().width
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn detach(&mut self) {
        self.subscription = None;
    }
}

impl fmt::Debug for SizeSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeSensor")
            .field("size", &self.size.get())
            .field("observing", &self.is_observing())
            .finish()
    }
}
