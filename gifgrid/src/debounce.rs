/// Delays a rapidly changing value until it has been stable for `delay_ms`.
///
/// The adapter feeds changes through [`Self::set`] and advances time through [`Self::poll`].
/// A value that is superseded before its deadline is never emitted. Dropping the debouncer (or
/// calling [`Self::cancel`]) discards the pending value, so nothing is emitted late.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    settled: T,
    pending: Option<Pending<T>>,
    delay_ms: u64,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    value: T,
    deadline_ms: u64,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T, delay_ms: u64) -> Self {
        Self {
            settled: initial,
            pending: None,
            delay_ms,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn set_delay_ms(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    /// The last value that stayed unchanged for the full delay.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// The most recent input, if it has not settled yet.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// When the pending value will settle, for adapters that schedule a real timer.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    /// Records a new input and restarts the quiet period.
    pub fn set(&mut self, value: T, now_ms: u64) {
        self.pending = Some(Pending {
            value,
            deadline_ms: now_ms.saturating_add(self.delay_ms),
        });
    }

    /// Settles the pending value once its deadline has passed.
    ///
    /// Returns the newly settled value when it differs from the previous one.
    pub fn poll(&mut self, now_ms: u64) -> Option<&T> {
        let due = self.pending.as_ref().is_some_and(|p| now_ms >= p.deadline_ms);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.value == self.settled {
            return None;
        }
        self.settled = pending.value;
        Some(&self.settled)
    }

    /// Settles `value` immediately, dropping anything pending.
    pub fn settle_now(&mut self, value: T) -> bool {
        self.pending = None;
        if value == self.settled {
            return false;
        }
        self.settled = value;
        true
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
