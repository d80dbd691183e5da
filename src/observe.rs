//! Publish-on-change helpers for wiring the pager to a host
use std::fmt;

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(u64);

/// An ordered registry of callbacks
pub struct Listeners<T> {
    next_id: u64,
    entries: Vec<(ListenerId, Box<dyn FnMut(&T)>)>,
}

impl<T> Listeners<T> {
    pub fn new() -> Listeners<T> {
        Listeners {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if no listener with the given ID was registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        self.entries.len() != before
    }

    /// Calls every listener with `value`, in order of subscription
    pub fn publish(&mut self, value: &T) {
        for (_, callback) in &mut self.entries {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Listeners<T> {
        Listeners::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

/// A value cell that notifies its listeners whenever the value changes.
///
/// The owner writes with [`Binding::set`]; everybody else reads with
/// [`Binding::get`] or subscribes.  Writing an equal value is a no-op.
#[derive(Debug)]
pub struct Binding<T> {
    value: T,
    listeners: Listeners<T>,
}

impl<T: Clone + PartialEq> Binding<T> {
    pub fn new(value: T) -> Binding<T> {
        Binding {
            value,
            listeners: Listeners::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Stores `value` and notifies listeners if it differs from the current
    /// value.  Returns whether the value changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.listeners.publish(&self.value);
        true
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&T) + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

/// Turns the position of a scroll surface's content, as reported in the
/// surface's own coordinates, into a scroll offset.
///
/// Content scrolled 120 units to the left sits at x = -120, which is an
/// offset of 120.  Listeners only hear about offsets that differ from the
/// last one.
#[derive(Debug, Default)]
pub struct OffsetObserver {
    offset: Binding<(f64, f64)>,
}

impl OffsetObserver {
    pub fn new() -> OffsetObserver {
        OffsetObserver {
            offset: Binding::new((0.0, 0.0)),
        }
    }

    /// Records the content origin `(x, y)` and returns the resulting offset
    pub fn observe_origin(&mut self, x: f64, y: f64) -> (f64, f64) {
        self.offset.set((-x, -y));
        self.offset.get()
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset.get()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&(f64, f64)) + 'static,
    {
        self.offset.subscribe(callback)
    }
}

impl<T: Clone + Default + PartialEq> Default for Binding<T> {
    fn default() -> Binding<T> {
        Binding::new(T::default())
    }
}
