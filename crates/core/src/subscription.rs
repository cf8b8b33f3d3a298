//! Listener registrations that unregister when dropped

use std::fmt;

/// Keeps a listener registered; dropping it unregisters the listener
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Listeners keyed by subscription id
pub(crate) struct ListenerSet<T: ?Sized> {
    next_id: u64,
    listeners: Vec<(u64, std::rc::Rc<T>)>,
}

impl<T: ?Sized> Default for ListenerSet<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<T: ?Sized> ListenerSet<T> {
    pub(crate) fn insert(&mut self, listener: std::rc::Rc<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    /// Snapshot so listeners may (un)subscribe while being notified
    pub(crate) fn snapshot(&self) -> Vec<std::rc::Rc<T>> {
        self.listeners.iter().map(|(_, l)| l.clone()).collect()
    }
}
