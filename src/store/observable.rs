//! Synchronous observer lists.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<T> = Box<dyn FnMut(&T) + Send>;

struct ListenerTable<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Listeners notified in subscription order, on the notifying thread.
///
/// A listener must not subscribe or unsubscribe on the same list while it is
/// being notified.
pub struct Listeners<T> {
    table: Arc<Mutex<ListenerTable<T>>>,
}

impl<T: 'static> Listeners<T> {
    #[must_use]
    pub fn new() -> Self {
        Listeners {
            table: Arc::new(Mutex::new(ListenerTable {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Add a listener. It is not called with the current value.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = {
            let mut table = self.table.lock();
            table.next_id += 1;
            let id = table.next_id;
            table.entries.push((id, Box::new(listener)));
            id
        };

        let weak: Weak<Mutex<ListenerTable<T>>> = Arc::downgrade(&self.table);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(table) = weak.upgrade() {
                    table.lock().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    pub fn notify(&self, value: &T) {
        let mut table = self.table.lock();
        for (_, listener) in table.entries.iter_mut() {
            listener(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it keeps the listener registered; call [`unsubscribe`](Self::unsubscribe)
/// to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_in_order_and_unsubscribe() {
        let listeners: Listeners<u32> = Listeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = Arc::clone(&seen);
        let first = listeners.subscribe(move |v| a.lock().push(("a", *v)));
        let b = Arc::clone(&seen);
        let _second = listeners.subscribe(move |v| b.lock().push(("b", *v)));

        listeners.notify(&1);
        first.unsubscribe();
        listeners.notify(&2);

        assert_eq!(*seen.lock(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_list_dropped() {
        let listeners: Listeners<u32> = Listeners::new();
        let sub = listeners.subscribe(|_| {});
        drop(listeners);
        sub.unsubscribe();
    }
}
