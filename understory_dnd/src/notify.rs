// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscription lists for notifications.
//!
//! ```
//! use core::cell::Cell;
//! use std::rc::Rc;
//! use understory_dnd::notify::Notifier;
//!
//! let mut n: Notifier<u32> = Notifier::new();
//! let seen = Rc::new(Cell::new(0));
//! let s = seen.clone();
//! let id = n.subscribe(move |v| s.set(s.get() + *v));
//! n.notify(&2);
//! assert!(n.unsubscribe(id));
//! n.notify(&40);
//! assert_eq!(seen.get(), 2);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;

/// Handle returned by [`Notifier::subscribe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

/// An ordered list of callbacks for one notification kind.
pub struct Notifier<T> {
    next: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&T)>)>,
}

impl<T> core::fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Notifier<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            next: 0,
            subscribers: Vec::new(),
        }
    }

    /// Add a callback. Callbacks run in subscription order.
    pub fn subscribe(&mut self, f: impl FnMut(&T) + 'static) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a callback. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(s, _)| *s != id);
        self.subscribers.len() != before
    }

    /// Remove every callback.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Returns true if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver `value` to every subscriber.
    pub fn notify(&mut self, value: &T) {
        for (_, f) in &mut self.subscribers {
            f(value);
        }
    }
}
