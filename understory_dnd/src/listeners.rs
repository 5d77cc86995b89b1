// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bookkeeping for installed native listeners.
//!
//! Every native listener the drag machinery would attach in a browser is
//! recorded here, and native events are only routed to owners holding a
//! matching record. Releasing a gesture therefore means removing records, and
//! a leak is visible as a non-zero [`Listeners::len`] after the gesture.

use alloc::vec::Vec;

use crate::types::{DraggableId, InputFamily};

/// Identifier of an installed listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// What a listener listens for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ListenerKind {
    /// Native "down" on a draggable element.
    Start,
    /// Native move on the document.
    Move,
    /// Native "up" on the document.
    End,
    /// Native cancel on the document.
    Cancel,
    /// Escape key on the document.
    Escape,
    /// Window blur.
    Blur,
    /// Trailing click on the dragged element.
    ClickSuppress,
}

/// One installed listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Listener<E> {
    /// Draggable that installed the listener.
    pub owner: DraggableId,
    /// Input family, for gesture listeners.
    pub family: Option<InputFamily>,
    /// Event the listener reacts to.
    pub kind: ListenerKind,
    /// Element the listener is attached to, or `None` for document/window.
    pub element: Option<E>,
}

/// Installed listeners, in installation order.
#[derive(Clone, Debug)]
pub struct Listeners<E> {
    next: u64,
    entries: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }
}

impl<E: Copy + Eq> Listeners<E> {
    /// Record a listener.
    pub fn install(&mut self, listener: Listener<E>) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not installed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(l, _)| *l != id);
        self.entries.len() != before
    }

    /// Remove every listener matching `pred`, returning how many went.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Listener<E>) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(_, l)| !pred(l));
        before - self.entries.len()
    }

    /// Number of installed listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate installed listeners.
    pub fn iter(&self) -> impl Iterator<Item = &Listener<E>> + '_ {
        self.entries.iter().map(|(_, l)| l)
    }

    /// Owner of the first document-level listener of `kind` (and `family`, if given).
    pub fn owner_of(&self, kind: ListenerKind, family: Option<InputFamily>) -> Option<DraggableId> {
        self.iter()
            .find(|l| l.kind == kind && (family.is_none() || l.family == family))
            .map(|l| l.owner)
    }
}
