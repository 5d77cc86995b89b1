// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag event dispatcher: turn hit-test targets into enter/over/leave/drop.
//!
//! ## Usage
//!
//! 1) On every drag step, resolve the element under the pointer.
//! 2) Call [`DragEventDispatcher::dispatch_over`] with it to get the element events to fire.
//! 3) On release, call [`DragEventDispatcher::dispatch_drop`]; on cancellation, [`DragEventDispatcher::reset`].
//!
//! ## Minimal example
//!
//! ```
//! use understory_dnd::dispatcher::{DragEventDispatcher, ElementEvent};
//!
//! let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
//! assert_eq!(
//!     d.dispatch_over(Some(1)),
//!     vec![ElementEvent::enter(1, None), ElementEvent::over(1)]
//! );
//! assert_eq!(d.dispatch_over(Some(1)), vec![ElementEvent::over(1)]);
//! assert_eq!(
//!     d.dispatch_over(Some(2)),
//!     vec![
//!         ElementEvent::enter(2, Some(1)),
//!         ElementEvent::leave(1, Some(2)),
//!         ElementEvent::over(2),
//!     ]
//! );
//! assert_eq!(d.reset(), vec![ElementEvent::leave(2, None)]);
//! ```
//!
//! ## Ordering
//!
//! Enter on the new target fires before leave on the old one. A dropzone that
//! contains both targets can then use the related target to ignore the pair,
//! which is how movement between children of one dropzone stays silent.

use alloc::vec;
use alloc::vec::Vec;

/// Kind of an element event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElementEventKind {
    /// The drag entered the target.
    Enter,
    /// The drag is over the target.
    Over,
    /// The drag left the target.
    Leave,
    /// The drag was released over the target.
    Drop,
}

/// A synthetic event fired on an element during a drag.
///
/// Element events bubble: a listener on an ancestor of `target` observes them too.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ElementEvent<E> {
    /// What happened.
    pub kind: ElementEventKind,
    /// Element the event is fired on.
    pub target: E,
    /// For enter, the element being left; for leave, the element being entered.
    pub related_target: Option<E>,
}

impl<E> ElementEvent<E> {
    /// An enter event.
    pub fn enter(target: E, related_target: Option<E>) -> Self {
        Self {
            kind: ElementEventKind::Enter,
            target,
            related_target,
        }
    }

    /// An over event.
    pub fn over(target: E) -> Self {
        Self {
            kind: ElementEventKind::Over,
            target,
            related_target: None,
        }
    }

    /// A leave event.
    pub fn leave(target: E, related_target: Option<E>) -> Self {
        Self {
            kind: ElementEventKind::Leave,
            target,
            related_target,
        }
    }

    /// A drop event.
    pub fn drop(target: E) -> Self {
        Self {
            kind: ElementEventKind::Drop,
            target,
            related_target: None,
        }
    }
}

/// Tracks the last entered element across drag steps.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DragEventDispatcher<E> {
    previous: Option<E>,
}

impl<E: Copy + Eq> DragEventDispatcher<E> {
    /// Create a dispatcher with nothing entered.
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// The element that last received an enter event.
    pub fn previous_target(&self) -> Option<E> {
        self.previous
    }

    /// Events for a drag step over `target`.
    ///
    /// A missed hit test (`None`) produces nothing and keeps the state.
    pub fn dispatch_over(&mut self, target: Option<E>) -> Vec<ElementEvent<E>> {
        let Some(target) = target else {
            return Vec::new();
        };
        if self.previous == Some(target) {
            return vec![ElementEvent::over(target)];
        }
        let mut out = Vec::with_capacity(3);
        out.push(ElementEvent::enter(target, self.previous));
        if let Some(prev) = self.previous {
            out.push(ElementEvent::leave(prev, Some(target)));
        }
        out.push(ElementEvent::over(target));
        self.previous = Some(target);
        out
    }

    /// Events for a release over `target`: the drop, then the reset leave.
    pub fn dispatch_drop(&mut self, target: Option<E>) -> Vec<ElementEvent<E>> {
        let mut out = Vec::new();
        if let Some(target) = target {
            out.push(ElementEvent::drop(target));
        }
        out.extend(self.reset());
        out
    }

    /// End of session: a final leave on the entered element, if any.
    pub fn reset(&mut self) -> Vec<ElementEvent<E>> {
        match self.previous.take() {
            Some(prev) => vec![ElementEvent::leave(prev, None)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fresh target: enter with no related target, then over.
    #[test]
    fn first_target_enters_without_leave() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        let ev = d.dispatch_over(Some(3));
        assert_eq!(ev, vec![ElementEvent::enter(3, None), ElementEvent::over(3)]);
        assert_eq!(d.previous_target(), Some(3));
    }

    // Same target repeated: only over.
    #[test]
    fn staying_put_only_fires_over() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        let _ = d.dispatch_over(Some(3));
        for _ in 0..3 {
            assert_eq!(d.dispatch_over(Some(3)), vec![ElementEvent::over(3)]);
        }
    }

    // Miss: nothing fires and the entered element is kept.
    #[test]
    fn missed_hit_test_is_silent() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        assert!(d.dispatch_over(None).is_empty());
        let _ = d.dispatch_over(Some(1));
        assert!(d.dispatch_over(None).is_empty());
        assert_eq!(d.previous_target(), Some(1));
    }

    // Any target sequence: every enter after the first is followed by the
    // leave of the previously entered element.
    #[test]
    fn enter_leave_pairing_over_a_sequence() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        let targets = [1, 1, 2, 2, 2, 3, 1, 1, 4];
        let mut all = Vec::new();
        for t in targets {
            all.extend(d.dispatch_over(Some(t)));
        }
        all.extend(d.reset());

        let mut entered: Option<u32> = None;
        let mut i = 0;
        while i < all.len() {
            let ev = all[i];
            match ev.kind {
                ElementEventKind::Enter => {
                    assert_eq!(ev.related_target, entered);
                    if let Some(prev) = entered {
                        assert_eq!(all[i + 1], ElementEvent::leave(prev, Some(ev.target)));
                        i += 1;
                    }
                    assert_eq!(all[i + 1], ElementEvent::over(ev.target));
                    i += 1;
                    entered = Some(ev.target);
                }
                ElementEventKind::Over => assert_eq!(Some(ev.target), entered),
                ElementEventKind::Leave => {
                    // Only the trailing reset leave reaches here.
                    assert_eq!(i, all.len() - 1);
                    assert_eq!(ev, ElementEvent::leave(4, None));
                }
                ElementEventKind::Drop => unreachable!("no drop dispatched"),
            }
            i += 1;
        }
        let enters = all
            .iter()
            .filter(|e| e.kind == ElementEventKind::Enter)
            .count();
        assert_eq!(enters, 5);
    }

    #[test]
    fn drop_then_leave_then_cleared() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        let _ = d.dispatch_over(Some(5));
        assert_eq!(
            d.dispatch_drop(Some(5)),
            vec![ElementEvent::drop(5), ElementEvent::leave(5, None)]
        );
        assert_eq!(d.previous_target(), None);
    }

    #[test]
    fn drop_without_target_still_resets() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        let _ = d.dispatch_over(Some(5));
        assert_eq!(d.dispatch_drop(None), vec![ElementEvent::leave(5, None)]);
        assert_eq!(d.previous_target(), None);
    }

    #[test]
    fn reset_when_nothing_entered_is_empty() {
        let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
        assert!(d.reset().is_empty());
        assert!(d.dispatch_drop(None).is_empty());
    }
}
