// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Acceptors decide which draggables a dropzone recognizes.

use alloc::collections::BTreeSet;

use crate::types::DraggableId;

/// Predicate gating which draggables a dropzone accepts.
///
/// Closures of the form `Fn(draggable_element, draggable_id, dropzone_element) -> bool`
/// are acceptors too.
pub trait Acceptor<E> {
    /// Returns true if the dropzone element accepts the dragged element.
    fn accepts(&self, draggable_element: E, draggable_id: DraggableId, dropzone_element: E)
    -> bool;
}

impl<E, F> Acceptor<E> for F
where
    F: Fn(E, DraggableId, E) -> bool,
{
    fn accepts(
        &self,
        draggable_element: E,
        draggable_id: DraggableId,
        dropzone_element: E,
    ) -> bool {
        self(draggable_element, draggable_id, dropzone_element)
    }
}

/// Accepts everything. Equivalent to configuring no acceptor.
#[derive(Copy, Clone, Debug, Default)]
pub struct AcceptAll;

impl<E> Acceptor<E> for AcceptAll {
    fn accepts(&self, _: E, _: DraggableId, _: E) -> bool {
        true
    }
}

/// Accepts draggables whose id is in a fixed set.
///
/// ```
/// use understory_dnd::acceptor::{Acceptor, DraggablesAcceptor};
/// use understory_dnd::types::DraggableId;
///
/// let a = DraggablesAcceptor::new([DraggableId(1), DraggableId(3)]);
/// assert!(a.accepts(0_u32, DraggableId(3), 9));
/// assert!(!a.accepts(0_u32, DraggableId(2), 9));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DraggablesAcceptor {
    ids: BTreeSet<DraggableId>,
}

impl DraggablesAcceptor {
    /// Accept exactly the given draggables.
    pub fn new(ids: impl IntoIterator<Item = DraggableId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl<E> Acceptor<E> for DraggablesAcceptor {
    fn accepts(&self, _: E, draggable_id: DraggableId, _: E) -> bool {
        self.ids.contains(&draggable_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_acceptors() {
        let only_even_zones = |_: u32, _: DraggableId, zone: u32| zone % 2 == 0;
        assert!(only_even_zones.accepts(1, DraggableId(1), 4));
        assert!(!only_even_zones.accepts(1, DraggableId(1), 5));
    }

    #[test]
    fn accept_all_accepts() {
        assert!(Acceptor::<u32>::accepts(&AcceptAll, 1, DraggableId(99), 2));
    }

    #[test]
    fn empty_membership_rejects_everything() {
        let a = DraggablesAcceptor::default();
        assert!(!Acceptor::<u32>::accepts(&a, 1, DraggableId(0), 2));
    }
}
