// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag session and the slot that holds at most one of them.

use kurbo::Point;

use crate::geometry::AxisConstraint;
use crate::types::{DragState, DraggableId, InputFamily};

/// The single record of the gesture currently being tracked.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession<E> {
    draggable_id: DraggableId,
    family: InputFamily,
    element: E,
    start_position: Point,
    raw_position: Point,
    axis: AxisConstraint,
    started: bool,
}

impl<E: Copy> DragSession<E> {
    pub(crate) fn new(
        draggable_id: DraggableId,
        family: InputFamily,
        element: E,
        start_position: Point,
        axis: AxisConstraint,
    ) -> Self {
        Self {
            draggable_id,
            family,
            element,
            start_position,
            raw_position: start_position,
            axis,
            started: false,
        }
    }

    /// Draggable owning the session.
    pub fn draggable_id(&self) -> DraggableId {
        self.draggable_id
    }

    /// Input family driving the session.
    pub fn family(&self) -> InputFamily {
        self.family
    }

    /// Element being dragged.
    pub fn element(&self) -> E {
        self.element
    }

    /// Page position where the gesture began.
    pub fn start_position(&self) -> Point {
        self.start_position
    }

    /// Latest unconstrained page position.
    pub fn raw_position(&self) -> Point {
        self.raw_position
    }

    /// Latest page position projected onto the allowed axis.
    pub fn position(&self) -> Point {
        self.axis.constrain(self.start_position, self.raw_position)
    }

    /// Returns true once the start distance has been reached.
    pub fn started(&self) -> bool {
        self.started
    }

    pub(crate) fn set_raw_position(&mut self, raw: Point) {
        self.raw_position = raw;
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }
}

/// Holder of the process-wide session.
///
/// One slot is shared by every draggable of a [`DragDrop`](crate::DragDrop),
/// which is what makes drags mutually exclusive.
#[derive(Clone, Debug)]
pub struct SessionSlot<E> {
    current: Option<DragSession<E>>,
}

impl<E> Default for SessionSlot<E> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<E: Copy> SessionSlot<E> {
    /// The current session.
    pub fn get(&self) -> Option<&DragSession<E>> {
        self.current.as_ref()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut DragSession<E>> {
        self.current.as_mut()
    }

    /// Store a new session. Refuses (returning false) while another exists.
    pub(crate) fn set(&mut self, session: DragSession<E>) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(session);
        true
    }

    pub(crate) fn clear(&mut self) -> Option<DragSession<E>> {
        self.current.take()
    }

    /// Returns true if `id` owns the current session.
    pub fn is_owned_by(&self, id: DraggableId) -> bool {
        self.current.as_ref().is_some_and(|s| s.draggable_id == id)
    }

    /// Lifecycle state.
    pub fn state(&self) -> DragState {
        match &self.current {
            None => DragState::Idle,
            Some(s) if s.started => DragState::Active,
            Some(_) => DragState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: u32) -> DragSession<u32> {
        DragSession::new(
            DraggableId(id),
            InputFamily::Mouse,
            10,
            Point::new(100.0, 100.0),
            AxisConstraint {
                horizontal_only: true,
                vertical_only: false,
            },
        )
    }

    #[test]
    fn slot_holds_one_session() {
        let mut slot = SessionSlot::default();
        assert_eq!(slot.state(), DragState::Idle);
        assert!(slot.set(session(1)));
        assert!(!slot.set(session(2)));
        assert!(slot.is_owned_by(DraggableId(1)));
        assert!(!slot.is_owned_by(DraggableId(2)));
        assert_eq!(slot.state(), DragState::Pending);
        slot.get_mut().unwrap().mark_started();
        assert_eq!(slot.state(), DragState::Active);
        assert_eq!(slot.clear().map(|s| s.draggable_id()), Some(DraggableId(1)));
        assert_eq!(slot.state(), DragState::Idle);
    }

    #[test]
    fn horizontal_only_pins_y_for_every_update() {
        let mut s = session(1);
        for raw in [
            Point::new(90.0, 0.0),
            Point::new(130.0, 250.0),
            Point::new(-5.0, 100.5),
        ] {
            s.set_raw_position(raw);
            assert_eq!(s.position().y, 100.0);
            assert_eq!(s.position().x, raw.x);
            assert_eq!(s.raw_position(), raw);
        }
        assert_eq!(s.start_position(), Point::new(100.0, 100.0));
    }
}
