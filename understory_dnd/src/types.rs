// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: identifiers, input families, and capability probes.

/// Identifier of a [`Draggable`](crate::draggable::Draggable).
///
/// Allocated from a monotonic counter by
/// [`DragDrop::add_draggable`](crate::DragDrop::add_draggable) and never reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DraggableId(pub u32);

/// Identifier of a [`Dropzone`](crate::dropzone::Dropzone).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DropzoneId(pub u32);

/// A family of native input events.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum InputFamily {
    /// `pointerdown`, `pointermove`, `pointerup`, `pointercancel`.
    Pointer,
    /// `touchstart`, `touchmove`, `touchend`, `touchcancel`.
    Touch,
    /// `mousedown`, `mousemove`, `mouseup`.
    Mouse,
}

impl InputFamily {
    /// Returns true if the family has a native cancel event.
    pub fn has_cancel(self) -> bool {
        !matches!(self, Self::Mouse)
    }
}

/// Which input APIs the host document exposes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Capabilities {
    /// Pointer events are available.
    pub pointer_events: bool,
    /// Touch events are available.
    pub touch_events: bool,
}

impl Capabilities {
    /// Input families to install managers for, richest first.
    ///
    /// Pointer events subsume everything else. Without them, a touch manager
    /// and a mouse manager coexist so devices with both still work.
    ///
    /// ```
    /// use understory_dnd::types::{Capabilities, InputFamily};
    ///
    /// let both = Capabilities { pointer_events: false, touch_events: true };
    /// assert_eq!(both.input_families(), &[InputFamily::Touch, InputFamily::Mouse]);
    /// ```
    pub fn input_families(self) -> &'static [InputFamily] {
        match (self.pointer_events, self.touch_events) {
            (true, _) => &[InputFamily::Pointer],
            (false, true) => &[InputFamily::Touch, InputFamily::Mouse],
            (false, false) => &[InputFamily::Mouse],
        }
    }
}

/// Coarse state of the process-wide drag lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DragState {
    /// No session exists.
    Idle,
    /// A session exists but has not moved past the start distance.
    Pending,
    /// A drag is in progress and notifications are firing.
    Active,
}
