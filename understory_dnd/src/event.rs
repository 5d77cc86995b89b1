// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native input events fed into [`DragDrop::handle_event`](crate::DragDrop::handle_event).

use alloc::vec::Vec;
use kurbo::Point;

use crate::types::InputFamily;

/// A pointer location in both coordinate spaces.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerPosition {
    /// Document coordinates (client plus scroll).
    pub page: Point,
    /// Viewport coordinates.
    pub client: Point,
}

impl PointerPosition {
    /// A position on an unscrolled page, where page and client coincide.
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            page: Point::new(x, y),
            client: Point::new(x, y),
        }
    }
}

/// Mouse button of a `mousedown`/`pointerdown`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum MouseButton {
    /// Usually the left button.
    #[default]
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
    /// Any other button.
    Other(u16),
}

/// Device behind a pointer event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PointerKind {
    /// A mouse.
    #[default]
    Mouse,
    /// A pen or stylus.
    Pen,
    /// A finger.
    Touch,
}

/// One contact of a touch event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TouchPoint {
    /// Stable identifier of the contact.
    pub identifier: i32,
    /// Where the contact is.
    pub position: PointerPosition,
}

/// Keys the drag machinery cares about.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// The escape key cancels a drag.
    Escape,
    /// Anything else.
    Other,
}

/// A native input event.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEvent<E> {
    /// `mousedown` on `target`.
    MouseDown {
        /// Event target.
        target: E,
        /// Pressed button.
        button: MouseButton,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `mousemove` on the document.
    MouseMove {
        /// Event target, the element under the pointer.
        target: Option<E>,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `mouseup` on the document.
    MouseUp {
        /// Event target, the element under the pointer.
        target: Option<E>,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `touchstart` on `target`.
    TouchStart {
        /// Event target.
        target: E,
        /// All current contacts.
        touches: Vec<TouchPoint>,
    },
    /// `touchmove` on the document.
    TouchMove {
        /// All current contacts.
        touches: Vec<TouchPoint>,
    },
    /// `touchend` on the document.
    TouchEnd {
        /// Contacts that ended.
        changed_touches: Vec<TouchPoint>,
    },
    /// `touchcancel` on the document.
    TouchCancel,
    /// `pointerdown` on `target`.
    PointerDown {
        /// Event target.
        target: E,
        /// Pressed button.
        button: MouseButton,
        /// Whether this is the primary pointer.
        is_primary: bool,
        /// Device behind the pointer.
        kind: PointerKind,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `pointermove` on the document.
    PointerMove {
        /// Event target, the element under the pointer.
        target: Option<E>,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `pointerup` on the document.
    PointerUp {
        /// Event target, the element under the pointer.
        target: Option<E>,
        /// Device behind the pointer.
        kind: PointerKind,
        /// Pointer location.
        position: PointerPosition,
    },
    /// `pointercancel` on the document.
    PointerCancel,
    /// `keydown` on the document.
    KeyDown(Key),
    /// `blur` on the window.
    WindowBlur,
    /// `click` on `target`.
    Click {
        /// Event target.
        target: E,
    },
}

impl<E> NativeEvent<E> {
    /// Input family of a gesture event, or `None` for keyboard, focus, and click events.
    pub fn family(&self) -> Option<InputFamily> {
        match self {
            Self::MouseDown { .. } | Self::MouseMove { .. } | Self::MouseUp { .. } => {
                Some(InputFamily::Mouse)
            }
            Self::TouchStart { .. }
            | Self::TouchMove { .. }
            | Self::TouchEnd { .. }
            | Self::TouchCancel => Some(InputFamily::Touch),
            Self::PointerDown { .. }
            | Self::PointerMove { .. }
            | Self::PointerUp { .. }
            | Self::PointerCancel => Some(InputFamily::Pointer),
            Self::KeyDown(_) | Self::WindowBlur | Self::Click { .. } => None,
        }
    }
}

/// What the listeners did to a native event.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EventResponse {
    /// `preventDefault()` was called.
    pub default_prevented: bool,
    /// `stopPropagation()` was called.
    pub propagation_stopped: bool,
}

impl EventResponse {
    /// A response that prevents the default action.
    pub const PREVENT_DEFAULT: Self = Self {
        default_prevented: true,
        propagation_stopped: false,
    };

    /// Fold another listener's response into this one.
    pub fn merge(&mut self, other: Self) {
        self.default_prevented |= other.default_prevented;
        self.propagation_stopped |= other.propagation_stopped;
    }
}
