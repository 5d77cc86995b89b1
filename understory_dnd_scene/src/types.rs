// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: element identifiers, flags, style, and element specs.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Insets, Rect, Vec2};

/// Identifier for an element in the scene.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `ElementId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ElementId`.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check whether an `ElementId` still refers to a live element.
/// Stale ids never alias a different live element because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Element flags controlling rendering and picking.
    ///
    /// Both flags are inherited: an element is only visible (or pickable) when
    /// every ancestor up to the document root is as well.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is rendered (`visibility: visible`).
        const VISIBLE  = 0b0000_0001;
        /// Element takes part in hit testing (`pointer-events: auto`).
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

bitflags::bitflags! {
    /// Input APIs the simulated browser exposes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SceneFeatures: u8 {
        /// Pointer events (`pointerdown`, `pointermove`, ...) are available.
        const POINTER_EVENTS = 0b0000_0001;
        /// Touch events (`touchstart`, `touchmove`, ...) are available.
        const TOUCH_EVENTS   = 0b0000_0010;
    }
}

impl Default for SceneFeatures {
    /// A plain desktop browser: mouse events only.
    fn default() -> Self {
        Self::empty()
    }
}

/// Inline style of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Absolute `left` in page space. When both `left` and `top` are set the
    /// element is laid out at that position instead of its layout box.
    pub left: Option<f64>,
    /// Absolute `top` in page space.
    pub top: Option<f64>,
    /// `transform: translate(..)` applied on top of the laid out box.
    pub translate: Option<Vec2>,
    /// Computed margins. Only `x0` (left) and `y0` (top) affect positioning.
    pub margin: Insets,
    /// `touch-action` value, if any.
    pub touch_action: Option<String>,
}

/// Description of a new element.
///
/// ```
/// use kurbo::Rect;
/// use understory_dnd_scene::ElementSpec;
///
/// let spec = ElementSpec::new("div")
///     .with_bounds(Rect::new(0.0, 0.0, 50.0, 20.0))
///     .with_class("card")
///     .with_attribute("data-id", "7");
/// assert_eq!(spec.tag, "div");
/// ```
#[derive(Clone, Debug)]
pub struct ElementSpec {
    /// Lowercase tag name.
    pub tag: String,
    /// Layout box (border box) in page coordinates.
    pub bounds: Rect,
    /// Stacking order; higher paints on top.
    pub z_index: i32,
    /// Class list.
    pub classes: Vec<String>,
    /// Attributes as `(name, value)` pairs.
    pub attributes: Vec<(String, String)>,
    /// Visibility and picking flags.
    pub flags: ElementFlags,
    /// Initial inline style.
    pub style: Style,
}

impl ElementSpec {
    /// Create a spec with the given tag and an empty box.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            bounds: Rect::ZERO,
            z_index: 0,
            classes: Vec::new(),
            attributes: Vec::new(),
            flags: ElementFlags::default(),
            style: Style::default(),
        }
    }

    /// Set the layout box.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the z-index.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Add a class.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the computed left/top margins.
    pub fn with_margin(mut self, left: f64, top: f64) -> Self {
        self.style.margin = Insets::new(left, top, 0.0, 0.0);
        self
    }
}
