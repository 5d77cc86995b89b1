// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host document seam.
//!
//! ## Overview
//!
//! The drag machinery never touches a concrete DOM. Everything it needs from
//! the page (hit testing, ancestry, class lists, inline style, selection)
//! goes through [`Document`]. A browser binding implements it over real
//! elements; [`adapters::scene`](crate::adapters) implements it over the
//! in-memory `understory_dnd_scene::Scene` used by tests and demos.
//!
//! Coordinates: `page` points include the document scroll offset, `client`
//! points are relative to the viewport. Hit testing takes client points.

use kurbo::{Point, Vec2};

use crate::types::Capabilities;

/// Tags whose built-in interactions break when `mousedown` is default-prevented.
pub const FORM_CONTROL_TAGS: &[&str] = &["select", "input", "textarea", "button", "option"];

/// Attribute marking a shadow host whose shadow tree should be hit tested.
pub const RETARGET_ATTRIBUTE: &str = "dnd-retarget";

/// Errors reported by fallible host operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The element is no longer part of the document.
    #[error("element is detached from the document")]
    Detached,
    /// The focused element does not support selection ranges.
    #[error("selection range is not supported on the focused element")]
    SelectionUnsupported,
}

/// CSS `pointer-events` as far as hit testing is concerned.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PointerEvents {
    /// The element can be hit.
    #[default]
    Auto,
    /// The element is transparent to hit testing.
    None,
}

/// A host document.
pub trait Document {
    /// Element handle.
    type Element: Copy + Eq + core::fmt::Debug;

    /// Input APIs available in this document.
    fn capabilities(&self) -> Capabilities;

    /// The `body` element.
    fn body(&self) -> Self::Element;

    /// Parent element, or `None` for the root or a detached element.
    fn parent(&self, element: Self::Element) -> Option<Self::Element>;

    /// Returns true if `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: Self::Element, node: Self::Element) -> bool {
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Lowercase tag name.
    fn tag_name(&self, element: Self::Element) -> &str;

    /// Returns true if the attribute is present.
    fn has_attribute(&self, element: Self::Element, name: &str) -> bool;

    /// Returns true if the element matches the CSS selector.
    fn matches(&self, element: Self::Element, selector: &str) -> bool;

    /// Topmost element under a client point (`document.elementFromPoint`).
    fn element_from_point(&self, client: Point) -> Option<Self::Element>;

    /// Topmost element of `host`'s shadow tree under a client point, or
    /// `None` if `host` has no shadow root.
    fn shadow_element_from_point(
        &self,
        host: Self::Element,
        client: Point,
    ) -> Option<Self::Element>;

    /// Add a class.
    fn add_class(&mut self, element: Self::Element, class: &str);

    /// Remove a class.
    fn remove_class(&mut self, element: Self::Element, class: &str);

    /// Returns true if the element has `visibility: hidden`.
    fn is_hidden(&self, element: Self::Element) -> bool;

    /// Set or clear `visibility: hidden`.
    fn set_hidden(&mut self, element: Self::Element, hidden: bool);

    /// Current `pointer-events` value.
    fn pointer_events(&self, element: Self::Element) -> PointerEvents;

    /// Set `pointer-events`.
    fn set_pointer_events(&mut self, element: Self::Element, value: PointerEvents);

    /// Set (or clear) `touch-action`.
    fn set_touch_action(&mut self, element: Self::Element, value: Option<&str>);

    /// Page-space offset of the element's border box, ignoring transforms.
    fn page_offset(&self, element: Self::Element) -> Point;

    /// Computed left and top margins.
    fn computed_margin(&self, element: Self::Element) -> Vec2;

    /// Position the element absolutely with the given `left`/`top`.
    fn set_left_top(&mut self, element: Self::Element, left_top: Point);

    /// Set (or clear) a `translate` transform.
    fn set_translate(&mut self, element: Self::Element, translate: Option<Vec2>);

    /// Deep-clone an element. The clone is detached.
    fn clone_element(&mut self, element: Self::Element) -> Result<Self::Element, DocumentError>;

    /// Append a detached element to the body.
    fn append_to_body(&mut self, element: Self::Element) -> Result<(), DocumentError>;

    /// Remove an element from the document.
    fn remove_element(&mut self, element: Self::Element) -> Result<(), DocumentError>;

    /// Clear the document selection and collapse the focused control's range.
    fn clear_selection(&mut self) -> Result<(), DocumentError>;

    /// Ask for an animation frame. The host answers by calling
    /// [`DragDrop::animation_frame`](crate::DragDrop::animation_frame).
    fn request_animation_frame(&mut self);
}

/// Returns true for native form controls.
pub fn is_form_control<D: Document + ?Sized>(doc: &D, element: D::Element) -> bool {
    let tag = doc.tag_name(element);
    FORM_CONTROL_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}
