// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Document`] for the in-memory Understory DnD Scene.
//!
//! ## Feature
//!
//! Enable with `scene_adapter`.
//!
//! ## Notes
//!
//! - Visibility and `pointer-events` map onto the element's own
//!   [`ElementFlags::VISIBLE`] and [`ElementFlags::PICKABLE`]; hit testing
//!   inherits them down the tree.
//! - Input capabilities come from the scene's [`SceneFeatures`].
//!
//! ## Example
//!
//! ```
//! use core::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::Rect;
//! use understory_dnd::DragDrop;
//! use understory_dnd::draggable::DraggableOptions;
//! use understory_dnd::dropzone::{DropzoneEvent, DropzoneOptions};
//! use understory_dnd::event::{MouseButton, NativeEvent, PointerPosition};
//! use understory_dnd_scene::{ElementId, ElementSpec, Scene};
//!
//! let mut scene = Scene::default();
//! let body = scene.body();
//! let card = scene.insert(
//!     Some(body),
//!     ElementSpec::new("div").with_bounds(Rect::new(0.0, 0.0, 50.0, 50.0)),
//! );
//! let bin = scene.insert(
//!     Some(body),
//!     ElementSpec::new("div").with_bounds(Rect::new(200.0, 0.0, 300.0, 100.0)),
//! );
//!
//! let mut dnd: DragDrop<Scene> = DragDrop::new();
//! dnd.add_draggable(&mut scene, [card], DraggableOptions::new());
//! let zone = dnd.add_dropzone([bin], DropzoneOptions::new());
//!
//! let drops = Rc::new(RefCell::new(Vec::new()));
//! let sink = drops.clone();
//! dnd.dropzone_mut(zone)
//!     .unwrap()
//!     .on_drop()
//!     .subscribe(move |e: &DropzoneEvent<ElementId>| sink.borrow_mut().push(e.dropzone_element));
//!
//! let at = PointerPosition::at;
//! dnd.handle_event(&mut scene, &NativeEvent::MouseDown {
//!     target: card,
//!     button: MouseButton::Primary,
//!     position: at(10.0, 10.0),
//! });
//! dnd.handle_event(&mut scene, &NativeEvent::MouseMove { target: None, position: at(250.0, 50.0) });
//! dnd.handle_event(&mut scene, &NativeEvent::MouseUp { target: None, position: at(250.0, 50.0) });
//!
//! assert_eq!(*drops.borrow(), vec![bin]);
//! ```

use kurbo::{Point, Vec2};
use understory_dnd_scene::{ElementFlags, ElementId, Scene, SceneError, SceneFeatures};

use crate::document::{Document, DocumentError, PointerEvents};
use crate::types::Capabilities;

impl From<SceneError> for DocumentError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::StaleElement | SceneError::NotAttached => Self::Detached,
            SceneError::SelectionUnsupported => Self::SelectionUnsupported,
        }
    }
}

impl Document for Scene {
    type Element = ElementId;

    fn capabilities(&self) -> Capabilities {
        let features = self.features();
        Capabilities {
            pointer_events: features.contains(SceneFeatures::POINTER_EVENTS),
            touch_events: features.contains(SceneFeatures::TOUCH_EVENTS),
        }
    }

    fn body(&self) -> ElementId {
        Self::body(self)
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        Self::parent(self, element)
    }

    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        Self::contains(self, ancestor, node)
    }

    fn tag_name(&self, element: ElementId) -> &str {
        Self::tag_name(self, element)
    }

    fn has_attribute(&self, element: ElementId, name: &str) -> bool {
        self.attribute(element, name).is_some()
    }

    fn matches(&self, element: ElementId, selector: &str) -> bool {
        Self::matches(self, element, selector)
    }

    fn element_from_point(&self, client: Point) -> Option<ElementId> {
        Self::element_from_point(self, client)
    }

    fn shadow_element_from_point(&self, host: ElementId, client: Point) -> Option<ElementId> {
        Self::shadow_element_from_point(self, host, client)
    }

    fn add_class(&mut self, element: ElementId, class: &str) {
        Self::add_class(self, element, class);
    }

    fn remove_class(&mut self, element: ElementId, class: &str) {
        Self::remove_class(self, element, class);
    }

    fn is_hidden(&self, element: ElementId) -> bool {
        !self.flags(element).contains(ElementFlags::VISIBLE)
    }

    fn set_hidden(&mut self, element: ElementId, hidden: bool) {
        let mut flags = self.flags(element);
        flags.set(ElementFlags::VISIBLE, !hidden);
        self.set_flags(element, flags);
    }

    fn pointer_events(&self, element: ElementId) -> PointerEvents {
        if self.flags(element).contains(ElementFlags::PICKABLE) {
            PointerEvents::Auto
        } else {
            PointerEvents::None
        }
    }

    fn set_pointer_events(&mut self, element: ElementId, value: PointerEvents) {
        let mut flags = self.flags(element);
        flags.set(ElementFlags::PICKABLE, value == PointerEvents::Auto);
        self.set_flags(element, flags);
    }

    fn set_touch_action(&mut self, element: ElementId, value: Option<&str>) {
        if let Some(style) = self.style_mut(element) {
            style.touch_action = value.map(Into::into);
        }
    }

    fn page_offset(&self, element: ElementId) -> Point {
        Self::page_offset(self, element)
    }

    fn computed_margin(&self, element: ElementId) -> Vec2 {
        self.style(element)
            .map(|s| Vec2::new(s.margin.x0, s.margin.y0))
            .unwrap_or(Vec2::ZERO)
    }

    fn set_left_top(&mut self, element: ElementId, left_top: Point) {
        if let Some(style) = self.style_mut(element) {
            style.left = Some(left_top.x);
            style.top = Some(left_top.y);
        }
    }

    fn set_translate(&mut self, element: ElementId, translate: Option<Vec2>) {
        if let Some(style) = self.style_mut(element) {
            style.translate = translate;
        }
    }

    fn clone_element(&mut self, element: ElementId) -> Result<ElementId, DocumentError> {
        Ok(Self::clone_element(self, element)?)
    }

    fn append_to_body(&mut self, element: ElementId) -> Result<(), DocumentError> {
        let body = Self::body(self);
        Ok(self.append_child(body, element)?)
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), DocumentError> {
        Ok(self.remove(element)?)
    }

    fn clear_selection(&mut self) -> Result<(), DocumentError> {
        Ok(Self::clear_selection(self)?)
    }

    fn request_animation_frame(&mut self) {
        Self::request_animation_frame(self);
    }
}
