// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draggables: configuration, notifications, and the per-step drag logic.
//!
//! A [`Draggable`] is created through [`DragDrop::add_draggable`](crate::DragDrop::add_draggable),
//! which installs its start listeners. Gesture routing lives in the context;
//! this module holds what happens once a session is known to belong to a
//! draggable: the start, every drag step, and the end.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::avatar::AvatarHandler;
use crate::dispatcher::DragEventDispatcher;
use crate::document::Document;
use crate::dropzone::{DragInfo, Dropzones};
use crate::geometry::AxisConstraint;
use crate::input::{InputManager, is_valid_start_target};
use crate::listeners::Listeners;
use crate::notify::Notifier;
use crate::session::DragSession;
use crate::types::{DraggableId, InputFamily};

/// Cancel selector used unless configured otherwise.
pub const DEFAULT_CANCEL: &str = "input, textarea, button, select, option";

/// Payload of draggable notifications.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DraggableEvent<E> {
    /// The element being dragged.
    pub draggable_element: E,
    /// The avatar element, if the draggable has one.
    pub avatar: Option<E>,
    /// Page position where the gesture began.
    pub start_position: Point,
    /// Current page position, after axis constraints.
    pub position: Point,
    /// True when the drag ended by cancellation rather than a release.
    pub cancelled: bool,
}

/// Draggable configuration.
pub struct DraggableOptions<D: Document> {
    /// Visual feedback while dragging.
    pub avatar: Option<Box<dyn AvatarHandler<D>>>,
    /// Restrict movement to the x axis.
    pub horizontal_only: bool,
    /// Restrict movement to the y axis.
    pub vertical_only: bool,
    /// Only gestures starting on an element matching this selector drag.
    pub handle: Option<String>,
    /// Gestures starting on an element matching this selector never drag.
    pub cancel: Option<String>,
    /// Class added to the dragged element during a drag.
    pub dragging_class: Option<String>,
    /// Class added to the body during a drag.
    pub dragging_class_body: Option<String>,
    /// Distance the pointer must travel before a drag starts. Releases of a
    /// drag longer than this also swallow the trailing click.
    pub min_drag_start_distance: f64,
}

impl<D: Document> Default for DraggableOptions<D> {
    fn default() -> Self {
        Self {
            avatar: None,
            horizontal_only: false,
            vertical_only: false,
            handle: None,
            cancel: Some(DEFAULT_CANCEL.to_string()),
            dragging_class: Some("dnd-dragging".to_string()),
            dragging_class_body: Some("dnd-drag-occurring".to_string()),
            min_drag_start_distance: 4.0,
        }
    }
}

impl<D: Document> fmt::Debug for DraggableOptions<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableOptions")
            .field("avatar", &self.avatar.as_ref().map(|_| ".."))
            .field("horizontal_only", &self.horizontal_only)
            .field("vertical_only", &self.vertical_only)
            .field("handle", &self.handle)
            .field("cancel", &self.cancel)
            .field("dragging_class", &self.dragging_class)
            .field("dragging_class_body", &self.dragging_class_body)
            .field("min_drag_start_distance", &self.min_drag_start_distance)
            .finish()
    }
}

impl<D: Document> DraggableOptions<D> {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `avatar` for visual feedback.
    pub fn with_avatar(mut self, avatar: impl AvatarHandler<D> + 'static) -> Self {
        self.avatar = Some(Box::new(avatar));
        self
    }

    /// Restrict movement to the x axis.
    pub fn horizontal_only(mut self) -> Self {
        self.horizontal_only = true;
        self
    }

    /// Restrict movement to the y axis.
    pub fn vertical_only(mut self) -> Self {
        self.vertical_only = true;
        self
    }

    /// Set the handle selector.
    pub fn with_handle(mut self, selector: &str) -> Self {
        self.handle = Some(selector.to_string());
        self
    }

    /// Set the cancel selector; `None` lets every target start a drag.
    pub fn with_cancel(mut self, selector: Option<&str>) -> Self {
        self.cancel = selector.map(ToString::to_string);
        self
    }

    /// Set the dragged element's class; `None` disables it.
    pub fn with_dragging_class(mut self, class: Option<&str>) -> Self {
        self.dragging_class = class.map(ToString::to_string);
        self
    }

    /// Set the body's class; `None` disables it.
    pub fn with_dragging_class_body(mut self, class: Option<&str>) -> Self {
        self.dragging_class_body = class.map(ToString::to_string);
        self
    }

    /// Set the start distance.
    pub fn with_min_drag_start_distance(mut self, distance: f64) -> Self {
        self.min_drag_start_distance = distance;
        self
    }
}

/// How a started drag ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DragOutcome<E> {
    /// Released over the element.
    Dropped(E),
    /// Escape, blur, native cancel, abort, or destruction.
    Cancelled,
}

/// A set of elements that can be dragged.
pub struct Draggable<D: Document> {
    id: DraggableId,
    elements: Vec<D::Element>,
    options: DraggableOptions<D>,
    managers: Vec<InputManager>,
    on_drag_start: Notifier<DraggableEvent<D::Element>>,
    on_drag: Notifier<DraggableEvent<D::Element>>,
    on_drag_end: Notifier<DraggableEvent<D::Element>>,
}

impl<D: Document> fmt::Debug for Draggable<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draggable")
            .field("id", &self.id)
            .field("elements", &self.elements)
            .field("options", &self.options)
            .field("managers", &self.managers)
            .finish_non_exhaustive()
    }
}

impl<D: Document> Draggable<D> {
    pub(crate) fn new(
        id: DraggableId,
        elements: Vec<D::Element>,
        options: DraggableOptions<D>,
        families: &[InputFamily],
    ) -> Self {
        Self {
            id,
            elements,
            options,
            managers: families.iter().copied().map(InputManager::new).collect(),
            on_drag_start: Notifier::new(),
            on_drag: Notifier::new(),
            on_drag_end: Notifier::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> DraggableId {
        self.id
    }

    /// Elements that can be dragged.
    pub fn elements(&self) -> &[D::Element] {
        &self.elements
    }

    /// Configuration.
    pub fn options(&self) -> &DraggableOptions<D> {
        &self.options
    }

    /// Input families listened to.
    pub fn families(&self) -> impl Iterator<Item = InputFamily> + '_ {
        self.managers.iter().map(InputManager::family)
    }

    /// The drag started.
    pub fn on_drag_start(&mut self) -> &mut Notifier<DraggableEvent<D::Element>> {
        &mut self.on_drag_start
    }

    /// The drag moved.
    pub fn on_drag(&mut self) -> &mut Notifier<DraggableEvent<D::Element>> {
        &mut self.on_drag
    }

    /// The drag ended, by release or cancellation.
    pub fn on_drag_end(&mut self) -> &mut Notifier<DraggableEvent<D::Element>> {
        &mut self.on_drag_end
    }

    /// Current avatar element.
    pub fn avatar_element(&self) -> Option<D::Element> {
        self.options.avatar.as_ref().and_then(|a| a.avatar())
    }

    pub(crate) fn axis(&self) -> AxisConstraint {
        AxisConstraint {
            horizontal_only: self.options.horizontal_only,
            vertical_only: self.options.vertical_only,
        }
    }

    pub(crate) fn is_valid_start_target(&self, doc: &D, target: D::Element) -> bool {
        is_valid_start_target(
            doc,
            target,
            &self.elements,
            self.options.handle.as_deref(),
            self.options.cancel.as_deref(),
        )
    }

    pub(crate) fn install(&mut self, doc: &mut D, listeners: &mut Listeners<D::Element>) {
        let axis = self.axis();
        for manager in &mut self.managers {
            manager.install_start(doc, listeners, self.id, &self.elements, axis);
        }
    }

    pub(crate) fn uninstall(&mut self, doc: &mut D, listeners: &mut Listeners<D::Element>) {
        for manager in &mut self.managers {
            manager.uninstall_gesture(listeners);
            manager.uninstall_start(doc, listeners, &self.elements);
        }
    }

    pub(crate) fn begin_gesture(
        &mut self,
        family: InputFamily,
        listeners: &mut Listeners<D::Element>,
    ) {
        if let Some(manager) = self.managers.iter_mut().find(|m| m.family() == family) {
            manager.install_gesture(listeners, self.id);
        }
    }

    pub(crate) fn end_gesture(&mut self, listeners: &mut Listeners<D::Element>) {
        for manager in &mut self.managers {
            manager.uninstall_gesture(listeners);
        }
    }

    fn event(
        &self,
        session: &DragSession<D::Element>,
        cancelled: bool,
    ) -> DraggableEvent<D::Element> {
        DraggableEvent {
            draggable_element: session.element(),
            avatar: self.avatar_element(),
            start_position: session.start_position(),
            position: session.position(),
            cancelled,
        }
    }

    fn drag_info(&self, session: &DragSession<D::Element>) -> DragInfo<D::Element> {
        DragInfo {
            draggable_id: self.id,
            element: session.element(),
            avatar: self.avatar_element(),
            position: session.position(),
        }
    }

    /// The start distance was reached.
    pub(crate) fn handle_drag_start(&mut self, doc: &mut D, session: &DragSession<D::Element>) {
        let element = session.element();
        let start = session.start_position();
        if let Some(avatar) = &mut self.options.avatar {
            avatar.drag_start(doc, element, start);
        }
        // The first notification reports the start position as the position.
        let mut event = self.event(session, false);
        event.position = start;
        log::debug!("{:?} drag started on {element:?} at {start:?}", self.id);
        self.on_drag_start.notify(&event);

        if let Some(class) = &self.options.dragging_class {
            doc.add_class(element, class);
        }
        if let Some(class) = &self.options.dragging_class_body {
            let body = doc.body();
            doc.add_class(body, class);
        }
        if let Err(err) = doc.clear_selection() {
            log::debug!("could not clear the selection: {err}");
        }
    }

    /// One step of a started drag over `target`.
    pub(crate) fn handle_drag(
        &mut self,
        doc: &mut D,
        session: &DragSession<D::Element>,
        target: Option<D::Element>,
        dispatcher: &mut DragEventDispatcher<D::Element>,
        dropzones: &mut Dropzones<D::Element>,
    ) {
        if let Some(avatar) = &mut self.options.avatar {
            avatar.drag(doc, session.start_position(), session.position());
        }
        let events = dispatcher.dispatch_over(target);
        dropzones.deliver(doc, &events, &self.drag_info(session));
        let event = self.event(session, false);
        self.on_drag.notify(&event);
    }

    /// A started drag is over.
    pub(crate) fn handle_drag_end(
        &mut self,
        doc: &mut D,
        session: &DragSession<D::Element>,
        outcome: DragOutcome<D::Element>,
        dispatcher: &mut DragEventDispatcher<D::Element>,
        dropzones: &mut Dropzones<D::Element>,
    ) {
        let info = self.drag_info(session);
        let (events, cancelled) = match outcome {
            DragOutcome::Dropped(target) => (dispatcher.dispatch_drop(Some(target)), false),
            DragOutcome::Cancelled => (dispatcher.reset(), true),
        };
        dropzones.deliver(doc, &events, &info);

        // Capture the avatar for the notification before the handler lets go of it.
        let event = self.event(session, cancelled);
        if let Some(avatar) = &mut self.options.avatar {
            avatar.drag_end(doc, session.start_position(), session.position());
        }
        log::debug!(
            "{:?} drag {} at {:?}",
            self.id,
            if cancelled { "cancelled" } else { "ended" },
            event.position
        );
        self.on_drag_end.notify(&event);

        let element = session.element();
        if let Some(class) = &self.options.dragging_class {
            doc.remove_class(element, class);
        }
        if let Some(class) = &self.options.dragging_class_body {
            let body = doc.body();
            doc.remove_class(body, class);
        }
    }

    pub(crate) fn animation_frame(&mut self, doc: &mut D) {
        if let Some(avatar) = &mut self.options.avatar {
            avatar.animation_frame(doc);
        }
    }
}
