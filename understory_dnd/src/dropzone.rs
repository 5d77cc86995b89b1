// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dropzones: translate element events into accepted-drag notifications.
//!
//! Element events bubble to every dropzone element containing their target.
//! Enter and leave pairs whose related target is inside the same dropzone
//! element are ignored, so moving between children of a dropzone is silent.
//!
//! A dropzone checks its [`Acceptor`] on every event. Rejected drags mark the
//! element with the invalid class on enter and forward nothing; accepted drags
//! get the over class and forwarded notifications.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use kurbo::Point;

use crate::acceptor::Acceptor;
use crate::dispatcher::{ElementEvent, ElementEventKind};
use crate::document::Document;
use crate::notify::Notifier;
use crate::types::{DraggableId, DropzoneId};

/// Payload of dropzone notifications.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropzoneEvent<E> {
    /// The dropzone element receiving the event.
    pub dropzone_element: E,
    /// Draggable being dragged.
    pub draggable_id: DraggableId,
    /// The element being dragged.
    pub draggable_element: E,
    /// The avatar element, if the draggable has one.
    pub avatar: Option<E>,
    /// Current drag position in page space.
    pub position: Point,
}

/// The drag in progress, as seen by dropzones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct DragInfo<E> {
    pub(crate) draggable_id: DraggableId,
    pub(crate) element: E,
    pub(crate) avatar: Option<E>,
    pub(crate) position: Point,
}

/// Dropzone configuration.
pub struct DropzoneOptions<E> {
    /// Gate for which draggables are recognized. `None` accepts everything.
    pub acceptor: Option<Box<dyn Acceptor<E>>>,
    /// Class added while an accepted drag is over the dropzone.
    pub over_class: Option<String>,
    /// Class added while a rejected drag is over the dropzone.
    pub invalid_class: Option<String>,
}

impl<E> Default for DropzoneOptions<E> {
    fn default() -> Self {
        Self {
            acceptor: None,
            over_class: Some("dnd-over".to_string()),
            invalid_class: Some("dnd-invalid".to_string()),
        }
    }
}

impl<E> fmt::Debug for DropzoneOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropzoneOptions")
            .field("acceptor", &self.acceptor.as_ref().map(|_| ".."))
            .field("over_class", &self.over_class)
            .field("invalid_class", &self.invalid_class)
            .finish()
    }
}

impl<E> DropzoneOptions<E> {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate the dropzone with `acceptor`.
    pub fn with_acceptor(mut self, acceptor: impl Acceptor<E> + 'static) -> Self {
        self.acceptor = Some(Box::new(acceptor));
        self
    }

    /// Class for accepted drags; `None` disables it.
    pub fn with_over_class(mut self, class: Option<&str>) -> Self {
        self.over_class = class.map(ToString::to_string);
        self
    }

    /// Class for rejected drags; `None` disables it.
    pub fn with_invalid_class(mut self, class: Option<&str>) -> Self {
        self.invalid_class = class.map(ToString::to_string);
        self
    }
}

/// A set of elements receiving drops.
pub struct Dropzone<E> {
    id: DropzoneId,
    elements: Vec<E>,
    options: DropzoneOptions<E>,
    on_drag_enter: Notifier<DropzoneEvent<E>>,
    on_drag_over: Notifier<DropzoneEvent<E>>,
    on_drag_leave: Notifier<DropzoneEvent<E>>,
    on_drop: Notifier<DropzoneEvent<E>>,
}

impl<E: fmt::Debug> fmt::Debug for Dropzone<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropzone")
            .field("id", &self.id)
            .field("elements", &self.elements)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<E: Copy + Eq + fmt::Debug> Dropzone<E> {
    fn new(id: DropzoneId, elements: Vec<E>, options: DropzoneOptions<E>) -> Self {
        Self {
            id,
            elements,
            options,
            on_drag_enter: Notifier::new(),
            on_drag_over: Notifier::new(),
            on_drag_leave: Notifier::new(),
            on_drop: Notifier::new(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> DropzoneId {
        self.id
    }

    /// Elements making up the dropzone.
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// Replace the acceptor; `None` accepts everything.
    pub fn set_acceptor(&mut self, acceptor: Option<Box<dyn Acceptor<E>>>) {
        self.options.acceptor = acceptor;
    }

    /// Accepted drag entered a dropzone element.
    pub fn on_drag_enter(&mut self) -> &mut Notifier<DropzoneEvent<E>> {
        &mut self.on_drag_enter
    }

    /// Accepted drag moved over a dropzone element.
    pub fn on_drag_over(&mut self) -> &mut Notifier<DropzoneEvent<E>> {
        &mut self.on_drag_over
    }

    /// Accepted drag left a dropzone element.
    pub fn on_drag_leave(&mut self) -> &mut Notifier<DropzoneEvent<E>> {
        &mut self.on_drag_leave
    }

    /// Accepted drag was released over a dropzone element.
    pub fn on_drop(&mut self) -> &mut Notifier<DropzoneEvent<E>> {
        &mut self.on_drop
    }

    fn accepts(&self, drag: &DragInfo<E>, zone: E) -> bool {
        self.options
            .acceptor
            .as_ref()
            .is_none_or(|a| a.accepts(drag.element, drag.draggable_id, zone))
    }

    fn handle<D: Document<Element = E> + ?Sized>(
        &mut self,
        doc: &mut D,
        zone: E,
        kind: ElementEventKind,
        drag: &DragInfo<E>,
    ) {
        let accepted = self.accepts(drag, zone);
        let event = DropzoneEvent {
            dropzone_element: zone,
            draggable_id: drag.draggable_id,
            draggable_element: drag.element,
            avatar: drag.avatar,
            position: drag.position,
        };
        match kind {
            ElementEventKind::Enter => {
                if accepted {
                    if let Some(class) = &self.options.over_class {
                        doc.add_class(zone, class);
                    }
                    self.on_drag_enter.notify(&event);
                } else if let Some(class) = &self.options.invalid_class {
                    doc.add_class(zone, class);
                }
            }
            ElementEventKind::Over => {
                if accepted {
                    self.on_drag_over.notify(&event);
                }
            }
            ElementEventKind::Leave => {
                if let Some(class) = &self.options.over_class {
                    doc.remove_class(zone, class);
                }
                if let Some(class) = &self.options.invalid_class {
                    doc.remove_class(zone, class);
                }
                if accepted {
                    self.on_drag_leave.notify(&event);
                }
            }
            ElementEventKind::Drop => {
                if accepted {
                    log::debug!("{:?} dropped on {zone:?} of {:?}", drag.draggable_id, self.id);
                    self.on_drop.notify(&event);
                }
            }
        }
    }
}

/// Every dropzone of a drag and drop context, plus element event observers.
pub(crate) struct Dropzones<E> {
    next: u32,
    zones: BTreeMap<DropzoneId, Dropzone<E>>,
    element_events: Notifier<ElementEvent<E>>,
}

impl<E> Default for Dropzones<E> {
    fn default() -> Self {
        Self {
            next: 0,
            zones: BTreeMap::new(),
            element_events: Notifier::new(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Dropzones<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dropzones")
            .field("zones", &self.zones)
            .field("element_events", &self.element_events)
            .finish_non_exhaustive()
    }
}

impl<E: Copy + Eq + fmt::Debug> Dropzones<E> {
    pub(crate) fn add(&mut self, elements: Vec<E>, options: DropzoneOptions<E>) -> DropzoneId {
        self.next += 1;
        let id = DropzoneId(self.next);
        self.zones.insert(id, Dropzone::new(id, elements, options));
        id
    }

    pub(crate) fn get(&self, id: DropzoneId) -> Option<&Dropzone<E>> {
        self.zones.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DropzoneId) -> Option<&mut Dropzone<E>> {
        self.zones.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: DropzoneId) -> bool {
        self.zones.remove(&id).is_some()
    }

    pub(crate) fn element_events(&mut self) -> &mut Notifier<ElementEvent<E>> {
        &mut self.element_events
    }

    /// Fire `events` in order, bubbling each to the dropzones containing its target.
    pub(crate) fn deliver<D: Document<Element = E> + ?Sized>(
        &mut self,
        doc: &mut D,
        events: &[ElementEvent<E>],
        drag: &DragInfo<E>,
    ) {
        for event in events {
            log::trace!("{:?} on {:?}", event.kind, event.target);
            self.element_events.notify(event);
            for zone in self.zones.values_mut() {
                for i in 0..zone.elements.len() {
                    let element = zone.elements[i];
                    if !doc.contains(element, event.target) {
                        continue;
                    }
                    let crossing = matches!(
                        event.kind,
                        ElementEventKind::Enter | ElementEventKind::Leave
                    );
                    if crossing && event.related_target.is_some_and(|r| doc.contains(element, r)) {
                        continue;
                    }
                    zone.handle(doc, element, event.kind, drag);
                }
            }
        }
    }
}
