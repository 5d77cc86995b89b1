// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag and drop context: native event routing and the session lifecycle.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::DndError;
use crate::acceptor::Acceptor;
use crate::dispatcher::{DragEventDispatcher, ElementEvent};
use crate::document::{Document, is_form_control};
use crate::draggable::{DragOutcome, Draggable, DraggableOptions};
use crate::dropzone::{Dropzone, DropzoneOptions, Dropzones};
use crate::event::{EventResponse, Key, MouseButton, NativeEvent, PointerKind, PointerPosition};
use crate::geometry::reached_start_distance;
use crate::input::resolve_real_target;
use crate::listeners::{Listener, ListenerKind, Listeners};
use crate::notify::Notifier;
use crate::session::{DragSession, SessionSlot};
use crate::types::{DragState, DraggableId, DropzoneId, InputFamily};

/// A native "down" reduced to what the start guards look at.
#[derive(Copy, Clone, Debug)]
struct StartGesture {
    button: MouseButton,
    is_primary: bool,
    contacts: usize,
    position: PointerPosition,
}

/// Owner of every draggable, dropzone, and the single drag session.
///
/// Feed native events to [`DragDrop::handle_event`]; call
/// [`DragDrop::tick`] at the start of each event-loop turn and
/// [`DragDrop::animation_frame`] when a requested frame arrives.
pub struct DragDrop<D: Document> {
    session: SessionSlot<D::Element>,
    dispatcher: DragEventDispatcher<D::Element>,
    listeners: Listeners<D::Element>,
    draggables: BTreeMap<DraggableId, Draggable<D>>,
    dropzones: Dropzones<D::Element>,
    next_draggable: u32,
}

impl<D: Document> Default for DragDrop<D> {
    fn default() -> Self {
        Self {
            session: SessionSlot::default(),
            dispatcher: DragEventDispatcher::new(),
            listeners: Listeners::default(),
            draggables: BTreeMap::new(),
            dropzones: Dropzones::default(),
            next_draggable: 0,
        }
    }
}

impl<D: Document> fmt::Debug for DragDrop<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragDrop")
            .field("session", &self.session)
            .field("dispatcher", &self.dispatcher)
            .field("listeners", &self.listeners.len())
            .field("draggables", &self.draggables)
            .field("dropzones", &self.dropzones)
            .finish_non_exhaustive()
    }
}

impl<D: Document> DragDrop<D> {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `elements` draggable. Installs start listeners for every input
    /// family the document supports.
    pub fn add_draggable(
        &mut self,
        doc: &mut D,
        elements: impl IntoIterator<Item = D::Element>,
        options: DraggableOptions<D>,
    ) -> DraggableId {
        self.next_draggable += 1;
        let id = DraggableId(self.next_draggable);
        let families = doc.capabilities().input_families();
        let mut draggable = Draggable::new(id, elements.into_iter().collect(), options, families);
        draggable.install(doc, &mut self.listeners);
        log::debug!("{id:?} created for {families:?}");
        self.draggables.insert(id, draggable);
        id
    }

    /// A draggable.
    pub fn draggable(&self, id: DraggableId) -> Option<&Draggable<D>> {
        self.draggables.get(&id)
    }

    /// A draggable, for subscribing to its notifications.
    pub fn draggable_mut(&mut self, id: DraggableId) -> Option<&mut Draggable<D>> {
        self.draggables.get_mut(&id)
    }

    /// Tear a draggable down, cancelling its session if it owns one.
    ///
    /// Returns false if `id` was already destroyed.
    pub fn destroy_draggable(&mut self, doc: &mut D, id: DraggableId) -> bool {
        self.cancel_session(doc, id);
        let Some(mut draggable) = self.draggables.remove(&id) else {
            return false;
        };
        draggable.uninstall(doc, &mut self.listeners);
        self.listeners.remove_where(|l| l.owner == id);
        log::debug!("{id:?} destroyed");
        true
    }

    /// Cancel the session owned by `id`, if any.
    ///
    /// Returns whether a session was cancelled.
    pub fn abort(&mut self, doc: &mut D, id: DraggableId) -> Result<bool, DndError> {
        if !self.draggables.contains_key(&id) {
            return Err(DndError::UnknownDraggable(id));
        }
        Ok(self.cancel_session(doc, id))
    }

    /// Make `elements` a dropzone.
    pub fn add_dropzone(
        &mut self,
        elements: impl IntoIterator<Item = D::Element>,
        options: DropzoneOptions<D::Element>,
    ) -> DropzoneId {
        let id = self.dropzones.add(elements.into_iter().collect(), options);
        log::debug!("{id:?} created");
        id
    }

    /// A dropzone.
    pub fn dropzone(&self, id: DropzoneId) -> Option<&Dropzone<D::Element>> {
        self.dropzones.get(id)
    }

    /// A dropzone, for subscribing to its notifications.
    pub fn dropzone_mut(&mut self, id: DropzoneId) -> Option<&mut Dropzone<D::Element>> {
        self.dropzones.get_mut(id)
    }

    /// Replace a dropzone's acceptor.
    pub fn set_dropzone_acceptor(
        &mut self,
        id: DropzoneId,
        acceptor: impl Acceptor<D::Element> + 'static,
    ) -> Result<(), DndError> {
        let zone = self
            .dropzones
            .get_mut(id)
            .ok_or(DndError::UnknownDropzone(id))?;
        zone.set_acceptor(Some(Box::new(acceptor)));
        Ok(())
    }

    /// Stop a dropzone from receiving events. The session is not touched.
    ///
    /// Returns false if `id` was already destroyed.
    pub fn destroy_dropzone(&mut self, id: DropzoneId) -> bool {
        let removed = self.dropzones.remove(id);
        if removed {
            log::debug!("{id:?} destroyed");
        }
        removed
    }

    /// Element-level enter/over/leave/drop events, before dropzone filtering.
    pub fn on_element_event(&mut self) -> &mut Notifier<ElementEvent<D::Element>> {
        self.dropzones.element_events()
    }

    /// The current session.
    pub fn session(&self) -> Option<&DragSession<D::Element>> {
        self.session.get()
    }

    /// Lifecycle state.
    pub fn drag_state(&self) -> DragState {
        self.session.state()
    }

    /// Installed native listeners.
    pub fn listeners(&self) -> &Listeners<D::Element> {
        &self.listeners
    }

    /// Number of installed native listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Start of the next event-loop turn: the trailing click window closes.
    pub fn tick(&mut self) {
        self.listeners
            .remove_where(|l| l.kind == ListenerKind::ClickSuppress);
    }

    /// A requested animation frame arrived.
    pub fn animation_frame(&mut self, doc: &mut D) {
        for draggable in self.draggables.values_mut() {
            draggable.animation_frame(doc);
        }
    }

    /// Route a native event.
    pub fn handle_event(&mut self, doc: &mut D, event: &NativeEvent<D::Element>) -> EventResponse {
        match event {
            NativeEvent::MouseDown {
                target,
                button,
                position,
            } => self.start(
                doc,
                InputFamily::Mouse,
                *target,
                StartGesture {
                    button: *button,
                    is_primary: true,
                    contacts: 1,
                    position: *position,
                },
            ),
            NativeEvent::PointerDown {
                target,
                button,
                is_primary,
                position,
                ..
            } => self.start(
                doc,
                InputFamily::Pointer,
                *target,
                StartGesture {
                    button: *button,
                    is_primary: *is_primary,
                    contacts: 1,
                    position: *position,
                },
            ),
            NativeEvent::TouchStart { target, touches } => {
                let Some(first) = touches.first() else {
                    return EventResponse::default();
                };
                self.start(
                    doc,
                    InputFamily::Touch,
                    *target,
                    StartGesture {
                        button: MouseButton::Primary,
                        is_primary: true,
                        contacts: touches.len(),
                        position: first.position,
                    },
                )
            }
            NativeEvent::MouseMove { target, position } => {
                self.step(doc, InputFamily::Mouse, *target, *position, 1)
            }
            NativeEvent::PointerMove { target, position } => {
                self.step(doc, InputFamily::Pointer, *target, *position, 1)
            }
            NativeEvent::TouchMove { touches } => match touches.first() {
                Some(first) => {
                    self.step(doc, InputFamily::Touch, None, first.position, touches.len())
                }
                None => EventResponse::default(),
            },
            NativeEvent::MouseUp { target, position } => {
                self.end(doc, InputFamily::Mouse, *target, Some(*position), true)
            }
            NativeEvent::PointerUp {
                target,
                kind,
                position,
            } => self.end(
                doc,
                InputFamily::Pointer,
                *target,
                Some(*position),
                *kind == PointerKind::Mouse,
            ),
            NativeEvent::TouchEnd { changed_touches } => self.end(
                doc,
                InputFamily::Touch,
                None,
                changed_touches.first().map(|t| t.position),
                false,
            ),
            NativeEvent::TouchCancel => {
                self.cancel_from(doc, ListenerKind::Cancel, Some(InputFamily::Touch))
            }
            NativeEvent::PointerCancel => {
                self.cancel_from(doc, ListenerKind::Cancel, Some(InputFamily::Pointer))
            }
            NativeEvent::KeyDown(Key::Escape) => self.cancel_from(doc, ListenerKind::Escape, None),
            NativeEvent::KeyDown(Key::Other) => EventResponse::default(),
            NativeEvent::WindowBlur => self.cancel_from(doc, ListenerKind::Blur, None),
            NativeEvent::Click { target } => self.click(doc, *target),
        }
    }

    /// Offer a "down" to the start listeners on `target` and its ancestors,
    /// innermost first.
    fn start(
        &mut self,
        doc: &mut D,
        family: InputFamily,
        target: D::Element,
        gesture: StartGesture,
    ) -> EventResponse {
        let mut response = EventResponse::default();
        let mut current = Some(target);
        while let Some(element) = current {
            let owners: Vec<DraggableId> = self
                .listeners
                .iter()
                .filter(|l| {
                    l.kind == ListenerKind::Start
                        && l.family == Some(family)
                        && l.element == Some(element)
                })
                .map(|l| l.owner)
                .collect();
            for owner in owners {
                response.merge(self.start_on(doc, owner, family, element, target, gesture));
            }
            current = doc.parent(element);
        }
        response
    }

    fn start_on(
        &mut self,
        doc: &mut D,
        owner: DraggableId,
        family: InputFamily,
        element: D::Element,
        target: D::Element,
        gesture: StartGesture,
    ) -> EventResponse {
        if self.session.get().is_some() {
            log::trace!("{owner:?} ignored a start: a session already exists");
            return EventResponse::default();
        }
        if gesture.button != MouseButton::Primary || !gesture.is_primary {
            log::trace!("{owner:?} ignored a non-primary start");
            return EventResponse::default();
        }
        if gesture.contacts > 1 {
            log::trace!("{owner:?} ignored a multi-touch start");
            return EventResponse::default();
        }
        let Some(draggable) = self.draggables.get_mut(&owner) else {
            return EventResponse::default();
        };
        if !draggable.is_valid_start_target(doc, target) {
            log::trace!("{owner:?} ignored a start on {target:?}");
            return EventResponse::default();
        }
        let session = DragSession::new(
            owner,
            family,
            element,
            gesture.position.page,
            draggable.axis(),
        );
        if !self.session.set(session) {
            return EventResponse::default();
        }
        draggable.begin_gesture(family, &mut self.listeners);
        log::debug!(
            "{owner:?} pending on {element:?} via {family:?} at {:?}",
            gesture.position.page
        );

        // Keep native text selection and image dragging out of the way, but
        // leave form controls working. Touch starts must not block scrolling.
        if family != InputFamily::Touch && !is_form_control(&*doc, target) {
            EventResponse::PREVENT_DEFAULT
        } else {
            EventResponse::default()
        }
    }

    fn step(
        &mut self,
        doc: &mut D,
        family: InputFamily,
        target: Option<D::Element>,
        position: PointerPosition,
        contacts: usize,
    ) -> EventResponse {
        let Some(owner) = self.listeners.owner_of(ListenerKind::Move, Some(family)) else {
            return EventResponse::default();
        };
        if contacts > 1 {
            log::debug!("{owner:?} cancelled by a second touch");
            self.cancel_session(doc, owner);
            return EventResponse::default();
        }
        let (Some(session), Some(draggable)) =
            (self.session.get_mut(), self.draggables.get_mut(&owner))
        else {
            return EventResponse::default();
        };
        session.set_raw_position(position.page);

        // Past the scroll test, a touch move is a drag step: native scrolling
        // must not get hold of it, even below the start distance.
        let response = if family == InputFamily::Touch {
            EventResponse::PREVENT_DEFAULT
        } else {
            EventResponse::default()
        };

        if !session.started() {
            let delta = position.page - session.start_position();
            if family == InputFamily::Touch && draggable.axis().is_scroll(delta) {
                log::trace!("{owner:?} yields to scrolling");
                self.cancel_session(doc, owner);
                return EventResponse::default();
            }
            if !reached_start_distance(
                session.start_position(),
                position.page,
                draggable.options().min_drag_start_distance,
            ) {
                return response;
            }
            session.mark_started();
            draggable.handle_drag_start(doc, session);
        }

        let avatar = draggable.avatar_element();
        let real = resolve_real_target(doc, position.client, target, avatar);
        if real.is_none() {
            log::trace!("hit test missed at {:?}", position.client);
        }
        draggable.handle_drag(
            doc,
            session,
            real,
            &mut self.dispatcher,
            &mut self.dropzones,
        );
        response
    }

    fn end(
        &mut self,
        doc: &mut D,
        family: InputFamily,
        target: Option<D::Element>,
        position: Option<PointerPosition>,
        suppress_click: bool,
    ) -> EventResponse {
        let Some(owner) = self.listeners.owner_of(ListenerKind::End, Some(family)) else {
            return EventResponse::default();
        };
        let mut response = EventResponse::default();
        if let (Some(session), Some(draggable)) =
            (self.session.get_mut(), self.draggables.get_mut(&owner))
        {
            if let Some(position) = position {
                session.set_raw_position(position.page);
            }
            if session.started() {
                let client = position.map_or_else(|| session.raw_position(), |p| p.client);
                let avatar = draggable.avatar_element();
                let real = resolve_real_target(doc, client, target, avatar)
                    .unwrap_or_else(|| doc.body());
                draggable.handle_drag_end(
                    doc,
                    session,
                    DragOutcome::Dropped(real),
                    &mut self.dispatcher,
                    &mut self.dropzones,
                );
                if suppress_click {
                    self.listeners.install(Listener {
                        owner,
                        family: Some(family),
                        kind: ListenerKind::ClickSuppress,
                        element: Some(session.element()),
                    });
                }
                if family == InputFamily::Touch {
                    response = EventResponse::PREVENT_DEFAULT;
                }
            }
        }
        self.release(owner);
        response
    }

    fn cancel_from(
        &mut self,
        doc: &mut D,
        kind: ListenerKind,
        family: Option<InputFamily>,
    ) -> EventResponse {
        if let Some(owner) = self.listeners.owner_of(kind, family) {
            self.cancel_session(doc, owner);
        }
        EventResponse::default()
    }

    /// Cancel the session if `owner` holds it. Returns whether it did.
    fn cancel_session(&mut self, doc: &mut D, owner: DraggableId) -> bool {
        if !self.session.is_owned_by(owner) {
            return false;
        }
        if let (Some(session), Some(draggable)) =
            (self.session.get(), self.draggables.get_mut(&owner))
            && session.started()
        {
            draggable.handle_drag_end(
                doc,
                session,
                DragOutcome::Cancelled,
                &mut self.dispatcher,
                &mut self.dropzones,
            );
        }
        log::debug!("{owner:?} session cancelled");
        self.release(owner);
        true
    }

    /// Drop the session and its gesture listeners.
    fn release(&mut self, owner: DraggableId) {
        if let Some(draggable) = self.draggables.get_mut(&owner) {
            draggable.end_gesture(&mut self.listeners);
        }
        self.session.clear();
    }

    fn click(&self, doc: &D, target: D::Element) -> EventResponse {
        let swallowed = self.listeners.iter().any(|l| {
            l.kind == ListenerKind::ClickSuppress
                && l.element.is_some_and(|el| doc.contains(el, target))
        });
        if swallowed {
            log::trace!("swallowed the click after a drag on {target:?}");
            EventResponse {
                default_prevented: true,
                propagation_stopped: true,
            }
        } else {
            EventResponse::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::{Point, Rect, Vec2};
    use understory_dnd_scene::{ElementFlags, ElementId, ElementSpec, Scene, SceneFeatures};

    use crate::avatar::{CloneAvatar, OriginalAvatar};
    use crate::dispatcher::ElementEventKind;
    use crate::document::RETARGET_ATTRIBUTE;
    use crate::draggable::DraggableEvent;
    use crate::dropzone::DropzoneEvent;
    use crate::event::TouchPoint;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn push(log: &Log, entry: &'static str) -> impl FnMut(&DropzoneEvent<ElementId>) + 'static {
        let log = log.clone();
        move |_: &DropzoneEvent<ElementId>| log.borrow_mut().push(entry)
    }

    struct World {
        scene: Scene,
        dnd: DragDrop<Scene>,
        card: ElementId,
        zone: ElementId,
        log: Log,
    }

    impl World {
        fn new(features: SceneFeatures) -> Self {
            let mut scene = Scene::new(features);
            let body = scene.body();
            let card = scene.insert(
                Some(body),
                ElementSpec::new("div").with_bounds(Rect::new(80.0, 80.0, 130.0, 115.0)),
            );
            let zone = scene.insert(
                Some(body),
                ElementSpec::new("section").with_bounds(Rect::new(0.0, 120.0, 300.0, 200.0)),
            );
            Self {
                scene,
                dnd: DragDrop::new(),
                card,
                zone,
                log: Rc::default(),
            }
        }

        fn mouse() -> Self {
            Self::new(SceneFeatures::empty())
        }

        fn draggable(
            &mut self,
            element: ElementId,
            options: DraggableOptions<Scene>,
        ) -> DraggableId {
            let id = self.dnd.add_draggable(&mut self.scene, [element], options);
            let d = self.dnd.draggable_mut(id).unwrap();
            let log = self.log.clone();
            d.on_drag_start()
                .subscribe(move |_: &DraggableEvent<ElementId>| log.borrow_mut().push("start"));
            let log = self.log.clone();
            d.on_drag()
                .subscribe(move |_: &DraggableEvent<ElementId>| log.borrow_mut().push("drag"));
            let log = self.log.clone();
            d.on_drag_end().subscribe(move |e: &DraggableEvent<ElementId>| {
                log.borrow_mut()
                    .push(if e.cancelled { "end(cancelled)" } else { "end" });
            });
            id
        }

        fn dropzone(
            &mut self,
            element: ElementId,
            options: DropzoneOptions<ElementId>,
        ) -> DropzoneId {
            let id = self.dnd.add_dropzone([element], options);
            let z = self.dnd.dropzone_mut(id).unwrap();
            z.on_drag_enter().subscribe(push(&self.log, "enter"));
            z.on_drag_over().subscribe(push(&self.log, "over"));
            z.on_drag_leave().subscribe(push(&self.log, "leave"));
            z.on_drop().subscribe(push(&self.log, "drop"));
            id
        }

        fn send(&mut self, event: NativeEvent<ElementId>) -> EventResponse {
            self.dnd.handle_event(&mut self.scene, &event)
        }

        fn take_log(&self) -> Vec<&'static str> {
            core::mem::take(&mut *self.log.borrow_mut())
        }

        /// Mouse down on the card at (100, 100) and move far enough to start.
        fn start_mouse_drag(&mut self) {
            let card = self.card;
            self.send(down(card, 100.0, 100.0));
            self.send(mouse_move(105.0, 100.0));
            assert_eq!(self.dnd.drag_state(), DragState::Active, "drag did not start");
        }
    }

    fn down(target: ElementId, x: f64, y: f64) -> NativeEvent<ElementId> {
        NativeEvent::MouseDown {
            target,
            button: MouseButton::Primary,
            position: PointerPosition::at(x, y),
        }
    }

    fn mouse_move(x: f64, y: f64) -> NativeEvent<ElementId> {
        NativeEvent::MouseMove {
            target: None,
            position: PointerPosition::at(x, y),
        }
    }

    fn up(x: f64, y: f64) -> NativeEvent<ElementId> {
        NativeEvent::MouseUp {
            target: None,
            position: PointerPosition::at(x, y),
        }
    }

    fn touches(points: &[(f64, f64)]) -> Vec<TouchPoint> {
        points
            .iter()
            .zip(0..)
            .map(|(&(x, y), identifier)| TouchPoint {
                identifier,
                position: PointerPosition::at(x, y),
            })
            .collect()
    }

    fn pointer_down(target: ElementId, is_primary: bool, x: f64, y: f64) -> NativeEvent<ElementId> {
        NativeEvent::PointerDown {
            target,
            button: MouseButton::Primary,
            is_primary,
            kind: PointerKind::Mouse,
            position: PointerPosition::at(x, y),
        }
    }

    fn pointer_move(x: f64, y: f64) -> NativeEvent<ElementId> {
        NativeEvent::PointerMove {
            target: None,
            position: PointerPosition::at(x, y),
        }
    }

    #[test]
    fn mouse_drag_reaches_threshold_then_drops() {
        let mut w = World::mouse();
        let card = w.card;
        let zone_el = w.zone;
        w.draggable(card, DraggableOptions::new());
        w.dropzone(zone_el, DropzoneOptions::new());
        let starts = Rc::new(RefCell::new(Vec::new()));
        let sink = starts.clone();
        w.dnd
            .draggable_mut(DraggableId(1))
            .unwrap()
            .on_drag_start()
            .subscribe(move |e: &DraggableEvent<ElementId>| sink.borrow_mut().push(*e));
        assert_eq!(w.dnd.listener_count(), 1);

        let r = w.send(down(card, 100.0, 100.0));
        assert!(r.default_prevented);
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
        assert_eq!(w.dnd.listener_count(), 5);

        w.send(mouse_move(102.0, 101.0));
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
        assert!(w.take_log().is_empty());

        w.send(mouse_move(105.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Active);
        assert_eq!(w.take_log(), vec!["start", "drag"]);
        let start = starts.borrow()[0];
        assert_eq!(start.start_position, Point::new(100.0, 100.0));
        assert_eq!(start.position, start.start_position);
        assert!(w.scene.has_class(card, "dnd-dragging"));
        assert!(w.scene.has_class(w.scene.body(), "dnd-drag-occurring"));

        w.send(mouse_move(105.0, 130.0));
        assert_eq!(w.take_log(), vec!["enter", "over", "drag"]);
        assert!(w.scene.has_class(zone_el, "dnd-over"));

        w.send(up(105.0, 130.0));
        assert_eq!(w.take_log(), vec!["drop", "leave", "end"]);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        assert!(!w.scene.has_class(card, "dnd-dragging"));
        assert!(!w.scene.has_class(w.scene.body(), "dnd-drag-occurring"));
        assert!(!w.scene.has_class(zone_el, "dnd-over"));
    }

    #[test]
    fn gestures_leak_no_listeners() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        let baseline = w.dnd.listener_count();

        // A plain click.
        w.send(down(card, 100.0, 100.0));
        w.send(up(100.0, 100.0));
        assert_eq!(w.dnd.listener_count(), baseline);

        // A full drag; the click suppressor lives until the next turn.
        w.start_mouse_drag();
        w.send(up(105.0, 100.0));
        assert_eq!(w.dnd.listener_count(), baseline + 1);
        w.dnd.tick();
        assert_eq!(w.dnd.listener_count(), baseline);

        // A cancelled drag.
        w.start_mouse_drag();
        w.send(NativeEvent::KeyDown(Key::Escape));
        assert_eq!(w.dnd.listener_count(), baseline);
    }

    #[test]
    fn trailing_click_is_swallowed_until_the_next_turn() {
        let mut w = World::mouse();
        let card = w.card;
        let zone = w.zone;
        w.draggable(card, DraggableOptions::new());

        w.start_mouse_drag();
        w.send(up(105.0, 100.0));
        let r = w.send(NativeEvent::Click { target: card });
        assert!(r.default_prevented && r.propagation_stopped);
        assert_eq!(
            w.send(NativeEvent::Click { target: zone }),
            EventResponse::default()
        );
        w.dnd.tick();
        assert_eq!(
            w.send(NativeEvent::Click { target: card }),
            EventResponse::default()
        );
    }

    #[test]
    fn clicks_without_a_drag_go_through() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(down(card, 100.0, 100.0));
        w.send(mouse_move(102.0, 101.0));
        w.send(up(102.0, 101.0));
        assert!(w.take_log().is_empty());
        assert_eq!(
            w.send(NativeEvent::Click { target: card }),
            EventResponse::default()
        );
    }

    #[test]
    fn only_one_session_across_draggables() {
        let mut w = World::mouse();
        let body = w.scene.body();
        let a = w.card;
        let b = w.scene.insert(
            Some(body),
            ElementSpec::new("div").with_bounds(Rect::new(200.0, 0.0, 250.0, 50.0)),
        );
        let id_a = w.draggable(a, DraggableOptions::new());
        w.draggable(b, DraggableOptions::new());

        w.send(down(a, 100.0, 100.0));
        let r = w.send(down(b, 210.0, 10.0));
        assert_eq!(r, EventResponse::default());
        assert_eq!(w.dnd.session().map(DragSession::draggable_id), Some(id_a));

        w.send(mouse_move(120.0, 100.0));
        assert_eq!(w.take_log(), vec!["start", "drag"]);
        assert_eq!(w.dnd.session().map(DragSession::element), Some(a));
    }

    #[derive(Copy, Clone, Debug)]
    enum Cancel {
        Escape,
        Blur,
        Abort,
    }

    fn cancel(w: &mut World, id: DraggableId, how: Cancel) {
        match how {
            Cancel::Escape => {
                w.send(NativeEvent::KeyDown(Key::Escape));
            }
            Cancel::Blur => {
                w.send(NativeEvent::WindowBlur);
            }
            Cancel::Abort => {
                w.dnd.abort(&mut w.scene, id).unwrap();
            }
        }
    }

    #[test]
    fn escape_blur_and_abort_cancel_alike() {
        for how in [Cancel::Escape, Cancel::Blur, Cancel::Abort] {
            let mut w = World::mouse();
            let card = w.card;
            let zone = w.zone;
            let id = w.draggable(card, DraggableOptions::new());
            w.dropzone(zone, DropzoneOptions::new());

            // Before the threshold: silent.
            w.send(down(card, 100.0, 100.0));
            cancel(&mut w, id, how);
            assert_eq!(w.dnd.drag_state(), DragState::Idle, "{how:?}");
            assert!(w.take_log().is_empty(), "{how:?} notified before the start");

            // Mid-drag over the dropzone: leave, then a cancelled end, no drop.
            w.start_mouse_drag();
            w.send(mouse_move(105.0, 130.0));
            w.take_log();
            cancel(&mut w, id, how);
            assert_eq!(w.take_log(), vec!["leave", "end(cancelled)"], "{how:?}");
            assert_eq!(w.dnd.drag_state(), DragState::Idle, "{how:?}");
            assert!(!w.scene.has_class(zone, "dnd-over"), "{how:?}");
            assert!(!w.scene.has_class(card, "dnd-dragging"), "{how:?}");

            // No click suppression after a cancel.
            assert_eq!(
                w.send(NativeEvent::Click { target: card }),
                EventResponse::default()
            );
        }
    }

    #[test]
    fn secondary_button_is_ignored() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        let r = w.send(NativeEvent::MouseDown {
            target: card,
            button: MouseButton::Secondary,
            position: PointerPosition::at(100.0, 100.0),
        });
        assert_eq!(r, EventResponse::default());
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
    }

    #[test]
    fn acceptor_rejection_marks_invalid_and_stays_silent() {
        let mut w = World::mouse();
        let card = w.card;
        let zone = w.zone;
        let id = w.draggable(card, DraggableOptions::new());
        w.dropzone(
            zone,
            DropzoneOptions::new()
                .with_acceptor(move |_: ElementId, d: DraggableId, _: ElementId| d != id),
        );

        w.start_mouse_drag();
        w.send(mouse_move(105.0, 130.0));
        assert!(w.scene.has_class(zone, "dnd-invalid"));
        assert!(!w.scene.has_class(zone, "dnd-over"));
        w.send(up(105.0, 130.0));
        assert_eq!(w.take_log(), vec!["start", "drag", "drag", "end"]);
        assert!(!w.scene.has_class(zone, "dnd-invalid"));
    }

    #[test]
    fn replaced_acceptor_applies_to_the_next_drag() {
        let mut w = World::mouse();
        let card = w.card;
        let zone_el = w.zone;
        w.draggable(card, DraggableOptions::new());
        let zone = w.dropzone(zone_el, DropzoneOptions::new());
        w.dnd
            .set_dropzone_acceptor(zone, |_: ElementId, _: DraggableId, _: ElementId| false)
            .unwrap();
        w.start_mouse_drag();
        w.send(mouse_move(105.0, 130.0));
        assert!(w.scene.has_class(zone_el, "dnd-invalid"));

        assert_eq!(
            w.dnd
                .set_dropzone_acceptor(DropzoneId(99), crate::acceptor::AcceptAll),
            Err(DndError::UnknownDropzone(DropzoneId(99)))
        );
    }

    #[test]
    fn horizontal_touch_drag_yields_to_vertical_scroll() {
        let mut w = World::new(SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new().horizontal_only());
        // Touch and mouse managers.
        assert_eq!(w.dnd.listener_count(), 2);

        let r = w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0)]),
        });
        assert_eq!(r, EventResponse::default());
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
        assert_eq!(w.dnd.listener_count(), 7);

        let r = w.send(NativeEvent::TouchMove {
            touches: touches(&[(102.0, 110.0)]),
        });
        assert!(!r.default_prevented);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        assert_eq!(w.dnd.listener_count(), 2);
        assert!(w.take_log().is_empty());
    }

    #[test]
    fn touch_drag_prevents_scrolling_and_emulated_clicks() {
        let mut w = World::new(SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new().horizontal_only());
        w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0)]),
        });
        let r = w.send(NativeEvent::TouchMove {
            touches: touches(&[(110.0, 101.0)]),
        });
        assert!(r.default_prevented);
        assert_eq!(w.dnd.session().map(DragSession::position), Some(Point::new(110.0, 100.0)));

        let r = w.send(NativeEvent::TouchEnd {
            changed_touches: touches(&[(120.0, 102.0)]),
        });
        assert!(r.default_prevented);
        assert_eq!(w.take_log(), vec!["start", "drag", "end"]);
        // No click suppressor for touch.
        assert_eq!(w.dnd.listener_count(), 2);
    }

    #[test]
    fn second_touch_cancels_the_drag() {
        let mut w = World::new(SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0)]),
        });
        w.send(NativeEvent::TouchMove {
            touches: touches(&[(110.0, 100.0)]),
        });
        w.send(NativeEvent::TouchMove {
            touches: touches(&[(112.0, 100.0), (300.0, 300.0)]),
        });
        assert_eq!(w.take_log(), vec!["start", "drag", "end(cancelled)"]);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);

        // A start with two contacts never begins.
        w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0), (150.0, 150.0)]),
        });
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
    }

    #[test]
    fn touch_moves_below_the_start_distance_block_scrolling() {
        let mut w = World::new(SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0)]),
        });
        let r = w.send(NativeEvent::TouchMove {
            touches: touches(&[(101.0, 101.0)]),
        });
        assert!(r.default_prevented);
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
        assert!(w.take_log().is_empty());

        let r = w.send(NativeEvent::TouchMove {
            touches: touches(&[(106.0, 100.0)]),
        });
        assert!(r.default_prevented);
        assert_eq!(w.dnd.drag_state(), DragState::Active);
        assert_eq!(w.take_log(), vec!["start", "drag"]);
    }

    #[test]
    fn touch_cancel_before_threshold_is_silent() {
        let mut w = World::new(SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(NativeEvent::TouchStart {
            target: card,
            touches: touches(&[(100.0, 100.0)]),
        });
        w.send(NativeEvent::TouchCancel);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        assert!(w.take_log().is_empty());
    }

    #[test]
    fn pointer_input_sets_touch_action_and_filters_non_primary() {
        let mut w = World::new(SceneFeatures::POINTER_EVENTS | SceneFeatures::TOUCH_EVENTS);
        let card = w.card;
        let id = w.draggable(card, DraggableOptions::new().vertical_only());
        assert_eq!(
            w.scene.style(card).and_then(|s| s.touch_action.as_deref()),
            Some("pan-x")
        );
        assert_eq!(w.dnd.listener_count(), 1);

        w.send(pointer_down(card, false, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Idle);

        // Mouse events are not listened to when pointer events exist.
        w.send(down(card, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Idle);

        assert!(w.send(pointer_down(card, true, 100.0, 100.0)).default_prevented);
        w.send(pointer_move(100.0, 110.0));
        w.send(NativeEvent::PointerUp {
            target: None,
            kind: PointerKind::Mouse,
            position: PointerPosition::at(100.0, 110.0),
        });
        assert_eq!(w.take_log(), vec!["start", "drag", "end"]);
        assert!(
            w.dnd
                .listeners()
                .iter()
                .any(|l| l.kind == ListenerKind::ClickSuppress)
        );

        w.dnd.tick();
        assert!(w.dnd.destroy_draggable(&mut w.scene, id));
        assert_eq!(w.scene.style(card).and_then(|s| s.touch_action.as_deref()), None);
        assert_eq!(w.dnd.listener_count(), 0);
    }

    #[test]
    fn pointer_touch_release_does_not_install_click_suppression() {
        let mut w = World::new(SceneFeatures::POINTER_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(pointer_down(card, true, 100.0, 100.0));
        w.send(pointer_move(110.0, 100.0));
        w.send(NativeEvent::PointerUp {
            target: None,
            kind: PointerKind::Touch,
            position: PointerPosition::at(110.0, 100.0),
        });
        assert_eq!(w.dnd.listener_count(), 1);
    }

    #[test]
    fn pointer_cancel_ends_as_cancelled() {
        let mut w = World::new(SceneFeatures::POINTER_EVENTS);
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.send(pointer_down(card, true, 100.0, 100.0));
        w.send(pointer_move(110.0, 100.0));
        w.send(NativeEvent::PointerCancel);
        assert_eq!(w.take_log(), vec!["start", "drag", "end(cancelled)"]);
        assert_eq!(w.dnd.listener_count(), 1);
    }

    #[test]
    fn cancel_selector_and_form_controls() {
        let mut w = World::mouse();
        let card = w.card;
        let input = w.scene.insert(Some(card), ElementSpec::new("input"));
        let id = w.draggable(card, DraggableOptions::new());

        w.send(down(input, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        w.dnd.destroy_draggable(&mut w.scene, id);

        // Without a cancel selector the drag may start, but the form control
        // keeps its default behavior.
        w.draggable(card, DraggableOptions::new().with_cancel(None));
        let r = w.send(down(input, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
        assert!(!r.default_prevented);
    }

    #[test]
    fn handle_restricts_where_drags_begin() {
        let mut w = World::mouse();
        let card = w.card;
        let grip = w
            .scene
            .insert(Some(card), ElementSpec::new("span").with_class("grip"));
        w.draggable(card, DraggableOptions::new().with_handle(".grip"));

        w.send(down(card, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        w.send(down(grip, 100.0, 100.0));
        assert_eq!(w.dnd.drag_state(), DragState::Pending);
    }

    #[test]
    fn nested_draggables_prefer_the_innermost() {
        let mut w = World::mouse();
        let outer = w.card;
        let inner = w.scene.insert(
            Some(outer),
            ElementSpec::new("div").with_bounds(Rect::new(90.0, 90.0, 110.0, 110.0)),
        );
        w.draggable(outer, DraggableOptions::new());
        let inner_id = w.draggable(inner, DraggableOptions::new());
        w.send(down(inner, 100.0, 100.0));
        assert_eq!(w.dnd.session().map(DragSession::draggable_id), Some(inner_id));
        assert_eq!(w.dnd.session().map(DragSession::element), Some(inner));
    }

    #[test]
    fn shadow_content_is_retargeted() {
        let mut w = World::mouse();
        let body = w.scene.body();
        let card = w.card;
        let host = w.scene.insert(
            Some(body),
            ElementSpec::new("x-board")
                .with_bounds(Rect::new(0.0, 120.0, 300.0, 200.0))
                .with_z_index(1)
                .with_attribute(RETARGET_ATTRIBUTE, ""),
        );
        let slot = w
            .scene
            .insert_shadow(
                host,
                ElementSpec::new("li").with_bounds(Rect::new(0.0, 120.0, 300.0, 160.0)),
            )
            .unwrap();
        w.draggable(card, DraggableOptions::new());
        w.dropzone(slot, DropzoneOptions::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        w.dnd
            .on_element_event()
            .subscribe(move |e: &ElementEvent<ElementId>| sink.borrow_mut().push(e.target));

        w.start_mouse_drag();
        w.send(mouse_move(105.0, 130.0));
        assert_eq!(w.take_log(), vec!["start", "drag", "enter", "over", "drag"]);
        assert!(seen.borrow().contains(&slot));
        assert!(!seen.borrow().contains(&host));
    }

    #[test]
    fn clone_avatar_lives_for_the_drag() {
        let mut w = World::mouse();
        let card = w.card;
        let zone_el = w.zone;
        let id = w.draggable(card, DraggableOptions::new().with_avatar(CloneAvatar::new()));
        w.dropzone(zone_el, DropzoneOptions::new());
        let avatars = Rc::new(RefCell::new(Vec::new()));
        let sink = avatars.clone();
        w.dnd
            .draggable_mut(id)
            .unwrap()
            .on_drag_start()
            .subscribe(move |e: &DraggableEvent<ElementId>| sink.borrow_mut().push(e.avatar));

        w.start_mouse_drag();
        let clone = avatars.borrow()[0].expect("clone avatar");
        assert_ne!(clone, card);
        assert!(w.scene.is_attached(clone));
        assert!(!w.scene.flags(clone).contains(ElementFlags::PICKABLE));
        assert_eq!(w.scene.page_offset(clone), Point::new(80.0, 80.0));

        // Two moves before the frame: one request, latest translate wins.
        w.send(mouse_move(105.0, 130.0));
        assert_eq!(w.scene.take_frame_requests(), 1);
        w.dnd.animation_frame(&mut w.scene);
        assert_eq!(
            w.scene.style(clone).and_then(|s| s.translate),
            Some(Vec2::new(5.0, 30.0))
        );

        // The clone is transparent, so the dropzone under it is still found.
        assert!(w.scene.has_class(zone_el, "dnd-over"));

        w.send(up(105.0, 130.0));
        assert!(!w.scene.is_alive(clone));
        assert_eq!(w.dnd.draggable(id).and_then(Draggable::avatar_element), None);
        assert_eq!(w.scene.page_offset(card), Point::new(80.0, 80.0));
    }

    #[test]
    fn original_avatar_commits_the_final_position() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(
            card,
            DraggableOptions::new().with_avatar(OriginalAvatar::new()),
        );
        w.start_mouse_drag();
        assert!(!w.scene.flags(card).contains(ElementFlags::PICKABLE));
        w.send(mouse_move(105.0, 130.0));
        w.dnd.animation_frame(&mut w.scene);
        assert_eq!(
            w.scene.style(card).and_then(|s| s.translate),
            Some(Vec2::new(5.0, 30.0))
        );

        w.send(up(105.0, 130.0));
        assert_eq!(w.scene.style(card).and_then(|s| s.translate), None);
        assert_eq!(w.scene.page_offset(card), Point::new(85.0, 110.0));
        assert!(w.scene.flags(card).contains(ElementFlags::PICKABLE));
    }

    #[test]
    fn destroy_mid_drag_cancels_and_releases_everything() {
        let mut w = World::mouse();
        let card = w.card;
        let id = w.draggable(card, DraggableOptions::new());
        w.start_mouse_drag();
        w.take_log();

        assert!(w.dnd.destroy_draggable(&mut w.scene, id));
        assert_eq!(w.take_log(), vec!["end(cancelled)"]);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
        assert_eq!(w.dnd.listener_count(), 0);
        assert!(!w.scene.has_class(card, "dnd-dragging"));

        assert!(!w.dnd.destroy_draggable(&mut w.scene, id));
        assert_eq!(
            w.dnd.abort(&mut w.scene, id),
            Err(DndError::UnknownDraggable(id))
        );
        // Later events find nobody listening.
        assert_eq!(w.send(mouse_move(200.0, 200.0)), EventResponse::default());
        assert_eq!(w.send(down(card, 100.0, 100.0)), EventResponse::default());
    }

    #[test]
    fn destroyed_dropzone_stops_receiving_mid_drag() {
        let mut w = World::mouse();
        let card = w.card;
        let zone_el = w.zone;
        w.draggable(card, DraggableOptions::new());
        let zone = w.dropzone(zone_el, DropzoneOptions::new());
        w.start_mouse_drag();
        assert!(w.dnd.destroy_dropzone(zone));
        assert!(!w.dnd.destroy_dropzone(zone));
        w.send(mouse_move(105.0, 130.0));
        w.send(up(105.0, 130.0));
        assert_eq!(w.take_log(), vec!["start", "drag", "drag", "end"]);
    }

    #[test]
    fn abort_reports_whether_it_cancelled() {
        let mut w = World::mouse();
        let card = w.card;
        let id = w.draggable(card, DraggableOptions::new());
        assert_eq!(w.dnd.abort(&mut w.scene, id), Ok(false));
        w.start_mouse_drag();
        assert_eq!(w.dnd.abort(&mut w.scene, id), Ok(true));
    }

    #[test]
    fn drag_start_clears_the_text_selection() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(card, DraggableOptions::new());
        w.scene.select_text();
        w.start_mouse_drag();
        assert!(!w.scene.has_selection());
    }

    #[test]
    fn drag_starts_when_the_focused_input_has_no_selection_range() {
        let mut w = World::mouse();
        let card = w.card;
        let body = w.scene.body();
        let file = w.scene.insert(
            Some(body),
            ElementSpec::new("input").with_attribute("type", "file"),
        );
        w.scene.set_active_element(Some(file));
        w.scene.select_text();
        w.draggable(card, DraggableOptions::new());

        w.start_mouse_drag();
        assert_eq!(w.take_log(), vec!["start", "drag"]);
        assert!(!w.scene.has_selection());
        assert!(w.scene.has_class(card, "dnd-dragging"));
    }

    #[test]
    fn release_outside_every_box_drops_on_the_body() {
        let mut w = World::mouse();
        let card = w.card;
        let body = w.scene.body();
        w.draggable(card, DraggableOptions::new());
        w.dropzone(body, DropzoneOptions::new());
        let drops = Rc::new(RefCell::new(Vec::new()));
        let sink = drops.clone();
        w.dnd.on_element_event().subscribe(move |e: &ElementEvent<ElementId>| {
            if e.kind == ElementEventKind::Drop {
                sink.borrow_mut().push(e.target);
            }
        });

        w.start_mouse_drag();
        assert_eq!(w.take_log(), vec!["start", "enter", "over", "drag"]);
        assert_eq!(w.scene.element_from_point(Point::new(-50.0, -50.0)), None);

        w.send(up(-50.0, -50.0));
        assert_eq!(*drops.borrow(), vec![body]);
        assert_eq!(w.take_log(), vec!["drop", "leave", "end"]);
        assert_eq!(w.dnd.drag_state(), DragState::Idle);
    }

    #[test]
    fn disabled_classes_are_not_applied() {
        let mut w = World::mouse();
        let card = w.card;
        w.draggable(
            card,
            DraggableOptions::new()
                .with_dragging_class(None)
                .with_dragging_class_body(Some("busy")),
        );
        w.start_mouse_drag();
        assert!(!w.scene.has_class(card, "dnd-dragging"));
        assert!(w.scene.has_class(w.scene.body(), "busy"));
    }
}
