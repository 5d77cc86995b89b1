// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input managers and the target checks they share.
//!
//! One [`InputManager`] exists per input family a draggable listens to. A
//! manager owns the listener records for its family: start listeners on the
//! draggable's elements for the draggable's whole life, and gesture listeners
//! on the document for the length of one session. Escape and window blur are
//! gesture listeners of every family.

use alloc::vec::Vec;

use kurbo::Point;

use crate::document::{Document, RETARGET_ATTRIBUTE};
use crate::geometry::AxisConstraint;
use crate::listeners::{Listener, ListenerId, ListenerKind, Listeners};
use crate::types::{DraggableId, InputFamily};

/// Shadow trees deeper than this are not searched when retargeting.
pub const MAX_SHADOW_DEPTH: usize = 32;

/// Returns true if a gesture starting on `target` may drag.
///
/// `roots` are the draggable's elements. With a `cancel` selector, the target
/// and its ancestors up to the draggable root must not match it. With a
/// `handle` selector, the target or one of its ancestors must match it, and
/// the matching element must lie within a draggable root.
pub fn is_valid_start_target<D: Document + ?Sized>(
    doc: &D,
    target: D::Element,
    roots: &[D::Element],
    handle: Option<&str>,
    cancel: Option<&str>,
) -> bool {
    if let Some(cancel) = cancel
        && find_up_to_root(doc, target, roots, cancel).is_some()
    {
        return false;
    }
    let Some(handle) = handle else {
        return true;
    };
    match find_up_to_root(doc, target, roots, handle) {
        Some(found) => roots.iter().any(|root| doc.contains(*root, found)),
        None => false,
    }
}

/// Nearest of `from` and its ancestors matching `selector`, stopping after
/// the first element that is one of `roots`.
fn find_up_to_root<D: Document + ?Sized>(
    doc: &D,
    from: D::Element,
    roots: &[D::Element],
    selector: &str,
) -> Option<D::Element> {
    let mut cur = Some(from);
    while let Some(el) = cur {
        if doc.matches(el, selector) {
            return Some(el);
        }
        if roots.contains(&el) {
            return None;
        }
        cur = doc.parent(el);
    }
    None
}

/// Resolve the element really under the pointer.
///
/// `hint` is the native event target, if the event had one. A missing hint,
/// or one inside the avatar, is replaced by a hit test with the avatar hidden
/// (its visibility is restored afterwards). The result is then retargeted
/// into shadow trees of hosts carrying [`RETARGET_ATTRIBUTE`].
pub fn resolve_real_target<D: Document + ?Sized>(
    doc: &mut D,
    client: Point,
    hint: Option<D::Element>,
    avatar: Option<D::Element>,
) -> Option<D::Element> {
    let raw = match hint {
        Some(target) => Some(target),
        None => doc.element_from_point(client),
    };
    let hit = match (raw, avatar) {
        (Some(target), Some(avatar)) if doc.contains(avatar, target) => {
            let was_hidden = doc.is_hidden(avatar);
            doc.set_hidden(avatar, true);
            let under = doc.element_from_point(client);
            doc.set_hidden(avatar, was_hidden);
            under
        }
        _ => raw,
    };
    hit.map(|target| retarget_into_shadow(&*doc, client, target))
}

fn retarget_into_shadow<D: Document + ?Sized>(
    doc: &D,
    client: Point,
    mut target: D::Element,
) -> D::Element {
    for _ in 0..MAX_SHADOW_DEPTH {
        if !doc.has_attribute(target, RETARGET_ATTRIBUTE) {
            return target;
        }
        match doc.shadow_element_from_point(target, client) {
            Some(inner) if inner != target => target = inner,
            _ => return target,
        }
    }
    log::warn!(
        "stopped retargeting at {target:?}: shadow trees nested deeper than {MAX_SHADOW_DEPTH}"
    );
    target
}

/// Listener bookkeeping for one input family of one draggable.
#[derive(Clone, Debug)]
pub struct InputManager {
    family: InputFamily,
    start: Vec<ListenerId>,
    gesture: Vec<ListenerId>,
}

impl InputManager {
    /// A manager with nothing installed.
    pub fn new(family: InputFamily) -> Self {
        Self {
            family,
            start: Vec::new(),
            gesture: Vec::new(),
        }
    }

    /// Input family handled by this manager.
    pub fn family(&self) -> InputFamily {
        self.family
    }

    /// Returns true while gesture listeners are installed.
    pub fn is_tracking(&self) -> bool {
        !self.gesture.is_empty()
    }

    /// Install start listeners on `elements`.
    ///
    /// Pointer input also sets `touch-action` so the browser keeps the axis
    /// the draggable does not use for scrolling.
    pub fn install_start<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        listeners: &mut Listeners<D::Element>,
        owner: DraggableId,
        elements: &[D::Element],
        axis: AxisConstraint,
    ) {
        for &element in elements {
            self.start.push(listeners.install(Listener {
                owner,
                family: Some(self.family),
                kind: ListenerKind::Start,
                element: Some(element),
            }));
            if self.family == InputFamily::Pointer {
                doc.set_touch_action(element, Some(touch_action(axis)));
            }
        }
    }

    /// Remove start listeners and, for pointer input, the `touch-action`.
    pub fn uninstall_start<D: Document + ?Sized>(
        &mut self,
        doc: &mut D,
        listeners: &mut Listeners<D::Element>,
        elements: &[D::Element],
    ) {
        for id in self.start.drain(..) {
            listeners.remove(id);
        }
        if self.family == InputFamily::Pointer {
            for &element in elements {
                doc.set_touch_action(element, None);
            }
        }
    }

    /// Install every listener a session needs.
    pub fn install_gesture<E: Copy + Eq>(
        &mut self,
        listeners: &mut Listeners<E>,
        owner: DraggableId,
    ) {
        self.install_move(listeners, owner);
        self.install_end(listeners, owner);
        self.install_cancel(listeners, owner);
        for kind in [ListenerKind::Escape, ListenerKind::Blur] {
            self.gesture.push(listeners.install(Listener {
                owner,
                family: None,
                kind,
                element: None,
            }));
        }
    }

    /// Install the document-level move listener.
    pub fn install_move<E: Copy + Eq>(&mut self, listeners: &mut Listeners<E>, owner: DraggableId) {
        self.install_document(listeners, owner, ListenerKind::Move);
    }

    /// Install the document-level end listener.
    pub fn install_end<E: Copy + Eq>(&mut self, listeners: &mut Listeners<E>, owner: DraggableId) {
        self.install_document(listeners, owner, ListenerKind::End);
    }

    /// Install the document-level cancel listener, if the family has one.
    pub fn install_cancel<E: Copy + Eq>(
        &mut self,
        listeners: &mut Listeners<E>,
        owner: DraggableId,
    ) {
        if self.family.has_cancel() {
            self.install_document(listeners, owner, ListenerKind::Cancel);
        }
    }

    fn install_document<E: Copy + Eq>(
        &mut self,
        listeners: &mut Listeners<E>,
        owner: DraggableId,
        kind: ListenerKind,
    ) {
        self.gesture.push(listeners.install(Listener {
            owner,
            family: Some(self.family),
            kind,
            element: None,
        }));
    }

    /// Remove every session listener.
    pub fn uninstall_gesture<E: Copy + Eq>(&mut self, listeners: &mut Listeners<E>) {
        for id in self.gesture.drain(..) {
            listeners.remove(id);
        }
    }
}

fn touch_action(axis: AxisConstraint) -> &'static str {
    if axis.horizontal_only {
        "pan-y"
    } else if axis.vertical_only {
        "pan-x"
    } else {
        "none"
    }
}
