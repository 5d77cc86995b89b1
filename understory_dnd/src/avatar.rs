// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Avatar handlers: visual feedback for the dragged element.
//!
//! ## Contract
//!
//! A handler's avatar is `Some` from [`AvatarHandler::drag_start`] until
//! [`AvatarHandler::drag_end`] and `None` otherwise. While it exists the avatar
//! is transparent to hit testing; the previous `pointer-events` value is
//! restored at the end.
//!
//! Moves are applied as `translate` transforms through [`AvatarState`], which
//! keeps at most one pending move and applies it on the next animation frame.
//!
//! Two handlers are built in:
//! - [`OriginalAvatar`] drags the element itself and commits its final
//!   `left`/`top` on release.
//! - [`CloneAvatar`] drags a deep clone appended to the body and removes it on
//!   release.

use kurbo::{Point, Vec2};

use crate::document::{Document, PointerEvents};

/// Visual feedback for a drag.
pub trait AvatarHandler<D: Document> {
    /// The avatar element, present only while a drag is in progress.
    fn avatar(&self) -> Option<D::Element>;

    /// A drag of `element` started at `start`.
    fn drag_start(&mut self, doc: &mut D, element: D::Element, start: Point);

    /// The drag moved to `position`.
    fn drag(&mut self, doc: &mut D, start: Point, position: Point);

    /// The drag ended (dropped or cancelled) at `position`.
    fn drag_end(&mut self, doc: &mut D, start: Point, position: Point);

    /// An animation frame requested through
    /// [`Document::request_animation_frame`] arrived.
    fn animation_frame(&mut self, doc: &mut D) {
        let _ = doc;
    }
}

/// Shared per-session bookkeeping for avatar handlers.
#[derive(Clone, Debug)]
pub struct AvatarState<E> {
    avatar: Option<E>,
    margin: Option<Vec2>,
    pending_translate: Option<Vec2>,
    frame_requested: bool,
    saved_pointer_events: Option<PointerEvents>,
}

impl<E> Default for AvatarState<E> {
    fn default() -> Self {
        Self {
            avatar: None,
            margin: None,
            pending_translate: None,
            frame_requested: false,
            saved_pointer_events: None,
        }
    }
}

impl<E: Copy + Eq + core::fmt::Debug> AvatarState<E> {
    /// The avatar element.
    pub fn avatar(&self) -> Option<E> {
        self.avatar
    }

    /// Start a session with `avatar`, dropping cached measurements.
    pub fn begin(&mut self, avatar: E) {
        self.avatar = Some(avatar);
        self.margin = None;
        self.pending_translate = None;
    }

    /// End the session.
    ///
    /// A frame requested but never delivered does not hold back the next
    /// session's request.
    pub fn finish(&mut self) {
        self.avatar = None;
        self.margin = None;
        self.pending_translate = None;
        self.frame_requested = false;
        self.saved_pointer_events = None;
    }

    /// Left/top margins of the avatar, measured once per session.
    pub fn margin<D: Document<Element = E>>(&mut self, doc: &D) -> Vec2 {
        match (self.margin, self.avatar) {
            (Some(m), _) => m,
            (None, Some(avatar)) => {
                let m = doc.computed_margin(avatar);
                self.margin = Some(m);
                m
            }
            (None, None) => Vec2::ZERO,
        }
    }

    /// Place the avatar's border box at `position` (page space).
    pub fn set_left_top<D: Document<Element = E>>(&mut self, doc: &mut D, position: Point) {
        let margin = self.margin(&*doc);
        if let Some(avatar) = self.avatar {
            doc.set_left_top(avatar, position - margin);
        }
    }

    /// Queue a translate for the next animation frame.
    ///
    /// Only the latest translate survives until the frame arrives.
    pub fn schedule_translate<D: Document<Element = E>>(&mut self, doc: &mut D, delta: Vec2) {
        self.pending_translate = Some(delta);
        if !self.frame_requested {
            self.frame_requested = true;
            doc.request_animation_frame();
        }
    }

    /// Apply the pending translate, if any.
    pub fn flush<D: Document<Element = E>>(&mut self, doc: &mut D) {
        self.frame_requested = false;
        if let (Some(delta), Some(avatar)) = (self.pending_translate.take(), self.avatar) {
            doc.set_translate(avatar, Some(delta));
        }
    }

    /// Drop any pending translate and clear the transform.
    pub fn remove_translate<D: Document<Element = E>>(&mut self, doc: &mut D) {
        self.pending_translate = None;
        if let Some(avatar) = self.avatar {
            doc.set_translate(avatar, None);
        }
    }

    /// Make the avatar transparent to hit testing, remembering the old value.
    pub fn make_transparent<D: Document<Element = E>>(&mut self, doc: &mut D) {
        if let Some(avatar) = self.avatar {
            self.saved_pointer_events = Some(doc.pointer_events(avatar));
            doc.set_pointer_events(avatar, PointerEvents::None);
        }
    }

    /// Restore the `pointer-events` value saved by [`AvatarState::make_transparent`].
    pub fn restore_pointer_events<D: Document<Element = E>>(&mut self, doc: &mut D) {
        if let (Some(avatar), Some(saved)) = (self.avatar, self.saved_pointer_events.take()) {
            doc.set_pointer_events(avatar, saved);
        }
    }
}

/// Drags the original element.
#[derive(Clone, Debug)]
pub struct OriginalAvatar<E> {
    state: AvatarState<E>,
    origin: Point,
}

impl<E> Default for OriginalAvatar<E> {
    fn default() -> Self {
        Self {
            state: AvatarState::default(),
            origin: Point::ZERO,
        }
    }
}

impl<E> OriginalAvatar<E> {
    /// Create a handler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Document> AvatarHandler<D> for OriginalAvatar<D::Element> {
    fn avatar(&self) -> Option<D::Element> {
        self.state.avatar()
    }

    fn drag_start(&mut self, doc: &mut D, element: D::Element, _start: Point) {
        self.state.begin(element);
        self.origin = doc.page_offset(element);
        self.state.set_left_top(doc, self.origin);
        self.state.make_transparent(doc);
    }

    fn drag(&mut self, doc: &mut D, start: Point, position: Point) {
        self.state.schedule_translate(doc, position - start);
    }

    fn drag_end(&mut self, doc: &mut D, start: Point, position: Point) {
        self.state.remove_translate(doc);
        // Keep the element reachable: never past the top or left edge.
        let moved = self.origin + (position - start);
        self.state
            .set_left_top(doc, Point::new(moved.x.max(0.0), moved.y.max(0.0)));
        self.state.restore_pointer_events(doc);
        self.state.finish();
    }

    fn animation_frame(&mut self, doc: &mut D) {
        self.state.flush(doc);
    }
}

/// Drags a clone of the element appended to the body.
#[derive(Clone, Debug)]
pub struct CloneAvatar<E> {
    state: AvatarState<E>,
}

impl<E> Default for CloneAvatar<E> {
    fn default() -> Self {
        Self {
            state: AvatarState::default(),
        }
    }
}

impl<E> CloneAvatar<E> {
    /// Create a handler.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Document> AvatarHandler<D> for CloneAvatar<D::Element> {
    fn avatar(&self) -> Option<D::Element> {
        self.state.avatar()
    }

    fn drag_start(&mut self, doc: &mut D, element: D::Element, _start: Point) {
        let clone = match doc.clone_element(element) {
            Ok(clone) => clone,
            Err(err) => {
                log::warn!("cannot clone {element:?} for the drag avatar: {err}");
                return;
            }
        };
        if let Err(err) = doc.append_to_body(clone) {
            log::warn!("cannot attach drag avatar {clone:?}: {err}");
            return;
        }
        self.state.begin(clone);
        let origin = doc.page_offset(element);
        self.state.set_left_top(doc, origin);
        self.state.make_transparent(doc);
    }

    fn drag(&mut self, doc: &mut D, start: Point, position: Point) {
        self.state.schedule_translate(doc, position - start);
    }

    fn drag_end(&mut self, doc: &mut D, _start: Point, _position: Point) {
        self.state.remove_translate(doc);
        self.state.restore_pointer_events(doc);
        if let Some(avatar) = self.state.avatar()
            && let Err(err) = doc.remove_element(avatar)
        {
            log::debug!("drag avatar {avatar:?} already gone: {err}");
        }
        self.state.finish();
    }

    fn animation_frame(&mut self, doc: &mut D) {
        self.state.flush(doc);
    }
}
