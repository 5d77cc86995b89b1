// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd --heading-base-level=0

//! Understory DnD: a deterministic, `no_std` drag and drop gesture engine.
//!
//! ## Overview
//!
//! This crate turns raw native input (mouse, touch, or pointer events) into a
//! drag session and the notifications built on it. It never touches a real
//! DOM: everything it needs from the page goes through the
//! [`Document`](crate::document::Document) host trait.
//!
//! - A [`Draggable`](crate::draggable::Draggable) is a set of elements that can
//!   be dragged. It emits drag start, drag, and drag end.
//! - A [`Dropzone`](crate::dropzone::Dropzone) is a set of elements that can
//!   receive drops. It emits enter, over, leave, and drop for drags its
//!   [`Acceptor`](crate::acceptor::Acceptor) recognizes.
//! - An [`AvatarHandler`](crate::avatar::AvatarHandler) provides visual
//!   feedback: the element itself or a clone follows the pointer.
//!
//! ## Lifecycle
//!
//! At most one session exists per [`DragDrop`]. A qualifying "down" creates a
//! pending session; it becomes active once the pointer travels the configured
//! start distance, and ends on release (a drop) or on escape, window blur,
//! native cancel, a second touch, or [`DragDrop::abort`] (a cancellation).
//! Cancelling a session that never started is silent.
//!
//! ## Event loop contract
//!
//! The host forwards native events to [`DragDrop::handle_event`] and applies
//! the returned [`EventResponse`](crate::event::EventResponse). It also calls
//! [`DragDrop::tick`] at the start of every event-loop turn (this closes the
//! window in which a trailing click is swallowed) and
//! [`DragDrop::animation_frame`] when a frame requested through the document
//! arrives.
//!
//! ## Minimal example
//!
//! See [`adapters::scene`](crate::adapters) (feature `scene_adapter`) for a
//! complete drag driven over the in-memory scene. The dispatcher alone:
//!
//! ```
//! use understory_dnd::dispatcher::{DragEventDispatcher, ElementEventKind};
//!
//! let mut d: DragEventDispatcher<u32> = DragEventDispatcher::new();
//! let kinds: Vec<_> = d.dispatch_over(Some(7)).iter().map(|e| e.kind).collect();
//! assert_eq!(kinds, [ElementEventKind::Enter, ElementEventKind::Over]);
//! ```
//!
//! ## Features
//!
//! - `std` (default) and `libm` select kurbo's float backend.
//! - `scene_adapter` implements [`Document`](crate::document::Document) for
//!   `understory_dnd_scene::Scene`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod acceptor;
pub mod adapters;
pub mod avatar;
pub mod dispatcher;
pub mod document;
pub mod draggable;
pub mod dropzone;
pub mod event;
pub mod geometry;
pub mod input;
pub mod listeners;
pub mod notify;
pub mod session;
pub mod types;

mod context;

pub use context::DragDrop;

use types::{DraggableId, DropzoneId};

/// Errors returned by id-addressed control calls on [`DragDrop`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DndError {
    /// No draggable with this id exists (it was never created or was destroyed).
    #[error("unknown draggable {0:?}")]
    UnknownDraggable(DraggableId),
    /// No dropzone with this id exists (it was never created or was destroyed).
    #[error("unknown dropzone {0:?}")]
    UnknownDropzone(DropzoneId),
}
