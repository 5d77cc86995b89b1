// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dnd_scene --heading-base-level=0

//! Understory DnD Scene: an in-memory document for driving drag and drop.
//!
//! The scene models just enough of a browser document for gesture handling to
//! be exercised without a browser:
//!
//! - A tree of elements rooted at `body`, with tags, classes, and attributes.
//! - Page-space layout boxes, z-order, and inline style (`left`/`top`,
//!   `translate`, margins, `touch-action`).
//! - Inherited visibility and pointer-event flags that control hit testing.
//! - Shadow trees: content inserted with [`Scene::insert_shadow`] is only
//!   reachable through [`Scene::shadow_element_from_point`].
//! - Text selection and focused-control selection ranges.
//! - A viewport scroll offset relating client and page coordinates.
//!
//! ## Not a layout engine
//!
//! Boxes are given, not computed. Callers set each element's page-space box
//! directly and the scene only answers queries over them.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_dnd_scene::{ElementSpec, Scene};
//! use kurbo::{Point, Rect};
//!
//! let mut scene = Scene::default();
//! let body = scene.body();
//! let list = scene.insert(
//!     Some(body),
//!     ElementSpec::new("ul").with_bounds(Rect::new(0.0, 0.0, 200.0, 200.0)),
//! );
//! let item = scene.insert(
//!     Some(list),
//!     ElementSpec::new("li")
//!         .with_bounds(Rect::new(0.0, 0.0, 200.0, 40.0))
//!         .with_class("item"),
//! );
//!
//! assert_eq!(scene.element_from_point(Point::new(10.0, 10.0)), Some(item));
//! assert_eq!(scene.element_from_point(Point::new(10.0, 100.0)), Some(list));
//! assert!(scene.matches(item, "li.item"));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod scene;
mod selector;
mod types;

pub use scene::Scene;
pub use types::{ElementFlags, ElementId, ElementSpec, SceneFeatures, Style};

/// Errors reported by [`Scene`] operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The element id no longer refers to a live element.
    #[error("element id is stale")]
    StaleElement,
    /// The operation would detach the body or create a cycle.
    #[error("element cannot be moved or removed there")]
    NotAttached,
    /// The element does not support selection ranges.
    #[error("element does not support selection ranges")]
    SelectionUnsupported,
}
