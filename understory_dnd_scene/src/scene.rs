// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, updates, queries.

use alloc::string::String;
use alloc::vec::Vec;
use kurbo::{Point, Rect, Vec2};

use crate::SceneError;
use crate::selector::{self, Subject};
use crate::types::{ElementFlags, ElementId, ElementSpec, SceneFeatures, Style};

/// Input types that reject `setSelectionRange`.
const NO_SELECTION_RANGE: &[&str] = &[
    "button", "checkbox", "color", "date", "file", "hidden", "image", "radio", "range", "reset",
    "submit",
];

#[derive(Clone, Debug)]
struct Element {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Host of the shadow tree this element lives in, if any.
    shadow_host: Option<ElementId>,
    has_shadow_root: bool,
    seq: u64,
    tag: String,
    bounds: Rect,
    z_index: i32,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    flags: ElementFlags,
    style: Style,
    selection_range: Option<(usize, usize)>,
}

impl Element {
    fn new(generation: u32, seq: u64, spec: ElementSpec) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            shadow_host: None,
            has_shadow_root: false,
            seq,
            tag: spec.tag,
            bounds: spec.bounds,
            z_index: spec.z_index,
            classes: spec.classes,
            attributes: spec.attributes,
            flags: spec.flags,
            style: spec.style,
            selection_range: None,
        }
    }

    fn subject(&self) -> Subject<'_> {
        Subject {
            tag: &self.tag,
            classes: &self.classes,
            attributes: &self.attributes,
        }
    }

    /// Border box origin, ignoring transforms.
    fn offset(&self) -> Point {
        match (self.style.left, self.style.top) {
            (Some(left), Some(top)) => {
                Point::new(left + self.style.margin.x0, top + self.style.margin.y0)
            }
            _ => self.bounds.origin(),
        }
    }

    /// Rendered box in page space, including transforms.
    fn rendered_rect(&self) -> Rect {
        let origin = self.offset() + self.style.translate.unwrap_or(Vec2::ZERO);
        Rect::from_origin_size(origin, self.bounds.size())
    }
}

/// An in-memory document.
///
/// The scene always has a `body` root element. Elements inserted without a
/// parent are detached: they exist but are not rendered and never hit.
pub struct Scene {
    elements: Vec<Option<Element>>, // slots
    generations: Vec<u32>,          // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    seq: u64,
    body: ElementId,
    features: SceneFeatures,
    scroll: Vec2,
    active_element: Option<ElementId>,
    has_selection: bool,
    frame_requests: u32,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.elements.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Scene")
            .field("elements_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("features", &self.features)
            .field("scroll", &self.scroll)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneFeatures::default())
    }
}

impl Scene {
    /// Create a scene with a body of unbounded size.
    pub fn new(features: SceneFeatures) -> Self {
        let mut scene = Self {
            elements: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            seq: 0,
            body: ElementId::new(0, 1),
            features,
            scroll: Vec2::ZERO,
            active_element: None,
            has_selection: false,
            frame_requests: 0,
        };
        scene.body = scene.alloc(ElementSpec::new("body").with_bounds(Rect::new(
            0.0,
            0.0,
            f64::INFINITY,
            f64::INFINITY,
        )));
        scene
    }

    /// The `body` element.
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Input APIs this scene claims to support.
    pub fn features(&self) -> SceneFeatures {
        self.features
    }

    fn alloc(&mut self, spec: ElementSpec) -> ElementId {
        self.seq += 1;
        let seq = self.seq;
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.elements[idx] = Some(Element::new(generation, seq, spec));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.elements.push(Some(Element::new(generation, seq, spec)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            ((self.elements.len() - 1) as u32, generation)
        };
        ElementId::new(idx, generation)
    }

    /// Insert a new element as the last child of `parent`, or detached if `None`.
    pub fn insert(&mut self, parent: Option<ElementId>, spec: ElementSpec) -> ElementId {
        let id = self.alloc(spec);
        if let Some(p) = parent.filter(|p| self.is_alive(*p)) {
            let host = self.get(p).and_then(|p| p.shadow_host);
            self.link(id, p, host);
        }
        id
    }

    /// Insert a new element at the top level of `host`'s shadow tree, creating
    /// the shadow root on first use.
    pub fn insert_shadow(
        &mut self,
        host: ElementId,
        spec: ElementSpec,
    ) -> Result<ElementId, SceneError> {
        if !self.is_alive(host) {
            return Err(SceneError::StaleElement);
        }
        let id = self.alloc(spec);
        if let Some(h) = self.get_mut(host) {
            h.has_shadow_root = true;
        }
        self.link(id, host, Some(host));
        Ok(id)
    }

    fn link(&mut self, id: ElementId, parent: ElementId, shadow_host: Option<ElementId>) {
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = Some(parent);
        }
        self.set_shadow_host(id, shadow_host);
    }

    fn set_shadow_host(&mut self, id: ElementId, shadow_host: Option<ElementId>) {
        let children = match self.get_mut(id) {
            Some(n) => {
                n.shadow_host = shadow_host;
                n.children.clone()
            }
            None => return,
        };
        for child in children {
            // Content of `id`'s own shadow root stays scoped to `id`.
            if self.get(child).is_some_and(|c| c.shadow_host == Some(id)) {
                continue;
            }
            self.set_shadow_host(child, shadow_host);
        }
    }

    fn unlink(&mut self, id: ElementId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.get_mut(id) {
            n.parent = None;
        }
        self.set_shadow_host(id, None);
    }

    /// Remove an element and its subtree. The body cannot be removed.
    pub fn remove(&mut self, id: ElementId) -> Result<(), SceneError> {
        if !self.is_alive(id) {
            return Err(SceneError::StaleElement);
        }
        if id == self.body {
            return Err(SceneError::NotAttached);
        }
        self.unlink(id);
        self.free_subtree(id);
        Ok(())
    }

    fn free_subtree(&mut self, id: ElementId) {
        let children = self.get(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.free_subtree(child);
        }
        if self.active_element == Some(id) {
            self.active_element = None;
        }
        self.elements[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` to be the last child of `new_parent`.
    pub fn append_child(&mut self, new_parent: ElementId, id: ElementId) -> Result<(), SceneError> {
        if !self.is_alive(id) || !self.is_alive(new_parent) {
            return Err(SceneError::StaleElement);
        }
        if self.contains(id, new_parent) {
            return Err(SceneError::NotAttached);
        }
        self.unlink(id);
        let host = self.get(new_parent).and_then(|p| p.shadow_host);
        self.link(id, new_parent, host);
        Ok(())
    }

    /// Deep-clone `id` (attributes, classes, style, subtree). The clone is detached.
    pub fn clone_element(&mut self, id: ElementId) -> Result<ElementId, SceneError> {
        let Some(source) = self.get(id).cloned() else {
            return Err(SceneError::StaleElement);
        };
        let mut spec = ElementSpec::new(&source.tag);
        spec.bounds = source.bounds;
        spec.z_index = source.z_index;
        spec.classes = source.classes;
        spec.attributes = source.attributes;
        spec.flags = source.flags;
        spec.style = source.style;
        let copy = self.alloc(spec);
        for child in source.children {
            // Shadow content is not cloned, matching `cloneNode(true)`.
            if self.get(child).map(|c| c.shadow_host) != Some(Some(id)) {
                let child_copy = self.clone_element(child)?;
                self.link(child_copy, copy, None);
            }
        }
        Ok(copy)
    }

    /// Returns true if `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Returns true if `id` is connected to the body.
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == self.body {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    /// Parent element. Top level shadow content reports its host.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id)?.parent
    }

    /// Children in insertion order, shadow content included.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Returns true if `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cur = Some(node);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// Lowercase tag name; empty for stale ids.
    pub fn tag_name(&self, id: ElementId) -> &str {
        self.get(id).map(|n| n.tag.as_str()).unwrap_or("")
    }

    /// Attribute value.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        let n = self.get(id)?;
        n.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set (or replace) an attribute.
    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        if let Some(n) = self.get_mut(id) {
            match n.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                Some((_, v)) => *v = value.into(),
                None => n.attributes.push((name.into(), value.into())),
            }
        }
    }

    /// Returns true if the element has a shadow root.
    pub fn has_shadow_root(&self, id: ElementId) -> bool {
        self.get(id).is_some_and(|n| n.has_shadow_root)
    }

    /// Returns true if the element's class list contains `class`.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Add a class if not present.
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(n) = self.get_mut(id)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.into());
        }
    }

    /// Remove a class if present.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(n) = self.get_mut(id) {
            n.classes.retain(|c| c != class);
        }
    }

    /// Returns true if the element matches `selector`.
    ///
    /// Supports comma separated compound selectors made of a type selector,
    /// classes, ids, and attribute selectors. Combinators never match.
    pub fn matches(&self, id: ElementId, selector: &str) -> bool {
        self.get(id)
            .is_some_and(|n| selector::matches(&n.subject(), selector))
    }

    /// Element flags.
    pub fn flags(&self, id: ElementId) -> ElementFlags {
        self.get(id).map(|n| n.flags).unwrap_or_else(ElementFlags::empty)
    }

    /// Replace element flags.
    pub fn set_flags(&mut self, id: ElementId, flags: ElementFlags) {
        if let Some(n) = self.get_mut(id) {
            n.flags = flags;
        }
    }

    /// Inline style.
    pub fn style(&self, id: ElementId) -> Option<&Style> {
        self.get(id).map(|n| &n.style)
    }

    /// Mutable inline style.
    pub fn style_mut(&mut self, id: ElementId) -> Option<&mut Style> {
        self.get_mut(id).map(|n| &mut n.style)
    }

    /// Update the layout box.
    pub fn set_bounds(&mut self, id: ElementId, bounds: Rect) {
        if let Some(n) = self.get_mut(id) {
            n.bounds = bounds;
        }
    }

    /// Border box origin in page space, ignoring transforms.
    pub fn page_offset(&self, id: ElementId) -> Point {
        self.get(id).map(Element::offset).unwrap_or(Point::ZERO)
    }

    /// Rendered box in page space, including transforms.
    pub fn rendered_rect(&self, id: ElementId) -> Option<Rect> {
        self.get(id).map(Element::rendered_rect)
    }

    /// Current scroll offset of the viewport.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Scroll the viewport. Client coordinates are page coordinates minus the scroll.
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
    }

    /// Focused element.
    pub fn active_element(&self) -> Option<ElementId> {
        self.active_element
    }

    /// Focus an element (or blur with `None`).
    pub fn set_active_element(&mut self, id: Option<ElementId>) {
        self.active_element = id.filter(|id| self.is_alive(*id));
    }

    /// Returns true if the document has a text selection.
    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    /// Simulate the user selecting text in the document.
    pub fn select_text(&mut self) {
        self.has_selection = true;
    }

    /// Selection range of a text control.
    pub fn selection_range(&self, id: ElementId) -> Option<(usize, usize)> {
        self.get(id)?.selection_range
    }

    /// Set the selection range of a text control.
    pub fn set_selection_range(
        &mut self,
        id: ElementId,
        start: usize,
        end: usize,
    ) -> Result<(), SceneError> {
        let supports = self.supports_selection_range(id);
        let n = self.get_mut(id).ok_or(SceneError::StaleElement)?;
        if !supports {
            return Err(SceneError::SelectionUnsupported);
        }
        n.selection_range = Some((start, end));
        Ok(())
    }

    fn supports_selection_range(&self, id: ElementId) -> bool {
        match self.tag_name(id) {
            "textarea" => true,
            "input" => {
                let ty = self.attribute(id, "type").unwrap_or("text");
                !NO_SELECTION_RANGE.iter().any(|t| t.eq_ignore_ascii_case(ty))
            }
            _ => false,
        }
    }

    /// Remove all document ranges, then collapse the selection of a focused
    /// text control.
    ///
    /// Fails with [`SceneError::SelectionUnsupported`] when the focused
    /// element is an input that has no selection range (for example a file
    /// input). The document selection is cleared regardless.
    pub fn clear_selection(&mut self) -> Result<(), SceneError> {
        self.has_selection = false;
        match self.active_element {
            Some(active) if matches!(self.tag_name(active), "input" | "textarea") => {
                self.set_selection_range(active, 0, 0)
            }
            _ => Ok(()),
        }
    }

    /// Record an animation frame request.
    pub fn request_animation_frame(&mut self) {
        self.frame_requests += 1;
    }

    /// Take the pending animation frame requests, returning how many were made.
    pub fn take_frame_requests(&mut self) -> u32 {
        core::mem::take(&mut self.frame_requests)
    }

    /// Returns the topmost rendered, pickable element of the document tree
    /// (shadow content excluded) under a client-space point.
    pub fn element_from_point(&self, client: Point) -> Option<ElementId> {
        self.hit_test(client, None)
    }

    /// Like [`Scene::element_from_point`] but inside `host`'s shadow tree.
    ///
    /// Returns `None` if `host` has no shadow root or nothing in it is hit.
    pub fn shadow_element_from_point(&self, host: ElementId, client: Point) -> Option<ElementId> {
        if !self.has_shadow_root(host) {
            return None;
        }
        self.hit_test(client, Some(host))
    }

    /// Hit test a client-space point within a tree scope.
    ///
    /// Ties are broken by z-index, then depth, then insertion order (later wins).
    fn hit_test(&self, client: Point, scope: Option<ElementId>) -> Option<ElementId> {
        let pt = client + self.scroll;
        let mut best: Option<(ElementId, (i32, usize, u64))> = None;
        for (idx, slot) in self.elements.iter().enumerate() {
            let Some(n) = slot else {
                continue;
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices by design."
            )]
            let id = ElementId::new(idx as u32, n.generation);
            if n.shadow_host != scope || !n.rendered_rect().contains(pt) {
                continue;
            }
            let Some(depth) = self.rendered_depth(id) else {
                continue;
            };
            let key = (n.z_index, depth, n.seq);
            if best.is_none_or(|(_, k)| key > k) {
                best = Some((id, key));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Depth below the body if the element is attached, visible, and pickable.
    fn rendered_depth(&self, id: ElementId) -> Option<usize> {
        let mut depth = 0;
        let mut cur = id;
        loop {
            let n = self.get(cur)?;
            if !n.flags.contains(ElementFlags::VISIBLE | ElementFlags::PICKABLE) {
                return None;
            }
            if cur == self.body {
                return Some(depth);
            }
            cur = n.parent?;
            depth += 1;
        }
    }
}
