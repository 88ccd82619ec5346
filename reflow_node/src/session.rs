// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session arena: node storage, style access, derived geometry, regrouping
//! mutations.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::{format, vec};
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::adapter::SourceAdapter;
use crate::cache::{CacheSlots, DerivedCache, Sides};
use crate::invalidate::{Propagation, invalidation_for};
use crate::style::{Clear, Display, Float, Position, parse_length, percent_of};
use crate::types::{AutoMargin, NodeId, NodeState, SessionId};

/// One node's stored data. All access goes through [`Session`] methods.
#[derive(Clone, Debug)]
struct NodeData {
    tag: String,
    element_id: Option<String>,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    style: HashMap<String, String>,
    /// Snapshot of `style` taken before the first write, once per session.
    initial: Option<HashMap<String, String>>,
    /// Memoized parsed lengths keyed by property name.
    parsed: HashMap<String, f64>,
    bounds: Rect,
    state: NodeState,
    cache: DerivedCache,
    // Natural (DOM-order) tree: immutable after build.
    natural_parent: Option<NodeId>,
    natural_children: Vec<NodeId>,
    natural_elements: Vec<NodeId>,
    // Render tree: mutated by the grouping pass.
    parent: Option<NodeId>,
    render_children: Vec<NodeId>,
    depth: u32,
    child_index: u32,
    /// Original members, for synthetic group nodes.
    grouped: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: String) -> Self {
        Self {
            tag,
            element_id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            style: HashMap::new(),
            initial: None,
            parsed: HashMap::new(),
            bounds: Rect::ZERO,
            state: NodeState::empty(),
            cache: DerivedCache::default(),
            natural_parent: None,
            natural_children: Vec::new(),
            natural_elements: Vec::new(),
            parent: None,
            render_children: Vec::new(),
            depth: 0,
            child_index: 0,
            grouped: Vec::new(),
        }
    }
}

/// An arena of nodes built from one snapshot of a rendered tree.
///
/// The type parameter `E` is the host's element handle (see
/// [`SourceAdapter::Element`]); it defaults to `usize`, which matches the
/// bundled [`VecAdapter`](crate::VecAdapter).
///
/// Accessors are total: an id this session never assigned yields `None`, an
/// empty slice, or a zero value rather than panicking.
/// Derived-geometry getters take `&mut self` so the session can maintain its
/// memo caches without interior mutability.
#[derive(Clone, Debug)]
pub struct Session<E = usize>
where
    E: Copy + Eq + Hash + Debug,
{
    id: SessionId,
    nodes: Vec<NodeData>,
    by_element: HashMap<E, NodeId>,
    elements: Vec<Option<E>>,
    epoch: u64,
}

impl<E> Session<E>
where
    E: Copy + Eq + Hash + Debug,
{
    /// Create an empty session.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            nodes: Vec::new(),
            by_element: HashMap::new(),
            elements: Vec::new(),
            epoch: 0,
        }
    }

    /// This session's identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Structure epoch; advances on any tree mutation.
    ///
    /// Query maps and other derived indices record the epoch they were built
    /// at and treat a mismatch as "rebuild me".
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of nodes created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if no nodes have been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in creation (ascending) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        (0..self.nodes.len() as u32).map(NodeId::new)
    }

    // --- build ---

    /// Snapshot the subtree rooted at `root` from the adapter.
    ///
    /// One node is created per visited element or text run, in DOM order, so
    /// ascending [`NodeId`] is document order. The render tree starts as a
    /// mirror of the natural tree. Returns `None` only when the adapter
    /// reports `root` itself as unreachable (empty tag and no children and no
    /// bounds would still build; missing data degrades, it does not fail).
    pub fn build<A>(&mut self, adapter: &A, root: A::Element) -> Option<NodeId>
    where
        A: SourceAdapter<Element = E>,
    {
        if self.by_element.contains_key(&root) {
            return self.by_element.get(&root).copied();
        }
        let root_id = self.create_from(adapter, root, None, 0, 0);
        // Depth-first, explicit stack; children pushed in reverse so they are
        // visited (and therefore numbered) in DOM order.
        let mut stack: Vec<(A::Element, NodeId, u32)> = Vec::new();
        let root_children = adapter.children(root);
        for (i, &child) in root_children.iter().enumerate().rev() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "child positions fit 32 bits by construction"
            )]
            stack.push((child, root_id, i as u32));
        }
        while let Some((element, parent_id, child_index)) = stack.pop() {
            let depth = self.nodes[parent_id.idx()].depth + 1;
            let id = self.create_from(adapter, element, Some(parent_id), depth, child_index);
            let grand_children = adapter.children(element);
            for (i, &child) in grand_children.iter().enumerate().rev() {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "child positions fit 32 bits by construction"
                )]
                stack.push((child, id, i as u32));
            }
        }
        // Natural child lists were appended in stack order; fix them to DOM
        // order by sorting on the recorded child index.
        for idx in 0..self.nodes.len() {
            let mut children = core::mem::take(&mut self.nodes[idx].natural_children);
            children.sort_by_key(|c| self.nodes[c.idx()].child_index);
            let elements: Vec<NodeId> = children
                .iter()
                .copied()
                .filter(|c| !self.nodes[c.idx()].state.contains(NodeState::TEXT))
                .collect();
            self.nodes[idx].render_children = children.clone();
            self.nodes[idx].natural_elements = elements;
            self.nodes[idx].natural_children = children;
        }
        self.epoch += 1;
        Some(root_id)
    }

    fn create_from<A>(
        &mut self,
        adapter: &A,
        element: A::Element,
        parent: Option<NodeId>,
        depth: u32,
        child_index: u32,
    ) -> NodeId
    where
        A: SourceAdapter<Element = E>,
    {
        let tag = String::from(adapter.tag_name(element));
        let mut data = NodeData::new(tag);
        data.element_id = adapter.element_id(element).map(String::from);
        data.classes = adapter.class_list(element);
        data.attrs = adapter.attributes(element).into_iter().collect();
        data.style = adapter.style_map(element).into_iter().collect();
        if data.tag.is_empty() {
            data.state.insert(NodeState::TEXT);
        } else if data.tag == "br" {
            data.state.insert(NodeState::LINE_BREAK);
        }
        match adapter.bounds(element) {
            Some(rect) => data.bounds = rect,
            None => {
                data.bounds = Rect::ZERO;
                data.state.insert(NodeState::UNMEASURED);
            }
        }
        data.natural_parent = parent;
        data.parent = parent;
        data.depth = depth;
        data.child_index = child_index;

        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let id = NodeId::new(self.nodes.len() as u32);
        if let Some(p) = parent {
            self.nodes[p.idx()].natural_children.push(id);
        }
        self.nodes.push(data);
        self.elements.push(Some(element));
        self.by_element.insert(element, id);
        id
    }

    // --- identity and reverse lookup ---

    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.idx())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.idx())
    }

    /// `true` if `id` names a node of this session.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.idx() < self.nodes.len()
    }

    /// The host element this node was built from, if any (groups have none).
    #[must_use]
    pub fn element_of(&self, id: NodeId) -> Option<E> {
        self.elements.get(id.idx()).copied().flatten()
    }

    /// Reverse lookup: the node already constructed for a host element.
    #[must_use]
    pub fn node_of(&self, element: E) -> Option<NodeId> {
        self.by_element.get(&element).copied()
    }

    // --- snapshot accessors ---

    /// Tag name (empty for text runs and groups).
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.tag.as_str())
    }

    /// The `id` attribute recorded at build time.
    #[must_use]
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.element_id.as_deref()
    }

    /// Class tokens recorded at build time.
    #[must_use]
    pub fn classes(&self, id: NodeId) -> &[String] {
        self.get(id).map_or(&[], |n| n.classes.as_slice())
    }

    /// `true` if the node carries the given class token.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|c| c == class)
    }

    /// An attribute value recorded at build time.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.attrs.get(name).map(String::as_str)
    }

    /// `true` for element nodes (not text runs). Groups count as elements.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| !n.state.contains(NodeState::TEXT))
    }

    /// Current node state bits.
    #[must_use]
    pub fn state(&self, id: NodeId) -> NodeState {
        self.get(id).map_or(NodeState::empty(), |n| n.state)
    }

    /// Mark the node as placed by the grouping pass.
    pub fn mark_rendered(&mut self, id: NodeId) {
        if let Some(n) = self.get_mut(id) {
            n.state.insert(NodeState::RENDERED);
        }
    }

    /// Exclude the node from output (grouping found no valid ancestor).
    pub fn hide(&mut self, id: NodeId) {
        if let Some(n) = self.get_mut(id) {
            n.state.insert(NodeState::HIDDEN);
        }
    }

    /// Clear transient pass state (`RENDERED`, `HIDDEN`, `UNMEASURED`).
    pub fn unset_state(&mut self, id: NodeId) {
        if let Some(n) = self.get_mut(id) {
            n.state.remove(NodeState::TRANSIENT);
        }
    }

    // --- bounds ---

    /// The authoritative measured rectangle (zero for unmeasured nodes).
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.get(id).map_or(Rect::ZERO, |n| n.bounds)
    }

    /// Replace the measured rectangle and drop the rectangles derived from it.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        if let Some(n) = self.get_mut(id) {
            if n.bounds != bounds {
                n.bounds = bounds;
                n.cache.clear(CacheSlots::RECTS);
            }
            n.state.remove(NodeState::UNMEASURED);
        }
    }

    /// Ask the adapter for a fresh rectangle. Only entry point for
    /// re-measurement; reads never trigger it.
    pub fn remeasure<A>(&mut self, adapter: &A, id: NodeId)
    where
        A: SourceAdapter<Element = E>,
    {
        let Some(element) = self.element_of(id) else {
            return;
        };
        match adapter.bounds(element) {
            Some(rect) => self.set_bounds(id, rect),
            None => {
                if let Some(n) = self.get_mut(id) {
                    n.bounds = Rect::ZERO;
                    n.cache.clear(CacheSlots::RECTS);
                    n.state.insert(NodeState::UNMEASURED);
                }
            }
        }
    }

    // --- style map ---

    /// Raw style value for a property, if set.
    #[must_use]
    pub fn css(&self, id: NodeId, attr: &str) -> Option<&str> {
        self.get(id)?.style.get(attr).map(String::as_str)
    }

    /// Write a style property and invalidate exactly the dependent caches.
    ///
    /// The first write on a node snapshots its style map as the `initial`
    /// state for [`Session::modified`] comparisons.
    pub fn css_set(&mut self, id: NodeId, attr: &str, value: &str) {
        let Some(n) = self.get_mut(id) else {
            return;
        };
        if n.initial.is_none() {
            n.initial = Some(n.style.clone());
        }
        n.style.insert(String::from(attr), String::from(value));
        n.parsed.remove(attr);
        self.invalidate(id, attr);
    }

    /// Drop cached derivations for the given properties without writing them.
    pub fn unset_cache(&mut self, id: NodeId, attrs: &[&str]) {
        for attr in attrs {
            if let Some(n) = self.get_mut(id) {
                n.parsed.remove(*attr);
            }
            self.invalidate(id, attr);
        }
    }

    fn invalidate(&mut self, id: NodeId, attr: &str) {
        let inv = invalidation_for(attr);
        match inv.propagation {
            Propagation::None => {
                if let Some(n) = self.get_mut(id) {
                    n.cache.clear(inv.slots);
                }
            }
            Propagation::Dimension => {
                if let Some(n) = self.get_mut(id) {
                    n.cache.clear(inv.slots);
                }
                let children: Vec<NodeId> = self.render_children(id).to_vec();
                for child in children {
                    if let Some(c) = self.get_mut(child) {
                        c.cache.clear(CacheSlots::HEIGHT_DEPENDENT);
                        // Percentage parses resolved against this node's
                        // dimensions are now stale too.
                        c.parsed.clear();
                    }
                }
                self.reset_bounds_ancestor(id);
            }
            Propagation::Structural => {
                if let Some(n) = self.get_mut(id) {
                    n.cache.clear_all();
                    n.parsed.clear();
                }
            }
        }
    }

    /// Walk up the render tree to the nearest ancestor with a fixed
    /// dimension and drop its rectangle caches.
    fn reset_bounds_ancestor(&mut self, id: NodeId) {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            let fixed = self
                .get(ancestor)
                .is_some_and(|n| has_fixed_dimension(&n.style));
            if fixed {
                if let Some(n) = self.get_mut(ancestor) {
                    n.cache.clear(CacheSlots::RECTS | CacheSlots::CONTENT_BOX);
                }
                return;
            }
            current = self.parent(ancestor);
        }
    }

    /// Whether a property differs from the initial snapshot.
    ///
    /// `false` when no write has happened yet (there is nothing to compare).
    #[must_use]
    pub fn modified(&self, id: NodeId, attr: &str) -> bool {
        let Some(n) = self.get(id) else {
            return false;
        };
        match &n.initial {
            Some(initial) => initial.get(attr) != n.style.get(attr),
            None => false,
        }
    }

    /// Parsed pixel value for a property, memoized per node.
    ///
    /// Percentages resolve against the render parent's bounds (width for
    /// horizontal properties, height for vertical ones); `auto`, absent, and
    /// unparseable values are `0.0`.
    pub fn css_px(&mut self, id: NodeId, attr: &str) -> f64 {
        let Some(n) = self.get(id) else {
            return 0.0;
        };
        if let Some(&v) = n.parsed.get(attr) {
            return v;
        }
        let raw = n.style.get(attr).cloned();
        let base = {
            let reference = self.parent(id).unwrap_or(id);
            let b = self.bounds(reference);
            if is_vertical_property(attr) {
                b.height()
            } else {
                b.width()
            }
        };
        let value = raw
            .as_deref()
            .and_then(|v| parse_length(v, base))
            .unwrap_or(0.0);
        if let Some(n) = self.get_mut(id) {
            n.parsed.insert(String::from(attr), value);
        }
        value
    }

    // --- derived geometry ---

    fn slot_valid(&self, id: NodeId, slot: CacheSlots) -> bool {
        self.get(id).is_some_and(|n| n.cache.valid.contains(slot))
    }

    /// Per-side margins (`auto` contributes `0.0`).
    pub fn margin_sides(&mut self, id: NodeId) -> Sides {
        if !self.contains(id) {
            return Sides::default();
        }
        if !self.slot_valid(id, CacheSlots::MARGIN) {
            let sides = Sides {
                left: self.css_px(id, "marginLeft"),
                top: self.css_px(id, "marginTop"),
                right: self.css_px(id, "marginRight"),
                bottom: self.css_px(id, "marginBottom"),
            };
            let n = &mut self.nodes[id.idx()];
            n.cache.margin = sides;
            n.cache.valid.insert(CacheSlots::MARGIN);
        }
        self.nodes[id.idx()].cache.margin
    }

    /// Per-side border widths.
    pub fn border_sides(&mut self, id: NodeId) -> Sides {
        if !self.contains(id) {
            return Sides::default();
        }
        if !self.slot_valid(id, CacheSlots::BORDER) {
            let sides = Sides {
                left: self.css_px(id, "borderLeftWidth"),
                top: self.css_px(id, "borderTopWidth"),
                right: self.css_px(id, "borderRightWidth"),
                bottom: self.css_px(id, "borderBottomWidth"),
            };
            let n = &mut self.nodes[id.idx()];
            n.cache.border = sides;
            n.cache.valid.insert(CacheSlots::BORDER);
        }
        self.nodes[id.idx()].cache.border
    }

    /// Per-side padding.
    pub fn padding_sides(&mut self, id: NodeId) -> Sides {
        if !self.contains(id) {
            return Sides::default();
        }
        if !self.slot_valid(id, CacheSlots::PADDING) {
            let sides = Sides {
                left: self.css_px(id, "paddingLeft"),
                top: self.css_px(id, "paddingTop"),
                right: self.css_px(id, "paddingRight"),
                bottom: self.css_px(id, "paddingBottom"),
            };
            let n = &mut self.nodes[id.idx()];
            n.cache.padding = sides;
            n.cache.valid.insert(CacheSlots::PADDING);
        }
        self.nodes[id.idx()].cache.padding
    }

    /// Horizontal border+padding extent.
    ///
    /// Invariant: `box_rect(id).width() + content_box_width(id) ==
    /// bounds(id).width()` whenever the inset does not exceed the bounds.
    pub fn content_box_width(&mut self, id: NodeId) -> f64 {
        self.ensure_content_box(id);
        self.get(id).map_or(0.0, |n| n.cache.content_box_width)
    }

    /// Vertical border+padding extent.
    pub fn content_box_height(&mut self, id: NodeId) -> f64 {
        self.ensure_content_box(id);
        self.get(id).map_or(0.0, |n| n.cache.content_box_height)
    }

    fn ensure_content_box(&mut self, id: NodeId) {
        if !self.contains(id) || self.slot_valid(id, CacheSlots::CONTENT_BOX) {
            return;
        }
        let border = self.border_sides(id);
        let padding = self.padding_sides(id);
        let n = &mut self.nodes[id.idx()];
        n.cache.content_box_width = border.horizontal() + padding.horizontal();
        n.cache.content_box_height = border.vertical() + padding.vertical();
        n.cache.valid.insert(CacheSlots::CONTENT_BOX);
    }

    /// The content rectangle: bounds inset by border and padding.
    ///
    /// Degenerates to a zero-extent edge rather than inverting when the
    /// inset exceeds the bounds.
    pub fn box_rect(&mut self, id: NodeId) -> Rect {
        if !self.contains(id) {
            return Rect::ZERO;
        }
        if !self.slot_valid(id, CacheSlots::BOX_RECT) {
            let b = self.bounds(id);
            let border = self.border_sides(id);
            let padding = self.padding_sides(id);
            let x0 = b.x0 + border.left + padding.left;
            let y0 = b.y0 + border.top + padding.top;
            let x1 = (b.x1 - border.right - padding.right).max(x0);
            let y1 = (b.y1 - border.bottom - padding.bottom).max(y0);
            let n = &mut self.nodes[id.idx()];
            n.cache.box_rect = Rect::new(x0, y0, x1, y1);
            n.cache.valid.insert(CacheSlots::BOX_RECT);
        }
        self.nodes[id.idx()].cache.box_rect
    }

    /// The margin rectangle: bounds grown by margins.
    ///
    /// Leading edges only grow for non-negative margins; trailing edges apply
    /// the raw margin, so a negative right or bottom margin shrinks the rect.
    /// This asymmetry is a behavioral contract, not an oversight.
    pub fn linear_rect(&mut self, id: NodeId) -> Rect {
        if !self.contains(id) {
            return Rect::ZERO;
        }
        if !self.slot_valid(id, CacheSlots::LINEAR_RECT) {
            let b = self.bounds(id);
            let margin = self.margin_sides(id);
            let rect = Rect::new(
                b.x0 - margin.left.max(0.0),
                b.y0 - margin.top.max(0.0),
                b.x1 + margin.right,
                b.y1 + margin.bottom,
            );
            let n = &mut self.nodes[id.idx()];
            n.cache.linear_rect = rect;
            n.cache.valid.insert(CacheSlots::LINEAR_RECT);
        }
        self.nodes[id.idx()].cache.linear_rect
    }

    /// Effective width: an explicit pixel `width` wins over measurement.
    pub fn actual_width(&mut self, id: NodeId) -> f64 {
        if !self.contains(id) {
            return 0.0;
        }
        if !self.slot_valid(id, CacheSlots::ACTUAL_WIDTH) {
            let styled = self
                .css(id, "width")
                .and_then(|v| parse_length(v, self.parent_basis(id).0));
            let value = styled.unwrap_or_else(|| self.bounds(id).width());
            let n = &mut self.nodes[id.idx()];
            n.cache.actual_width = value;
            n.cache.valid.insert(CacheSlots::ACTUAL_WIDTH);
        }
        self.nodes[id.idx()].cache.actual_width
    }

    /// Effective height: an explicit pixel `height` wins over measurement.
    pub fn actual_height(&mut self, id: NodeId) -> f64 {
        if !self.contains(id) {
            return 0.0;
        }
        if !self.slot_valid(id, CacheSlots::ACTUAL_HEIGHT) {
            let styled = self
                .css(id, "height")
                .and_then(|v| parse_length(v, self.parent_basis(id).1));
            let value = styled.unwrap_or_else(|| self.bounds(id).height());
            let n = &mut self.nodes[id.idx()];
            n.cache.actual_height = value;
            n.cache.valid.insert(CacheSlots::ACTUAL_HEIGHT);
        }
        self.nodes[id.idx()].cache.actual_height
    }

    fn parent_basis(&self, id: NodeId) -> (f64, f64) {
        let reference = self.parent(id).unwrap_or(id);
        let b = self.bounds(reference);
        (b.width(), b.height())
    }

    // --- classification ---

    /// Computed display (text runs are inline; missing values are block).
    #[must_use]
    pub fn display(&self, id: NodeId) -> Display {
        let Some(n) = self.get(id) else {
            return Display::None;
        };
        if n.state.contains(NodeState::TEXT) {
            return Display::Inline;
        }
        n.style
            .get("display")
            .map_or(Display::Block, |v| Display::from_css(v))
    }

    /// Computed float.
    #[must_use]
    pub fn float_of(&self, id: NodeId) -> Float {
        self.css(id, "float")
            .or_else(|| self.css(id, "cssFloat"))
            .map_or(Float::None, Float::from_css)
    }

    /// Computed clear.
    #[must_use]
    pub fn clear_of(&self, id: NodeId) -> Clear {
        self.css(id, "clear").map_or(Clear::None, Clear::from_css)
    }

    /// Computed position.
    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Position {
        self.css(id, "position")
            .map_or(Position::Static, Position::from_css)
    }

    /// `page_flow` ⇔ position ∈ {static, relative} or a forced line break.
    pub fn page_flow(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.slot_valid(id, CacheSlots::PAGE_FLOW) {
            let value = matches!(
                self.position_of(id),
                Position::Static | Position::Relative
            ) || self.state(id).contains(NodeState::LINE_BREAK);
            let n = &mut self.nodes[id.idx()];
            n.cache.page_flow = value;
            n.cache.valid.insert(CacheSlots::PAGE_FLOW);
        }
        self.nodes[id.idx()].cache.page_flow
    }

    /// `floating` ⇔ an element with `float: left | right`. Text runs and
    /// synthetic groups never float.
    pub fn floating(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.slot_valid(id, CacheSlots::FLOATING) {
            let state = self.state(id);
            let value = !state.contains(NodeState::TEXT)
                && !state.contains(NodeState::GROUP)
                && self.float_of(id) != Float::None;
            let n = &mut self.nodes[id.idx()];
            n.cache.floating = value;
            n.cache.valid.insert(CacheSlots::FLOATING);
        }
        self.nodes[id.idx()].cache.floating
    }

    /// Which margins are `auto`.
    pub fn auto_margin(&mut self, id: NodeId) -> AutoMargin {
        if !self.contains(id) {
            return AutoMargin::empty();
        }
        if !self.slot_valid(id, CacheSlots::AUTO_MARGIN) {
            let mut mask = AutoMargin::empty();
            for (attr, bit) in [
                ("marginLeft", AutoMargin::LEFT),
                ("marginRight", AutoMargin::RIGHT),
                ("marginTop", AutoMargin::TOP),
                ("marginBottom", AutoMargin::BOTTOM),
            ] {
                if self.css(id, attr).is_some_and(|v| v.trim() == "auto") {
                    mask.insert(bit);
                }
            }
            let n = &mut self.nodes[id.idx()];
            n.cache.auto_margin = mask;
            n.cache.valid.insert(CacheSlots::AUTO_MARGIN);
        }
        self.nodes[id.idx()].cache.auto_margin
    }

    /// `block_static` ⇔ (block-level ∧ ¬floating) ∨ (out-of-flow ∧
    /// percentage width+min-width sum ≥ 100 ∧ no auto horizontal margin).
    ///
    /// This formula is a load-bearing tie-break for the grouping pass;
    /// deviations are regressions, not fixes.
    pub fn block_static(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.slot_valid(id, CacheSlots::BLOCK_STATIC) {
            let in_flow_block = self.display(id).is_block_level() && !self.floating(id);
            let value = if in_flow_block {
                true
            } else if !self.page_flow(id) {
                let width_pct = self.css(id, "width").and_then(percent_of).unwrap_or(0.0);
                let min_pct = self.css(id, "minWidth").and_then(percent_of).unwrap_or(0.0);
                width_pct + min_pct >= 100.0 && !self.auto_margin(id).any_horizontal()
            } else {
                false
            };
            let n = &mut self.nodes[id.idx()];
            n.cache.block_static = value;
            n.cache.valid.insert(CacheSlots::BLOCK_STATIC);
        }
        self.nodes[id.idx()].cache.block_static
    }

    /// `inline_static` ⇔ inline-level ∧ in page flow ∧ ¬floating ∧ no
    /// explicit width.
    pub fn inline_static(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.slot_valid(id, CacheSlots::INLINE_STATIC) {
            let value = self.display(id).is_inline_level()
                && self.page_flow(id)
                && !self.floating(id)
                && self.css(id, "width").is_none_or(|v| v.trim().is_empty());
            let n = &mut self.nodes[id.idx()];
            n.cache.inline_static = value;
            n.cache.valid.insert(CacheSlots::INLINE_STATIC);
        }
        self.nodes[id.idx()].cache.inline_static
    }

    /// `baseline` ⇔ in page flow ∧ ¬floating ∧ baseline vertical alignment.
    pub fn baseline(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if !self.slot_valid(id, CacheSlots::BASELINE) {
            let aligned = self
                .css(id, "verticalAlign")
                .is_none_or(|v| matches!(v.trim(), "" | "baseline" | "initial"));
            let value = self.page_flow(id) && !self.floating(id) && aligned;
            let n = &mut self.nodes[id.idx()];
            n.cache.baseline = value;
            n.cache.valid.insert(CacheSlots::BASELINE);
        }
        self.nodes[id.idx()].cache.baseline
    }

    // --- natural tree (immutable after build) ---

    /// DOM-order children recorded at build time, text runs included.
    #[must_use]
    pub fn natural_children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.natural_children.as_slice())
    }

    /// DOM-order element children (text runs excluded).
    #[must_use]
    pub fn natural_elements(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.natural_elements.as_slice())
    }

    /// The DOM parent recorded at build time.
    #[must_use]
    pub fn natural_parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.natural_parent
    }

    /// Position among the natural siblings (0-based), for `nth-child`.
    #[must_use]
    pub fn natural_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.natural_parent(id)?;
        self.natural_children(parent).iter().position(|&c| c == id)
    }

    // --- render tree (mutable) ---

    /// Current render parent (diverges from the natural parent once the
    /// grouping pass starts reparenting).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Current render children in sibling order.
    #[must_use]
    pub fn render_children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.render_children.as_slice())
    }

    /// Render-tree depth (recomputed when siblings are reordered).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> u32 {
        self.get(id).map_or(0, |n| n.depth)
    }

    /// Position among the current render siblings.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> u32 {
        self.get(id).map_or(0, |n| n.child_index)
    }

    /// Deepest render depth currently present.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Ids at the given render depth, ascending.
    #[must_use]
    pub fn nodes_at_depth(&self, depth: u32) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.nodes[id.idx()].depth == depth)
            .collect()
    }

    /// Move `id` (with its render subtree) under `new_parent`.
    ///
    /// The natural tree is untouched. No-op for unknown ids, self-parenting,
    /// or when `new_parent` lies inside `id`'s own subtree.
    pub fn reparent_render(&mut self, id: NodeId, new_parent: NodeId) {
        if !self.contains(id) || !self.contains(new_parent) || id == new_parent {
            return;
        }
        // Reject cycles: new_parent must not be a render descendant of id.
        let mut cursor = Some(new_parent);
        while let Some(c) = cursor {
            if c == id {
                return;
            }
            cursor = self.parent(c);
        }
        if let Some(old) = self.parent(id) {
            let old_children = &mut self.nodes[old.idx()].render_children;
            old_children.retain(|&c| c != id);
            let reindex: Vec<NodeId> = old_children.clone();
            self.reindex_children(&reindex);
        }
        self.nodes[new_parent.idx()].render_children.push(id);
        self.nodes[id.idx()].parent = Some(new_parent);
        let reindex: Vec<NodeId> = self.nodes[new_parent.idx()].render_children.clone();
        self.reindex_children(&reindex);
        self.refresh_depths(id);
        self.epoch += 1;
    }

    /// Materialize a synthetic group around a run of render siblings.
    ///
    /// The group takes the first member's slot under `parent`, adopts the
    /// members in order, and records them in `grouped`. Its bounds are the
    /// union of the member bounds and its display is block. Returns `None`
    /// when `members` is empty or any member is not a render child of
    /// `parent`.
    pub fn create_group(&mut self, parent: NodeId, members: &[NodeId]) -> Option<NodeId> {
        if members.is_empty() || !self.contains(parent) {
            return None;
        }
        for &m in members {
            if self.parent(m) != Some(parent) {
                return None;
            }
        }
        let mut bounds: Option<Rect> = None;
        for &m in members {
            let b = self.bounds(m);
            bounds = Some(match bounds {
                Some(acc) => acc.union(b),
                None => b,
            });
        }

        let mut data = NodeData::new(String::new());
        data.state.insert(NodeState::GROUP);
        data.style.insert(String::from("display"), String::from("block"));
        data.bounds = bounds.unwrap_or(Rect::ZERO);
        data.parent = Some(parent);
        data.grouped = members.to_vec();
        data.render_children = members.to_vec();

        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeId uses 32-bit indices by design."
        )]
        let group = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(data);
        self.elements.push(None);

        // Splice the group into the parent's child list at the position of
        // the first member, then remove the members.
        let first = members[0];
        let children = &mut self.nodes[parent.idx()].render_children;
        let at = children.iter().position(|&c| c == first).unwrap_or(0);
        children.retain(|c| !members.contains(c));
        children.insert(at.min(children.len()), group);
        for &m in members {
            self.nodes[m.idx()].parent = Some(group);
        }
        let reindex: Vec<NodeId> = self.nodes[parent.idx()].render_children.clone();
        self.reindex_children(&reindex);
        self.refresh_depths(group);
        self.epoch += 1;
        Some(group)
    }

    /// The original nodes a synthetic group was built around.
    #[must_use]
    pub fn grouped(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.grouped.as_slice())
    }

    fn reindex_children(&mut self, children: &[NodeId]) {
        for (i, &c) in children.iter().enumerate() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "child positions fit 32 bits by construction"
            )]
            {
                self.nodes[c.idx()].child_index = i as u32;
            }
        }
    }

    /// Recompute depths below `root` after a reparent (explicit stack).
    fn refresh_depths(&mut self, root: NodeId) {
        let base = self
            .parent(root)
            .map_or(0, |p| self.nodes[p.idx()].depth + 1);
        let mut stack = vec![(root, base)];
        while let Some((id, depth)) = stack.pop() {
            self.nodes[id.idx()].depth = depth;
            for &child in &self.nodes[id.idx()].render_children {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Debug summary used in demo output.
    #[must_use]
    pub fn describe(&self, id: NodeId) -> String {
        let Some(n) = self.get(id) else {
            return String::from("<missing>");
        };
        if n.state.contains(NodeState::GROUP) {
            format!("group({})", n.grouped.len())
        } else if n.tag.is_empty() {
            String::from("#text")
        } else {
            n.tag.clone()
        }
    }
}

fn has_fixed_dimension(style: &HashMap<String, String>) -> bool {
    ["width", "height"].iter().any(|attr| {
        style
            .get(*attr)
            .is_some_and(|v| parse_length(v, 0.0).is_some())
    })
}

fn is_vertical_property(attr: &str) -> bool {
    matches!(
        attr,
        "height"
            | "minHeight"
            | "maxHeight"
            | "marginTop"
            | "marginBottom"
            | "paddingTop"
            | "paddingBottom"
            | "borderTopWidth"
            | "borderBottomWidth"
            | "top"
            | "bottom"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{VecAdapter, VecElement};

    fn block(x0: f64, y0: f64, x1: f64, y1: f64) -> VecElement {
        VecElement::new("div")
            .style("display", "block")
            .bounds(x0, y0, x1, y1)
    }

    fn build_one(element: VecElement) -> (Session, NodeId) {
        let mut host = VecAdapter::new();
        let root = host.element(element);
        let mut session = Session::new(SessionId::new(1));
        let id = session.build(&host, root).unwrap();
        (session, id)
    }

    #[test]
    fn ids_are_dom_order() {
        let mut host = VecAdapter::new();
        let root = host.element(block(0.0, 0.0, 100.0, 100.0));
        let a = host.element(block(0.0, 0.0, 50.0, 10.0));
        let b = host.element(block(0.0, 10.0, 50.0, 20.0));
        let a_child = host.element(block(0.0, 0.0, 10.0, 10.0));
        host.append(root, a);
        host.append(root, b);
        host.append(a, a_child);

        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let children = session.natural_children(root_id);
        assert_eq!(children.len(), 2);
        assert!(children[0] < children[1]);
        assert_eq!(session.depth(children[0]), 1);
        assert_eq!(session.child_index(children[1]), 1);
        assert_eq!(session.node_of(a), Some(children[0]));
        assert_eq!(session.element_of(children[1]), Some(b));
    }

    #[test]
    fn box_plus_content_box_recovers_bounds_width() {
        let (mut session, id) = build_one(
            block(0.0, 0.0, 100.0, 50.0)
                .style("paddingLeft", "5px")
                .style("paddingRight", "7px")
                .style("borderLeftWidth", "2px")
                .style("borderRightWidth", "1px"),
        );
        let bounds = session.bounds(id);
        let box_rect = session.box_rect(id);
        let content = session.content_box_width(id);
        assert_eq!(box_rect.width() + content, bounds.width());
        assert!(box_rect.x0 >= bounds.x0 && box_rect.x1 <= bounds.x1);
    }

    #[test]
    fn linear_width_uses_clamped_left_raw_right() {
        let (mut session, id) = build_one(
            block(10.0, 10.0, 110.0, 60.0)
                .style("marginLeft", "-8px")
                .style("marginRight", "-3px"),
        );
        let bounds = session.bounds(id);
        let linear = session.linear_rect(id);
        // Negative left margin is clamped out of the leading edge; the raw
        // right margin shrinks the trailing edge.
        assert_eq!(linear.x0, bounds.x0);
        assert_eq!(linear.width(), bounds.width() + 0.0 + (-3.0));
    }

    #[test]
    fn box_is_inside_bounds_is_inside_linear_for_nonnegative_style() {
        let (mut session, id) = build_one(
            block(0.0, 0.0, 100.0, 100.0)
                .style("margin", "0")
                .style("marginLeft", "4px")
                .style("marginTop", "4px")
                .style("marginRight", "4px")
                .style("marginBottom", "4px")
                .style("paddingLeft", "3px")
                .style("paddingTop", "3px")
                .style("borderLeftWidth", "1px"),
        );
        let bounds = session.bounds(id);
        let box_rect = session.box_rect(id);
        let linear = session.linear_rect(id);
        assert!(linear.x0 <= bounds.x0 && bounds.x0 <= box_rect.x0);
        assert!(box_rect.x1 <= bounds.x1 && bounds.x1 <= linear.x1);
        assert!(linear.y0 <= bounds.y0 && bounds.y0 <= box_rect.y0);
    }

    #[test]
    fn writing_width_is_visible_immediately() {
        let (mut session, id) = build_one(block(0.0, 0.0, 100.0, 50.0));
        assert_eq!(session.actual_width(id), 100.0);
        session.css_set(id, "width", "80px");
        assert_eq!(session.actual_width(id), 80.0);
        session.css_set(id, "width", "60px");
        assert_eq!(session.actual_width(id), 60.0);
    }

    #[test]
    fn writing_display_invalidates_flow_predicates() {
        let (mut session, id) = build_one(block(0.0, 0.0, 100.0, 50.0));
        assert!(session.block_static(id));
        assert!(!session.inline_static(id));
        session.css_set(id, "display", "inline");
        assert!(!session.block_static(id));
        assert!(session.inline_static(id));
    }

    #[test]
    fn float_write_invalidates_block_static() {
        let (mut session, id) = build_one(block(0.0, 0.0, 100.0, 50.0));
        assert!(session.block_static(id));
        session.css_set(id, "float", "left");
        assert!(session.floating(id));
        assert!(!session.block_static(id));
    }

    #[test]
    fn dimension_write_cascades_to_children() {
        let mut host = VecAdapter::new();
        let root = host.element(block(0.0, 0.0, 100.0, 100.0).style("height", "100px"));
        let child = host.element(block(0.0, 0.0, 100.0, 40.0).style("height", "40%"));
        host.append(root, child);
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let child_id = session.natural_children(root_id)[0];

        // Prime the child's cache against the 100px basis.
        assert_eq!(session.actual_height(child_id), 40.0);
        // The write cascades to children; the re-measurement makes the new
        // basis observable.
        session.css_set(root_id, "height", "200px");
        session.set_bounds(root_id, Rect::new(0.0, 0.0, 100.0, 200.0));
        session.unset_cache(child_id, &["height"]);
        assert_eq!(session.actual_height(child_id), 80.0);
    }

    #[test]
    fn out_of_flow_full_percent_width_is_block_static() {
        let (mut session, id) = build_one(
            block(0.0, 0.0, 100.0, 50.0)
                .style("display", "inline")
                .style("position", "absolute")
                .style("width", "60%")
                .style("minWidth", "40%"),
        );
        assert!(!session.page_flow(id));
        assert!(session.block_static(id));
        session.css_set(id, "marginLeft", "auto");
        session.css_set(id, "marginRight", "auto");
        assert!(!session.block_static(id));
    }

    #[test]
    fn missing_measurement_degrades_to_zero_size() {
        let (mut session, id) = build_one(VecElement::new("div"));
        assert!(session.state(id).contains(NodeState::UNMEASURED));
        assert_eq!(session.bounds(id), Rect::ZERO);
        assert_eq!(session.box_rect(id), Rect::ZERO);
        assert_eq!(session.actual_width(id), 0.0);
    }

    #[test]
    fn initial_snapshot_and_modified() {
        let (mut session, id) = build_one(block(0.0, 0.0, 10.0, 10.0));
        assert!(!session.modified(id, "display"));
        session.css_set(id, "display", "inline");
        assert!(session.modified(id, "display"));
        session.css_set(id, "display", "block");
        assert!(!session.modified(id, "display"));
    }

    #[test]
    fn group_creation_keeps_natural_tree_intact() {
        let mut host = VecAdapter::new();
        let root = host.element(block(0.0, 0.0, 100.0, 100.0));
        let a = host.element(block(0.0, 0.0, 50.0, 10.0));
        let b = host.element(block(0.0, 10.0, 50.0, 20.0));
        let c = host.element(block(0.0, 20.0, 50.0, 30.0));
        host.append(root, a);
        host.append(root, b);
        host.append(root, c);
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let kids: Vec<NodeId> = session.natural_children(root_id).to_vec();

        let group = session.create_group(root_id, &kids[0..2]).unwrap();
        assert!(session.state(group).contains(NodeState::GROUP));
        assert_eq!(session.grouped(group), &kids[0..2]);
        // Render tree: root -> [group, c]; group -> [a, b].
        assert_eq!(session.render_children(root_id), [group, kids[2]]);
        assert_eq!(session.render_children(group), &kids[0..2]);
        assert_eq!(session.parent(kids[0]), Some(group));
        assert_eq!(session.depth(kids[0]), 2);
        // Natural tree unchanged.
        assert_eq!(session.natural_children(root_id), kids.as_slice());
        assert_eq!(session.natural_parent(kids[0]), Some(root_id));
        // Group bounds cover both members.
        assert_eq!(session.bounds(group), Rect::new(0.0, 0.0, 50.0, 20.0));
    }

    #[test]
    fn group_rejects_non_siblings() {
        let mut host = VecAdapter::new();
        let root = host.element(block(0.0, 0.0, 100.0, 100.0));
        let a = host.element(block(0.0, 0.0, 50.0, 10.0));
        let inner = host.element(block(0.0, 0.0, 10.0, 10.0));
        host.append(root, a);
        host.append(a, inner);
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let a_id = session.natural_children(root_id)[0];
        let inner_id = session.natural_children(a_id)[0];
        assert!(session.create_group(root_id, &[a_id, inner_id]).is_none());
        assert!(session.create_group(root_id, &[]).is_none());
    }

    #[test]
    fn reparent_updates_depth_and_epoch() {
        let mut host = VecAdapter::new();
        let root = host.element(block(0.0, 0.0, 100.0, 100.0));
        let a = host.element(block(0.0, 0.0, 50.0, 10.0));
        let b = host.element(block(0.0, 10.0, 50.0, 20.0));
        host.append(root, a);
        host.append(root, b);
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let kids: Vec<NodeId> = session.natural_children(root_id).to_vec();
        let before = session.epoch();

        session.reparent_render(kids[1], kids[0]);
        assert_eq!(session.parent(kids[1]), Some(kids[0]));
        assert_eq!(session.depth(kids[1]), 2);
        assert!(session.epoch() > before);
        // Cycles are rejected.
        session.reparent_render(kids[0], kids[1]);
        assert_eq!(session.parent(kids[0]), Some(root_id));
    }

    #[test]
    fn unset_state_clears_transient_bits_only() {
        let (mut session, id) = build_one(VecElement::new("br").bounds(0.0, 0.0, 0.0, 0.0));
        session.mark_rendered(id);
        session.hide(id);
        assert!(session.state(id).contains(NodeState::RENDERED));
        session.unset_state(id);
        assert!(!session.state(id).contains(NodeState::RENDERED));
        assert!(!session.state(id).contains(NodeState::HIDDEN));
        assert!(session.state(id).contains(NodeState::LINE_BREAK));
    }

    #[test]
    fn unset_cache_forces_recompute() {
        let (mut session, id) = build_one(block(0.0, 0.0, 100.0, 50.0).style("marginLeft", "5px"));
        let first = session.linear_rect(id);
        assert_eq!(first.x0, -5.0);
        session.unset_cache(id, &["marginLeft"]);
        // Value unchanged, but the read path must recompute without error.
        assert_eq!(session.linear_rect(id), first);
    }
}
