// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam to the host measurement layer.
//!
//! Reflow never touches the live markup tree directly. A [`SourceAdapter`]
//! hands over everything the session snapshots at build time: tag names,
//! attributes, the already-resolved style map, DOM-order children, and one
//! authoritative rectangle per element. After the snapshot, the session
//! answers from its own data; the adapter is only consulted again for an
//! explicit [`Session::remeasure`](crate::Session::remeasure).

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::Rect;

/// Read access to one element of the host's rendered tree.
///
/// `Element` is a small copyable handle chosen by the host (an index, a
/// pointer wrapper, an id). Tag names are expected in ASCII lowercase; a text
/// run reports an empty tag name.
pub trait SourceAdapter {
    /// Host-side element handle.
    type Element: Copy + Eq + Hash + Debug;

    /// Tag name in ASCII lowercase; empty for text runs.
    fn tag_name(&self, element: Self::Element) -> &str;

    /// The `id` attribute, if present.
    fn element_id(&self, element: Self::Element) -> Option<&str>;

    /// Class tokens in document order.
    fn class_list(&self, element: Self::Element) -> Vec<String>;

    /// A single attribute value, if present.
    fn attr(&self, element: Self::Element, name: &str) -> Option<&str>;

    /// All attributes as name/value pairs.
    fn attributes(&self, element: Self::Element) -> Vec<(String, String)>;

    /// The resolved style map (property name → raw value).
    fn style_map(&self, element: Self::Element) -> Vec<(String, String)>;

    /// The one authoritative rectangle for this element.
    ///
    /// `None` means measurement failed; the session records zero-size bounds
    /// and flags the node [`NodeState::UNMEASURED`](crate::NodeState::UNMEASURED)
    /// instead of erroring.
    fn bounds(&self, element: Self::Element) -> Option<Rect>;

    /// Children (elements and text runs) in DOM order.
    fn children(&self, element: Self::Element) -> Vec<Self::Element>;
}

/// Handle type used by [`VecAdapter`].
pub type VecHandle = usize;

/// Element description for [`VecAdapter`].
///
/// Built fluently; see the crate-level example.
#[derive(Clone, Debug)]
pub struct VecElement {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    style: Vec<(String, String)>,
    bounds: Option<Rect>,
    children: Vec<VecHandle>,
}

impl VecElement {
    /// A new element with the given lowercase tag name.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: String::from(tag),
            id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            style: Vec::new(),
            bounds: None,
            children: Vec::new(),
        }
    }

    /// A text run (empty tag name).
    #[must_use]
    pub fn text() -> Self {
        Self::new("")
    }

    /// Set the `id` attribute.
    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(String::from(id));
        self
    }

    /// Append a class token.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(String::from(class));
        self
    }

    /// Set an attribute.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(String::from(name), String::from(value));
        self
    }

    /// Set a resolved style property.
    #[must_use]
    pub fn style(mut self, name: &str, value: &str) -> Self {
        self.style.push((String::from(name), String::from(value)));
        self
    }

    /// Set the measured rectangle.
    #[must_use]
    pub fn bounds(mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        self.bounds = Some(Rect::new(x0, y0, x1, y1));
        self
    }
}

/// An in-memory [`SourceAdapter`] over a flat element vector.
///
/// Intended for tests and demos; real hosts implement the trait against
/// their own tree.
#[derive(Clone, Debug, Default)]
pub struct VecAdapter {
    elements: Vec<VecElement>,
}

impl VecAdapter {
    /// An empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element, returning its handle.
    pub fn element(&mut self, element: VecElement) -> VecHandle {
        self.elements.push(element);
        self.elements.len() - 1
    }

    /// Append `child` to `parent`'s child list.
    pub fn append(&mut self, parent: VecHandle, child: VecHandle) {
        if let Some(p) = self.elements.get_mut(parent) {
            p.children.push(child);
        }
    }
}

impl SourceAdapter for VecAdapter {
    type Element = VecHandle;

    fn tag_name(&self, element: VecHandle) -> &str {
        self.elements.get(element).map_or("", |e| e.tag.as_str())
    }

    fn element_id(&self, element: VecHandle) -> Option<&str> {
        self.elements.get(element)?.id.as_deref()
    }

    fn class_list(&self, element: VecHandle) -> Vec<String> {
        self.elements
            .get(element)
            .map_or_else(Vec::new, |e| e.classes.clone())
    }

    fn attr(&self, element: VecHandle, name: &str) -> Option<&str> {
        self.elements.get(element)?.attrs.get(name).map(String::as_str)
    }

    fn attributes(&self, element: VecHandle) -> Vec<(String, String)> {
        self.elements.get(element).map_or_else(Vec::new, |e| {
            e.attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
    }

    fn style_map(&self, element: VecHandle) -> Vec<(String, String)> {
        self.elements
            .get(element)
            .map_or_else(Vec::new, |e| e.style.clone())
    }

    fn bounds(&self, element: VecHandle) -> Option<Rect> {
        self.elements.get(element)?.bounds
    }

    fn children(&self, element: VecHandle) -> Vec<VecHandle> {
        self.elements
            .get(element)
            .map_or_else(Vec::new, |e| e.children.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_adapter_round_trip() {
        let mut host = VecAdapter::new();
        let root = host.element(
            VecElement::new("div")
                .id("main")
                .class("wrap")
                .attr("data-k", "v")
                .style("display", "block")
                .bounds(0.0, 0.0, 10.0, 10.0),
        );
        let child = host.element(VecElement::text());
        host.append(root, child);

        assert_eq!(host.tag_name(root), "div");
        assert_eq!(host.element_id(root), Some("main"));
        assert_eq!(host.class_list(root), ["wrap"]);
        assert_eq!(host.attr(root, "data-k"), Some("v"));
        assert_eq!(host.children(root), [child]);
        assert_eq!(host.tag_name(child), "");
        assert!(host.bounds(child).is_none());
    }
}
