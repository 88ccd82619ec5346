// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-indexed subtree matching.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{NodeId, Session};

use crate::parse::{AttrOp, Combinator, Nth, PseudoClass, QueryData, parse_selector};

/// A depth index over one natural subtree.
///
/// Slot `k` holds the element nodes at depth `k` relative to the root (slot
/// 0 is the root itself; query targets are drawn from slot 1 onward, so the
/// root never matches its own query). The index records the session epoch it
/// was built at; after regrouping, [`QueryMap::is_current`] turns false and
/// the caller rebuilds.
#[derive(Clone, Debug)]
pub struct QueryMap {
    root: NodeId,
    epoch: u64,
    depths: Vec<Vec<NodeId>>,
}

impl QueryMap {
    /// Index the natural subtree under `root`. Text runs are skipped.
    #[must_use]
    pub fn build<E>(session: &Session<E>, root: NodeId) -> Self
    where
        E: Copy + Eq + Hash + Debug,
    {
        let mut depths: Vec<Vec<NodeId>> = Vec::new();
        let mut frontier = Vec::new();
        if session.contains(root) {
            frontier.push(root);
        }
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &id in &frontier {
                next.extend_from_slice(session.natural_elements(id));
            }
            depths.push(frontier);
            frontier = next;
        }
        Self {
            root,
            epoch: session.epoch(),
            depths,
        }
    }

    /// The subtree root this index was built for.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// `false` once the session structure has changed since the build.
    #[must_use]
    pub fn is_current<E>(&self, session: &Session<E>) -> bool
    where
        E: Copy + Eq + Hash + Debug,
    {
        self.epoch == session.epoch()
    }

    /// All indexed descendants (depth ≥ 1), in index order.
    fn candidates(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.depths.iter().skip(1).flatten().copied()
    }
}

/// All descendants of the map's root matching the selector, deduplicated
/// and sorted ascending by id.
///
/// Syntax errors in the selector yield an empty (or partial, for comma
/// lists) result rather than an error.
#[must_use]
pub fn query_selector_all<E>(
    session: &Session<E>,
    map: &QueryMap,
    selector: &str,
) -> Vec<NodeId>
where
    E: Copy + Eq + Hash + Debug,
{
    let mut out = Vec::new();
    for chain in parse_selector(selector) {
        let Some(target) = chain.last() else {
            continue;
        };
        for candidate in map.candidates() {
            if matches_segment(session, candidate, target)
                && matches_chain(session, map, candidate, &chain)
            {
                out.push(candidate);
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// The first match of [`query_selector_all`] (lowest id).
#[must_use]
pub fn query_selector<E>(session: &Session<E>, map: &QueryMap, selector: &str) -> Option<NodeId>
where
    E: Copy + Eq + Hash + Debug,
{
    query_selector_all(session, map, selector).first().copied()
}

/// Walk the chain right-to-left from an already-matched target.
///
/// An explicit worklist of (node, segment) states stands in for recursion:
/// descendant and general-sibling combinators fan out to several ancestor or
/// sibling positions, and any one surviving path accepts the candidate.
fn matches_chain<E>(
    session: &Session<E>,
    map: &QueryMap,
    target: NodeId,
    chain: &[QueryData],
) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    let mut work = Vec::new();
    work.push((target, chain.len() - 1));
    while let Some((node, idx)) = work.pop() {
        if idx == 0 {
            return true;
        }
        let left = &chain[idx - 1];
        match chain[idx].combinator {
            Combinator::Child => {
                if let Some(parent) = session.natural_parent(node)
                    && matches_segment(session, parent, left)
                {
                    work.push((parent, idx - 1));
                }
            }
            Combinator::Descendant => {
                let mut cursor = session.natural_parent(node);
                while let Some(ancestor) = cursor {
                    if matches_segment(session, ancestor, left) {
                        work.push((ancestor, idx - 1));
                    }
                    if ancestor == map.root() {
                        break;
                    }
                    cursor = session.natural_parent(ancestor);
                }
            }
            Combinator::Adjacent => {
                if let Some(previous) = preceding_siblings(session, node).last()
                    && matches_segment(session, *previous, left)
                {
                    work.push((*previous, idx - 1));
                }
            }
            Combinator::Sibling => {
                for sibling in preceding_siblings(session, node) {
                    if matches_segment(session, sibling, left) {
                        work.push((sibling, idx - 1));
                    }
                }
            }
        }
    }
    false
}

/// Element siblings before `node`, in document order.
fn preceding_siblings<E>(session: &Session<E>, node: NodeId) -> Vec<NodeId>
where
    E: Copy + Eq + Hash + Debug,
{
    let Some(parent) = session.natural_parent(node) else {
        return Vec::new();
    };
    session
        .natural_elements(parent)
        .iter()
        .copied()
        .take_while(|&s| s != node)
        .collect()
}

fn matches_segment<E>(session: &Session<E>, node: NodeId, seg: &QueryData) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    if !session.is_element(node) {
        return false;
    }
    if let Some(tag) = &seg.tag
        && session.tag_name(node) != Some(tag.as_str())
    {
        return false;
    }
    if let Some(id) = &seg.id
        && session.element_id(node) != Some(id.as_str())
    {
        return false;
    }
    for class in &seg.classes {
        if !session.has_class(node, class) {
            return false;
        }
    }
    for attr in &seg.attrs {
        if !matches_attr(session, node, attr) {
            return false;
        }
    }
    for pseudo in &seg.pseudos {
        if !matches_pseudo(session, node, pseudo) {
            return false;
        }
    }
    true
}

fn matches_attr<E>(
    session: &Session<E>,
    node: NodeId,
    predicate: &crate::parse::AttrPredicate,
) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    let Some(actual) = session.attr(node, &predicate.name) else {
        return false;
    };
    let eq = |a: &str, b: &str| {
        if predicate.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    };
    let contains = |haystack: &str, needle: &str| {
        if needle.is_empty() {
            return false;
        }
        if predicate.case_insensitive {
            haystack
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
        } else {
            haystack.contains(needle)
        }
    };
    // Byte-wise so that a needle length falling inside a multibyte character
    // compares unequal instead of panicking on a str slice. ASCII case
    // folding leaves non-ASCII bytes untouched, so UTF-8 stays intact.
    let starts = |haystack: &str, needle: &str| {
        if predicate.case_insensitive {
            haystack.len() >= needle.len()
                && haystack.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
        } else {
            haystack.starts_with(needle)
        }
    };
    let ends = |haystack: &str, needle: &str| {
        if predicate.case_insensitive {
            haystack.len() >= needle.len()
                && haystack.as_bytes()[haystack.len() - needle.len()..]
                    .eq_ignore_ascii_case(needle.as_bytes())
        } else {
            haystack.ends_with(needle)
        }
    };
    let value = predicate.value.as_str();
    match predicate.op {
        AttrOp::Exists => true,
        AttrOp::Eq => eq(actual, value),
        AttrOp::Includes => actual.split_ascii_whitespace().any(|t| eq(t, value)),
        AttrOp::Prefix => !value.is_empty() && starts(actual, value),
        AttrOp::Suffix => !value.is_empty() && ends(actual, value),
        AttrOp::Substring => contains(actual, value),
        AttrOp::DashMatch => {
            eq(actual, value)
                || (actual.len() > value.len()
                    && actual.as_bytes()[value.len()] == b'-'
                    && starts(actual, value))
        }
    }
}

fn matches_pseudo<E>(session: &Session<E>, node: NodeId, pseudo: &PseudoClass) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    match pseudo {
        PseudoClass::FirstChild => element_index(session, node).0 == Some(1),
        PseudoClass::LastChild => {
            let (idx, total) = element_index(session, node);
            idx.is_some() && idx == Some(total)
        }
        PseudoClass::OnlyChild => element_index(session, node) == (Some(1), 1),
        PseudoClass::Empty => session.natural_children(node).is_empty(),
        PseudoClass::FirstOfType => type_index(session, node).0 == Some(1),
        PseudoClass::LastOfType => {
            let (idx, total) = type_index(session, node);
            idx.is_some() && idx == Some(total)
        }
        PseudoClass::NthChild(nth) => nth_matches(element_index(session, node).0, *nth),
        PseudoClass::NthLastChild(nth) => {
            let (idx, total) = element_index(session, node);
            nth_matches(idx.map(|i| total - i + 1), *nth)
        }
        PseudoClass::NthOfType(nth) => nth_matches(type_index(session, node).0, *nth),
        PseudoClass::Not(inner) => !matches_segment(session, node, inner),
    }
}

fn nth_matches(index: Option<i32>, nth: Nth) -> bool {
    index.is_some_and(|i| nth.matches(i))
}

/// 1-based position among element siblings, plus the sibling count.
///
/// A root has no parent and so no position; structural pseudo-classes fail
/// on it rather than treating it as a first child.
fn element_index<E>(session: &Session<E>, node: NodeId) -> (Option<i32>, i32)
where
    E: Copy + Eq + Hash + Debug,
{
    let Some(parent) = session.natural_parent(node) else {
        return (None, 0);
    };
    let siblings = session.natural_elements(parent);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "sibling counts fit i32 by construction"
    )]
    {
        let total = siblings.len() as i32;
        let idx = siblings
            .iter()
            .position(|&s| s == node)
            .map(|p| p as i32 + 1);
        (idx, total)
    }
}

/// 1-based position among same-tag element siblings, plus that count.
fn type_index<E>(session: &Session<E>, node: NodeId) -> (Option<i32>, i32)
where
    E: Copy + Eq + Hash + Debug,
{
    let Some(parent) = session.natural_parent(node) else {
        return (None, 0);
    };
    let tag = session.tag_name(node);
    let mut idx = None;
    let mut total = 0;
    for &sibling in session.natural_elements(parent) {
        if session.tag_name(sibling) == tag {
            total += 1;
            if sibling == node {
                idx = Some(total);
            }
        }
    }
    (idx, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_node::{SessionId, VecAdapter, VecElement};

    /// root(div) > [ul > li.a, li, li.a, li], p#intro(data-kind="hot stuff"),
    /// span(text child), br
    fn fixture() -> (Session, NodeId) {
        let mut host = VecAdapter::new();
        let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 200.0, 200.0));
        let ul = host.element(VecElement::new("ul").bounds(0.0, 0.0, 200.0, 80.0));
        let items: Vec<_> = (0..4)
            .map(|i| {
                let y = f64::from(i) * 20.0;
                let e = VecElement::new("li").bounds(0.0, y, 200.0, y + 20.0);
                let e = if i % 2 == 0 { e.class("a") } else { e };
                host.element(e)
            })
            .collect();
        let p = host.element(
            VecElement::new("p")
                .id("intro")
                .attr("data-kind", "hot stuff")
                .bounds(0.0, 80.0, 200.0, 100.0),
        );
        let span = host.element(VecElement::new("span").bounds(0.0, 100.0, 200.0, 120.0));
        let text = host.element(VecElement::text().bounds(0.0, 100.0, 50.0, 120.0));
        let br = host.element(VecElement::new("br").bounds(0.0, 120.0, 0.0, 120.0));
        host.append(root, ul);
        for &item in &items {
            host.append(ul, item);
        }
        host.append(root, p);
        host.append(root, span);
        host.append(span, text);
        host.append(root, br);

        let mut session = Session::new(SessionId::new(7));
        let root_id = session.build(&host, root).unwrap();
        (session, root_id)
    }

    fn all(session: &Session, root: NodeId, selector: &str) -> Vec<NodeId> {
        let map = QueryMap::build(session, root);
        query_selector_all(session, &map, selector)
    }

    #[test]
    fn universal_returns_each_element_once_sorted() {
        let (session, root) = fixture();
        let result = all(&session, root, "*");
        // ul + 4 li + p + span + br; text runs and the root itself excluded.
        assert_eq!(result.len(), 8);
        let mut sorted = result.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(result, sorted);
    }

    #[test]
    fn tag_class_id_attribute() {
        let (session, root) = fixture();
        assert_eq!(all(&session, root, "li").len(), 4);
        assert_eq!(all(&session, root, "li.a").len(), 2);
        assert_eq!(all(&session, root, "#intro").len(), 1);
        assert_eq!(all(&session, root, "[data-kind~=hot]").len(), 1);
        assert_eq!(all(&session, root, "[data-kind^=hot]").len(), 1);
        assert_eq!(all(&session, root, "[data-kind$=stuff]").len(), 1);
        assert_eq!(all(&session, root, "[data-kind*='t st']").len(), 1);
        assert_eq!(all(&session, root, "[data-kind=cold]").len(), 0);
        assert_eq!(all(&session, root, "p[data-kind]").len(), 1);
    }

    #[test]
    fn prefix_suffix_stay_total_on_multibyte_values() {
        let mut host = VecAdapter::new();
        let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 20.0));
        let child = host.element(
            VecElement::new("span")
                .attr("data-x", "dí")
                .attr("data-y", "ís")
                .bounds(0.0, 0.0, 100.0, 20.0),
        );
        host.append(root, child);
        let mut session = Session::new(SessionId::new(9));
        let root_id = session.build(&host, root).unwrap();

        // Needle lengths that land inside the two-byte 'í' must simply not
        // match, case-insensitive or not.
        assert_eq!(all(&session, root_id, "[data-x^=ab]").len(), 0);
        assert_eq!(all(&session, root_id, "[data-x$=ab]").len(), 0);
        assert_eq!(all(&session, root_id, "[data-x^='ab' i]").len(), 0);
        assert_eq!(all(&session, root_id, "[data-y$='ab' i]").len(), 0);
        // Multibyte needles still match exactly.
        assert_eq!(all(&session, root_id, "[data-x^=dí]").len(), 1);
        assert_eq!(all(&session, root_id, "[data-y$=ís]").len(), 1);
        assert_eq!(all(&session, root_id, "[data-x^='Dí' i]").len(), 1);
    }

    #[test]
    fn nth_child_odd_picks_odd_positions() {
        let (session, root) = fixture();
        let odd = all(&session, root, "li:nth-child(2n+1)");
        let first_and_third = all(&session, root, "li.a");
        assert_eq!(odd, first_and_third);
        let last_two = all(&session, root, "li:nth-last-child(-n+2)");
        assert_eq!(last_two.len(), 2);
        assert_eq!(all(&session, root, "li:first-child").len(), 1);
        assert_eq!(all(&session, root, "li:last-child").len(), 1);
        assert_eq!(all(&session, root, "ul:first-of-type").len(), 1);
    }

    #[test]
    fn not_is_disjoint_with_its_argument() {
        let (session, root) = fixture();
        let with = all(&session, root, "li.a");
        let without = all(&session, root, "li:not(.a)");
        assert_eq!(with.len() + without.len(), 4);
        assert!(with.iter().all(|id| !without.contains(id)));
    }

    #[test]
    fn combinator_chains() {
        let (session, root) = fixture();
        assert_eq!(all(&session, root, "div > ul > li").len(), 4);
        assert_eq!(all(&session, root, "div li").len(), 4);
        // No li is a direct child of the root div.
        assert_eq!(all(&session, root, "div > li").len(), 0);
        assert_eq!(all(&session, root, "ul + p").len(), 1);
        assert_eq!(all(&session, root, "p + span").len(), 1);
        assert_eq!(all(&session, root, "ul ~ span").len(), 1);
        assert_eq!(all(&session, root, "li + li").len(), 3);
    }

    #[test]
    fn alternatives_union_and_errors_degrade() {
        let (session, root) = fixture();
        let both = all(&session, root, "p, span");
        assert_eq!(both.len(), 2);
        // The invalid alternative contributes nothing; the valid one stands.
        let partial = all(&session, root, "p, > span");
        assert_eq!(partial.len(), 1);
        assert!(all(&session, root, "::after").is_empty());
    }

    #[test]
    fn empty_matches_childless_elements() {
        let (session, root) = fixture();
        let empties = all(&session, root, ":empty");
        // Each li, the p, and the br have no children; span holds a text run.
        assert_eq!(empties.len(), 6);
        let span = all(&session, root, "span");
        assert!(!empties.contains(&span[0]));
    }

    #[test]
    fn stale_map_is_detected_after_regrouping() {
        let (mut session, root) = fixture();
        let map = QueryMap::build(&session, root);
        assert!(map.is_current(&session));
        let kids: Vec<NodeId> = session.render_children(root).to_vec();
        session.create_group(root, &kids[0..2]);
        assert!(!map.is_current(&session));
        // Natural-tree queries still see the original structure.
        let fresh = QueryMap::build(&session, root);
        assert_eq!(query_selector_all(&session, &fresh, "li").len(), 4);
    }

    #[test]
    fn query_selector_is_lowest_id() {
        let (session, root) = fixture();
        let map = QueryMap::build(&session, root);
        let first = query_selector(&session, &map, "li").unwrap();
        let each = query_selector_all(&session, &map, "li");
        assert_eq!(Some(&first), each.first());
        assert!(query_selector(&session, &map, "table").is_none());
    }
}
