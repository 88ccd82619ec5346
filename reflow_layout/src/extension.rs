// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extension hooks: external interception of nodes during grouping.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{NodeId, Session};

/// What the dispatcher should do after an extension ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Nothing substituted; keep asking the remaining extensions, then
    /// proceed with the normal partitioning.
    Continue,
    /// Partition the named node's children instead of the original's.
    Replace(NodeId),
    /// The extension produced the output itself; skip the subtree.
    Complete,
}

/// An external hook that may substitute output for a node.
///
/// The grouping pass asks `condition` before descending into a parent; when
/// it holds, `process_node` runs and its [`Directive`] steers the pass. The
/// core never learns what the extension emitted.
pub trait Extension<E>
where
    E: Copy + Eq + Hash + Debug,
{
    /// Dispatch order; higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this extension claims the node.
    fn condition(&self, session: &Session<E>, node: NodeId) -> bool;

    /// Handle the node. Runs only when `condition` held.
    fn process_node(&mut self, session: &mut Session<E>, node: NodeId) -> Directive;
}

/// An ordered collection of extensions.
pub struct ExtensionSet<E>
where
    E: Copy + Eq + Hash + Debug,
{
    items: Vec<Box<dyn Extension<E>>>,
}

impl<E> Default for ExtensionSet<E>
where
    E: Copy + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ExtensionSet<E>
where
    E: Copy + Eq + Hash + Debug,
{
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add an extension, keeping the set sorted by descending priority.
    ///
    /// Registration order breaks ties, so equal-priority extensions run
    /// first-registered first.
    pub fn register(&mut self, extension: Box<dyn Extension<E>>) {
        let priority = extension.priority();
        let at = self
            .items
            .iter()
            .position(|e| e.priority() < priority)
            .unwrap_or(self.items.len());
        self.items.insert(at, extension);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Offer a node to each claiming extension in priority order.
    ///
    /// The first non-[`Directive::Continue`] answer wins.
    pub fn dispatch(&mut self, session: &mut Session<E>, node: NodeId) -> Directive {
        for extension in &mut self.items {
            if !extension.condition(session, node) {
                continue;
            }
            match extension.process_node(session, node) {
                Directive::Continue => {}
                directive => return directive,
            }
        }
        Directive::Continue
    }
}

impl<E> Debug for ExtensionSet<E>
where
    E: Copy + Eq + Hash + Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtensionSet")
            .field("len", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_node::{SessionId, VecAdapter, VecElement};

    struct TagClaimer {
        tag: &'static str,
        priority: i32,
        answer: Directive,
        hits: usize,
    }

    impl Extension<usize> for TagClaimer {
        fn priority(&self) -> i32 {
            self.priority
        }

        fn condition(&self, session: &Session, node: NodeId) -> bool {
            session.tag_name(node) == Some(self.tag)
        }

        fn process_node(&mut self, _session: &mut Session, _node: NodeId) -> Directive {
            self.hits += 1;
            self.answer
        }
    }

    fn session_with(tag: &str) -> (Session, NodeId) {
        let mut host = VecAdapter::new();
        let root = host.element(VecElement::new(tag).bounds(0.0, 0.0, 10.0, 10.0));
        let mut session = Session::new(SessionId::new(1));
        let id = session.build(&host, root).unwrap();
        (session, id)
    }

    #[test]
    fn unclaimed_nodes_continue() {
        let (mut session, id) = session_with("div");
        let mut set = ExtensionSet::new();
        set.register(Box::new(TagClaimer {
            tag: "table",
            priority: 0,
            answer: Directive::Complete,
            hits: 0,
        }));
        assert_eq!(set.dispatch(&mut session, id), Directive::Continue);
    }

    #[test]
    fn higher_priority_wins() {
        let (mut session, id) = session_with("table");
        let mut set = ExtensionSet::new();
        set.register(Box::new(TagClaimer {
            tag: "table",
            priority: 1,
            answer: Directive::Continue,
            hits: 0,
        }));
        set.register(Box::new(TagClaimer {
            tag: "table",
            priority: 10,
            answer: Directive::Complete,
            hits: 0,
        }));
        // The priority-10 claimer answers first and short-circuits.
        assert_eq!(set.dispatch(&mut session, id), Directive::Complete);
    }

    #[test]
    fn continue_falls_through_to_the_next_claimer() {
        let (mut session, id) = session_with("table");
        let mut set = ExtensionSet::new();
        set.register(Box::new(TagClaimer {
            tag: "table",
            priority: 5,
            answer: Directive::Continue,
            hits: 0,
        }));
        set.register(Box::new(TagClaimer {
            tag: "table",
            priority: 1,
            answer: Directive::Replace(id),
            hits: 0,
        }));
        assert_eq!(set.dispatch(&mut session, id), Directive::Replace(id));
    }
}
