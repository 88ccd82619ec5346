// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Layout`] aggregate and its classification flags.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use bitflags::bitflags;
use hashbrown::{HashMap, HashSet};
use reflow_node::{Clear, NodeId, Session};

use crate::linear::classify;

bitflags! {
    /// Container shape a run of siblings collapses into.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ContainerType: u8 {
        /// Members lay out along one horizontal band.
        const HORIZONTAL = 1 << 0;
        /// Members stack top to bottom.
        const VERTICAL = 1 << 1;
        /// Float interaction shaped the run (segment groups inside).
        const FLOAT = 1 << 2;
        /// A synthetic wrapper introduced by the pass, not an original node.
        const WRAPPER = 1 << 3;
    }
}

bitflags! {
    /// Alignment hints for the emitting layer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Alignment: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const CENTER = 1 << 2;
        const TOP = 1 << 3;
        const BOTTOM = 1 << 4;
        const BASELINE = 1 << 5;
    }
}

/// One-pass linear classification of a sibling run.
#[derive(Clone, Debug, Default)]
pub struct LinearData {
    /// Members with an effective float.
    pub floated: HashSet<NodeId>,
    /// Members whose `clear` terminated open float sides, and which sides.
    pub cleared: HashMap<NodeId, Clear>,
    /// Every pair of page-flow members overlaps vertically (one band).
    pub linear_x: bool,
    /// Each successive page-flow member starts at or below the previous
    /// member's bottom (one column).
    pub linear_y: bool,
}

/// An ephemeral aggregate over one candidate run of render siblings.
///
/// Constructed per grouping decision and discarded once the run has been
/// materialized. The linear classification is computed lazily and dropped on
/// any structural change to the member list.
#[derive(Clone, Debug)]
pub struct Layout {
    parent: NodeId,
    members: Vec<NodeId>,
    container: ContainerType,
    alignment: Alignment,
    linear: Option<LinearData>,
}

impl Layout {
    /// A run of `members` under `parent`, unclassified.
    #[must_use]
    pub fn new(parent: NodeId, members: Vec<NodeId>) -> Self {
        Self {
            parent,
            members,
            container: ContainerType::empty(),
            alignment: Alignment::empty(),
            linear: None,
        }
    }

    #[must_use]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    #[must_use]
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a member; drops the cached classification.
    pub fn push(&mut self, id: NodeId) {
        self.members.push(id);
        self.linear = None;
    }

    /// Remove a member; drops the cached classification.
    pub fn remove(&mut self, id: NodeId) {
        self.members.retain(|&m| m != id);
        self.linear = None;
    }

    /// The linear classification, computed on first use.
    pub fn linear<E>(&mut self, session: &mut Session<E>) -> &LinearData
    where
        E: Copy + Eq + Hash + Debug,
    {
        if self.linear.is_none() {
            self.linear = Some(classify(session, &self.members));
        }
        self.linear.get_or_insert_with(LinearData::default)
    }

    #[must_use]
    pub fn container(&self) -> ContainerType {
        self.container
    }

    pub fn set_container(&mut self, container: ContainerType) {
        self.container = container;
    }

    #[must_use]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }
}

/// Alignment hints derived from auto margins and baseline flags.
///
/// Both horizontal margins auto centers the run; a single auto margin pushes
/// the content toward the opposite side. A run whose every member sits on
/// the baseline additionally carries [`Alignment::BASELINE`].
pub fn alignment_of<E>(session: &mut Session<E>, members: &[NodeId]) -> Alignment
where
    E: Copy + Eq + Hash + Debug,
{
    use reflow_node::AutoMargin;
    let mut out = Alignment::empty();
    let mut all_baseline = !members.is_empty();
    for &m in members {
        let auto = session.auto_margin(m);
        if auto.contains(AutoMargin::LEFT | AutoMargin::RIGHT) {
            out.insert(Alignment::CENTER);
        } else if auto.contains(AutoMargin::LEFT) {
            out.insert(Alignment::RIGHT);
        } else if auto.contains(AutoMargin::RIGHT) {
            out.insert(Alignment::LEFT);
        }
        if !session.baseline(m) {
            all_baseline = false;
        }
    }
    if all_baseline {
        out.insert(Alignment::BASELINE);
    }
    out
}
