// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-sorted output list for the emitting layer.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use reflow_node::{NodeId, NodeState, Session};

use crate::layout::{Alignment, ContainerType, Layout};

/// One row of the emission list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderEntry {
    pub id: NodeId,
    /// Final render-tree parent (after grouping), not the natural parent.
    pub parent: Option<NodeId>,
    pub depth: u32,
    /// Container shape this node's children collapse into; empty for
    /// leaves and single-child parents.
    pub container: ContainerType,
    pub alignment: Alignment,
}

/// The serialization-ready node list: every placed, visible node in
/// (depth, id) order, carrying its final parentage and the container and
/// alignment flags the grouping pass decided for it.
///
/// Hidden nodes and their subtrees are omitted. Several layouts under one
/// parent merge their flags.
#[must_use]
pub fn render_list<E>(session: &Session<E>, layouts: &[Layout]) -> Vec<RenderEntry>
where
    E: Copy + Eq + Hash + Debug,
{
    let mut flags: HashMap<NodeId, (ContainerType, Alignment)> = HashMap::new();
    for layout in layouts {
        let entry = flags
            .entry(layout.parent())
            .or_insert((ContainerType::empty(), Alignment::empty()));
        entry.0 |= layout.container();
        entry.1 |= layout.alignment();
    }

    let mut out: Vec<RenderEntry> = session
        .ids()
        .filter(|&id| session.state(id).contains(NodeState::RENDERED))
        .filter(|&id| !hidden_or_inside_hidden(session, id))
        .map(|id| {
            let (container, alignment) = flags
                .get(&id)
                .copied()
                .unwrap_or((ContainerType::empty(), Alignment::empty()));
            RenderEntry {
                id,
                parent: session.parent(id),
                depth: session.depth(id),
                container,
                alignment,
            }
        })
        .collect();
    out.sort_unstable_by_key(|e| (e.depth, e.id));
    out
}

fn hidden_or_inside_hidden<E>(session: &Session<E>, id: NodeId) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    let mut cursor = Some(id);
    while let Some(c) = cursor {
        if session.state(c).contains(NodeState::HIDDEN) {
            return true;
        }
        cursor = session.parent(c);
    }
    false
}
