// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The grouping pass: partitioning sibling runs into containers.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{Clear, Float, NodeId, NodeState, Session};

use crate::extension::{Directive, ExtensionSet};
use crate::float::bucket_floats;
use crate::layout::{ContainerType, Layout, alignment_of};

/// Tunables for one grouping run.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupingOptions {
    /// Forbid a block element from sharing a run with open floats even when
    /// the floated bottom edge stays at or above the block's top.
    pub float_overlap_disabled: bool,
}

/// Decides the container shape for a materialized run.
///
/// The pass only partitions; what a "horizontal container" becomes in the
/// output format is the embedder's business. [`FlowController`] gives a
/// usable default; exporters substitute their own.
pub trait Controller<E>
where
    E: Copy + Eq + Hash + Debug,
{
    fn decide(&mut self, session: &mut Session<E>, layout: &mut Layout) -> ContainerType;
}

/// Default controller: container shape straight from the linear
/// classification.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlowController;

impl<E> Controller<E> for FlowController
where
    E: Copy + Eq + Hash + Debug,
{
    fn decide(&mut self, session: &mut Session<E>, layout: &mut Layout) -> ContainerType {
        let linear = layout.linear(session);
        let has_float = !linear.floated.is_empty();
        let mut out = if linear.linear_y {
            ContainerType::VERTICAL
        } else if linear.linear_x {
            ContainerType::HORIZONTAL
        } else {
            ContainerType::VERTICAL
        };
        if has_float {
            out |= ContainerType::FLOAT;
        }
        out
    }
}

/// Run the full grouping pass over the subtree under `root`.
///
/// Depth levels are processed shallowest-unprocessed-first; synthetic groups
/// created along the way extend the depth range and are picked up by later
/// levels. Every node under `root` ends the pass marked
/// [`NodeState::RENDERED`]; out-of-flow nodes with no valid placement are
/// additionally marked [`NodeState::HIDDEN`]. Returns the materialized
/// [`Layout`]s in creation order.
pub fn run<E, C>(
    session: &mut Session<E>,
    root: NodeId,
    controller: &mut C,
    extensions: &mut ExtensionSet<E>,
    options: &GroupingOptions,
) -> Vec<Layout>
where
    E: Copy + Eq + Hash + Debug,
    C: Controller<E>,
{
    let mut layouts = Vec::new();
    if !session.contains(root) {
        return layouts;
    }
    session.mark_rendered(root);
    let mut depth = session.depth(root);
    while depth <= session.max_depth() {
        let parents: Vec<NodeId> = session
            .nodes_at_depth(depth)
            .into_iter()
            .filter(|&p| in_subtree(session, p, root))
            .filter(|&p| !session.state(p).contains(NodeState::HIDDEN))
            .collect();
        for parent in parents {
            if all_rendered(session, parent) {
                continue;
            }
            match extensions.dispatch(session, parent) {
                Directive::Complete => mark_subtree_rendered(session, parent),
                Directive::Replace(substitute) => {
                    partition(session, substitute, controller, options, &mut layouts);
                    mark_subtree_rendered(session, parent);
                }
                Directive::Continue => {
                    partition(session, parent, controller, options, &mut layouts);
                }
            }
        }
        depth += 1;
    }
    layouts
}

fn in_subtree<E>(session: &Session<E>, node: NodeId, root: NodeId) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    let mut cursor = Some(node);
    while let Some(c) = cursor {
        if c == root {
            return true;
        }
        cursor = session.parent(c);
    }
    false
}

fn all_rendered<E>(session: &Session<E>, parent: NodeId) -> bool
where
    E: Copy + Eq + Hash + Debug,
{
    session
        .render_children(parent)
        .iter()
        .all(|&c| session.state(c).contains(NodeState::RENDERED))
}

fn mark_subtree_rendered<E>(session: &mut Session<E>, root: NodeId)
where
    E: Copy + Eq + Hash + Debug,
{
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        session.mark_rendered(id);
        stack.extend_from_slice(session.render_children(id));
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Walk one parent's child sequence left to right, cutting it into
/// axis-consistent runs.
fn partition<E, C>(
    session: &mut Session<E>,
    parent: NodeId,
    controller: &mut C,
    options: &GroupingOptions,
    layouts: &mut Vec<Layout>,
) where
    E: Copy + Eq + Hash + Debug,
    C: Controller<E>,
{
    let children: Vec<NodeId> = session.render_children(parent).to_vec();
    let mut buffer: Vec<NodeId> = Vec::new();
    let mut axis: Option<Axis> = None;
    let mut run_has_float = false;
    let mut open_left = false;
    let mut open_right = false;
    let mut open_float_bottom = f64::NEG_INFINITY;

    for child in children {
        if session.state(child).contains(NodeState::HIDDEN) {
            session.mark_rendered(child);
            continue;
        }
        // Out of flow with neither float nor full-width anchoring: nowhere
        // valid to place it.
        if !session.page_flow(child) && !session.block_static(child) && !session.floating(child)
        {
            session.hide(child);
            session.mark_rendered(child);
            continue;
        }

        let clear = session.clear_of(child);
        let clears_open = match clear {
            Clear::None => false,
            Clear::Left => open_left,
            Clear::Right => open_right,
            Clear::Both => open_left || open_right,
        };
        if clears_open {
            // The clear boundary stays inside the float run; the bucketing
            // pass splits above/below around it.
            match clear {
                Clear::Left => open_left = false,
                Clear::Right => open_right = false,
                Clear::Both => {
                    open_left = false;
                    open_right = false;
                }
                Clear::None => {}
            }
            open_float_bottom = f64::NEG_INFINITY;
            buffer.push(child);
            continue;
        }

        let floating = session.floating(child);
        let kind = if floating || !session.block_static(child) {
            Axis::Horizontal
        } else {
            Axis::Vertical
        };

        match axis {
            None => {
                buffer.push(child);
                axis = Some(kind);
            }
            Some(Axis::Horizontal) => {
                if kind == Axis::Horizontal {
                    buffer.push(child);
                } else if run_has_float
                    && !options.float_overlap_disabled
                    && open_float_bottom <= session.bounds(child).y0
                {
                    // Overlap permitted: the block joins the float run.
                    buffer.push(child);
                } else {
                    // Forced termination ("break" the nested run).
                    flush(
                        session, parent, &mut buffer, &mut run_has_float, controller, layouts,
                    );
                    open_left = false;
                    open_right = false;
                    open_float_bottom = f64::NEG_INFINITY;
                    buffer.push(child);
                    axis = Some(Axis::Vertical);
                }
            }
            Some(Axis::Vertical) => {
                if kind == Axis::Vertical {
                    buffer.push(child);
                } else {
                    flush(
                        session, parent, &mut buffer, &mut run_has_float, controller, layouts,
                    );
                    buffer.push(child);
                    axis = Some(Axis::Horizontal);
                }
            }
        }

        if floating {
            run_has_float = true;
            match session.float_of(child) {
                Float::Left => open_left = true,
                Float::Right => open_right = true,
                Float::None => {}
            }
            let bottom = session.bounds(child).y1;
            if bottom > open_float_bottom {
                open_float_bottom = bottom;
            }
        }
    }
    flush(
        session, parent, &mut buffer, &mut run_has_float, controller, layouts,
    );
}

/// Materialize the buffered run: mark members placed, and for runs longer
/// than one element either delegate to the controller or, when floats are
/// involved, fall through to segment bucketing.
fn flush<E, C>(
    session: &mut Session<E>,
    parent: NodeId,
    buffer: &mut Vec<NodeId>,
    run_has_float: &mut bool,
    controller: &mut C,
    layouts: &mut Vec<Layout>,
) where
    E: Copy + Eq + Hash + Debug,
    C: Controller<E>,
{
    let members = core::mem::take(buffer);
    let had_float = core::mem::take(run_has_float);
    for &m in &members {
        session.mark_rendered(m);
    }
    if members.len() < 2 {
        return;
    }
    if had_float {
        flush_float_run(session, parent, members, layouts);
        return;
    }
    let alignment = alignment_of(session, &members);
    let mut layout = Layout::new(parent, members);
    let container = controller.decide(session, &mut layout);
    layout.set_container(container);
    layout.set_alignment(alignment);
    layouts.push(layout);
}

/// Second pass for float-shaped runs: bucket into side x row segments,
/// materialize a synthetic group per multi-member segment, and arrange the
/// segment representatives.
///
/// Floated content is hosted in a single horizontal arrangement whenever no
/// clear boundary was crossed; a vertical wrapper appears only when a below
/// row exists, because a horizontal-only container cannot host both rows.
fn flush_float_run<E>(
    session: &mut Session<E>,
    parent: NodeId,
    members: Vec<NodeId>,
    layouts: &mut Vec<Layout>,
) where
    E: Copy + Eq + Hash + Debug,
{
    let buckets = bucket_floats(session, &members);
    let above = [
        &buckets.left_above,
        &buckets.right_above,
        &buckets.inline_above,
    ];
    let below = [
        &buckets.left_below,
        &buckets.right_below,
        &buckets.inline_below,
    ];
    let above_reps = segment_reps(session, parent, &above, layouts);
    let below_reps = segment_reps(session, parent, &below, layouts);

    let mut arranged: Vec<NodeId> = Vec::new();
    let mut container = ContainerType::FLOAT;
    if below_reps.is_empty() {
        arranged.extend_from_slice(&above_reps);
        container |= ContainerType::HORIZONTAL;
    } else {
        let above_row = row_rep(session, parent, above_reps, layouts);
        let below_row = row_rep(session, parent, below_reps, layouts);
        arranged.extend(above_row);
        arranged.extend(below_row);
        container |= ContainerType::VERTICAL;
    }
    if arranged.len() < 2 {
        return;
    }
    let alignment = alignment_of(session, &arranged);
    let mut layout = Layout::new(parent, arranged);
    layout.set_container(container);
    layout.set_alignment(alignment);
    layouts.push(layout);
}

/// One representative per occupied segment: the member itself for singleton
/// segments, a synthetic group otherwise.
fn segment_reps<E>(
    session: &mut Session<E>,
    parent: NodeId,
    segments: &[&Vec<NodeId>; 3],
    layouts: &mut Vec<Layout>,
) -> Vec<NodeId>
where
    E: Copy + Eq + Hash + Debug,
{
    let mut reps = Vec::new();
    for segment in segments {
        match segment.as_slice() {
            [] => {}
            [single] => reps.push(*single),
            many => {
                if let Some(group) = session.create_group(parent, many) {
                    session.mark_rendered(group);
                    let alignment = alignment_of(session, many);
                    let mut layout = Layout::new(group, many.to_vec());
                    layout.set_container(ContainerType::HORIZONTAL | ContainerType::FLOAT);
                    layout.set_alignment(alignment);
                    layouts.push(layout);
                    reps.push(group);
                } else {
                    // Inconsistent segment (members no longer siblings):
                    // the members stay placed individually.
                    reps.extend_from_slice(many);
                }
            }
        }
    }
    reps
}

/// Collapse one row's representatives into a single node, wrapping in a
/// synthetic horizontal group when the row holds several segments.
fn row_rep<E>(
    session: &mut Session<E>,
    parent: NodeId,
    reps: Vec<NodeId>,
    layouts: &mut Vec<Layout>,
) -> Option<NodeId>
where
    E: Copy + Eq + Hash + Debug,
{
    match reps.as_slice() {
        [] => None,
        [single] => Some(*single),
        many => {
            let group = session.create_group(parent, many)?;
            session.mark_rendered(group);
            let mut layout = Layout::new(group, many.to_vec());
            layout.set_container(
                ContainerType::HORIZONTAL | ContainerType::FLOAT | ContainerType::WRAPPER,
            );
            layouts.push(layout);
            Some(group)
        }
    }
}
