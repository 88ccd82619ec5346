// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float segment bucketing: the second grouping pass.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{AutoMargin, Clear, Float, NodeId, Session};

/// Members of a float-shaped run, split into side x row segments.
///
/// "Above" and "below" are relative to the first clear boundary that closes
/// an open float side; everything before it is above, everything from the
/// clearing member onward is below. Sides come from the effective float, or
/// for in-flow members from the auto-margin direction (an auto left margin
/// pushes content right, and vice versa).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FloatBuckets {
    pub inline_above: Vec<NodeId>,
    pub inline_below: Vec<NodeId>,
    pub left_above: Vec<NodeId>,
    pub left_below: Vec<NodeId>,
    pub right_above: Vec<NodeId>,
    pub right_below: Vec<NodeId>,
}

impl FloatBuckets {
    /// Segments in precedence order: floated content first, inline last,
    /// above before below.
    #[must_use]
    pub fn segments(&self) -> [&Vec<NodeId>; 6] {
        [
            &self.left_above,
            &self.right_above,
            &self.inline_above,
            &self.left_below,
            &self.right_below,
            &self.inline_below,
        ]
    }

    /// `true` when any below row is occupied (a clear boundary was crossed).
    #[must_use]
    pub fn has_below(&self) -> bool {
        !self.left_below.is_empty()
            || !self.right_below.is_empty()
            || !self.inline_below.is_empty()
    }

    /// Occupied segments only, in precedence order.
    #[must_use]
    pub fn occupied(&self) -> Vec<&Vec<NodeId>> {
        self.segments()
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Bucket one run of siblings around its clear boundaries.
pub fn bucket_floats<E>(session: &mut Session<E>, members: &[NodeId]) -> FloatBuckets
where
    E: Copy + Eq + Hash + Debug,
{
    let mut buckets = FloatBuckets::default();
    let mut open_left = false;
    let mut open_right = false;
    let mut below = false;

    for &m in members {
        let clear = session.clear_of(m);
        let clears_open = match clear {
            Clear::None => false,
            Clear::Left => open_left,
            Clear::Right => open_right,
            Clear::Both => open_left || open_right,
        };
        if clears_open {
            below = true;
            match clear {
                Clear::Left => open_left = false,
                Clear::Right => open_right = false,
                Clear::Both => {
                    open_left = false;
                    open_right = false;
                }
                Clear::None => {}
            }
        }

        let side = effective_side(session, m);
        let bucket = match (side, below) {
            (Float::Left, false) => &mut buckets.left_above,
            (Float::Left, true) => &mut buckets.left_below,
            (Float::Right, false) => &mut buckets.right_above,
            (Float::Right, true) => &mut buckets.right_below,
            (Float::None, false) => &mut buckets.inline_above,
            (Float::None, true) => &mut buckets.inline_below,
        };
        bucket.push(m);

        if session.floating(m) {
            match session.float_of(m) {
                Float::Left => open_left = true,
                Float::Right => open_right = true,
                Float::None => {}
            }
        }
    }
    buckets
}

/// The side a member gravitates to: its float, else its auto-margin push.
fn effective_side<E>(session: &mut Session<E>, id: NodeId) -> Float
where
    E: Copy + Eq + Hash + Debug,
{
    match session.float_of(id) {
        Float::None => {
            let auto = session.auto_margin(id);
            let left = auto.contains(AutoMargin::LEFT);
            let right = auto.contains(AutoMargin::RIGHT);
            if left && !right {
                Float::Right
            } else if right && !left {
                Float::Left
            } else {
                Float::None
            }
        }
        side => side,
    }
}
