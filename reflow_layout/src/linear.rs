// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-pass linear classification of a sibling run.

use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{Clear, Float, NodeId, Session};

use crate::layout::LinearData;

/// Classify one run of siblings in a single left-to-right pass.
///
/// Tracks the currently-open float sides: a floated member opens its side, a
/// member whose `clear` matches an open side is recorded in `cleared` and
/// closes that side (`clear: both` closes everything). `linear_x` holds when
/// every pair of page-flow members overlaps vertically; `linear_y` holds when
/// each successive page-flow member starts at or below the previous one's
/// bottom. Both are vacuously true for runs of fewer than two page-flow
/// members. Idempotent over the same session state.
pub fn classify<E>(session: &mut Session<E>, members: &[NodeId]) -> LinearData
where
    E: Copy + Eq + Hash + Debug,
{
    let mut data = LinearData {
        linear_x: true,
        linear_y: true,
        ..LinearData::default()
    };
    let mut open_left = false;
    let mut open_right = false;

    for &m in members {
        let clear = session.clear_of(m);
        let clears_open = match clear {
            Clear::None => false,
            Clear::Left => open_left,
            Clear::Right => open_right,
            Clear::Both => open_left || open_right,
        };
        if clears_open {
            data.cleared.insert(m, clear);
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
        if session.floating(m) {
            data.floated.insert(m);
            match session.float_of(m) {
                Float::Left => open_left = true,
                Float::Right => open_right = true,
                Float::None => {}
            }
        }
    }

    let flow: alloc::vec::Vec<NodeId> = members
        .iter()
        .copied()
        .filter(|&m| session.page_flow(m))
        .collect();
    for pair in flow.windows(2) {
        let a = session.bounds(pair[0]);
        let b = session.bounds(pair[1]);
        if b.y0 < a.y1 {
            data.linear_y = false;
        }
    }
    'x: for (i, &a) in flow.iter().enumerate() {
        let ra = session.bounds(a);
        for &b in &flow[i + 1..] {
            let rb = session.bounds(b);
            let overlaps = ra.y0 < rb.y1 && rb.y0 < ra.y1;
            if !overlaps {
                data.linear_x = false;
                break 'x;
            }
        }
    }
    data
}
