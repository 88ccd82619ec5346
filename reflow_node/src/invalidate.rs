// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The attribute → cache-slot dependency table.
//!
//! Every write through [`Session::css_set`](crate::Session::css_set) consults
//! this table to decide (a) which [`CacheSlots`] on the written node go
//! stale and (b) how far the invalidation propagates through the render
//! tree. Keeping the table explicit, instead of burying the knowledge in
//! individual getters, makes the invalidation behavior testable on its own
//! and keeps the geometry code free of bookkeeping.

use crate::cache::CacheSlots;

/// How far an invalidation reaches beyond the written node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// Only the written node's own slots are cleared.
    None,
    /// A direct dimension change: additionally clear height-dependent slots
    /// on every render child, and rect slots on the nearest ancestor that
    /// declares a fixed `width` or `height`.
    Dimension,
    /// A structural property whose effect is too broad to track precisely:
    /// the whole derived cache and the parsed-value cache are wiped.
    Structural,
}

/// One row of the dependency table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Invalidation {
    /// Slots on the written node that become stale.
    pub slots: CacheSlots,
    /// Reach of the invalidation.
    pub propagation: Propagation,
}

/// Look up the invalidation consequences of writing `attr`.
///
/// Properties not in the table fall through to an empty slot set with
/// [`Propagation::None`]; the session still drops the memoized parsed value
/// for the attribute itself.
#[must_use]
pub fn invalidation_for(attr: &str) -> Invalidation {
    let (slots, propagation) = match attr {
        "width" | "minWidth" | "maxWidth" => (
            CacheSlots::BOX_RECT
                | CacheSlots::LINEAR_RECT
                | CacheSlots::CONTENT_BOX
                | CacheSlots::ACTUAL_WIDTH
                | CacheSlots::BLOCK_STATIC
                | CacheSlots::INLINE_STATIC,
            Propagation::Dimension,
        ),
        "height" | "minHeight" | "maxHeight" => (
            CacheSlots::BOX_RECT
                | CacheSlots::LINEAR_RECT
                | CacheSlots::CONTENT_BOX
                | CacheSlots::ACTUAL_HEIGHT,
            Propagation::Dimension,
        ),
        "marginLeft" | "marginRight" | "marginTop" | "marginBottom" | "margin" => (
            CacheSlots::MARGIN
                | CacheSlots::LINEAR_RECT
                | CacheSlots::AUTO_MARGIN
                | CacheSlots::BLOCK_STATIC,
            Propagation::None,
        ),
        "paddingLeft" | "paddingRight" | "paddingTop" | "paddingBottom" | "padding" => (
            CacheSlots::PADDING | CacheSlots::CONTENT_BOX | CacheSlots::BOX_RECT,
            Propagation::None,
        ),
        "borderLeftWidth" | "borderRightWidth" | "borderTopWidth" | "borderBottomWidth"
        | "borderWidth" => (
            CacheSlots::BORDER | CacheSlots::CONTENT_BOX | CacheSlots::BOX_RECT,
            Propagation::None,
        ),
        "verticalAlign" => (CacheSlots::BASELINE, Propagation::None),
        // Structural properties: effect is too broad to track slot by slot.
        "display" | "float" | "cssFloat" | "clear" | "position" | "tagName" => {
            (CacheSlots::all(), Propagation::Structural)
        }
        _ => (CacheSlots::empty(), Propagation::None),
    };
    Invalidation { slots, propagation }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_write_is_a_dimension_change() {
        let inv = invalidation_for("width");
        assert_eq!(inv.propagation, Propagation::Dimension);
        assert!(inv.slots.contains(CacheSlots::ACTUAL_WIDTH));
        assert!(inv.slots.contains(CacheSlots::BOX_RECT));
        // Margins are not derived from width.
        assert!(!inv.slots.contains(CacheSlots::MARGIN));
    }

    #[test]
    fn margin_write_stays_local() {
        let inv = invalidation_for("marginTop");
        assert_eq!(inv.propagation, Propagation::None);
        assert!(inv.slots.contains(CacheSlots::MARGIN));
        assert!(inv.slots.contains(CacheSlots::LINEAR_RECT));
        assert!(!inv.slots.contains(CacheSlots::BOX_RECT));
    }

    #[test]
    fn structural_writes_clear_everything() {
        for attr in ["display", "float", "position", "tagName"] {
            let inv = invalidation_for(attr);
            assert_eq!(inv.propagation, Propagation::Structural, "attr {attr}");
            assert_eq!(inv.slots, CacheSlots::all(), "attr {attr}");
        }
    }

    #[test]
    fn unknown_attributes_clear_nothing() {
        let inv = invalidation_for("color");
        assert_eq!(inv.slots, CacheSlots::empty());
        assert_eq!(inv.propagation, Propagation::None);
    }

    #[test]
    fn display_covers_every_flow_predicate() {
        let inv = invalidation_for("display");
        assert!(inv.slots.contains(CacheSlots::BLOCK_STATIC));
        assert!(inv.slots.contains(CacheSlots::PAGE_FLOW));
        assert!(inv.slots.contains(CacheSlots::FLOATING));
        assert!(inv.slots.contains(CacheSlots::INLINE_STATIC));
    }
}
