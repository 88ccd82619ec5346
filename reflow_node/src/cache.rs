// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node derived-value cache and its validity mask.

use kurbo::Rect;

use crate::types::AutoMargin;

/// Four per-side lengths in logical pixels (left, top, right, bottom).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sides {
    /// Left edge value.
    pub left: f64,
    /// Top edge value.
    pub top: f64,
    /// Right edge value.
    pub right: f64,
    /// Bottom edge value.
    pub bottom: f64,
}

impl Sides {
    /// Sum of the horizontal components.
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of the vertical components.
    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

bitflags::bitflags! {
    /// Validity bits for [`DerivedCache`] fields.
    ///
    /// A set bit means the corresponding cached value is current. The
    /// invalidation table in [`crate::invalidate`] clears exactly the bits
    /// whose derivations depend on a written style property.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CacheSlots: u16 {
        /// Per-side margins.
        const MARGIN        = 1 << 0;
        /// Per-side border widths.
        const BORDER        = 1 << 1;
        /// Per-side padding.
        const PADDING       = 1 << 2;
        /// Composite border+padding extents.
        const CONTENT_BOX   = 1 << 3;
        /// The content rectangle (bounds minus border and padding).
        const BOX_RECT      = 1 << 4;
        /// The margin rectangle (bounds plus margin).
        const LINEAR_RECT   = 1 << 5;
        /// Effective width after style overrides.
        const ACTUAL_WIDTH  = 1 << 6;
        /// Effective height after style overrides.
        const ACTUAL_HEIGHT = 1 << 7;
        /// The `block_static` predicate.
        const BLOCK_STATIC  = 1 << 8;
        /// The `page_flow` predicate.
        const PAGE_FLOW     = 1 << 9;
        /// The `floating` predicate.
        const FLOATING      = 1 << 10;
        /// The `inline_static` predicate.
        const INLINE_STATIC = 1 << 11;
        /// The `auto_margin` side mask.
        const AUTO_MARGIN   = 1 << 12;
        /// The `baseline` predicate.
        const BASELINE      = 1 << 13;
    }
}

impl CacheSlots {
    /// Slots derived from the bounds rectangle; cleared when bounds change.
    pub const RECTS: Self = Self::BOX_RECT
        .union(Self::LINEAR_RECT)
        .union(Self::ACTUAL_WIDTH)
        .union(Self::ACTUAL_HEIGHT);

    /// Slots whose value depends on the height of an ancestor or sibling.
    ///
    /// Cleared on every render child when a parent's dimension changes.
    pub const HEIGHT_DEPENDENT: Self = Self::ACTUAL_HEIGHT
        .union(Self::BOX_RECT)
        .union(Self::LINEAR_RECT);

    /// The flow-classification predicates.
    pub const FLOW: Self = Self::BLOCK_STATIC
        .union(Self::PAGE_FLOW)
        .union(Self::FLOATING)
        .union(Self::INLINE_STATIC)
        .union(Self::BASELINE);
}

/// Memoized derived values for one node.
///
/// Fields are only meaningful while the matching [`CacheSlots`] bit is set;
/// the session recomputes them on first read after invalidation. This is a
/// plain value store: all derivation logic lives on [`crate::Session`] so it
/// can reach sibling and ancestor data.
#[derive(Clone, Debug, Default)]
pub struct DerivedCache {
    /// Which fields below are current.
    pub valid: CacheSlots,
    /// Per-side margins (`auto` contributes `0.0` here; see `auto_margin`).
    pub margin: Sides,
    /// Per-side border widths.
    pub border: Sides,
    /// Per-side padding.
    pub padding: Sides,
    /// Horizontal border+padding extent.
    pub content_box_width: f64,
    /// Vertical border+padding extent.
    pub content_box_height: f64,
    /// Content rectangle.
    pub box_rect: Rect,
    /// Margin rectangle.
    pub linear_rect: Rect,
    /// Effective width.
    pub actual_width: f64,
    /// Effective height.
    pub actual_height: f64,
    /// `block_static` predicate result.
    pub block_static: bool,
    /// `page_flow` predicate result.
    pub page_flow: bool,
    /// `floating` predicate result.
    pub floating: bool,
    /// `inline_static` predicate result.
    pub inline_static: bool,
    /// Which margins were `auto`.
    pub auto_margin: AutoMargin,
    /// `baseline` predicate result.
    pub baseline: bool,
}

impl DerivedCache {
    /// Drop the given slots, forcing recomputation on next read.
    pub fn clear(&mut self, slots: CacheSlots) {
        self.valid.remove(slots);
    }

    /// Drop everything, including the validity of every slot.
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_removes_only_named_slots() {
        let mut cache = DerivedCache::default();
        cache.valid = CacheSlots::MARGIN | CacheSlots::BOX_RECT | CacheSlots::PAGE_FLOW;
        cache.clear(CacheSlots::BOX_RECT);
        assert!(cache.valid.contains(CacheSlots::MARGIN));
        assert!(cache.valid.contains(CacheSlots::PAGE_FLOW));
        assert!(!cache.valid.contains(CacheSlots::BOX_RECT));
    }

    #[test]
    fn default_cache_has_no_valid_slots() {
        let cache = DerivedCache::default();
        assert!(cache.valid.is_empty());
        assert!(cache.auto_margin.is_empty());
    }

    #[test]
    fn composite_slot_sets_cover_their_parts() {
        assert!(CacheSlots::RECTS.contains(CacheSlots::LINEAR_RECT));
        assert!(CacheSlots::HEIGHT_DEPENDENT.contains(CacheSlots::ACTUAL_HEIGHT));
        assert!(CacheSlots::FLOW.contains(CacheSlots::BLOCK_STATIC));
        assert!(!CacheSlots::FLOW.contains(CacheSlots::MARGIN));
    }
}
