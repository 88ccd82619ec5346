// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public identifier and flag types for nodes and sessions.

/// Identifier for one parse session.
///
/// Sessions sharing a process are distinguished by this id, which the host
/// chooses when it builds the session. Node ids are meaningful only within
/// the session that assigned them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(u32);

impl SessionId {
    /// Create a session id from a raw value chosen by the host.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw value this id was created from.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Identifier for a node within a session.
///
/// Ids are dense arena indices, assigned monotonically in traversal order and
/// never reused within a session. Their `Ord` is creation order, which is the
/// deterministic tie-break used throughout the query and grouping code.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Lifecycle and classification state of a node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeState: u8 {
        /// The grouping pass has placed this node in a run or group.
        const RENDERED   = 0b0000_0001;
        /// No valid render ancestor was found; excluded from output.
        const HIDDEN     = 0b0000_0010;
        /// The host could not supply a rectangle; bounds are zero.
        const UNMEASURED = 0b0000_0100;
        /// A text run rather than an element.
        const TEXT       = 0b0000_1000;
        /// A synthetic group created by the grouping pass.
        const GROUP      = 0b0001_0000;
        /// A forced line break (`br`), which participates in page flow.
        const LINE_BREAK = 0b0010_0000;
    }
}

impl NodeState {
    /// The bits cleared by [`Session::unset_state`](crate::Session::unset_state).
    ///
    /// `TEXT`, `GROUP`, and `LINE_BREAK` are structural facts and survive;
    /// the rest are transient pass results.
    pub(crate) const TRANSIENT: Self = Self::RENDERED
        .union(Self::HIDDEN)
        .union(Self::UNMEASURED);
}

bitflags::bitflags! {
    /// Which margins of a node resolve to `auto`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AutoMargin: u8 {
        /// `margin-left: auto`.
        const LEFT   = 0b0000_0001;
        /// `margin-right: auto`.
        const RIGHT  = 0b0000_0010;
        /// `margin-top: auto`.
        const TOP    = 0b0000_0100;
        /// `margin-bottom: auto`.
        const BOTTOM = 0b0000_1000;
    }
}

impl AutoMargin {
    /// Both horizontal margins are auto (the element centers itself).
    #[must_use]
    pub const fn horizontal(self) -> bool {
        self.contains(Self::LEFT.union(Self::RIGHT))
    }

    /// Both vertical margins are auto.
    #[must_use]
    pub const fn vertical(self) -> bool {
        self.contains(Self::TOP.union(Self::BOTTOM))
    }

    /// At least one horizontal margin is auto.
    #[must_use]
    pub const fn any_horizontal(self) -> bool {
        self.intersects(Self::LEFT.union(Self::RIGHT))
    }
}
