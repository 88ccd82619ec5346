// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reflow Node: sessions, nodes, and lazily cached box-model geometry.
//!
//! Reflow recomputes an independent box model over an already-rendered markup
//! tree so the tree can be regrouped and re-emitted as native UI containers.
//! This crate is the foundation: it owns the per-session node arena, the raw
//! style map for each node, and every derived geometric or classification
//! value, all computed lazily and invalidated precisely on write.
//!
//! The core concepts are:
//!
//! - [`Session`]: an arena of nodes built from one snapshot of a rendered
//!   tree. Node ids are dense, monotonically assigned, and never reused
//!   within a session. Independent sessions (distinguished by [`SessionId`])
//!   share no mutable state.
//! - [`SourceAdapter`]: the seam to the host measurement layer. The adapter
//!   supplies tag names, attributes, the resolved style map, and one
//!   authoritative bounding rectangle per element; the session snapshots all
//!   of it during [`Session::build`].
//! - Three rectangles per node: *bounds* (measured ground truth), *box*
//!   (bounds minus border and padding), and *linear* (bounds plus margin).
//!   Box and linear are pure functions of bounds plus style and are memoized
//!   in a per-node cache guarded by [`CacheSlots`] validity bits.
//! - An explicit invalidation table ([`invalidation_for`]) mapping each
//!   writable style property to the cache slots it dirties and a propagation
//!   rule, evaluated by the session on every [`Session::css_set`].
//! - Classification predicates ([`Session::block_static`],
//!   [`Session::page_flow`], [`Session::floating`], …) encoding the
//!   formatting-context decision table the grouping pass relies on.
//!
//! ## Dual-tree model
//!
//! Every node carries two distinct sets of tree relations. The *natural*
//! tree (DOM order, set once at build time) is immutable. The *render* tree
//! (`parent` / render children / depth / child index) starts as a mirror of
//! the natural tree and diverges as the grouping pass reparents nodes into
//! synthetic groups. The two are never conflated: natural accessors always
//! answer from the snapshot, render accessors from the current placement.
//!
//! ## Minimal example
//!
//! ```rust
//! use reflow_node::{Session, SessionId, VecAdapter, VecElement};
//!
//! // A tiny host tree: one block parent with one child.
//! let mut host = VecAdapter::new();
//! let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 60.0));
//! let child = host.element(
//!     VecElement::new("span")
//!         .bounds(0.0, 0.0, 40.0, 20.0)
//!         .style("display", "inline"),
//! );
//! host.append(root, child);
//!
//! let mut session = Session::new(SessionId::new(1));
//! let node = session.build(&host, root).unwrap();
//! assert_eq!(session.tag_name(node), Some("div"));
//! assert_eq!(session.natural_children(node).len(), 1);
//! assert_eq!(session.bounds(node).width(), 100.0);
//! ```
//!
//! Measurement failures never abort a build: an element without a
//! retrievable rectangle is given zero-size bounds and flagged
//! [`NodeState::UNMEASURED`].
//!
//! This crate is `no_std` and uses `alloc`.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![no_std]

extern crate alloc;

mod adapter;
mod cache;
mod invalidate;
mod preload;
mod session;
mod style;
mod types;

pub use adapter::{SourceAdapter, VecAdapter, VecElement};
pub use cache::{CacheSlots, DerivedCache, Sides};
pub use invalidate::{Invalidation, Propagation, invalidation_for};
pub use preload::{AssetId, PreloadError, PreloadReport};
pub use session::Session;
pub use style::{Clear, Display, Float, Position, parse_length};
pub use types::{AutoMargin, NodeId, NodeState, SessionId};
