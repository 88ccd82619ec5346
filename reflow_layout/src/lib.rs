// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float/clear grouping over [`reflow_node`] sessions.
//!
//! The grouping pass walks a session's render tree one depth level at a
//! time, cutting each parent's child sequence into axis-consistent runs.
//! Runs longer than one member become a [`Layout`] whose container shape a
//! [`Controller`] decides; float-shaped runs go through a second bucketing
//! pass that materializes synthetic group nodes per float segment. The
//! result is a depth-sorted [`render_list`] ready for an exporter.
//!
//! ## Minimal example
//!
//! ```
//! use reflow_node::{Session, SessionId, VecAdapter, VecElement};
//! use reflow_layout::{
//!     ContainerType, ExtensionSet, FlowController, GroupingOptions, render_list, run,
//! };
//!
//! let mut host = VecAdapter::new();
//! let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 30.0));
//! let a = host.element(
//!     VecElement::new("div").style("display", "block").bounds(0.0, 0.0, 100.0, 10.0),
//! );
//! let b = host.element(
//!     VecElement::new("div").style("display", "block").bounds(0.0, 10.0, 100.0, 30.0),
//! );
//! host.append(root, a);
//! host.append(root, b);
//!
//! let mut session = Session::new(SessionId::new(1));
//! let root_id = session.build(&host, root).unwrap();
//! let layouts = run(
//!     &mut session,
//!     root_id,
//!     &mut FlowController,
//!     &mut ExtensionSet::new(),
//!     &GroupingOptions::default(),
//! );
//! assert!(layouts[0].container().contains(ContainerType::VERTICAL));
//! let list = render_list(&session, &layouts);
//! assert_eq!(list.len(), 3);
//! ```

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

mod extension;
mod float;
mod grouping;
mod layout;
mod linear;
mod render;

pub use extension::{Directive, Extension, ExtensionSet};
pub use float::{FloatBuckets, bucket_floats};
pub use grouping::{Controller, FlowController, GroupingOptions, run};
pub use layout::{Alignment, ContainerType, Layout, LinearData, alignment_of};
pub use linear::classify;
pub use render::{RenderEntry, render_list};
