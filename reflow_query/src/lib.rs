// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A CSS-subset selector engine for [`reflow_node`] sessions.
//!
//! Selectors are parsed into per-segment [`QueryData`] chains and matched
//! right-to-left against a depth-indexed [`QueryMap`] of a subtree. The
//! supported grammar is the practically-used subset: tags, ids, classes,
//! attribute predicates, structural pseudo-classes (including `an+b` forms),
//! recursive `:not(...)`, and the four combinators.
//!
//! Syntax errors are non-fatal: an invalid comma-alternative yields no
//! matches and the remaining alternatives still apply.
//!
//! ## Minimal example
//!
//! ```
//! use reflow_node::{Session, SessionId, VecAdapter, VecElement};
//! use reflow_query::{QueryMap, query_selector_all};
//!
//! let mut host = VecAdapter::new();
//! let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 40.0));
//! let a = host.element(VecElement::new("span").class("hot").bounds(0.0, 0.0, 50.0, 20.0));
//! let b = host.element(VecElement::new("span").bounds(0.0, 20.0, 50.0, 40.0));
//! host.append(root, a);
//! host.append(root, b);
//!
//! let mut session = Session::new(SessionId::new(1));
//! let root_id = session.build(&host, root).unwrap();
//! let map = QueryMap::build(&session, root_id);
//!
//! let hot = query_selector_all(&session, &map, "span.hot");
//! assert_eq!(hot.len(), 1);
//! assert_eq!(query_selector_all(&session, &map, "*").len(), 2);
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

mod matcher;
mod parse;

pub use matcher::{QueryMap, query_selector, query_selector_all};
pub use parse::{
    AttrOp, AttrPredicate, Combinator, Nth, PseudoClass, QueryData, parse_selector,
};
