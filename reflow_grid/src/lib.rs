// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid extraction: detecting column-aligned repeating structure.
//!
//! [`extract`] inspects a candidate parent and either returns a full
//! [`GridModel`] (cells with row/column positions, spans, and edge flags) or
//! `None`. There is no partial result: any shape conflict aborts cleanly
//! and the caller falls back to ordinary flow treatment.
//!
//! ## Minimal example
//!
//! ```
//! use reflow_node::{Session, SessionId, VecAdapter, VecElement};
//! use reflow_grid::{GridOptions, extract};
//!
//! let mut host = VecAdapter::new();
//! let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 40.0));
//! for r in 0..2 {
//!     let y = f64::from(r) * 20.0;
//!     let row = host.element(VecElement::new("div").bounds(0.0, y, 100.0, y + 20.0));
//!     host.append(root, row);
//!     for c in 0..2 {
//!         let x = f64::from(c) * 50.0;
//!         let cell = host.element(VecElement::new("div").bounds(x, y, x + 50.0, y + 20.0));
//!         host.append(row, cell);
//!     }
//! }
//! let mut session = Session::new(SessionId::new(1));
//! let root_id = session.build(&host, root).unwrap();
//! let grid = extract(&session, root_id, &GridOptions::default()).unwrap();
//! assert_eq!((grid.rows, grid.columns), (2, 2));
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

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use reflow_node::{NodeId, Session};
use smallvec::SmallVec;

/// Extraction tunables.
#[derive(Clone, Copy, Debug)]
pub struct GridOptions {
    /// Left edges closer than this cluster into one column.
    pub column_epsilon: f64,
    /// Fewer detected columns than this aborts the extraction.
    pub min_columns: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            column_epsilon: 2.0,
            min_columns: 2,
        }
    }
}

/// One cell of a detected grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCell {
    pub node: NodeId,
    pub row: usize,
    pub column: usize,
    pub column_span: usize,
    pub row_span: usize,
    /// First or last cell of its row.
    pub row_start: bool,
    pub row_end: bool,
    /// Cell of the first or last row.
    pub first_row: bool,
    pub last_row: bool,
    /// Trailing siblings folded into this cell when they landed on the same
    /// column (sparse-grid compensation).
    pub absorbed: SmallVec<[NodeId; 2]>,
}

/// A complete rectangular grid; spans in every row sum to `columns`.
#[derive(Clone, Debug, PartialEq)]
pub struct GridModel {
    pub rows: usize,
    pub columns: usize,
    /// Clustered column left edges, ascending.
    pub column_edges: Vec<f64>,
    pub cells: Vec<GridCell>,
}

impl GridModel {
    /// Cells of one row, left to right.
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<&GridCell> {
        self.cells.iter().filter(|c| c.row == row).collect()
    }
}

/// Detect a grid under `parent`.
///
/// When every element child is itself a multi-cell row the rows are taken
/// directly (`<table>`-like structure); otherwise the element children are
/// treated as loose cells and bucketed into rows by top edge. Column
/// positions come from clustering cell left edges within
/// [`GridOptions::column_epsilon`]. A cell spanning past the next occupied
/// column, cells out of left-to-right order, or too few columns all abort
/// with `None`, never partial grid data.
#[must_use]
pub fn extract<E>(
    session: &Session<E>,
    parent: NodeId,
    options: &GridOptions,
) -> Option<GridModel>
where
    E: Copy + Eq + Hash + Debug,
{
    let children: Vec<NodeId> = session.natural_elements(parent).to_vec();
    if children.is_empty() {
        return None;
    }
    // Rows may hold a single spanning cell, so "table-like" means every
    // child wraps at least one cell and at least one wraps several.
    let cell_counts: Vec<usize> = children
        .iter()
        .map(|&c| session.natural_elements(c).len())
        .collect();
    let row_like = children.len() > 1
        && cell_counts.iter().all(|&n| n > 0)
        && cell_counts.iter().any(|&n| n > 1);
    let rows: Vec<Vec<NodeId>> = if row_like {
        children
            .iter()
            .map(|&r| session.natural_elements(r).to_vec())
            .collect()
    } else {
        bucket_rows(session, &children, options.column_epsilon)
    };
    if rows.is_empty() {
        return None;
    }

    let mut edges: Vec<f64> = Vec::new();
    for row in &rows {
        for &cell in row {
            edges.push(session.bounds(cell).x0);
        }
    }
    let column_edges = cluster(edges, options.column_epsilon);
    let columns = column_edges.len();
    if columns < options.min_columns {
        return None;
    }

    let row_count = rows.len();
    let mut cells: Vec<GridCell> = Vec::new();
    for (row_index, row) in rows.iter().enumerate() {
        let placed = place_row(session, row, &column_edges, options.column_epsilon)?;
        let total = placed.len();
        for (i, (node, column, absorbed)) in placed.into_iter().enumerate() {
            cells.push(GridCell {
                node,
                row: row_index,
                column,
                // Placeholder; the fix-up below assigns positional spans
                // once every column in the row is known.
                column_span: 1,
                row_span: 1,
                row_start: i == 0,
                row_end: i + 1 == total,
                first_row: row_index == 0,
                last_row: row_index + 1 == row_count,
                absorbed,
            });
        }
    }

    // Fix up spans now that every cell's column is known, and verify the
    // geometry agrees.
    let mut by_row: Vec<Vec<usize>> = alloc::vec![Vec::new(); row_count];
    for (i, cell) in cells.iter().enumerate() {
        by_row[cell.row].push(i);
    }
    for row_cells in &by_row {
        for window in 0..row_cells.len() {
            let this = row_cells[window];
            let next_col = row_cells
                .get(window + 1)
                .map_or(columns, |&n| cells[n].column);
            let span = next_col.checked_sub(cells[this].column)?;
            if span == 0 {
                return None;
            }
            // A cell whose rectangle covers more column starts than its
            // positional span overlaps its right neighbor: width conflict.
            let b = session.bounds(cells[this].node);
            let covered = column_edges
                .iter()
                .filter(|&&e| e >= b.x0 - options.column_epsilon && e < b.x1 - options.column_epsilon)
                .count()
                .max(1);
            if covered > span {
                return None;
            }
            cells[this].column_span = span;
        }
    }

    // Row spans from vertical coverage of the clustered row tops.
    let row_tops: Vec<f64> = rows
        .iter()
        .filter_map(|row| {
            row.iter()
                .map(|&c| session.bounds(c).y0)
                .min_by(f64::total_cmp)
        })
        .collect();
    for cell in &mut cells {
        let b = session.bounds(cell.node);
        let covered = row_tops
            .iter()
            .filter(|&&t| t >= b.y0 - options.column_epsilon && t < b.y1 - options.column_epsilon)
            .count();
        cell.row_span = covered.max(1);
    }

    Some(GridModel {
        rows: row_count,
        columns,
        column_edges,
        cells,
    })
}

/// Bucket loose cells into rows by clustered top edge.
fn bucket_rows<E>(
    session: &Session<E>,
    children: &[NodeId],
    epsilon: f64,
) -> Vec<Vec<NodeId>>
where
    E: Copy + Eq + Hash + Debug,
{
    let tops = cluster(
        children.iter().map(|&c| session.bounds(c).y0).collect(),
        epsilon,
    );
    let mut rows: Vec<Vec<NodeId>> = alloc::vec![Vec::new(); tops.len()];
    for &c in children {
        let y = session.bounds(c).y0;
        if let Some(row) = nearest(&tops, y, epsilon) {
            rows[row].push(c);
        }
    }
    rows.retain(|r| !r.is_empty());
    rows
}

/// Assign a row's cells to columns, left to right.
///
/// A cell landing on the same column as its predecessor is absorbed into
/// it; a cell landing on an earlier column than its predecessor means the
/// row is not left-to-right and the grid is rejected.
type PlacedCell = (NodeId, usize, SmallVec<[NodeId; 2]>);

fn place_row<E>(
    session: &Session<E>,
    row: &[NodeId],
    column_edges: &[f64],
    epsilon: f64,
) -> Option<Vec<PlacedCell>>
where
    E: Copy + Eq + Hash + Debug,
{
    let mut placed: Vec<PlacedCell> = Vec::new();
    for &cell in row {
        let x = session.bounds(cell).x0;
        let column = nearest(column_edges, x, epsilon)?;
        match placed.last_mut() {
            Some(last) if column == last.1 => last.2.push(cell),
            Some(last) if column < last.1 => return None,
            _ => placed.push((cell, column, SmallVec::new())),
        }
    }
    if placed.is_empty() { None } else { Some(placed) }
}

/// Sorted cluster representatives: values within `epsilon` of the running
/// representative share a cluster.
fn cluster(mut values: Vec<f64>, epsilon: f64) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::new();
    for v in values {
        match out.last() {
            Some(&last) if (v - last).abs() <= epsilon => {}
            _ => out.push(v),
        }
    }
    out
}

fn nearest(representatives: &[f64], value: f64, epsilon: f64) -> Option<usize> {
    representatives
        .iter()
        .position(|&r| (value - r).abs() <= epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflow_node::{SessionId, VecAdapter, VecElement};

    /// Build rows of cells given per-row (x0, x1) extents.
    fn grid_session(rows: &[&[(f64, f64)]]) -> (Session, NodeId) {
        let mut host = VecAdapter::new();
        let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 100.0));
        for (r, cells) in rows.iter().enumerate() {
            let y = f64::from(u32::try_from(r).unwrap()) * 20.0;
            let row = host.element(VecElement::new("div").bounds(0.0, y, 100.0, y + 20.0));
            host.append(root, row);
            for &(x0, x1) in *cells {
                let cell = host.element(VecElement::new("div").bounds(x0, y, x1, y + 20.0));
                host.append(row, cell);
            }
        }
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        (session, root_id)
    }

    #[test]
    fn uniform_two_by_two() {
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(0.0, 50.0), (50.0, 100.0)],
        ]);
        let grid = extract(&session, root, &GridOptions::default()).unwrap();
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.columns, 2);
        assert_eq!(grid.cells.len(), 4);
        assert!(grid.cells.iter().all(|c| c.column_span == 1));
        let first = &grid.cells[0];
        assert!(first.row_start && first.first_row && !first.row_end);
    }

    #[test]
    fn spans_sum_to_columns_in_every_row() {
        let (session, root) = grid_session(&[
            &[(0.0, 30.0), (30.0, 60.0), (60.0, 100.0)],
            &[(0.0, 60.0), (60.0, 100.0)],
            &[(0.0, 100.0)],
        ]);
        let grid = extract(&session, root, &GridOptions::default()).unwrap();
        assert_eq!(grid.columns, 3);
        for row in 0..grid.rows {
            let total: usize = grid.row(row).iter().map(|c| c.column_span).sum();
            assert_eq!(total, grid.columns, "row {row}");
        }
        // The wide middle cell spans two columns.
        assert_eq!(grid.row(1)[0].column_span, 2);
    }

    #[test]
    fn sparse_row_absorbs_trailing_empty_columns() {
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(0.0, 40.0)],
        ]);
        let grid = extract(&session, root, &GridOptions::default()).unwrap();
        // The lone second-row cell is narrow, but its positional span
        // stretches across the unoccupied trailing column.
        assert_eq!(grid.row(1)[0].column_span, 2);
        assert!(grid.row(1)[0].row_end);
    }

    #[test]
    fn full_width_single_cell_row_stays_a_row() {
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(0.0, 100.0)],
        ]);
        let grid = extract(&session, root, &GridOptions::default()).unwrap();
        assert_eq!(grid.rows, 2);
        let footer = grid.row(1);
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].column_span, 2);
        assert!(footer[0].row_start && footer[0].row_end);
    }

    #[test]
    fn same_column_siblings_are_absorbed() {
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(0.0, 50.0), (1.0, 50.0), (50.0, 100.0)],
        ]);
        let grid = extract(&session, root, &GridOptions::default()).unwrap();
        let second = grid.row(1);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].absorbed.len(), 1);
    }

    #[test]
    fn width_conflict_aborts_with_no_data() {
        // The first cell reaches across its neighbor's column start.
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(0.0, 80.0), (50.0, 100.0)],
        ]);
        assert!(extract(&session, root, &GridOptions::default()).is_none());
    }

    #[test]
    fn out_of_order_row_aborts() {
        let (session, root) = grid_session(&[
            &[(0.0, 50.0), (50.0, 100.0)],
            &[(50.0, 100.0), (0.0, 50.0)],
        ]);
        assert!(extract(&session, root, &GridOptions::default()).is_none());
    }

    #[test]
    fn single_column_is_not_a_grid() {
        let (session, root) = grid_session(&[&[(0.0, 100.0)], &[(0.0, 100.0)]]);
        assert!(extract(&session, root, &GridOptions::default()).is_none());
    }

    #[test]
    fn loose_children_bucket_into_rows_by_top_edge() {
        let mut host = VecAdapter::new();
        let root = host.element(VecElement::new("div").bounds(0.0, 0.0, 100.0, 40.0));
        for (x0, y0) in [(0.0, 0.0), (50.0, 0.0), (0.0, 20.0), (50.0, 20.0)] {
            let cell =
                host.element(VecElement::new("div").bounds(x0, y0, x0 + 50.0, y0 + 20.0));
            host.append(root, cell);
        }
        let mut session = Session::new(SessionId::new(1));
        let root_id = session.build(&host, root).unwrap();
        let grid = extract(&session, root_id, &GridOptions::default()).unwrap();
        assert_eq!((grid.rows, grid.columns), (2, 2));
        assert_eq!(grid.cells.len(), 4);
    }
}
