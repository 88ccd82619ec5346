// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a small synthetic page, run the grouping pass, and print the
//! resulting container structure.
//!
//! The page is a heading over two left-floated tiles, a cleared footer
//! paragraph, and a 2x2 cell area that the grid extractor recognizes.
//!
//! Run:
//! - `cargo run -p reflow_demos --example regroup_page`

use reflow_grid::{GridOptions, extract};
use reflow_layout::{ExtensionSet, FlowController, GroupingOptions, render_list, run};
use reflow_node::{Session, SessionId, VecAdapter, VecElement};
use reflow_query::{QueryMap, query_selector_all};

fn main() {
    let mut host = VecAdapter::new();
    let page = host.element(VecElement::new("body").bounds(0.0, 0.0, 200.0, 200.0));

    let heading = host.element(
        VecElement::new("h1")
            .style("display", "block")
            .bounds(0.0, 0.0, 200.0, 24.0),
    );
    host.append(page, heading);

    // Two floated tiles side by side, then a footer that clears them.
    for (i, x) in [0.0, 100.0].iter().enumerate() {
        let tile = host.element(
            VecElement::new("div")
                .class("tile")
                .attr("data-slot", &format!("{i}"))
                .style("float", "left")
                .bounds(*x, 24.0, x + 100.0, 104.0),
        );
        host.append(page, tile);
    }
    let footer = host.element(
        VecElement::new("p")
            .class("footer")
            .style("display", "block")
            .style("clear", "left")
            .bounds(0.0, 104.0, 200.0, 128.0),
    );
    host.append(page, footer);

    // A detached cell area shaped like a 2x2 grid.
    let cells = host.element(VecElement::new("div").bounds(0.0, 128.0, 200.0, 168.0));
    host.append(page, cells);
    for r in 0..2 {
        let y = 128.0 + f64::from(r) * 20.0;
        let row = host.element(VecElement::new("div").bounds(0.0, y, 200.0, y + 20.0));
        host.append(cells, row);
        for c in 0..2 {
            let x = f64::from(c) * 100.0;
            let cell = host.element(VecElement::new("div").bounds(x, y, x + 100.0, y + 20.0));
            host.append(row, cell);
        }
    }

    let mut session = Session::new(SessionId::new(1));
    let root = session.build(&host, page).expect("page builds");

    // Selector queries run against the natural tree.
    let map = QueryMap::build(&session, root);
    let tiles = query_selector_all(&session, &map, ".tile");
    println!("tiles by class: {tiles:?}");
    let second = query_selector_all(&session, &map, "[data-slot='1']");
    println!("second tile by attribute: {second:?}");

    // Grouping rewrites the render tree and reports the container runs.
    let layouts = run(
        &mut session,
        root,
        &mut FlowController,
        &mut ExtensionSet::new(),
        &GroupingOptions::default(),
    );
    println!("\nmaterialized {} layout(s):", layouts.len());
    for layout in &layouts {
        println!(
            "  parent={} members={:?} container={:?}",
            session.describe(layout.parent()),
            layout.members(),
            layout.container(),
        );
    }

    println!("\nrender list:");
    for entry in render_list(&session, &layouts) {
        let indent = " ".repeat(entry.depth as usize * 2);
        println!(
            "{indent}{} id={:?} container={:?}",
            session.describe(entry.id),
            entry.id,
            entry.container,
        );
    }

    // The cell area round-trips through the grid extractor.
    let cells_node = session.node_of(cells).expect("cells node");
    match extract(&session, cells_node, &GridOptions::default()) {
        Some(grid) => println!("\ngrid: {} rows x {} columns", grid.rows, grid.columns),
        None => println!("\nno grid detected"),
    }
}
