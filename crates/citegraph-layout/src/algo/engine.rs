use super::LayoutOptions;
use super::relax::{Body, relax};
use super::table::NodeTable;
use super::tree::{Placement, place};
use crate::graph::{Graph, LayoutResult, LayoutStats, PositionMap};
use std::borrow::Cow;

#[derive(Debug, Default, Clone)]
struct LayoutTimings {
    total: std::time::Duration,
    index: std::time::Duration,
    place: std::time::Duration,
    relax: std::time::Duration,
    output: std::time::Duration,
}

fn timing_enabled() -> bool {
    std::env::var("CITEGRAPH_LAYOUT_TIMING").ok().as_deref() == Some("1")
}

/// Options that fail validation are replaced by the defaults.
fn checked(opts: &LayoutOptions) -> Cow<'_, LayoutOptions> {
    match opts.validate() {
        Ok(()) => Cow::Borrowed(opts),
        Err(err) => {
            tracing::warn!(%err, "invalid layout options; falling back to defaults");
            Cow::Owned(LayoutOptions::default())
        }
    }
}

/// Tree placement only, without relaxation.
pub(crate) fn anchors(graph: &Graph, center_id: Option<&str>, opts: &LayoutOptions) -> PositionMap {
    let opts = checked(opts);
    let opts = opts.as_ref();
    let table = NodeTable::from_nodes(&graph.nodes);
    let Some(center) = center_id.and_then(|id| table.index_of(id)) else {
        return PositionMap::new();
    };
    let placement = place(&table, &graph.links, center, opts);
    to_position_map(&table, &placement.anchors)
}

pub(crate) fn layout(graph: &Graph, center_id: Option<&str>, opts: &LayoutOptions) -> LayoutResult {
    let opts = checked(opts);
    let opts = opts.as_ref();
    let timing = timing_enabled();
    let mut timings = LayoutTimings::default();
    let total_start = timing.then(std::time::Instant::now);

    let index_start = timing.then(std::time::Instant::now);
    let table = NodeTable::from_nodes(&graph.nodes);
    if let Some(s) = index_start {
        timings.index = s.elapsed();
    }

    let Some(center) = center_id.and_then(|id| table.index_of(id)) else {
        tracing::debug!(
            center_id = center_id.unwrap_or("<none>"),
            nodes = table.len(),
            "center is not part of the graph; returning an empty layout"
        );
        return LayoutResult::default();
    };

    let place_start = timing.then(std::time::Instant::now);
    let Placement {
        anchors,
        tree_placed,
        fallback_placed,
    } = place(&table, &graph.links, center, opts);
    if let Some(s) = place_start {
        timings.place = s.elapsed();
    }

    let relax_start = timing.then(std::time::Instant::now);
    let bodies: Vec<Body> = table
        .nodes
        .iter()
        .zip(&anchors)
        .enumerate()
        .map(|(idx, (n, &anchor))| Body {
            id: n.id.clone(),
            bucket: n.bucket(),
            radius: opts.radius(n.size),
            pinned: idx == center,
            anchor,
        })
        .collect();
    let outcome = relax(&bodies, &opts.relax);
    if let Some(s) = relax_start {
        timings.relax = s.elapsed();
    }

    let output_start = timing.then(std::time::Instant::now);
    let positions = to_position_map(&table, &outcome.positions);
    if let Some(s) = output_start {
        timings.output = s.elapsed();
    }

    let stats = LayoutStats {
        tree_placed,
        fallback_placed,
        iterations: outcome.iterations,
        converged: outcome.converged,
    };
    tracing::debug!(
        nodes = table.len(),
        links = graph.links.len(),
        tree_placed,
        fallback_placed,
        iterations = stats.iterations,
        converged = stats.converged,
        "citation graph laid out"
    );

    if let Some(s) = total_start {
        timings.total = s.elapsed();
        tracing::info!(
            total = ?timings.total,
            index = ?timings.index,
            place = ?timings.place,
            relax = ?timings.relax,
            output = ?timings.output,
            nodes = table.len(),
            iterations = stats.iterations,
            "layout timing"
        );
    }

    LayoutResult { positions, stats }
}

fn to_position_map(table: &NodeTable<'_>, positions: &[crate::graph::Position]) -> PositionMap {
    table
        .nodes
        .iter()
        .zip(positions)
        .map(|(n, p)| (n.id.clone(), *p))
        .collect()
}
