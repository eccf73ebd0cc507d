#![forbid(unsafe_code)]

//! Headless, deterministic 3D layout for citation graphs.
//!
//! A focal paper sits at the origin; papers it references grow as a tree toward negative x,
//! papers citing it grow toward positive x. Anchor positions come from the tree walk and are
//! then relaxed in the (y, z) plane until node spheres stop overlapping or the iteration
//! budget is spent. Identical inputs always produce identical positions, regardless of the
//! order in which nodes and links are listed.

pub mod algo;
pub mod cache;
pub mod error;
pub mod graph;
pub mod links;

pub use algo::{LayoutOptions, RelaxOptions};
pub use cache::LayoutCache;
pub use error::{Error, Result};
pub use graph::{
    Bucket, Graph, LayoutResult, LayoutStats, Link, LinkKind, Node, Position, PositionMap, Side,
};
pub use links::{LinkSegment, resolve_links};

/// Lays out `graph` around `center_id`.
///
/// Never fails: a missing or unknown center yields an empty result and every other distinct
/// node id gets exactly one position. Options rejected by [`LayoutOptions::validate`] are
/// replaced by [`LayoutOptions::default`].
pub fn layout(graph: &Graph, center_id: Option<&str>, options: &LayoutOptions) -> LayoutResult {
    algo::engine::layout(graph, center_id, options)
}

/// Tree-derived anchor positions, before collision relaxation.
pub fn anchors(graph: &Graph, center_id: Option<&str>, options: &LayoutOptions) -> PositionMap {
    algo::engine::anchors(graph, center_id, options)
}
