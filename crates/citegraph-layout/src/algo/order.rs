use crate::graph::Node;
use std::cmp::Ordering;

/// Sibling order: most-cited first, ties broken by ascending id.
pub fn compare(a: &Node, b: &Node) -> Ordering {
    b.cited_by_count
        .cmp(&a.cited_by_count)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_nodes(nodes: &mut [&Node]) {
    nodes.sort_by(|a, b| compare(a, b));
}

/// Sorts node indices by [`compare`], looking nodes up in `nodes`.
pub(crate) fn sort_indices(indices: &mut [usize], nodes: &[&Node]) {
    indices.sort_by(|&a, &b| compare(nodes[a], nodes[b]));
}
