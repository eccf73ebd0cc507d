//! Whole-result memoization.
//!
//! Layout is a pure function of its inputs, so a front end that re-renders on every state
//! change can keep one `LayoutCache` and only pay for a layout when the graph, the center or
//! the options actually changed.

use crate::algo::LayoutOptions;
use crate::graph::{Graph, LayoutResult};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Default)]
pub struct LayoutCache {
    last: Option<(u64, LayoutResult)>,
    hits: usize,
    misses: usize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(
        &mut self,
        graph: &Graph,
        center_id: Option<&str>,
        opts: &LayoutOptions,
    ) -> LayoutResult {
        let key = fingerprint(graph, center_id, opts);
        if let Some((_, result)) = self.last.as_ref().filter(|(k, _)| *k == key) {
            self.hits += 1;
            return result.clone();
        }

        self.misses += 1;
        let result = crate::layout(graph, center_id, opts);
        self.last = Some((key, result.clone()));
        result
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}

/// Order-sensitive digest of a layout request. Reordering nodes or links yields a different
/// key (a cache miss) even though the layout itself would be identical.
pub fn fingerprint(graph: &Graph, center_id: Option<&str>, opts: &LayoutOptions) -> u64 {
    let mut h = FxHasher::default();
    center_id.hash(&mut h);
    h.write_usize(graph.nodes.len());
    for n in &graph.nodes {
        n.id.hash(&mut h);
        h.write_u64(n.cited_by_count);
        n.side.hash(&mut h);
        h.write_u32(n.depth);
        h.write_u64(n.size.to_bits());
    }
    graph.links.hash(&mut h);
    opts.fingerprint(&mut h);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::{LayoutCache, fingerprint};
    use crate::algo::LayoutOptions;
    use crate::graph::{Graph, Link, Node, Side};

    fn graph() -> Graph {
        Graph::new(
            vec![
                Node::new("c", Side::Center).with_depth(0),
                Node::new("r", Side::Backward),
            ],
            vec![Link::references("c", "r")],
        )
    }

    #[test]
    fn repeated_requests_hit_the_cache() {
        let mut cache = LayoutCache::new();
        let opts = LayoutOptions::default();
        let g = graph();

        let first = cache.layout(&g, Some("c"), &opts);
        let second = cache.layout(&g, Some("c"), &opts);
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        cache.layout(&g, Some("r"), &opts);
        assert_eq!(cache.misses(), 2);

        cache.clear();
        cache.layout(&g, Some("r"), &opts);
        assert_eq!(cache.misses(), 3);
    }

    #[test]
    fn fingerprint_tracks_every_input() {
        let opts = LayoutOptions::default();
        let g = graph();
        let base = fingerprint(&g, Some("c"), &opts);

        let mut bigger = g.clone();
        bigger.nodes[1].size = 4.0;
        assert_ne!(base, fingerprint(&bigger, Some("c"), &opts));

        let mut relinked = g.clone();
        relinked.links[0] = Link::cited_by("c", "r");
        assert_ne!(base, fingerprint(&relinked, Some("c"), &opts));

        let tighter = LayoutOptions {
            sibling_gap: 0.1,
            ..LayoutOptions::default()
        };
        assert_ne!(base, fingerprint(&g, Some("c"), &tighter));
        assert_ne!(base, fingerprint(&g, None, &opts));
        assert_eq!(base, fingerprint(&g, Some("c"), &opts));
    }
}
