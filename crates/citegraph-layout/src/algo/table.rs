use crate::graph::Node;
use rustc_hash::FxHashMap;

/// Distinct nodes in canonical (ascending id) order, addressed by index.
///
/// Every later stage works on indices into this table, so the outcome never depends on the
/// order in which the caller listed nodes.
#[derive(Debug)]
pub(crate) struct NodeTable<'a> {
    pub(crate) nodes: Vec<&'a Node>,
    id_to_idx: FxHashMap<&'a str, usize>,
}

impl<'a> NodeTable<'a> {
    pub(crate) fn from_nodes(input: &'a [Node]) -> Self {
        let mut first: FxHashMap<&'a str, &'a Node> = FxHashMap::default();
        first.reserve(input.len());
        for n in input {
            if first.contains_key(n.id.as_str()) {
                tracing::warn!(id = %n.id, "ignoring duplicate node record");
                continue;
            }
            first.insert(n.id.as_str(), n);
        }

        let mut nodes: Vec<&'a Node> = first.into_values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut id_to_idx: FxHashMap<&'a str, usize> = FxHashMap::default();
        id_to_idx.reserve(nodes.len());
        for (idx, n) in nodes.iter().enumerate() {
            id_to_idx.insert(n.id.as_str(), idx);
        }

        Self { nodes, id_to_idx }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }
}
