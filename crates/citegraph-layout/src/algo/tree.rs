//! Anchor placement: two diverging trees grown from the center.
//!
//! `references` children grow toward negative x, `cited_by` children toward positive x, one
//! `depth_spacing` per level. Siblings are stacked along y around their parent's slot; z gets a
//! small per-id jitter. A node reachable along several paths keeps the first slot it was given.

use super::LayoutOptions;
use super::hash::unit_hash;
use super::order::sort_indices;
use super::table::NodeTable;
use crate::graph::{Link, LinkKind, Position};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};

type ChildIndex = FxHashMap<(usize, LinkKind), IndexSet<usize, FxBuildHasher>>;

#[derive(Debug, Clone, Copy)]
struct Branch {
    kind: LinkKind,
    sign: f64,
}

// Backward first: on a node reachable both ways the references branch claims it.
const BRANCHES: [Branch; 2] = [
    Branch {
        kind: LinkKind::References,
        sign: -1.0,
    },
    Branch {
        kind: LinkKind::CitedBy,
        sign: 1.0,
    },
];

#[derive(Debug, Clone)]
pub(crate) struct Placement {
    pub(crate) anchors: Vec<Position>,
    pub(crate) tree_placed: usize,
    pub(crate) fallback_placed: usize,
}

pub(crate) fn place(
    table: &NodeTable<'_>,
    links: &[Link],
    center: usize,
    opts: &LayoutOptions,
) -> Placement {
    let mut placer = TreePlacer::new(table, links, opts);
    placer.anchors[center] = Some(Position::ORIGIN);
    for branch in BRANCHES {
        placer.walk(center, branch);
    }
    let tree_placed = placer.anchors.iter().filter(|a| a.is_some()).count();
    let anchors = placer.finish_with_fallback();
    Placement {
        fallback_placed: anchors.len() - tree_placed,
        anchors,
        tree_placed,
    }
}

/// One expanded parent on the depth-first worklist.
#[derive(Debug)]
struct Frame {
    owner: usize,
    depth: u32,
    slots: Vec<(usize, f64)>,
    next: usize,
}

struct TreePlacer<'t, 'a> {
    table: &'t NodeTable<'a>,
    opts: &'t LayoutOptions,
    children: ChildIndex,
    max_depth: u32,
    anchors: Vec<Option<Position>>,
}

impl<'t, 'a> TreePlacer<'t, 'a> {
    fn new(table: &'t NodeTable<'a>, links: &[Link], opts: &'t LayoutOptions) -> Self {
        let mut children: ChildIndex = FxHashMap::default();
        for l in links {
            if l.kind == LinkKind::Unknown {
                continue;
            }
            let Some(parent) = table.index_of(&l.source) else {
                continue;
            };
            let Some(child) = table.index_of(&l.target) else {
                continue;
            };
            children.entry((parent, l.kind)).or_default().insert(child);
        }

        let max_depth = table
            .nodes
            .iter()
            .map(|n| n.depth)
            .max()
            .unwrap_or(0)
            .max(1);

        Self {
            table,
            opts,
            children,
            max_depth,
            anchors: vec![None; table.len()],
        }
    }

    /// Sorted children of `parent` with their stacking-axis slot, centered on `offset`.
    fn sibling_slots(&self, parent: usize, kind: LinkKind, offset: f64) -> Vec<(usize, f64)> {
        let Some(set) = self.children.get(&(parent, kind)) else {
            return Vec::new();
        };
        let mut kids: Vec<usize> = set.iter().copied().collect();
        sort_indices(&mut kids, &self.table.nodes);

        let radii: Vec<f64> = kids
            .iter()
            .map(|&k| self.opts.radius(self.table.nodes[k].size))
            .collect();
        let gaps = self.opts.sibling_gap * kids.len().saturating_sub(1) as f64;
        let span = radii.iter().map(|r| 2.0 * r).sum::<f64>() + gaps;

        let mut cursor = offset - span / 2.0;
        kids.into_iter()
            .zip(radii)
            .map(|(k, r)| {
                let y = cursor + r;
                cursor += 2.0 * r + self.opts.sibling_gap;
                (k, y)
            })
            .collect()
    }

    fn frame(&self, owner: usize, kind: LinkKind, depth: u32, offset: f64) -> Option<Frame> {
        let slots = self.sibling_slots(owner, kind, offset);
        (!slots.is_empty()).then_some(Frame {
            owner,
            depth,
            slots,
            next: 0,
        })
    }

    /// Depth-first walk of one branch. `on_path` marks the ancestors of the frame being
    /// expanded, so a cycle stops at the first repeated node while sibling subtrees stay
    /// independent of each other.
    fn walk(&mut self, root: usize, branch: Branch) {
        let mut on_path = vec![false; self.table.len()];
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.frame(root, branch.kind, 1, 0.0) {
            on_path[root] = true;
            stack.push(frame);
        }

        while let Some(top) = stack.last_mut() {
            let Some(&(child, offset)) = top.slots.get(top.next) else {
                if let Some(done) = stack.pop() {
                    on_path[done.owner] = false;
                }
                continue;
            };
            top.next += 1;
            let depth = top.depth;

            if self.anchors[child].is_none() {
                let id = &self.table.nodes[child].id;
                self.anchors[child] = Some(Position::new(
                    branch.sign * self.opts.depth_spacing * f64::from(depth),
                    offset,
                    (unit_hash(id) - 0.5) * self.opts.tree_jitter,
                ));
            }

            if on_path[child] || depth >= self.max_depth {
                continue;
            }
            if let Some(frame) = self.frame(child, branch.kind, depth + 1, offset) {
                on_path[child] = true;
                stack.push(frame);
            }
        }
    }

    /// Gives every node the walks did not reach a slot derived from its own fields.
    fn finish_with_fallback(self) -> Vec<Position> {
        let nodes = &self.table.nodes;
        let mut unplaced: Vec<usize> = (0..nodes.len())
            .filter(|&i| self.anchors[i].is_none())
            .collect();
        sort_indices(&mut unplaced, nodes);

        let mut anchors = self.anchors;
        for (slot, &idx) in unplaced.iter().enumerate() {
            let n = nodes[idx];
            let column = (slot % self.opts.fallback_columns) as f64;
            anchors[idx] = Some(Position::new(
                n.side.fallback_sign() * f64::from(n.depth.max(1)) * self.opts.depth_spacing,
                column * self.opts.fallback_step - self.opts.fallback_offset,
                (unit_hash(&n.id) - 0.5) * self.opts.fallback_jitter,
            ));
        }

        anchors
            .into_iter()
            .map(|a| a.unwrap_or(Position::ORIGIN))
            .collect()
    }
}
