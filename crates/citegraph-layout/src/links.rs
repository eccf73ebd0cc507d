use crate::graph::{Link, LinkKind, Position, PositionMap};
use serde::Serialize;

/// A link with both endpoints resolved, ready to be drawn as a line segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSegment {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub from: Position,
    pub to: Position,
}

/// Resolves every link through `positions`. Links with a missing endpoint are dropped, the
/// rest keep their input order.
pub fn resolve_links(links: &[Link], positions: &PositionMap) -> Vec<LinkSegment> {
    links
        .iter()
        .filter_map(|l| {
            let from = positions.get(&l.source)?;
            let to = positions.get(&l.target)?;
            Some(LinkSegment {
                source: l.source.clone(),
                target: l.target.clone(),
                kind: l.kind,
                from: *from,
                to: *to,
            })
        })
        .collect()
}
