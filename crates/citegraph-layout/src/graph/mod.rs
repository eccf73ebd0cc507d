use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

mod lenient;

/// A citation graph as handed over by the retrieval layer.
///
/// The center is identified externally; `center_id` is carried here only so that a single JSON
/// document can describe a complete layout request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default, alias = "centerId", skip_serializing_if = "Option::is_none")]
    pub center_id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self {
            center_id: None,
            nodes,
            links,
        }
    }

    pub fn with_center(mut self, center_id: impl Into<String>) -> Self {
        self.center_id = Some(center_id.into());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(
        default,
        alias = "citedByCount",
        deserialize_with = "lenient::cited_by_count"
    )]
    pub cited_by_count: u64,
    #[serde(default)]
    pub side: Side,
    /// Hops from the center along the node's branch. Missing or invalid values read as 1.
    #[serde(default = "lenient::default_depth", deserialize_with = "lenient::depth")]
    pub depth: u32,
    /// Drives the rendered radius. Missing, negative or non-finite values read as 0.
    #[serde(default, deserialize_with = "lenient::size")]
    pub size: f64,
}

impl Node {
    pub fn new(id: impl Into<String>, side: Side) -> Self {
        Self {
            id: id.into(),
            cited_by_count: 0,
            side,
            depth: 1,
            size: 0.0,
        }
    }

    pub fn with_cited_by_count(mut self, count: u64) -> Self {
        self.cited_by_count = count;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = if size.is_finite() && size >= 0.0 {
            size
        } else {
            0.0
        };
        self
    }

    pub fn bucket(&self) -> Bucket {
        self.side.bucket()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Center,
    Backward,
    Forward,
    Both,
    #[default]
    Other,
}

impl Side {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "center" => Self::Center,
            "backward" => Self::Backward,
            "forward" => Self::Forward,
            "both" => Self::Both,
            _ => Self::Other,
        }
    }

    pub fn bucket(self) -> Bucket {
        match self {
            Self::Center => Bucket::Center,
            Self::Backward => Bucket::Left,
            Self::Forward => Bucket::Right,
            Self::Both | Self::Other => Bucket::Other,
        }
    }

    /// Sign of the primary axis used when a node has to be placed without a tree path.
    pub(crate) fn fallback_sign(self) -> f64 {
        match self {
            Self::Backward => -1.0,
            Self::Forward => 1.0,
            _ => 0.0,
        }
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Side::parse).unwrap_or_default())
    }
}

/// Collision group. Only nodes sharing a bucket (or touching the center bucket) are relaxed
/// against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Center,
    Left,
    Right,
    Other,
}

impl Bucket {
    pub fn interacts_with(self, other: Bucket) -> bool {
        self == Bucket::Center || other == Bucket::Center || self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "lenient::id")]
    pub source: String,
    #[serde(deserialize_with = "lenient::id")]
    pub target: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: LinkKind,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }

    pub fn references(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, LinkKind::References)
    }

    pub fn cited_by(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, LinkKind::CitedBy)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// `source` cites `target`; walked along the backward branch.
    References,
    /// `target` cites `source`; walked along the forward branch.
    CitedBy,
    #[default]
    Unknown,
}

impl LinkKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "references" => Self::References,
            "cited_by" | "citedby" => Self::CitedBy,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for LinkKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(LinkKind::parse).unwrap_or_default())
    }
}

/// A point in layout space. `x` is the depth axis, `y` the sibling stacking axis and `z` the
/// jitter axis. Serialized as `[x, y, z]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    pub(crate) fn to_vector(self) -> nalgebra::Vector3<f64> {
        nalgebra::Vector3::new(self.x, self.y, self.z)
    }
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Position> for [f64; 3] {
    fn from(p: Position) -> Self {
        [p.x, p.y, p.z]
    }
}

/// Final id → position mapping, ordered by id so serialized output is stable.
pub type PositionMap = std::collections::BTreeMap<String, Position>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayoutStats {
    /// Nodes positioned by walking a branch from the center (the center included).
    pub tree_placed: usize,
    /// Nodes that had no tree path and received a fallback position.
    pub fallback_placed: usize,
    /// Relaxation iterations that ran.
    pub iterations: usize,
    /// `true` when relaxation ended with an overlap-free pass.
    pub converged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub positions: PositionMap,
    pub stats: LayoutStats,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Position> {
        self.positions.get(id).copied()
    }
}
