//! Node and edge records supplied by the editor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, RouterError};

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Standard,
    /// Diamond-shaped decision node, approximated by its bounding square.
    Conditional,
}

impl NodeKind {
    /// Fixed rendered size `(width, height)` in canvas units.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            Self::Standard => (120.0, 60.0),
            Self::Conditional => (80.0, 80.0),
        }
    }
}

/// A node placed on the canvas. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, x: f64, y: f64, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            kind,
        }
    }

    pub fn size(&self) -> (f64, f64) {
        self.kind.dimensions()
    }

    /// Connection anchor on the middle of the right edge (outgoing side).
    pub fn right_center(&self) -> Point {
        let (w, h) = self.size();
        Point::new(self.x + w, self.y + h / 2.0)
    }

    /// Connection anchor on the middle of the left edge (incoming side).
    pub fn left_center(&self) -> Point {
        let (_, h) = self.size();
        Point::new(self.x, self.y + h / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl EdgeRecord {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A full graph snapshot as exchanged with the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphInput {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn node_lookup(&self) -> HashMap<&str, &NodeRecord> {
        self.nodes.iter().map(|n| (n.id.as_str(), n)).collect()
    }

    /// Resolve both endpoints of an edge.
    pub fn endpoints(&self, edge: &EdgeRecord) -> Result<(&NodeRecord, &NodeRecord)> {
        let find = |id: &str| {
            self.nodes
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| RouterError::UnknownNode(id.to_string()))
        };
        Ok((find(&edge.source)?, find(&edge.target)?))
    }
}
