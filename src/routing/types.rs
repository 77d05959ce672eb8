//! Value types shared by the routing pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouterError};
use crate::graph::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Search-tree node. `parent` indexes into the arena owned by the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    pub point: GridPoint,
    pub g: f64,
    pub h: f64,
    pub f: f64,
    pub parent: Option<usize>,
}

/// Outcome of a single grid search.
#[derive(Debug, Clone, PartialEq)]
pub struct PathfindingResult {
    pub path: Vec<GridPoint>,
    pub found: bool,
    /// Accumulated step cost; infinity when nothing was found.
    pub cost: f64,
    pub nodes_explored: usize,
}

impl PathfindingResult {
    pub fn not_found(nodes_explored: usize) -> Self {
        Self {
            path: Vec::new(),
            found: false,
            cost: f64::INFINITY,
            nodes_explored,
        }
    }
}

/// Post-processing tier applied to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathQuality {
    Fast,
    #[default]
    Balanced,
    Smooth,
}

impl PathQuality {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fast" => Some(Self::Fast),
            "balanced" => Some(Self::Balanced),
            "smooth" => Some(Self::Smooth),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::from_str(s).ok_or_else(|| RouterError::UnknownQuality(s.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Smooth => "smooth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDebug {
    pub grid_path: Vec<GridPoint>,
    pub nodes_explored: usize,
    pub cached: bool,
    pub quality: PathQuality,
}

/// A routed edge in canvas space, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub waypoints: Vec<Point>,
    pub found: bool,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<PathDebug>,
}

impl EdgePath {
    /// Straight segment returned when no route exists.
    pub fn straight(start: Point, end: Point, nodes_explored: usize, quality: PathQuality) -> Self {
        Self {
            waypoints: vec![start, end],
            found: false,
            cost: f64::INFINITY,
            debug: Some(PathDebug {
                grid_path: Vec::new(),
                nodes_explored,
                cached: false,
                quality,
            }),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.debug.as_ref().is_some_and(|d| d.cached)
    }

    /// Total polyline length in canvas units.
    pub fn length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }
}
