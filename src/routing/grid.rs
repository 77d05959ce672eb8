//! Obstacle grid over the canvas.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use crate::graph::{NodeRecord, Point};

use super::types::GridPoint;

/// Grid geometry, fixed for the lifetime of a [`GridSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub cell_size: f64,
    pub width: usize,
    pub height: usize,
    /// Cells of clearance stamped around every node footprint.
    pub padding: i32,
}

impl GridConfig {
    pub fn for_canvas(canvas_width: f64, canvas_height: f64, cell_size: f64) -> Self {
        Self {
            cell_size,
            width: (canvas_width / cell_size).ceil() as usize,
            height: (canvas_height / cell_size).ceil() as usize,
            padding: 1,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::for_canvas(3000.0, 3000.0, 20.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub is_obstacle: bool,
    /// 1.0 for free cells, infinity for obstacles.
    pub cost: f64,
}

/// Rectangular footprint of one node, in grid cells, before padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeObstacle {
    pub node_id: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub padding: i32,
}

impl NodeObstacle {
    fn contains(&self, p: GridPoint) -> bool {
        let (x_start, x_end) = padded_span(self.grid_x, self.grid_width, self.padding);
        let (y_start, y_end) = padded_span(self.grid_y, self.grid_height, self.padding);
        (x_start..x_end).contains(&p.x) && (y_start..y_end).contains(&p.y)
    }
}

/// Half-open padded range `[start - pad, start + len + pad)`, saturating so
/// far-off nodes never overflow.
fn padded_span(start: i32, len: i32, pad: i32) -> (i32, i32) {
    (
        start.saturating_sub(pad),
        start.saturating_add(len).saturating_add(pad),
    )
}

const NEIGHBOR_OFFSETS: [(i32, i32, f64); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, SQRT_2),
    (1, -1, SQRT_2),
    (-1, 1, SQRT_2),
    (-1, -1, SQRT_2),
];

pub type Neighbors = SmallVec<[(GridPoint, f64); 8]>;

/// Cell grid tracking one padded rectangle per node.
///
/// Every obstacle change rebuilds the whole cell array and bumps
/// [`GridSystem::version`], which is what cached paths are checked against.
#[derive(Debug, Clone)]
pub struct GridSystem {
    config: GridConfig,
    cells: Vec<GridCell>,
    obstacles: HashMap<String, NodeObstacle>,
    version: u64,
}

impl GridSystem {
    pub fn new(config: GridConfig) -> Self {
        let cells = (0..config.height as i32)
            .flat_map(|y| {
                (0..config.width as i32).map(move |x| GridCell {
                    x,
                    y,
                    is_obstacle: false,
                    cost: 1.0,
                })
            })
            .collect();
        Self {
            config,
            cells,
            obstacles: HashMap::new(),
            version: 0,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rebuilds so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn canvas_to_grid(&self, point: Point) -> GridPoint {
        GridPoint::new(
            (point.x / self.config.cell_size).floor() as i32,
            (point.y / self.config.cell_size).floor() as i32,
        )
    }

    /// Center of the cell in canvas space.
    pub fn grid_to_canvas(&self, point: GridPoint) -> Point {
        let half = self.config.cell_size / 2.0;
        Point::new(
            point.x as f64 * self.config.cell_size + half,
            point.y as f64 * self.config.cell_size + half,
        )
    }

    pub fn is_in_bounds(&self, point: GridPoint) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.config.width
            && (point.y as usize) < self.config.height
    }

    pub(crate) fn index_of(&self, point: GridPoint) -> Option<usize> {
        self.is_in_bounds(point)
            .then(|| point.y as usize * self.config.width + point.x as usize)
    }

    pub fn cell(&self, point: GridPoint) -> Option<&GridCell> {
        self.index_of(point).map(|idx| &self.cells[idx])
    }

    /// Cells outside the grid count as blocked.
    pub fn is_obstacle(&self, point: GridPoint) -> bool {
        self.cell(point).is_none_or(|c| c.is_obstacle)
    }

    pub fn cost_at(&self, point: GridPoint) -> f64 {
        self.cell(point).map_or(f64::INFINITY, |c| c.cost)
    }

    /// Traversable 8-connected neighbors with their step cost.
    pub fn neighbors(&self, point: GridPoint) -> Neighbors {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy, base)| {
                let next = point.offset(dx, dy);
                let cell = self.cell(next)?;
                (!cell.is_obstacle).then_some((next, base * cell.cost))
            })
            .collect()
    }

    /// Grid-stepped walk from `from` to `to`, failing on the first blocked cell.
    pub fn has_line_of_sight(&self, from: GridPoint, to: GridPoint) -> bool {
        let (mut x0, mut y0) = (from.x, from.y);
        let (x1, y1) = (to.x, to.y);

        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if self.is_obstacle(GridPoint::new(x0, y0)) {
                return false;
            }
            if x0 == x1 && y0 == y1 {
                return true;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x0 += sx;
            }
            if e2 < dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Footprint of a node in grid cells, padded by the configured clearance.
    pub fn footprint(&self, node: &NodeRecord) -> NodeObstacle {
        let (w, h) = node.size();
        let cell = self.config.cell_size;
        let grid_x = (node.x / cell).floor() as i32;
        let grid_y = (node.y / cell).floor() as i32;
        NodeObstacle {
            node_id: node.id.clone(),
            grid_x,
            grid_y,
            grid_width: (((node.x + w) / cell).ceil() as i32).saturating_sub(grid_x),
            grid_height: (((node.y + h) / cell).ceil() as i32).saturating_sub(grid_y),
            padding: self.config.padding,
        }
    }

    pub fn obstacle(&self, node_id: &str) -> Option<&NodeObstacle> {
        self.obstacles.get(node_id)
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Add or replace the obstacle for `node`, then rebuild.
    pub fn add_node_obstacle(&mut self, node: &NodeRecord) {
        let obstacle = self.footprint(node);
        self.insert_obstacle(obstacle);
    }

    /// Add or replace a precomputed obstacle, then rebuild.
    pub fn insert_obstacle(&mut self, obstacle: NodeObstacle) {
        self.obstacles.insert(obstacle.node_id.clone(), obstacle);
        self.rebuild();
    }

    /// Returns false when no obstacle was stored for `node_id`.
    pub fn remove_node_obstacle(&mut self, node_id: &str) -> bool {
        if self.obstacles.remove(node_id).is_none() {
            return false;
        }
        self.rebuild();
        true
    }

    /// Replace the whole obstacle set with `nodes` in a single rebuild.
    pub fn update_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a NodeRecord>) {
        self.obstacles.clear();
        for node in nodes {
            let obstacle = self.footprint(node);
            self.obstacles.insert(obstacle.node_id.clone(), obstacle);
        }
        self.rebuild();
    }

    /// Add or replace obstacles for `nodes`, keeping all others, in a
    /// single rebuild.
    pub fn upsert_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a NodeRecord>) {
        for node in nodes {
            let obstacle = self.footprint(node);
            self.obstacles.insert(obstacle.node_id.clone(), obstacle);
        }
        self.rebuild();
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        for cell in &mut self.cells {
            cell.is_obstacle = false;
            cell.cost = 1.0;
        }

        for obstacle in self.obstacles.values() {
            let pad = obstacle.padding;
            let (x_start, x_end) = padded_span(obstacle.grid_x, obstacle.grid_width, pad);
            let (y_start, y_end) = padded_span(obstacle.grid_y, obstacle.grid_height, pad);
            let x_start = x_start.max(0);
            let x_end = x_end.min(self.config.width as i32);
            let y_start = y_start.max(0);
            let y_end = y_end.min(self.config.height as i32);

            for y in y_start..y_end {
                for x in x_start..x_end {
                    let idx = y as usize * self.config.width + x as usize;
                    self.cells[idx].is_obstacle = true;
                    self.cells[idx].cost = f64::INFINITY;
                }
            }
        }

        self.version += 1;
        tracing::debug!(
            version = self.version,
            obstacles = self.obstacles.len(),
            "rebuilt obstacle grid"
        );
    }

    /// Node ids whose padded footprint covers `point`.
    pub fn obstacles_at(&self, point: GridPoint) -> Vec<&str> {
        self.obstacles
            .values()
            .filter(|o| o.contains(point))
            .map(|o| o.node_id.as_str())
            .collect()
    }
}

impl Default for GridSystem {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}
