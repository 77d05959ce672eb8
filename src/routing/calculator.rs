//! Edge routing service: anchors, caching, batched grid updates.

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::graph::{EdgeRecord, GraphInput, NodeRecord, Point};

use super::astar::SearchConfig;
use super::cache::{CacheConfig, CacheKey, CacheStats, PathfindingCache};
use super::grid::{GridConfig, GridSystem};
use super::quality::QualityAwarePathfinder;
use super::scheduler::UpdateScheduler;
use super::types::{EdgePath, GridPoint, PathDebug, PathQuality};

/// How far (in cells) an anchor may be nudged to leave an obstacle.
const MAX_CLEARANCE_RADIUS: i32 = 5;

const CLEARANCE_DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorConfig {
    pub grid: GridConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    /// Quiet period before a batch of node updates is applied.
    pub debounce_ms: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            search: SearchConfig::default(),
            cache: CacheConfig::default(),
            debounce_ms: 50.0,
        }
    }
}

/// Per-session routing choices, passed explicitly to each route request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    pub quality: PathQuality,
}

/// One routed edge of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub edge_id: String,
    #[serde(flatten)]
    pub path: EdgePath,
}

/// Routes edges between nodes around the other nodes on the canvas.
///
/// Owns the obstacle grid, the route cache and the pending update batch
/// for one editing session.
pub struct EdgeCalculator {
    grid: GridSystem,
    cache: PathfindingCache,
    finder: QualityAwarePathfinder,
    scheduler: UpdateScheduler,
    clock: Box<dyn Clock>,
}

impl Default for EdgeCalculator {
    fn default() -> Self {
        Self::new(CalculatorConfig::default())
    }
}

impl EdgeCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: CalculatorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            grid: GridSystem::new(config.grid),
            cache: PathfindingCache::new(config.cache),
            finder: QualityAwarePathfinder::new(config.search),
            scheduler: UpdateScheduler::new(config.debounce_ms),
            clock,
        }
    }

    pub fn grid(&self) -> &GridSystem {
        &self.grid
    }

    /// Direct grid access. Any obstacle change bumps the grid version,
    /// so cached routes are not served afterwards.
    pub fn grid_mut(&mut self) -> &mut GridSystem {
        &mut self.grid
    }

    /// Replace all obstacles right away, dropping any pending batch.
    pub fn set_nodes(&mut self, nodes: &[NodeRecord]) {
        self.scheduler.cancel();
        self.grid.update_nodes(nodes);
        self.cache.clear();
    }

    /// Queue moved nodes; the grid is rebuilt once the burst settles.
    pub fn update_nodes_batch(&mut self, nodes: &[NodeRecord]) {
        let now = self.clock.now_ms();
        self.scheduler.schedule(nodes, now);
    }

    pub fn has_pending_updates(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Apply the pending batch if its debounce delay has elapsed.
    pub fn poll_updates(&mut self) -> bool {
        let now = self.clock.now_ms();
        match self.scheduler.poll(now) {
            Some(batch) => {
                self.apply_batch(&batch);
                true
            }
            None => false,
        }
    }

    /// Apply the pending batch now.
    pub fn flush_updates(&mut self) -> bool {
        match self.scheduler.flush() {
            Some(batch) => {
                self.apply_batch(&batch);
                true
            }
            None => false,
        }
    }

    fn apply_batch(&mut self, batch: &[NodeRecord]) {
        tracing::debug!(nodes = batch.len(), "applying batched node updates");
        self.grid.upsert_nodes(batch);
        self.cache.clear();
    }

    /// Drop a node's obstacle, its cached routes, and any queued move for it.
    pub fn remove_node(&mut self, node_id: &str) {
        self.scheduler.forget(node_id);
        self.cache.invalidate_node(node_id);
        self.grid.remove_node_obstacle(node_id);
    }

    /// Route from the source's right-center to the target's left-center.
    ///
    /// Successful routes are cached per `(source, target, quality)` until the
    /// grid changes or the entry expires. Failures are never cached.
    pub fn calculate_path(
        &mut self,
        source: &NodeRecord,
        target: &NodeRecord,
        quality: PathQuality,
    ) -> EdgePath {
        self.poll_updates();

        let key = CacheKey::new(&source.id, &target.id, quality);
        let now = self.clock.now_ms();
        let version = self.grid.version();

        if let Some(mut hit) = self.cache.get(&key, version, now) {
            tracing::trace!(source = %source.id, target = %target.id, "route cache hit");
            if let Some(debug) = hit.debug.as_mut() {
                debug.cached = true;
            }
            return hit;
        }

        let path = self.route_between(source.right_center(), target.left_center(), quality);
        if path.found {
            self.cache.insert(key, path.clone(), version, now);
        } else {
            tracing::warn!(source = %source.id, target = %target.id, "no route found, using straight line");
        }
        path
    }

    /// Route between two canvas points without touching the cache.
    pub fn route_between(&self, start: Point, end: Point, quality: PathQuality) -> EdgePath {
        let start_cell = self.clear_cell_near(self.grid.canvas_to_grid(start));
        let end_cell = self.clear_cell_near(self.grid.canvas_to_grid(end));

        let result = self.finder.find_path(&self.grid, start_cell, end_cell, quality);
        if !result.found {
            return EdgePath::straight(start, end, result.nodes_explored, quality);
        }

        let mut waypoints = Vec::with_capacity(result.path.len() + 2);
        waypoints.push(start);
        waypoints.extend(result.path.iter().map(|&p| self.grid.grid_to_canvas(p)));
        waypoints.push(end);

        EdgePath {
            waypoints: remove_collinear(&waypoints),
            found: true,
            cost: result.cost,
            debug: Some(PathDebug {
                grid_path: result.path,
                nodes_explored: result.nodes_explored,
                cached: false,
                quality,
            }),
        }
    }

    /// Route every edge of `graph`. Edges with unknown endpoints are skipped.
    pub fn route_all(&mut self, graph: &GraphInput, quality: PathQuality) -> Vec<RoutedEdge> {
        let lookup = graph.node_lookup();
        graph
            .edges
            .iter()
            .filter_map(|edge: &EdgeRecord| {
                let (Some(source), Some(target)) =
                    (lookup.get(edge.source.as_str()), lookup.get(edge.target.as_str()))
                else {
                    tracing::warn!(edge = %edge.id, "edge references an unknown node");
                    return None;
                };
                Some(RoutedEdge {
                    edge_id: edge.id.clone(),
                    path: self.calculate_path(source, target, quality),
                })
            })
            .collect()
    }

    /// Nearest free cell, searched ring by ring along the eight directions.
    /// Falls back to `cell` itself when nothing free is in reach.
    fn clear_cell_near(&self, cell: GridPoint) -> GridPoint {
        if !self.grid.is_obstacle(cell) {
            return cell;
        }
        (1..=MAX_CLEARANCE_RADIUS)
            .flat_map(|r| CLEARANCE_DIRECTIONS.iter().map(move |&(dx, dy)| cell.offset(dx * r, dy * r)))
            .find(|&candidate| !self.grid.is_obstacle(candidate))
            .unwrap_or(cell)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats(self.grid.version())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn invalidate_node(&mut self, node_id: &str) -> usize {
        self.cache.invalidate_node(node_id)
    }

    /// Cancel pending updates and drop cached routes.
    pub fn dispose(&mut self) {
        self.scheduler.cancel();
        self.cache.clear();
    }
}

/// Drop interior points lying on the line through their kept neighbors.
pub fn remove_collinear(points: &[Point]) -> Vec<Point> {
    const EPSILON: f64 = 1e-6;

    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut out = vec![points[0]];
    for i in 1..points.len() - 1 {
        let a = out[out.len() - 1];
        let (b, c) = (points[i], points[i + 1]);
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross.abs() > EPSILON {
            out.push(b);
        }
    }
    out.push(points[points.len() - 1]);
    out
}
