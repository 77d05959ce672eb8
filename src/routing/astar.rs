//! A* search over the obstacle grid.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::grid::GridSystem;
use super::heuristics::octile;
use super::reconstruct::{reconstruct_path, smooth_path};
use super::types::{GridPoint, PathNode, PathfindingResult};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Give up after expanding this many cells. `None` searches until the
    /// frontier is exhausted.
    pub max_expansions: Option<usize>,
}

/// Frontier entry pointing into the node arena.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    h: f64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f, then on h so ties favor cells nearer the goal.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AStarPathfinder {
    config: SearchConfig,
}

impl AStarPathfinder {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Shortest 8-connected path from `start` to `goal`.
    ///
    /// The search tree lives only for the duration of the call.
    pub fn find_path(&self, grid: &GridSystem, start: GridPoint, goal: GridPoint) -> PathfindingResult {
        let (Some(start_idx), Some(goal_idx)) = (grid.index_of(start), grid.index_of(goal)) else {
            tracing::trace!(?start, ?goal, "endpoint outside grid");
            return PathfindingResult::not_found(0);
        };
        if grid.is_obstacle(goal) {
            tracing::trace!(?goal, "goal cell is blocked");
            return PathfindingResult::not_found(0);
        }

        let mut arena: Vec<PathNode> = Vec::new();
        let mut best_g = vec![f64::INFINITY; grid.len()];
        let mut closed = vec![false; grid.len()];
        let mut open = BinaryHeap::new();

        let h = octile(start, goal);
        arena.push(PathNode {
            point: start,
            g: 0.0,
            h,
            f: h,
            parent: None,
        });
        best_g[start_idx] = 0.0;
        open.push(OpenEntry { f: h, h, node: 0 });

        let mut explored = 0;

        while let Some(entry) = open.pop() {
            let current = arena[entry.node];
            let Some(cell_idx) = grid.index_of(current.point) else {
                continue;
            };
            if closed[cell_idx] {
                continue;
            }

            if cell_idx == goal_idx {
                let path = reconstruct_path(&arena, entry.node);
                tracing::trace!(explored, cost = current.g, len = path.len(), "path found");
                return PathfindingResult {
                    path,
                    found: true,
                    cost: current.g,
                    nodes_explored: explored,
                };
            }

            closed[cell_idx] = true;
            explored += 1;
            if self.config.max_expansions.is_some_and(|limit| explored > limit) {
                tracing::warn!(explored, "search step budget exhausted");
                return PathfindingResult::not_found(explored);
            }

            for (neighbor, step_cost) in grid.neighbors(current.point) {
                let Some(neighbor_idx) = grid.index_of(neighbor) else {
                    continue;
                };
                if closed[neighbor_idx] {
                    continue;
                }

                let g = current.g + step_cost;
                if g >= best_g[neighbor_idx] {
                    continue;
                }
                best_g[neighbor_idx] = g;

                let h = octile(neighbor, goal);
                arena.push(PathNode {
                    point: neighbor,
                    g,
                    h,
                    f: g + h,
                    parent: Some(entry.node),
                });
                open.push(OpenEntry {
                    f: g + h,
                    h,
                    node: arena.len() - 1,
                });
            }
        }

        tracing::trace!(explored, "frontier exhausted");
        PathfindingResult::not_found(explored)
    }

    /// [`find_path`](Self::find_path) followed by one line-of-sight pass.
    pub fn find_path_with_smoothing(
        &self,
        grid: &GridSystem,
        start: GridPoint,
        goal: GridPoint,
    ) -> PathfindingResult {
        let mut result = self.find_path(grid, start, goal);
        if result.found && result.path.len() > 2 {
            result.path = smooth_path(&result.path, grid);
        }
        result
    }
}
