//! Quality tiers: one search, three levels of post-processing.

use serde::{Deserialize, Serialize};

use super::astar::{AStarPathfinder, SearchConfig};
use super::grid::GridSystem;
use super::types::{GridPoint, PathQuality, PathfindingResult};

/// Post-processing applied on top of the raw search for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityConfig {
    /// Run the line-of-sight reduction pass.
    pub line_of_sight_smoothing: bool,
    /// Weighted-average passes over interior points.
    pub curve_passes: usize,
    /// Drop waypoints whose neighbors already see each other.
    pub corner_optimization: bool,
    /// Declared greediness of the tier. The search does not read it.
    pub heuristic_weight: f64,
}

impl QualityConfig {
    pub fn for_quality(quality: PathQuality) -> Self {
        match quality {
            PathQuality::Fast => Self {
                line_of_sight_smoothing: false,
                curve_passes: 0,
                corner_optimization: false,
                heuristic_weight: 1.5,
            },
            PathQuality::Balanced => Self {
                line_of_sight_smoothing: true,
                curve_passes: 0,
                corner_optimization: false,
                heuristic_weight: 1.2,
            },
            PathQuality::Smooth => Self {
                line_of_sight_smoothing: true,
                curve_passes: 3,
                corner_optimization: true,
                heuristic_weight: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityAwarePathfinder {
    finder: AStarPathfinder,
}

impl QualityAwarePathfinder {
    pub fn new(search: SearchConfig) -> Self {
        Self {
            finder: AStarPathfinder::new(search),
        }
    }

    pub fn find_path(
        &self,
        grid: &GridSystem,
        start: GridPoint,
        goal: GridPoint,
        quality: PathQuality,
    ) -> PathfindingResult {
        let profile = QualityConfig::for_quality(quality);
        if !profile.line_of_sight_smoothing {
            return self.finder.find_path(grid, start, goal);
        }

        let mut result = self.finder.find_path_with_smoothing(grid, start, goal);
        if !result.found {
            return result;
        }
        for _ in 0..profile.curve_passes {
            result.path = curve_smoothing_pass(&result.path, grid);
        }
        if profile.corner_optimization {
            result.path = optimize_corners(&result.path, grid);
        }
        result
    }
}

/// Pull each interior point toward its neighbors with a 1-2-1 weighting.
///
/// A moved point is kept only if its cell is free and both adjoining
/// segments stay in sight; otherwise the original point stays.
pub fn curve_smoothing_pass(path: &[GridPoint], grid: &GridSystem) -> Vec<GridPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut out = Vec::with_capacity(path.len());
    out.push(path[0]);
    for i in 1..path.len() - 1 {
        let prev = out[out.len() - 1];
        let (cur, next) = (path[i], path[i + 1]);
        let candidate = GridPoint::new(
            ((path[i - 1].x + 2 * cur.x + next.x) as f64 / 4.0).round() as i32,
            ((path[i - 1].y + 2 * cur.y + next.y) as f64 / 4.0).round() as i32,
        );
        let accepted = !grid.is_obstacle(candidate)
            && grid.has_line_of_sight(prev, candidate)
            && grid.has_line_of_sight(candidate, next);
        out.push(if accepted { candidate } else { cur });
    }
    out.push(path[path.len() - 1]);
    out.dedup();
    out
}

/// Remove waypoints that can be skipped without losing line of sight.
pub fn optimize_corners(path: &[GridPoint], grid: &GridSystem) -> Vec<GridPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut out = vec![path[0]];
    for i in 1..path.len() - 1 {
        let last = out[out.len() - 1];
        if !grid.has_line_of_sight(last, path[i + 1]) {
            out.push(path[i]);
        }
    }
    out.push(path[path.len() - 1]);
    out
}
