//! Backtracing solved searches and line-of-sight waypoint reduction.

use super::grid::GridSystem;
use super::types::{GridPoint, PathNode};

/// Walk parent links from `goal` back to the root and return the path
/// in start-to-goal order.
pub fn reconstruct_path(arena: &[PathNode], goal: usize) -> Vec<GridPoint> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(idx) = current {
        let node = &arena[idx];
        path.push(node.point);
        current = node.parent;
    }
    path.reverse();
    path
}

/// Greedy string-pulling: from each anchor jump to the furthest later
/// point still in direct sight. Every retained segment is obstacle-free.
pub fn smooth_path(path: &[GridPoint], grid: &GridSystem) -> Vec<GridPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut smoothed = vec![path[0]];
    let mut anchor = 0;
    while anchor < path.len() - 1 {
        let mut next = anchor + 1;
        for candidate in (anchor + 2..path.len()).rev() {
            if grid.has_line_of_sight(path[anchor], path[candidate]) {
                next = candidate;
                break;
            }
        }
        smoothed.push(path[next]);
        anchor = next;
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::grid::NodeObstacle;

    fn gp(x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, y)
    }

    fn node(point: GridPoint, parent: Option<usize>) -> PathNode {
        PathNode {
            point,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            parent,
        }
    }

    #[test]
    fn test_reconstruct_follows_parents() {
        let arena = vec![
            node(gp(0, 0), None),
            node(gp(5, 5), Some(0)),
            node(gp(1, 0), Some(0)),
            node(gp(2, 1), Some(2)),
        ];
        assert_eq!(reconstruct_path(&arena, 3), vec![gp(0, 0), gp(1, 0), gp(2, 1)]);
        assert_eq!(reconstruct_path(&arena, 0), vec![gp(0, 0)]);
    }

    #[test]
    fn test_smooth_collapses_open_path() {
        let grid = GridSystem::default();
        let path: Vec<_> = (0..=10).map(|i| gp(i, i / 2)).collect();
        assert_eq!(smooth_path(&path, &grid), vec![gp(0, 0), gp(10, 5)]);
    }

    #[test]
    fn test_smooth_keeps_short_paths() {
        let grid = GridSystem::default();
        assert_eq!(smooth_path(&[gp(0, 0), gp(3, 3)], &grid).len(), 2);
        assert!(smooth_path(&[], &grid).is_empty());
    }

    #[test]
    fn test_smooth_respects_obstacles() {
        let mut grid = GridSystem::default();
        grid.insert_obstacle(NodeObstacle {
            node_id: "block".into(),
            grid_x: 3,
            grid_y: 0,
            grid_width: 2,
            grid_height: 4,
            padding: 0,
        });
        // Detour below the block, then back up.
        let path = vec![
            gp(0, 2),
            gp(1, 3),
            gp(2, 4),
            gp(3, 4),
            gp(4, 4),
            gp(5, 4),
            gp(6, 3),
            gp(7, 2),
        ];
        let smoothed = smooth_path(&path, &grid);

        assert!(smoothed.len() < path.len());
        assert_eq!(smoothed.first(), Some(&gp(0, 2)));
        assert_eq!(smoothed.last(), Some(&gp(7, 2)));
        for pair in smoothed.windows(2) {
            assert!(grid.has_line_of_sight(pair[0], pair[1]));
        }
    }
}
