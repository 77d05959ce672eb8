//! Obstacle-aware edge routing.
//!
//! Nodes are stamped as padded rectangles onto a cell grid, routes are found
//! with 8-connected A* and then thinned according to a [`PathQuality`] tier.
//! [`EdgeCalculator`] ties this together with anchor placement, a route
//! cache and debounced grid rebuilds.

pub mod astar;
pub mod cache;
pub mod calculator;
pub mod grid;
pub mod heuristics;
pub mod quality;
pub mod reconstruct;
pub mod scheduler;
pub mod types;

pub use astar::{AStarPathfinder, SearchConfig};
pub use cache::{CacheConfig, CacheKey, CacheStats, PathfindingCache};
pub use calculator::{CalculatorConfig, EdgeCalculator, RouteOptions, RoutedEdge, remove_collinear};
pub use grid::{GridCell, GridConfig, GridSystem, NodeObstacle};
pub use quality::{QualityAwarePathfinder, QualityConfig};
pub use scheduler::UpdateScheduler;
pub use types::{EdgePath, GridPoint, PathDebug, PathNode, PathQuality, PathfindingResult};
