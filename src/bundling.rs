//! Edge bundling: near-parallel, nearby edges share one offset curve.

pub mod calculator;
pub mod clustering;
pub mod geometry;

pub use calculator::{
    BundleGroup, BundleStats, BundlingSettings, BundlingSettingsUpdate, EdgeBundlingCalculator,
    bundle_stats,
};
pub use clustering::{ClusterableEdge, cluster_similar_edges, direction_difference};
pub use geometry::{create_bundle_control_points, edge_offset};
