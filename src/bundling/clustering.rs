//! Grouping of near-parallel, nearby edges.

use crate::graph::{EdgeRecord, NodeRecord, Point};

use super::calculator::BundlingSettings;

/// Edge geometry precomputed for similarity tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterableEdge {
    pub edge: EdgeRecord,
    pub start_point: Point,
    pub end_point: Point,
    /// Heading in degrees, normalized to `[0, 360)`.
    pub direction: f64,
    pub length: f64,
    pub mid_point: Point,
}

impl ClusterableEdge {
    pub fn from_points(edge: EdgeRecord, start_point: Point, end_point: Point) -> Self {
        let dx = end_point.x - start_point.x;
        let dy = end_point.y - start_point.y;
        Self {
            edge,
            start_point,
            end_point,
            direction: dy.atan2(dx).to_degrees().rem_euclid(360.0),
            length: start_point.distance(&end_point),
            mid_point: start_point.midpoint(&end_point),
        }
    }

    /// Uses the fixed right-center to left-center anchors.
    pub fn new(edge: EdgeRecord, source: &NodeRecord, target: &NodeRecord) -> Self {
        Self::from_points(edge, source.right_center(), target.left_center())
    }
}

/// Smallest angle between two headings, in degrees.
pub fn direction_difference(a: f64, b: f64) -> f64 {
    let delta = (a - b).abs() % 360.0;
    delta.min(360.0 - delta)
}

pub fn are_similar(a: &ClusterableEdge, b: &ClusterableEdge, settings: &BundlingSettings) -> bool {
    direction_difference(a.direction, b.direction) <= settings.direction_tolerance
        && a.mid_point.distance(&b.mid_point) <= settings.max_bundle_distance
}

/// Single greedy pass: each unused edge seeds a cluster and absorbs every
/// later unused edge similar to it. Clusters below the minimum size are
/// dropped and their edges stay unused by any other seed.
///
/// Returns clusters as indices into `edges`.
pub fn cluster_similar_edges(edges: &[ClusterableEdge], settings: &BundlingSettings) -> Vec<Vec<usize>> {
    let mut used = vec![false; edges.len()];
    let mut clusters = Vec::new();

    for seed in 0..edges.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;

        let mut cluster = vec![seed];
        for other in seed + 1..edges.len() {
            if !used[other] && are_similar(&edges[seed], &edges[other], settings) {
                used[other] = true;
                cluster.push(other);
            }
        }

        if cluster.len() >= settings.min_edges_for_bundle {
            clusters.push(cluster);
        }
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BundlingSettings {
        BundlingSettings {
            min_edges_for_bundle: 2,
            ..BundlingSettings::default()
        }
    }

    fn edge_at(id: &str, origin: Point, degrees: f64, length: f64) -> ClusterableEdge {
        let rad = degrees.to_radians();
        let end = Point::new(origin.x + length * rad.cos(), origin.y + length * rad.sin());
        ClusterableEdge::from_points(EdgeRecord::new(id, "s", "t"), origin, end)
    }

    #[test]
    fn test_geometry() {
        let edge = ClusterableEdge::from_points(
            EdgeRecord::new("e", "a", "b"),
            Point::new(0.0, 0.0),
            Point::new(0.0, -10.0),
        );
        assert!((edge.direction - 270.0).abs() < 1e-9);
        assert_eq!(edge.length, 10.0);
        assert_eq!(edge.mid_point, Point::new(0.0, -5.0));
    }

    #[test]
    fn test_direction_difference_wraps() {
        assert_eq!(direction_difference(350.0, 10.0), 20.0);
        assert_eq!(direction_difference(10.0, 350.0), 20.0);
        assert_eq!(direction_difference(90.0, 270.0), 180.0);
        assert_eq!(direction_difference(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_31_degrees_never_bundled() {
        let origin = Point::new(100.0, 100.0);
        let edges = vec![edge_at("a", origin, 0.0, 200.0), edge_at("b", origin, 31.0, 200.0)];
        let loose = BundlingSettings {
            max_bundle_distance: 10_000.0,
            ..settings()
        };
        assert!(cluster_similar_edges(&edges, &loose).is_empty());
    }

    #[test]
    fn test_29_degrees_bundled_when_close() {
        let origin = Point::new(100.0, 100.0);
        let edges = vec![edge_at("a", origin, 0.0, 60.0), edge_at("b", origin, 29.0, 60.0)];
        assert!(edges[0].mid_point.distance(&edges[1].mid_point) <= settings().max_bundle_distance);
        assert_eq!(cluster_similar_edges(&edges, &settings()), vec![vec![0, 1]]);
    }

    #[test]
    fn test_wraparound_headings_bundle() {
        let origin = Point::new(0.0, 0.0);
        let edges = vec![edge_at("a", origin, 355.0, 100.0), edge_at("b", origin, 10.0, 100.0)];
        assert_eq!(cluster_similar_edges(&edges, &settings()).len(), 1);
    }

    #[test]
    fn test_far_midpoints_not_bundled() {
        let edges = vec![
            edge_at("a", Point::new(0.0, 0.0), 0.0, 100.0),
            edge_at("b", Point::new(0.0, 500.0), 0.0, 100.0),
        ];
        assert!(cluster_similar_edges(&edges, &settings()).is_empty());
    }

    #[test]
    fn test_first_seen_edge_seeds_cluster() {
        // b is similar to both a and c, but a and c are too far apart.
        let edges = vec![
            edge_at("a", Point::new(0.0, 0.0), 0.0, 100.0),
            edge_at("b", Point::new(0.0, 60.0), 0.0, 100.0),
            edge_at("c", Point::new(0.0, 120.0), 0.0, 100.0),
        ];
        let clusters = cluster_similar_edges(&edges, &settings());
        assert_eq!(clusters, vec![vec![0, 1]]);
    }

    #[test]
    fn test_min_size_filters_clusters() {
        let edges = vec![
            edge_at("a", Point::new(0.0, 0.0), 0.0, 100.0),
            edge_at("b", Point::new(0.0, 5.0), 0.0, 100.0),
        ];
        let strict = BundlingSettings {
            min_edges_for_bundle: 3,
            ..settings()
        };
        assert!(cluster_similar_edges(&edges, &strict).is_empty());
    }
}
