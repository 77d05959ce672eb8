//! Shared curve geometry for a bundle of edges.

use crate::graph::Point;

use super::clustering::ClusterableEdge;

/// Canvas units of perpendicular bulge per unit of bundle strength.
pub const BULGE_PER_STRENGTH: f64 = 50.0;

/// Three quadratic-curve control points shared by every edge in a cluster:
/// centroid start, bulged midpoint, centroid end.
pub fn create_bundle_control_points(edges: &[&ClusterableEdge], bundle_strength: f64) -> Vec<Point> {
    if edges.is_empty() {
        return Vec::new();
    }

    let count = edges.len() as f64;
    let start = Point::new(
        edges.iter().map(|e| e.start_point.x).sum::<f64>() / count,
        edges.iter().map(|e| e.start_point.y).sum::<f64>() / count,
    );
    let end = Point::new(
        edges.iter().map(|e| e.end_point.x).sum::<f64>() / count,
        edges.iter().map(|e| e.end_point.y).sum::<f64>() / count,
    );

    let mid = start.midpoint(&end);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    let control = if length > f64::EPSILON {
        let offset = bundle_strength * BULGE_PER_STRENGTH;
        Point::new(mid.x - dy / length * offset, mid.y + dx / length * offset)
    } else {
        mid
    };

    vec![start, control, end]
}

/// Lateral offset of the `index`-th of `total` edges, centered on the
/// bundle curve.
#[inline]
pub fn edge_offset(index: usize, total: usize, separation: f64) -> f64 {
    if total <= 1 {
        0.0
    } else {
        (index as f64 - (total - 1) as f64 / 2.0) * separation
    }
}
