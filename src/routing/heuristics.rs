//! Distance estimates between grid cells.

use std::f64::consts::SQRT_2;

use super::types::GridPoint;

#[inline]
fn deltas(a: GridPoint, b: GridPoint) -> (f64, f64) {
    ((b.x - a.x).abs() as f64, (b.y - a.y).abs() as f64)
}

#[inline]
pub fn manhattan(a: GridPoint, b: GridPoint) -> f64 {
    let (dx, dy) = deltas(a, b);
    dx + dy
}

#[inline]
pub fn euclidean(a: GridPoint, b: GridPoint) -> f64 {
    let (dx, dy) = deltas(a, b);
    (dx * dx + dy * dy).sqrt()
}

/// Exact cost of an unobstructed 8-directional walk with diagonal steps
/// costing √2, so it never overestimates.
#[inline]
pub fn octile(a: GridPoint, b: GridPoint) -> f64 {
    let (dx, dy) = deltas(a, b);
    dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: GridPoint = GridPoint::new(1, 2);
    const B: GridPoint = GridPoint::new(4, -2);

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(A, B), 7.0);
    }

    #[test]
    fn test_euclidean() {
        assert_eq!(euclidean(A, B), 5.0);
    }

    #[test]
    fn test_octile() {
        let expected = 4.0 + (SQRT_2 - 1.0) * 3.0;
        assert!((octile(A, B) - expected).abs() < 1e-12);
        assert_eq!(octile(A, A), 0.0);
        assert_eq!(octile(A, B), octile(B, A));
    }

    #[test]
    fn test_ordering_between_heuristics() {
        let b = GridPoint::new(9, 7);
        assert!(euclidean(A, b) <= octile(A, b));
        assert!(octile(A, b) <= manhattan(A, b));
    }
}
