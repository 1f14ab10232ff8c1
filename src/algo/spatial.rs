//! k-d tree over world-space points.
//!
//! A thin wrapper around kiddo's immutable k-d tree that speaks
//! `nalgebra::Point3` and plain `usize` indices. Range queries are inclusive
//! and exact: the tree is queried with a slightly padded radius and candidates
//! are re-checked with the true Euclidean distance.

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

/// Static spatial index over a point set.
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, 3>,
    points: Vec<Point3<f64>>,
}

impl SpatialIndex {
    /// Build an index, or `None` if `points` is empty.
    pub fn build(points: &[Point3<f64>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let entries: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree = ImmutableKdTree::new_from_slice(&entries);
        Some(Self {
            tree,
            points: points.to_vec(),
        })
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index is empty (never true for a built index).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of all points with `distance(query, p) <= radius`, ascending.
    pub fn within(&self, query: &Point3<f64>, radius: f64) -> Vec<usize> {
        let padded = radius * radius * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let mut found: Vec<usize> = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], padded)
            .into_iter()
            .map(|n| n.item as usize)
            .filter(|&i| (self.points[i] - query).norm() <= radius)
            .collect();
        found.sort_unstable();
        found
    }

    /// Index of the point closest to `query` (ties: lowest index).
    pub fn nearest(&self, query: &Point3<f64>) -> usize {
        let best = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[query.x, query.y, query.z]);
        let best_distance = squared_distance(&self.points[best.item as usize], query);
        // The tree reports one of possibly several equidistant points
        let padded = best_distance * (1.0 + 1e-9) + f64::MIN_POSITIVE;
        let ties = self
            .tree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], padded);
        ties.into_iter()
            .map(|n| n.item as usize)
            .filter(|&i| squared_distance(&self.points[i], query) <= best_distance)
            .min()
            .unwrap_or(best.item as usize)
    }
}

#[inline]
fn squared_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}
