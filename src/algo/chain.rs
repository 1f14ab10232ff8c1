//! Cyclic neighbor chain construction.
//!
//! Orders an unordered point set by a greedy nearest-neighbor walk that starts
//! at the point closest to the centroid. For points arranged roughly on a loop
//! (the rim of a quadblock or triblock) the walk follows the loop, which is
//! what the rotation tools in [`super::rotate`] rely on.
//!
//! This is the classic nearest-neighbor TSP heuristic: O(n²), no optimality
//! guarantee, intended for the handful of vertices of a single block.
//!
//! # Example
//!
//! ```
//! use trackverts::algo::chain::build_chain;
//! use nalgebra::Point3;
//!
//! let square = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let chain = build_chain(&square).unwrap();
//! assert_eq!(chain.len(), 4);
//! assert!(chain.is_complete());
//! ```

use nalgebra::Point3;

use crate::error::{Result, VertexError};

/// Default distance below which a point counts as coinciding with the centroid.
pub const DEFAULT_CENTROID_EPSILON: f64 = 1e-5;

/// Options for chain construction.
#[derive(Debug, Clone)]
pub struct ChainOptions {
    /// Points closer than this to the centroid are never chosen as the next
    /// link (the start point may still be one of them).
    pub centroid_epsilon: f64,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            centroid_epsilon: DEFAULT_CENTROID_EPSILON,
        }
    }
}

impl ChainOptions {
    /// Set the centroid exclusion radius.
    pub fn with_centroid_epsilon(mut self, epsilon: f64) -> Self {
        self.centroid_epsilon = epsilon.max(0.0);
        self
    }
}

/// One entry of a chain: an original point index and its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainLink {
    /// Index of the point in the source it was read from.
    pub index: usize,
    /// Position of the point.
    pub position: Point3<f64>,
}

impl ChainLink {
    /// Create a new link.
    #[inline]
    pub fn new(index: usize, position: Point3<f64>) -> Self {
        Self { index, position }
    }
}

/// An ordered sequence of links, each original index appearing at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    links: Vec<ChainLink>,
    total: usize,
    centroid: Point3<f64>,
}

impl Chain {
    /// Build a chain from explicit links, e.g. a user-picked vertex order.
    ///
    /// The centroid is recomputed from the link positions.
    pub fn from_links(links: Vec<ChainLink>) -> Self {
        let positions: Vec<Point3<f64>> = links.iter().map(|l| l.position).collect();
        let centroid = centroid(&positions).unwrap_or_else(Point3::origin);
        Self {
            total: links.len(),
            links,
            centroid,
        }
    }

    /// The links in walk order.
    #[inline]
    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    /// Consume the chain, returning its links.
    #[inline]
    pub fn into_links(self) -> Vec<ChainLink> {
        self.links
    }

    /// Number of links.
    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the chain has no links.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of points the chain was built from.
    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Centroid of the input points.
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        self.centroid
    }

    /// Whether every input point was placed in the chain.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.links.len() == self.total
    }

    /// Original indices in walk order.
    pub fn indices(&self) -> Vec<usize> {
        self.links.iter().map(|l| l.index).collect()
    }

    /// Positions in walk order.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.links.iter().map(|l| l.position).collect()
    }

    /// Return the chain, or [`VertexError::DegenerateChain`] if the walk
    /// stopped early.
    pub fn ensure_complete(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(VertexError::DegenerateChain {
                visited: self.links.len(),
                total: self.total,
            })
        }
    }

    pub(crate) fn with_links(&self, links: Vec<ChainLink>) -> Self {
        Self {
            links,
            total: self.total,
            centroid: self.centroid,
        }
    }
}

/// Arithmetic mean of a point set, or `None` if it is empty.
pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Build a chain with default options.
///
/// See [`build_chain_with_options`].
pub fn build_chain(points: &[Point3<f64>]) -> Result<Chain> {
    build_chain_with_options(points, &ChainOptions::default())
}

/// Order points by a nearest-unvisited-neighbor walk from the point nearest
/// the centroid.
///
/// # Algorithm
///
/// 1. Compute the centroid and start at the point closest to it.
/// 2. From the current point, pick the closest unvisited point, skipping any
///    point within `centroid_epsilon` of the centroid.
/// 3. Repeat until every point is visited or no candidate remains.
///
/// Ties are broken by lowest original index. When candidates run out early
/// (duplicate or centroid-coincident positions) the returned chain is shorter
/// than the input and [`Chain::is_complete`] is `false`.
///
/// # Errors
///
/// Returns [`VertexError::EmptyInput`] if `points` is empty.
pub fn build_chain_with_options(points: &[Point3<f64>], options: &ChainOptions) -> Result<Chain> {
    let center = centroid(points).ok_or(VertexError::EmptyInput)?;
    let n = points.len();

    let mut start = 0;
    let mut best = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = (p - center).norm();
        if d < best {
            best = d;
            start = i;
        }
    }

    let mut visited = vec![false; n];
    visited[start] = true;
    let mut links = Vec::with_capacity(n);
    links.push(ChainLink::new(start, points[start]));

    let mut current = start;
    while links.len() < n {
        let next = closest_unvisited(points, current, &visited, &center, options.centroid_epsilon);
        match next {
            Some(i) => {
                visited[i] = true;
                links.push(ChainLink::new(i, points[i]));
                current = i;
            }
            None => {
                log::warn!(
                    "chain walk stopped after {} of {} points: no reachable candidate",
                    links.len(),
                    n
                );
                break;
            }
        }
    }

    log::debug!("built chain of {} links from {} points (start {})", links.len(), n, start);

    Ok(Chain {
        links,
        total: n,
        centroid: center,
    })
}

fn closest_unvisited(
    points: &[Point3<f64>],
    current: usize,
    visited: &[bool],
    center: &Point3<f64>,
    centroid_epsilon: f64,
) -> Option<usize> {
    let from = &points[current];
    let mut closest = None;
    let mut min_distance = f64::INFINITY;

    for (i, p) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        if (p - center).norm() < centroid_epsilon {
            continue;
        }
        let d = (p - from).norm();
        if d < min_distance {
            min_distance = d;
            closest = Some(i);
        }
    }

    closest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn hexagon() -> Vec<Point3<f64>> {
        (0..6)
            .map(|k| {
                let a = k as f64 * PI / 3.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect()
    }

    fn grid_3x3() -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                points.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        points
    }

    fn assert_permutation(chain: &Chain, n: usize) {
        let mut indices = chain.indices();
        indices.sort_unstable();
        assert_eq!(indices, (0..n).collect::<Vec<_>>());
    }

    /// Every link is one of the closest points among those not yet placed.
    fn assert_nearest_neighbor_walk(points: &[Point3<f64>], chain: &Chain) {
        let indices = chain.indices();
        for i in 1..indices.len() {
            let prev = points[indices[i - 1]];
            let chosen = (points[indices[i]] - prev).norm();
            for &later in &indices[i..] {
                let d = (points[later] - prev).norm();
                assert!(
                    chosen <= d + 1e-12,
                    "link {} not nearest: {} > {}",
                    i,
                    chosen,
                    d
                );
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(build_chain(&[]), Err(VertexError::EmptyInput)));
    }

    #[test]
    fn test_single_point() {
        let chain = build_chain(&[Point3::new(3.0, 1.0, 2.0)]).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.links()[0].index, 0);
        assert!(chain.is_complete());
    }

    #[test]
    fn test_hexagon_ring() {
        let points = hexagon();
        let chain = build_chain(&points).unwrap();

        assert_eq!(chain.len(), 6);
        assert_permutation(&chain, 6);
        assert_nearest_neighbor_walk(&points, &chain);

        // Consecutive links are angular neighbours on the ring
        let side = (points[1] - points[0]).norm();
        for pair in chain.links().windows(2) {
            let d = (pair[1].position - pair[0].position).norm();
            assert!((d - side).abs() < 1e-9, "non-adjacent step of length {}", d);
        }
    }

    #[test]
    fn test_hexagon_start_tie_breaks_on_lowest_index() {
        // All six points are equidistant from the centroid (up to rounding),
        // the start must be deterministic
        let points = hexagon();
        let a = build_chain(&points).unwrap();
        let b = build_chain(&points).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_grid_walks_ring_from_center() {
        let points = grid_3x3();
        let chain = build_chain(&points).unwrap();

        // Starts at the centre vertex, then walks the rim
        assert_eq!(chain.indices(), vec![4, 1, 0, 3, 6, 7, 8, 5, 2]);
        assert!(chain.is_complete());
        assert_nearest_neighbor_walk(&points, &chain);
    }

    #[test]
    fn test_scrambled_square_follows_perimeter() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let chain = build_chain(&points).unwrap();
        assert_eq!(chain.len(), 8);
        assert_permutation(&chain, 8);
        assert_nearest_neighbor_walk(&points, &chain);

        for pair in chain.links().windows(2) {
            let d = (pair[1].position - pair[0].position).norm();
            assert!((d - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pseudo_random_clouds_are_complete_walks() {
        // Small LCG so the test stays dependency-free and reproducible
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64) / ((1u64 << 53) as f64)
        };

        for n in 1..20 {
            let points: Vec<Point3<f64>> = (0..n)
                .map(|_| Point3::new(next() + 0.5, next(), next()))
                .collect();
            let chain = build_chain(&points).unwrap();
            assert_eq!(chain.len(), n);
            assert_permutation(&chain, n);
            assert_nearest_neighbor_walk(&points, &chain);
        }
    }

    #[test]
    fn test_duplicate_of_centroid_shortens_chain() {
        // Documents observed behaviour rather than an ideal one: a second
        // point sitting on the centroid is never reachable
        let points = vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let chain = build_chain(&points).unwrap();
        assert_eq!(chain.len(), 3);
        assert!(!chain.is_complete());
        assert_eq!(chain.links()[0].index, 1);

        let err = chain.ensure_complete().unwrap_err();
        assert!(matches!(err, VertexError::DegenerateChain { visited: 3, total: 4 }));
    }

    #[test]
    fn test_duplicate_rim_points_still_visited() {
        // Duplicates away from the centroid are picked up at distance zero
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let chain = build_chain(&points).unwrap();
        assert!(chain.is_complete());
        assert_permutation(&chain, 4);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&grid_3x3()).unwrap();
        assert!((c - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-12);
        assert!(centroid(&[]).is_none());
    }
}
