//! Distance-threshold welding across several point sources.
//!
//! Points gathered from all sources are linked whenever they lie within the
//! threshold of each other, and every linked group is snapped onto one
//! representative position. This is the "attach by distance" tool used to
//! close the small gaps between adjacent track blocks that were modelled as
//! separate objects.
//!
//! # Single linkage
//!
//! Links are transitive. If A is within the threshold of B and B of C, all
//! three are welded even when A and C are farther apart than the threshold.
//!
//! # Algorithm
//!
//! 1. Flatten every source into one global point list tagged with handles
//! 2. Build a k-d tree over all positions
//! 3. Range-query each point's neighbors and union them in a disjoint-set
//! 4. Snap every member of a group of two or more onto the group's first point
//!
//! # Example
//!
//! ```
//! use trackverts::algo::weld::weld_by_distance;
//! use trackverts::mesh::{MeshObject, PointSource};
//! use nalgebra::Point3;
//!
//! let mut sources = vec![
//!     MeshObject::from_points("left", vec![Point3::new(0.0, 0.0, 0.0)]),
//!     MeshObject::from_points("right", vec![Point3::new(0.05, 0.0, 0.0)]),
//! ];
//!
//! let report = weld_by_distance(&mut sources, 0.1).unwrap();
//! assert_eq!(report.moved, 1);
//! assert_eq!(sources[1].position(0), Some(Point3::new(0.0, 0.0, 0.0)));
//! ```

mod union_find;

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{Result, VertexError};
use crate::mesh::{PointHandle, PointSource};

use super::spatial::SpatialIndex;
use super::Progress;

use union_find::UnionFind;

/// Default distance below which a point already counts as snapped.
pub const DEFAULT_SNAP_EPSILON: f64 = 1e-6;

/// Options for distance welding.
#[derive(Debug, Clone)]
pub struct WeldOptions {
    /// Maximum distance between two points for them to be linked (inclusive).
    pub threshold: f64,

    /// Members closer than this to the representative are left untouched.
    pub epsilon: f64,

    /// Whether to run the neighbor queries in parallel (default: true).
    pub parallel: bool,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            threshold: 1e-4,
            epsilon: DEFAULT_SNAP_EPSILON,
            parallel: true,
        }
    }
}

impl WeldOptions {
    /// Create options with the given link threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Set the already-snapped tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(VertexError::invalid_param(
                "threshold",
                self.threshold,
                "must be finite and non-negative",
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(VertexError::invalid_param(
                "epsilon",
                self.epsilon,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// A group of welded points.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Members in global scan order (source order, then vertex order).
    pub members: Vec<PointHandle>,
    /// Position every member was snapped to.
    pub representative: Point3<f64>,
}

/// Outcome of a weld.
#[derive(Debug, Clone, Default)]
pub struct WeldReport {
    /// Number of points whose position was overwritten.
    pub moved: usize,
    /// Number of points read from all sources.
    pub total_points: usize,
    /// Every group of two or more linked points.
    pub clusters: Vec<Cluster>,
}

impl WeldReport {
    /// Number of points that belong to some multi-point cluster.
    pub fn linked_points(&self) -> usize {
        self.clusters.iter().map(|c| c.members.len()).sum()
    }
}

/// Weld points from all `sources` that are transitively within `threshold`.
///
/// See [`weld_by_distance_with_progress`].
pub fn weld_by_distance<S: PointSource>(sources: &mut [S], threshold: f64) -> Result<WeldReport> {
    weld_by_distance_with_options(sources, &WeldOptions::with_threshold(threshold))
}

/// Weld with explicit options.
pub fn weld_by_distance_with_options<S: PointSource>(
    sources: &mut [S],
    options: &WeldOptions,
) -> Result<WeldReport> {
    weld_by_distance_with_progress(sources, options, &Progress::none())
}

/// Weld with explicit options and progress reporting.
///
/// # Errors
///
/// * [`VertexError::InvalidParameter`] for a negative or non-finite threshold
/// * [`VertexError::InsufficientInput`] if fewer than two sources contain
///   points, or there are no points at all
///
/// Errors are raised before any source is modified.
pub fn weld_by_distance_with_progress<S: PointSource>(
    sources: &mut [S],
    options: &WeldOptions,
    progress: &Progress,
) -> Result<WeldReport> {
    options.validate()?;

    let mut handles = Vec::new();
    let mut points = Vec::new();
    let mut bearing = 0;
    for (s, source) in sources.iter().enumerate() {
        let positions = source.positions();
        if !positions.is_empty() {
            bearing += 1;
        }
        for (v, p) in positions.into_iter().enumerate() {
            handles.push(PointHandle::new(s, v));
            points.push(p);
        }
    }

    if bearing < 2 || points.is_empty() {
        return Err(VertexError::InsufficientInput {
            sources: bearing,
            points: points.len(),
        });
    }

    let total_steps = 3;
    progress.report(0, total_steps, "Building spatial index");
    let groups = link_groups(&points, options.threshold, options.parallel, progress, total_steps);

    progress.report(2, total_steps, "Snapping clusters");
    let mut clusters = Vec::new();
    let mut writes: Vec<(PointHandle, Point3<f64>)> = Vec::new();
    for group in groups.into_iter().filter(|g| g.len() >= 2) {
        let representative = points[group[0]];
        for &i in &group[1..] {
            if (points[i] - representative).norm() > options.epsilon {
                writes.push((handles[i], representative));
            }
        }
        clusters.push(Cluster {
            members: group.iter().map(|&i| handles[i]).collect(),
            representative,
        });
    }

    for (handle, position) in &writes {
        sources[handle.source.index()].set_position(handle.vertex.index(), *position)?;
    }
    progress.report(total_steps, total_steps, "Done");

    log::debug!(
        "welded {} points across {} sources: {} clusters, {} moved (threshold {})",
        points.len(),
        bearing,
        clusters.len(),
        writes.len(),
        options.threshold
    );

    Ok(WeldReport {
        moved: writes.len(),
        total_points: points.len(),
        clusters,
    })
}

/// Group point indices by single linkage at `threshold`.
///
/// Returns every group, singletons included, ordered by smallest member with
/// members ascending.
///
/// # Example
///
/// ```
/// use trackverts::algo::weld::cluster_points;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(5.0, 0.0, 0.0),
///     Point3::new(0.05, 0.0, 0.0),
/// ];
/// let groups = cluster_points(&points, 0.1, false).unwrap();
/// assert_eq!(groups, vec![vec![0, 2], vec![1]]);
/// ```
pub fn cluster_points(points: &[Point3<f64>], threshold: f64, parallel: bool) -> Result<Vec<Vec<usize>>> {
    WeldOptions::with_threshold(threshold).validate()?;
    Ok(link_groups(points, threshold, parallel, &Progress::none(), 3))
}

fn link_groups(
    points: &[Point3<f64>],
    threshold: f64,
    parallel: bool,
    progress: &Progress,
    total_steps: usize,
) -> Vec<Vec<usize>> {
    let index = match SpatialIndex::build(points) {
        Some(index) => index,
        None => return Vec::new(),
    };

    progress.report(1, total_steps, "Linking neighbors");
    let n = points.len();
    let neighbors: Vec<Vec<usize>> = if parallel {
        (0..n)
            .into_par_iter()
            .map(|i| index.within(&points[i], threshold))
            .collect()
    } else {
        (0..n).map(|i| index.within(&points[i], threshold)).collect()
    };

    // Unions are applied in index order so the grouping is deterministic
    let mut uf = UnionFind::new(n);
    for (i, found) in neighbors.iter().enumerate() {
        for &j in found.iter().filter(|&&j| j > i) {
            uf.union(i, j);
        }
    }

    uf.groups()
}
