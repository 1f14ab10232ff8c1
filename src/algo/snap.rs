//! Snapping vertices onto the closest vertex of other objects.
//!
//! Each selected vertex of the active object is moved onto the nearest vertex
//! found among all reference objects, in world space. Unlike
//! [`super::weld`], reference objects are never modified.

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

use super::spatial::SpatialIndex;
use super::weld::DEFAULT_SNAP_EPSILON;

/// Which vertices of the active object to snap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every vertex.
    All,
    /// An explicit list of vertex indices.
    Indices(Vec<usize>),
}

impl Selection {
    pub(crate) fn resolve(&self, len: usize) -> Result<Vec<usize>> {
        let indices = match self {
            Selection::All => (0..len).collect::<Vec<_>>(),
            Selection::Indices(indices) => {
                if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                    return Err(VertexError::InvalidVertexIndex { index, len });
                }
                indices.clone()
            }
        };
        if indices.is_empty() {
            return Err(VertexError::NoSelection);
        }
        Ok(indices)
    }
}

/// Options for snapping.
#[derive(Debug, Clone)]
pub struct SnapOptions {
    /// Whether to run the nearest-vertex queries in parallel (default: true).
    pub parallel: bool,
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl SnapOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcome of a snap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapReport {
    /// Number of selected vertices whose position changed.
    pub moved: usize,
    /// Largest distance any vertex travelled.
    pub max_displacement: f64,
}

/// Snap the selected vertices of `active` onto the closest reference vertex.
///
/// # Errors
///
/// * [`VertexError::InsufficientInput`] if no reference contains vertices
/// * [`VertexError::NoSelection`] if the selection resolves to nothing
/// * [`VertexError::InvalidVertexIndex`] for out-of-range selected indices
///
/// # Example
///
/// ```
/// use trackverts::algo::snap::{snap_to_closest, Selection, SnapOptions};
/// use trackverts::mesh::{MeshObject, PointSource};
/// use nalgebra::Point3;
///
/// let mut active = MeshObject::from_points("road", vec![Point3::new(0.9, 0.1, 0.0)]);
/// let references = vec![MeshObject::from_points(
///     "kerb",
///     vec![Point3::new(1.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)],
/// )];
///
/// let report = snap_to_closest(&mut active, &Selection::All, &references, &SnapOptions::default()).unwrap();
/// assert_eq!(report.moved, 1);
/// assert_eq!(active.position(0), Some(Point3::new(1.0, 0.0, 0.0)));
/// ```
pub fn snap_to_closest<A, R>(
    active: &mut A,
    selection: &Selection,
    references: &[R],
    options: &SnapOptions,
) -> Result<SnapReport>
where
    A: PointSource + ?Sized,
    R: PointSource,
{
    let reference_points: Vec<Point3<f64>> =
        references.iter().flat_map(|r| r.positions()).collect();
    let bearing = references.iter().filter(|r| !r.is_empty()).count();
    let index = SpatialIndex::build(&reference_points).ok_or(VertexError::InsufficientInput {
        sources: bearing,
        points: 0,
    })?;

    let selected = selection.resolve(active.len())?;
    let current: Vec<(usize, Point3<f64>)> = selected
        .iter()
        .filter_map(|&i| active.position(i).map(|p| (i, p)))
        .collect();

    let lookup = |&(i, p): &(usize, Point3<f64>)| (i, p, reference_points[index.nearest(&p)]);
    let targets: Vec<(usize, Point3<f64>, Point3<f64>)> = if options.parallel {
        current.par_iter().map(lookup).collect()
    } else {
        current.iter().map(lookup).collect()
    };

    let mut report = SnapReport::default();
    for (i, from, to) in targets {
        let displacement = (to - from).norm();
        if displacement > DEFAULT_SNAP_EPSILON {
            active.set_position(i, to)?;
            report.moved += 1;
            report.max_displacement = report.max_displacement.max(displacement);
        }
    }

    log::debug!(
        "snapped {} of {} selected vertices of '{}' to {} reference vertices",
        report.moved,
        selected.len(),
        active.name(),
        reference_points.len()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshObject;
    use nalgebra::{Matrix4, Vector3};

    fn references() -> Vec<MeshObject> {
        vec![
            MeshObject::from_points("a", vec![Point3::new(0.0, 0.0, 0.0)]),
            MeshObject::from_points("empty", Vec::new()),
            MeshObject::from_points(
                "b",
                vec![Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0)],
            ),
        ]
    }

    #[test]
    fn test_snaps_selected_only() {
        let mut active = MeshObject::from_points(
            "road",
            vec![
                Point3::new(0.1, 0.1, 0.0),
                Point3::new(1.9, 0.2, 0.0),
                Point3::new(0.3, 1.6, 0.0),
            ],
        );
        let report = snap_to_closest(
            &mut active,
            &Selection::Indices(vec![0, 2]),
            &references(),
            &SnapOptions::default(),
        )
        .unwrap();

        assert_eq!(report.moved, 2);
        assert_eq!(active.vertices()[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(active.vertices()[1], Point3::new(1.9, 0.2, 0.0));
        assert_eq!(active.vertices()[2], Point3::new(0.0, 2.0, 0.0));
        let expected = (0.3f64 * 0.3 + 0.4 * 0.4).sqrt();
        assert!((report.max_displacement - expected).abs() < 1e-12);
    }

    #[test]
    fn test_already_snapped_not_counted() {
        let mut active = MeshObject::from_points("road", vec![Point3::new(2.0, 0.0, 0.0)]);
        let report =
            snap_to_closest(&mut active, &Selection::All, &references(), &SnapOptions::default())
                .unwrap();
        assert_eq!(report.moved, 0);
    }

    #[test]
    fn test_world_space_write_back() {
        let mut active = MeshObject::from_points("road", vec![Point3::new(0.1, 0.0, 0.0)])
            .with_transform(Matrix4::new_translation(&Vector3::new(1.9, 0.0, 0.0)))
            .unwrap();
        snap_to_closest(&mut active, &Selection::All, &references(), &SnapOptions::default())
            .unwrap();
        // World (2, 0, 0) is local (0.1, 0, 0) minus the offset
        assert!((active.vertices()[0] - Point3::new(0.1, 0.0, 0.0)).norm() < 1e-12);

        let mut far = MeshObject::from_points("road", vec![Point3::new(0.0, 0.0, 0.0)])
            .with_transform(Matrix4::new_translation(&Vector3::new(0.0, 1.5, 0.0)))
            .unwrap();
        snap_to_closest(&mut far, &Selection::All, &references(), &SnapOptions::default())
            .unwrap();
        assert!((far.vertices()[0] - Point3::new(0.0, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_errors() {
        let mut active = MeshObject::from_points("road", vec![Point3::origin()]);
        let none: Vec<MeshObject> = vec![MeshObject::from_points("empty", Vec::new())];
        assert!(matches!(
            snap_to_closest(&mut active, &Selection::All, &none, &SnapOptions::default()),
            Err(VertexError::InsufficientInput { .. })
        ));

        assert!(matches!(
            snap_to_closest(&mut active, &Selection::Indices(vec![]), &references(), &SnapOptions::default()),
            Err(VertexError::NoSelection)
        ));

        assert!(matches!(
            snap_to_closest(&mut active, &Selection::Indices(vec![3]), &references(), &SnapOptions::default()),
            Err(VertexError::InvalidVertexIndex { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let points: Vec<Point3<f64>> = (0..50).map(|i| Point3::new(i as f64 * 0.37, 0.2, 0.0)).collect();
        let mut a = MeshObject::from_points("a", points.clone());
        let mut b = MeshObject::from_points("b", points);
        let refs = references();
        let ra = snap_to_closest(&mut a, &Selection::All, &refs, &SnapOptions::default()).unwrap();
        let rb = snap_to_closest(&mut b, &Selection::All, &refs, &SnapOptions::default().with_parallel(false))
            .unwrap();
        assert_eq!(ra, rb);
        assert_eq!(a.vertices(), b.vertices());
    }
}
