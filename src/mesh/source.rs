//! Point sources: the boundary between the algorithms and the host mesh.
//!
//! Every algorithm in this crate reads world-space positions through the
//! [`PointSource`] trait and writes results back one vertex at a time. The
//! crate ships one concrete source, [`MeshObject`], which holds local-space
//! vertices, optional polygon faces and an object-to-world transform.

use nalgebra::{Matrix4, Point3};

use crate::error::{Result, VertexError};

use super::PointHandle;

/// A container of points that can be read in world space and written back.
///
/// Implementations must enumerate points in a stable order; indices into that
/// order are the vertex handles used by the algorithms.
pub trait PointSource {
    /// Human-readable name of the source (the object name).
    fn name(&self) -> &str;

    /// Number of points in the source.
    fn len(&self) -> usize;

    /// Whether the source has no points.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World-space position of a point, or `None` if `index` is out of range.
    fn position(&self, index: usize) -> Option<Point3<f64>>;

    /// Overwrite the world-space position of a point.
    fn set_position(&mut self, index: usize, position: Point3<f64>) -> Result<()>;

    /// All world-space positions, in index order.
    fn positions(&self) -> Vec<Point3<f64>> {
        (0..self.len()).filter_map(|i| self.position(i)).collect()
    }
}

impl<S: PointSource + ?Sized> PointSource for &mut S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn position(&self, index: usize) -> Option<Point3<f64>> {
        (**self).position(index)
    }

    fn set_position(&mut self, index: usize, position: Point3<f64>) -> Result<()> {
        (**self).set_position(index, position)
    }

    fn positions(&self) -> Vec<Point3<f64>> {
        (**self).positions()
    }
}

impl<S: PointSource + ?Sized> PointSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn position(&self, index: usize) -> Option<Point3<f64>> {
        (**self).position(index)
    }

    fn set_position(&mut self, index: usize, position: Point3<f64>) -> Result<()> {
        (**self).set_position(index, position)
    }

    fn positions(&self) -> Vec<Point3<f64>> {
        (**self).positions()
    }
}

/// A named mesh object: local-space vertices, polygon faces and a world transform.
///
/// Faces are carried through untouched; the algorithms only ever move vertices.
#[derive(Debug, Clone)]
pub struct MeshObject {
    name: String,
    vertices: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
    transform: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl MeshObject {
    /// Create an object with identity transform from local-space vertices.
    pub fn from_points(name: impl Into<String>, vertices: Vec<Point3<f64>>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces: Vec::new(),
            transform: Matrix4::identity(),
            inverse: Matrix4::identity(),
        }
    }

    /// Attach polygon faces (vertex index lists).
    ///
    /// Returns an error if any face references a vertex that does not exist.
    pub fn with_faces(mut self, faces: Vec<Vec<usize>>) -> Result<Self> {
        let len = self.vertices.len();
        if let Some(&index) = faces.iter().flatten().find(|&&i| i >= len) {
            return Err(VertexError::InvalidVertexIndex { index, len });
        }
        self.faces = faces;
        Ok(self)
    }

    /// Set the object-to-world transform.
    ///
    /// The transform must be invertible so that world-space writes can be
    /// mapped back into local space.
    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Result<Self> {
        let inverse = transform.try_inverse().ok_or_else(|| {
            VertexError::invalid_param("transform", "singular matrix", "must be invertible")
        })?;
        self.transform = transform;
        self.inverse = inverse;
        Ok(self)
    }

    /// Rename the object.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Local-space vertices.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Polygon faces.
    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Object-to-world transform.
    #[inline]
    pub fn transform(&self) -> &Matrix4<f64> {
        &self.transform
    }

    /// Axis-aligned world-space bounding box, or `None` for an empty object.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let positions = self.positions();
        let first = *positions.first()?;
        Some(positions.iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }
}

impl PointSource for MeshObject {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.vertices.len()
    }

    fn position(&self, index: usize) -> Option<Point3<f64>> {
        self.vertices
            .get(index)
            .map(|p| self.transform.transform_point(p))
    }

    fn set_position(&mut self, index: usize, position: Point3<f64>) -> Result<()> {
        let len = self.vertices.len();
        let local = self.inverse.transform_point(&position);
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(VertexError::InvalidVertexIndex { index, len })?;
        *slot = local;
        Ok(())
    }
}

/// World-space position of the point a handle refers to.
///
/// # Errors
///
/// * [`VertexError::InvalidSource`] if the handle's source is out of range
/// * [`VertexError::InvalidVertexIndex`] if its vertex is out of range
pub fn resolve<S: PointSource>(sources: &[S], handle: PointHandle) -> Result<Point3<f64>> {
    let source = sources.get(handle.source.index()).ok_or(VertexError::InvalidSource {
        index: handle.source.index(),
        len: sources.len(),
    })?;
    let index = handle.vertex.index();
    source.position(index).ok_or(VertexError::InvalidVertexIndex {
        index,
        len: source.len(),
    })
}
