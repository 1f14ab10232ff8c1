//! Flattening a vertex selection onto an axis-aligned plane.
//!
//! Aligning along X moves every selected vertex to the mean x of the
//! selection, leaving y and z untouched. This lines up a block edge before
//! welding it to its neighbor.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

use super::snap::Selection;

/// World axis whose coordinate is equalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    #[inline]
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl FromStr for Axis {
    type Err = VertexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(VertexError::invalid_param("axis", s, "must be x, y or z")),
        }
    }
}

/// Move the selected vertices onto the plane through their mean along `axis`.
///
/// Works in world space. Returns the coordinate of the plane.
///
/// # Errors
///
/// * [`VertexError::NoSelection`] if the selection resolves to nothing
/// * [`VertexError::InvalidVertexIndex`] for out-of-range selected indices
///
/// # Example
///
/// ```
/// use trackverts::algo::align::{align_to_axis, Axis};
/// use trackverts::algo::snap::Selection;
/// use trackverts::mesh::{MeshObject, PointSource};
/// use nalgebra::Point3;
///
/// let mut edge = MeshObject::from_points("edge", vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 2.0, 0.0),
/// ]);
/// let plane = align_to_axis(&mut edge, &Selection::All, Axis::X).unwrap();
/// assert_eq!(plane, 0.5);
/// assert_eq!(edge.position(1), Some(Point3::new(0.5, 2.0, 0.0)));
/// ```
pub fn align_to_axis<S: PointSource + ?Sized>(source: &mut S, selection: &Selection, axis: Axis) -> Result<f64> {
    let mut indices = selection.resolve(source.len())?;
    indices.sort_unstable();
    indices.dedup();

    let len = source.len();
    let mut positions = Vec::with_capacity(indices.len());
    for &index in &indices {
        let position = source
            .position(index)
            .ok_or(VertexError::InvalidVertexIndex { index, len })?;
        positions.push(position);
    }

    let k = axis.index();
    let plane = positions.iter().map(|p| p[k]).sum::<f64>() / positions.len() as f64;
    for (&index, mut position) in indices.iter().zip(positions) {
        position[k] = plane;
        source.set_position(index, position)?;
    }

    log::debug!(
        "aligned {} vertices of {} to {} = {}",
        indices.len(),
        source.name(),
        axis,
        plane
    );
    Ok(plane)
}
