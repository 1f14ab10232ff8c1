//! Mirroring three collinear vertices.
//!
//! Swapping the outer two of three vertices flips a block edge end to end
//! while the middle vertex stays where it is.

use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

/// Swap the positions of the outer two of exactly three selected vertices.
///
/// The vertices are ordered by x coordinate; the first and third exchange
/// positions. Returns the swapped pair of indices.
///
/// # Errors
///
/// * [`VertexError::WrongVertexCount`] unless exactly three indices are given
/// * [`VertexError::InvalidVertexIndex`] for out-of-range indices
/// * [`VertexError::DuplicateVertex`] if an index is selected twice
///
/// # Example
///
/// ```
/// use trackverts::algo::swap::swap_outer;
/// use trackverts::mesh::{MeshObject, PointSource};
/// use nalgebra::Point3;
///
/// let mut edge = MeshObject::from_points("edge", vec![
///     Point3::new(2.0, 0.0, 1.0),
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ]);
/// assert_eq!(swap_outer(&mut edge, &[0, 1, 2]).unwrap(), (1, 0));
/// assert_eq!(edge.position(1), Some(Point3::new(2.0, 0.0, 1.0)));
/// ```
pub fn swap_outer<S: PointSource + ?Sized>(source: &mut S, selection: &[usize]) -> Result<(usize, usize)> {
    if selection.len() != 3 {
        return Err(VertexError::WrongVertexCount {
            expected: 3,
            found: selection.len(),
        });
    }

    let len = source.len();
    let mut picked = Vec::with_capacity(3);
    for (k, &index) in selection.iter().enumerate() {
        if selection[..k].contains(&index) {
            return Err(VertexError::DuplicateVertex {
                object: source.name().to_string(),
                index,
            });
        }
        let position = source
            .position(index)
            .ok_or(VertexError::InvalidVertexIndex { index, len })?;
        picked.push((index, position));
    }
    picked.sort_by(|a, b| a.1.x.total_cmp(&b.1.x));

    let (first, p_first) = picked[0];
    let (last, p_last) = picked[2];
    source.set_position(first, p_last)?;
    source.set_position(last, p_first)?;
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshObject;
    use nalgebra::Point3;

    fn edge() -> MeshObject {
        MeshObject::from_points(
            "edge",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(9.0, 9.0, 9.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 0.1, 0.0),
            ],
        )
    }

    #[test]
    fn test_swaps_outer_pair() {
        let mut obj = edge();
        assert_eq!(swap_outer(&mut obj, &[3, 2, 0]).unwrap(), (0, 2));
        assert_eq!(obj.vertices()[0], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(obj.vertices()[2], Point3::new(0.0, 0.0, 0.0));
        // Middle and unselected vertices do not move
        assert_eq!(obj.vertices()[3], Point3::new(0.5, 0.1, 0.0));
        assert_eq!(obj.vertices()[1], Point3::new(9.0, 9.0, 9.0));
    }

    #[test]
    fn test_twice_is_identity() {
        let mut obj = edge();
        swap_outer(&mut obj, &[0, 2, 3]).unwrap();
        swap_outer(&mut obj, &[0, 2, 3]).unwrap();
        assert_eq!(obj.vertices(), edge().vertices());
    }

    #[test]
    fn test_requires_three() {
        let mut obj = edge();
        assert!(matches!(
            swap_outer(&mut obj, &[0, 2]),
            Err(VertexError::WrongVertexCount { expected: 3, found: 2 })
        ));
        assert!(matches!(
            swap_outer(&mut obj, &[0, 2, 7]),
            Err(VertexError::InvalidVertexIndex { index: 7, .. })
        ));
    }

    #[test]
    fn test_repeated_index() {
        let mut obj = edge();
        let result = swap_outer(&mut obj, &[0, 0, 2]);
        assert!(matches!(
            result,
            Err(VertexError::DuplicateVertex { ref object, index: 0 }) if object == "edge"
        ));
        assert_eq!(obj.vertices(), edge().vertices());
    }
}
