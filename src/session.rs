//! Per-object vertex lists for manual block rotation.
//!
//! When the automatic chain does not follow a block's rim (irregular blocks)
//! the rim vertices are picked by hand, one at a time, into a list kept per
//! object. A [`VertexSession`] owns those lists; it is created by the caller
//! and passed to each edit, so there is no ambient state.
//!
//! # Example
//!
//! ```
//! use trackverts::session::{BlockKind, VertexSession};
//! use trackverts::mesh::MeshObject;
//! use nalgebra::Point3;
//!
//! let ring: Vec<Point3<f64>> = (0..6)
//!     .map(|k| {
//!         let a = k as f64 * std::f64::consts::PI / 3.0;
//!         Point3::new(a.cos(), a.sin(), 0.0)
//!     })
//!     .collect();
//! let mut block = MeshObject::from_points("tri_07", ring.clone());
//!
//! let mut session = VertexSession::new();
//! for (i, p) in ring.iter().enumerate() {
//!     session.add_vertex("tri_07", BlockKind::TriBlock, i, *p).unwrap();
//! }
//! session.rotate("tri_07", BlockKind::TriBlock, &mut block, 2).unwrap();
//! assert_eq!(block.vertices()[0], ring[2]);
//! ```

use std::collections::HashMap;

use nalgebra::Point3;

use crate::algo::chain::Chain;
use crate::error::{Result, VertexError};
use crate::mesh::PointSource;

/// Block type, which fixes how many rim vertices a list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Triangular block: six rim vertices.
    TriBlock,
    /// Quad block: eight rim vertices around the centre.
    QuadBlock,
}

impl BlockKind {
    /// Number of rim vertices for this block type.
    #[inline]
    pub fn capacity(self) -> usize {
        match self {
            BlockKind::TriBlock => 6,
            BlockKind::QuadBlock => 8,
        }
    }
}

/// One registered vertex: its index and the coordinate it had when recorded.
pub type Entry = (usize, Point3<f64>);

/// Vertex lists keyed by object name.
#[derive(Debug, Clone, Default)]
pub struct VertexSession {
    lists: HashMap<String, Vec<Entry>>,
}

impl VertexSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The list for `object` (empty if none was started).
    pub fn list(&self, object: &str) -> &[Entry] {
        self.lists.get(object).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of objects with a non-empty list.
    pub fn objects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .lists
            .iter()
            .filter(|(_, l)| !l.is_empty())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Append a vertex to the list for `object`.
    ///
    /// # Errors
    ///
    /// * [`VertexError::DuplicateVertex`] if the vertex index is already listed
    /// * [`VertexError::ListFull`] if the list holds `kind.capacity()` entries
    pub fn add_vertex(
        &mut self,
        object: &str,
        kind: BlockKind,
        index: usize,
        position: Point3<f64>,
    ) -> Result<usize> {
        let list = self.lists.entry(object.to_string()).or_default();
        if list.iter().any(|&(i, _)| i == index) {
            log::warn!("vertex {} already listed for '{}'", index, object);
            return Err(VertexError::DuplicateVertex {
                object: object.to_string(),
                index,
            });
        }
        if list.len() >= kind.capacity() {
            return Err(VertexError::ListFull {
                object: object.to_string(),
                capacity: kind.capacity(),
            });
        }
        list.push((index, position));
        Ok(list.len())
    }

    /// Remove and return the most recently added vertex.
    pub fn remove_last(&mut self, object: &str) -> Option<Entry> {
        self.lists.get_mut(object).and_then(Vec::pop)
    }

    /// Clear the list for `object`.
    pub fn clear(&mut self, object: &str) {
        self.lists.remove(object);
    }

    /// Clear every list.
    pub fn clear_all(&mut self) {
        self.lists.clear();
    }

    /// Replace the list for `object` with the links of a chain.
    pub fn register_chain(&mut self, object: &str, chain: &Chain) {
        let entries = chain.links().iter().map(|l| (l.index, l.position)).collect();
        self.lists.insert(object.to_string(), entries);
    }

    /// Rotate the listed vertices of `object` around the ring by `step` places
    /// and write the result into `source`.
    ///
    /// Each recorded coordinate moves to the vertex listed `step` places
    /// earlier, i.e. index `idx[(j - step) mod n]` gets `coord[j]`, so
    /// `step = 2` is a quarter turn of a quadblock rim ("R90") and `-2`
    /// reverses it. The stored list is updated to the new `(index, coordinate)`
    /// pairs so repeated rotations compose.
    ///
    /// # Errors
    ///
    /// * [`VertexError::WrongVertexCount`] unless the list holds exactly
    ///   `kind.capacity()` vertices
    /// * [`VertexError::InvalidVertexIndex`] if a listed index is out of range
    ///   for `source`
    pub fn rotate<S: PointSource + ?Sized>(
        &mut self,
        object: &str,
        kind: BlockKind,
        source: &mut S,
        step: isize,
    ) -> Result<()> {
        let list = self.list(object);
        let n = list.len();
        if n != kind.capacity() {
            return Err(VertexError::WrongVertexCount {
                expected: kind.capacity(),
                found: n,
            });
        }

        let len = source.len();
        if let Some(&(index, _)) = list.iter().find(|&&(i, _)| i >= len) {
            return Err(VertexError::InvalidVertexIndex { index, len });
        }

        let shift = step.rem_euclid(n as isize) as usize;
        let rotated: Vec<Entry> = (0..n)
            .map(|j| (list[(j + n - shift) % n].0, list[j].1))
            .collect();

        for &(index, position) in &rotated {
            source.set_position(index, position)?;
        }
        log::debug!("rotated {} listed vertices of '{}' by {}", n, object, step);

        self.lists.insert(object.to_string(), rotated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::chain::build_chain;
    use crate::mesh::MeshObject;

    fn octagon_rim() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn filled_session(points: &[Point3<f64>]) -> VertexSession {
        let mut session = VertexSession::new();
        for (i, p) in points.iter().enumerate() {
            session.add_vertex("quad", BlockKind::QuadBlock, i, *p).unwrap();
        }
        session
    }

    #[test]
    fn test_capacity_and_duplicates() {
        let mut session = VertexSession::new();
        let p = Point3::origin();
        for i in 0..6 {
            assert_eq!(session.add_vertex("tri", BlockKind::TriBlock, i, p).unwrap(), i + 1);
        }
        assert!(matches!(
            session.add_vertex("tri", BlockKind::TriBlock, 6, p),
            Err(VertexError::ListFull { capacity: 6, .. })
        ));
        assert!(matches!(
            session.add_vertex("tri", BlockKind::TriBlock, 2, p),
            Err(VertexError::DuplicateVertex { index: 2, .. })
        ));
        assert_eq!(session.list("tri").len(), 6);
    }

    #[test]
    fn test_lists_are_per_object() {
        let mut session = VertexSession::new();
        session.add_vertex("a", BlockKind::QuadBlock, 0, Point3::origin()).unwrap();
        session.add_vertex("b", BlockKind::QuadBlock, 0, Point3::origin()).unwrap();
        assert_eq!(session.objects(), vec!["a", "b"]);

        assert_eq!(session.remove_last("a"), Some((0, Point3::origin())));
        assert!(session.remove_last("a").is_none());
        assert_eq!(session.objects(), vec!["b"]);

        session.clear("b");
        assert!(session.list("b").is_empty());

        session.add_vertex("c", BlockKind::QuadBlock, 3, Point3::origin()).unwrap();
        session.clear_all();
        assert!(session.objects().is_empty());
    }

    #[test]
    fn test_rotate_requires_full_list() {
        let rim = octagon_rim();
        let mut session = filled_session(&rim[..7]);
        let mut obj = MeshObject::from_points("quad", rim);
        assert!(matches!(
            session.rotate("quad", BlockKind::QuadBlock, &mut obj, 2),
            Err(VertexError::WrongVertexCount { expected: 8, found: 7 })
        ));
    }

    #[test]
    fn test_rotate_moves_coords_along_ring() {
        let rim = octagon_rim();
        let mut session = filled_session(&rim);
        let mut obj = MeshObject::from_points("quad", rim.clone());

        session.rotate("quad", BlockKind::QuadBlock, &mut obj, 2).unwrap();
        // Vertex j - 2 now sits where vertex j was
        for j in 0..8 {
            assert_eq!(obj.vertices()[(j + 6) % 8], rim[j]);
        }

        // The list tracks the current state, so the inverse step undoes it
        session.rotate("quad", BlockKind::QuadBlock, &mut obj, -2).unwrap();
        assert_eq!(obj.vertices(), &rim[..]);
    }

    #[test]
    fn test_four_quarter_turns_identity() {
        let rim = octagon_rim();
        let mut session = filled_session(&rim);
        let mut obj = MeshObject::from_points("quad", rim.clone());
        for _ in 0..4 {
            session.rotate("quad", BlockKind::QuadBlock, &mut obj, 2).unwrap();
        }
        assert_eq!(obj.vertices(), &rim[..]);
    }

    #[test]
    fn test_register_chain() {
        let rim = octagon_rim();
        let chain = build_chain(&rim).unwrap();
        let mut session = VertexSession::new();
        session.register_chain("quad", &chain);
        assert_eq!(session.list("quad").len(), 8);
        assert_eq!(session.list("quad")[0].0, chain.links()[0].index);
    }

    #[test]
    fn test_rotate_rejects_out_of_range() {
        let rim = octagon_rim();
        let mut session = filled_session(&rim);
        let mut small = MeshObject::from_points("quad", rim[..4].to_vec());
        assert!(matches!(
            session.rotate("quad", BlockKind::QuadBlock, &mut small, 2),
            Err(VertexError::InvalidVertexIndex { .. })
        ));
        assert_eq!(small.vertices(), &rim[..4]);
    }
}
