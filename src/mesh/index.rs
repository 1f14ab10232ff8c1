//! Index types for point sources.
//!
//! This module provides type-safe index wrappers for sources and the vertices
//! within them. A [`PointHandle`] pairs the two so that results computed over a
//! flattened point list can be written back to the right place.

use std::fmt::{self, Debug};

/// A type-safe index of a point source within a multi-source operation.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SourceId(u32);

/// A type-safe vertex index, local to one point source.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// Panics in debug builds if the value does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index())
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(SourceId, "S");
impl_index_type!(VertexId, "V");

/// Opaque reference to one point: the source it came from and its local index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PointHandle {
    /// The originating source.
    pub source: SourceId,
    /// Index of the point within its source.
    pub vertex: VertexId,
}

impl PointHandle {
    /// Create a handle from raw source and vertex indices.
    #[inline]
    pub fn new(source: usize, vertex: usize) -> Self {
        Self {
            source: SourceId::new(source),
            vertex: VertexId::new(vertex),
        }
    }
}

impl Debug for PointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{:?}", self.source, self.vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(VertexId::from(42), v);
    }

    #[test]
    fn test_handle_ordering() {
        // Handles order by source first, then by vertex
        let a = PointHandle::new(0, 5);
        let b = PointHandle::new(1, 0);
        let c = PointHandle::new(1, 2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(7)), "V(7)");
        assert_eq!(format!("{:?}", PointHandle::new(2, 7)), "S(2):V(7)");
    }
}
