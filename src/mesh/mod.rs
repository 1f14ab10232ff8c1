//! Point sources and handles.
//!
//! This module provides the narrow interface through which the algorithms
//! reach the host mesh.
//!
//! # Overview
//!
//! The primary abstraction is the [`PointSource`] trait: read world-space
//! positions by index, write one position back. [`MeshObject`] is the concrete
//! source used by the file I/O layer and the CLI.
//!
//! # Index Types
//!
//! - [`SourceId`] - Identifies a source within a multi-source operation
//! - [`VertexId`] - Identifies a vertex within one source
//! - [`PointHandle`] - A `(source, vertex)` pair
//!
//! ```
//! use trackverts::mesh::{MeshObject, PointSource};
//! use nalgebra::Point3;
//!
//! let mut obj = MeshObject::from_points("quad", vec![Point3::new(0.0, 0.0, 0.0)]);
//! obj.set_position(0, Point3::new(1.0, 0.0, 0.0)).unwrap();
//! assert_eq!(obj.position(0), Some(Point3::new(1.0, 0.0, 0.0)));
//! ```

mod index;
mod source;

pub use index::{PointHandle, SourceId, VertexId};
pub use source::{resolve, MeshObject, PointSource};
