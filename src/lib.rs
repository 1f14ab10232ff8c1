//! # Trackverts
//!
//! Vertex editing tools for racing-track mesh assets.
//!
//! Track surfaces are assembled from small blocks: triangular blocks with six
//! rim vertices and quadblocks laid out as a 3×3 vertex grid. Trackverts
//! provides the geometry behind the usual block edits, working on plain
//! point sets so it can sit behind any host application.
//!
//! ## Features
//!
//! - **Chains**: deterministic nearest-neighbor ordering of a block's vertices
//! - **Rotation**: cyclic shifts along a chain, quarter turns of quadblocks
//! - **Welding**: k-d tree accelerated single-linkage merging across objects
//! - **Snapping**: move vertices onto the closest vertex of other objects
//! - **Aligning**: flatten selected vertices along one axis
//! - **Validation**: classify objects as triblocks, quadblocks or invalid
//! - **Sessions**: hand-picked per-object vertex lists for irregular blocks
//! - **Paths**: track path trees with JSON export
//! - **File formats**: PLY, STL
//!
//! ## Quick Start
//!
//! ```no_run
//! use trackverts::prelude::*;
//!
//! let mut block = trackverts::io::load("quad_12.ply").unwrap();
//! quarter_turn(&mut block, Turn::Clockwise).unwrap();
//! trackverts::io::save(&block, "quad_12_r90.ply").unwrap();
//! ```
//!
//! ## Chains and Rotation
//!
//! ```
//! use trackverts::prelude::*;
//! use nalgebra::Point3;
//!
//! let square = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//!
//! let chain = build_chain(&square).unwrap();
//! assert!(chain.is_complete());
//! assert_eq!(chain.indices(), vec![0, 2, 1, 3]);
//!
//! // Shift every coordinate one place along the ring
//! let rotated = rotate_chain(&chain, 1).unwrap();
//! assert_eq!(rotated.positions()[0], square[2]);
//! ```
//!
//! ## Welding
//!
//! ```
//! use trackverts::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut objects = vec![
//!     MeshObject::from_points("a", vec![Point3::new(0.0, 0.0, 0.0)]),
//!     MeshObject::from_points("b", vec![Point3::new(0.00005, 0.0, 0.0)]),
//! ];
//!
//! let report = weld_by_distance(&mut objects, 1e-4).unwrap();
//! assert_eq!(report.clusters.len(), 1);
//! assert_eq!(objects[1].position(0), objects[0].position(0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod path;
pub mod session;
pub mod validate;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use trackverts::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::align::{align_to_axis, Axis};
    pub use crate::algo::chain::{build_chain, build_chain_with_options, Chain, ChainLink, ChainOptions};
    pub use crate::algo::grid::{apply_grid_rotation, rotate_grid};
    pub use crate::algo::rotate::{apply_chain, quarter_turn, rotate_chain, Turn};
    pub use crate::algo::snap::{snap_to_closest, Selection, SnapOptions, SnapReport};
    pub use crate::algo::swap::swap_outer;
    pub use crate::algo::weld::{
        cluster_points, weld_by_distance, weld_by_distance_with_options, Cluster, WeldOptions,
        WeldReport,
    };
    pub use crate::algo::Progress;
    pub use crate::error::{Result, VertexError};
    pub use crate::mesh::{MeshObject, PointHandle, PointSource, SourceId, VertexId};
    pub use crate::path::{Category, PathTree, Side};
    pub use crate::session::{BlockKind, VertexSession};
    pub use crate::validate::{classify, reset_name, tag_name, tag_objects, validate_objects, Verdict};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    /// A 3×3 quadblock in row-major order.
    fn quadblock() -> MeshObject {
        let mut points = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                points.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        MeshObject::from_points("quad", points)
    }

    #[test]
    fn test_quadblock_workflow() {
        let mut block = quadblock();
        let original = block.vertices().to_vec();

        // The rim chain of a quadblock starts at the centre vertex
        let chain = build_chain(&original).unwrap();
        assert_eq!(chain.indices()[0], 4);
        assert!(chain.is_complete());

        // A quarter turn keeps the centre and preserves the vertex set
        quarter_turn(&mut block, Turn::Clockwise).unwrap();
        assert_eq!(block.vertices()[4], original[4]);
        let mut after: Vec<_> = block.vertices().to_vec();
        let mut before = original.clone();
        let key = |p: &Point3<f64>| (p.x as i64, p.y as i64);
        after.sort_by_key(key);
        before.sort_by_key(key);
        assert_eq!(after, before);

        quarter_turn(&mut block, Turn::CounterClockwise).unwrap();
        assert_eq!(block.vertices(), &original[..]);
    }

    #[test]
    fn test_weld_then_snap() {
        let mut objects = vec![
            MeshObject::from_points("left", vec![Point3::new(1.0, 0.0, 0.0)]),
            MeshObject::from_points("right", vec![Point3::new(1.00002, 0.0, 0.0)]),
        ];
        let report = weld_by_distance(&mut objects, 1e-4).unwrap();
        assert_eq!(report.linked_points(), 2);

        let mut road = MeshObject::from_points("road", vec![Point3::new(0.9, 0.0, 0.0)]);
        let snapped = snap_to_closest(&mut road, &Selection::All, &objects, &SnapOptions::default()).unwrap();
        assert_eq!(snapped.moved, 1);
        assert_eq!(road.vertices()[0], Point3::new(1.0, 0.0, 0.0));
    }
}
