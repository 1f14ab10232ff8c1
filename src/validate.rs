//! Block geometry validation.
//!
//! A valid triblock has 6 vertices and 9 edges (four triangles), and a valid
//! quadblock has 9 vertices and 12 edges (four quads around a centre
//! vertex). Anything else, including any object with a face of more than
//! four corners, is invalid. Edges are the unique undirected sides of the
//! faces, so a quadblock must be stored with quad faces; a triangulated quad
//! grid has 16 edges and fails.
//!
//! Objects are tagged by appending a suffix to their name (`_triblock`,
//! `_quadblock`, `_invalid`), and [`reset_name`] strips the tags again.
//!
//! # Example
//!
//! ```
//! use trackverts::validate::{classify, tag_name, Verdict};
//! use trackverts::session::BlockKind;
//! use trackverts::mesh::MeshObject;
//! use nalgebra::Point3;
//!
//! let grid = (0..9).map(|v| Point3::new((v % 3) as f64, (v / 3) as f64, 0.0)).collect();
//! let block = MeshObject::from_points("quad_12", grid)
//!     .with_faces(vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4], vec![3, 4, 7, 6], vec![4, 5, 8, 7]])
//!     .unwrap();
//!
//! let verdict = classify(&block);
//! assert_eq!(verdict, Verdict::Block(BlockKind::QuadBlock));
//! assert_eq!(tag_name("quad_12", verdict), "quad_12_quadblock");
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, VertexError};
use crate::mesh::{MeshObject, PointSource};
use crate::session::BlockKind;

/// Name suffix of a valid triblock.
pub const TRIBLOCK_SUFFIX: &str = "_triblock";
/// Name suffix of a valid quadblock.
pub const QUADBLOCK_SUFFIX: &str = "_quadblock";
/// Name suffix of an object that is neither block type.
pub const INVALID_SUFFIX: &str = "_invalid";

/// Why an object is not a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// A face has more than four corners.
    NGon {
        /// Index of the first offending face.
        face: usize,
        /// Its number of corners.
        corners: usize,
    },
    /// The vertex and edge counts match neither block type.
    Shape {
        /// Vertex count of the object.
        vertices: usize,
        /// Unique edge count of the object.
        edges: usize,
    },
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Defect::NGon { face, corners } => write!(f, "face {} has {} corners", face, corners),
            Defect::Shape { vertices, edges } => {
                let expected_edges = match vertices {
                    6 => Some(9),
                    9 => Some(12),
                    _ => None,
                };
                match expected_edges {
                    Some(expected) => write!(f, "{} edges, expected {} for {} vertices", edges, expected, vertices),
                    None => write!(f, "{} vertices, expected 6 or 9", vertices),
                }
            }
        }
    }
}

/// Classification of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The object is a valid block of this kind.
    Block(BlockKind),
    /// The object is not a block.
    Invalid(Defect),
}

impl Verdict {
    /// The block kind, if valid.
    pub fn kind(self) -> Option<BlockKind> {
        match self {
            Verdict::Block(kind) => Some(kind),
            Verdict::Invalid(_) => None,
        }
    }

    /// Name suffix for this verdict.
    pub fn suffix(self) -> &'static str {
        match self {
            Verdict::Block(BlockKind::TriBlock) => TRIBLOCK_SUFFIX,
            Verdict::Block(BlockKind::QuadBlock) => QUADBLOCK_SUFFIX,
            Verdict::Invalid(_) => INVALID_SUFFIX,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Block(BlockKind::TriBlock) => f.write_str("triblock"),
            Verdict::Block(BlockKind::QuadBlock) => f.write_str("quadblock"),
            Verdict::Invalid(defect) => write!(f, "invalid ({})", defect),
        }
    }
}

#[inline]
fn canonical_edge(v0: usize, v1: usize) -> (usize, usize) {
    if v0 < v1 {
        (v0, v1)
    } else {
        (v1, v0)
    }
}

/// Number of unique undirected edges spanned by the faces.
pub fn edge_count(faces: &[Vec<usize>]) -> usize {
    let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();
    for face in faces {
        for i in 0..face.len() {
            let (v0, v1) = (face[i], face[(i + 1) % face.len()]);
            if v0 != v1 {
                seen_edges.insert(canonical_edge(v0, v1));
            }
        }
    }
    seen_edges.len()
}

/// Classify an object by its face arity, vertex count and edge count.
pub fn classify(object: &MeshObject) -> Verdict {
    if let Some((face, corners)) = object
        .faces()
        .iter()
        .enumerate()
        .map(|(i, f)| (i, f.len()))
        .find(|&(_, corners)| corners > 4)
    {
        return Verdict::Invalid(Defect::NGon { face, corners });
    }

    let vertices = object.len();
    let edges = edge_count(object.faces());
    match (vertices, edges) {
        (6, 9) => Verdict::Block(BlockKind::TriBlock),
        (9, 12) => Verdict::Block(BlockKind::QuadBlock),
        _ => Verdict::Invalid(Defect::Shape { vertices, edges }),
    }
}

/// Strip the classification suffixes from a name.
///
/// Suffixes are removed from the end in the order `_invalid`, `_quadblock`,
/// `_triblock`, so a name tagged twice is fully restored.
pub fn reset_name(name: &str) -> &str {
    let mut name = name;
    for suffix in [INVALID_SUFFIX, QUADBLOCK_SUFFIX, TRIBLOCK_SUFFIX] {
        name = name.strip_suffix(suffix).unwrap_or(name);
    }
    name
}

/// The name with any earlier tag replaced by the suffix for `verdict`.
pub fn tag_name(name: &str, verdict: Verdict) -> String {
    format!("{}{}", reset_name(name), verdict.suffix())
}

/// Per-object verdicts of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Object name (before tagging) and verdict, in input order.
    pub verdicts: Vec<(String, Verdict)>,
}

impl ValidationReport {
    /// Number of objects with the given verdict kind.
    pub fn count(&self, kind: Option<BlockKind>) -> usize {
        self.verdicts.iter().filter(|(_, v)| v.kind() == kind).count()
    }
}

/// Classify every object without renaming anything.
pub fn validate_objects(objects: &[MeshObject]) -> ValidationReport {
    let verdicts = objects
        .iter()
        .map(|object| (reset_name(object.name()).to_string(), classify(object)))
        .collect();
    ValidationReport { verdicts }
}

/// Classify every object and rename it with its tag.
///
/// Nothing is tagged unless both a triblock and a quadblock are present.
///
/// # Errors
///
/// Returns [`VertexError::InvalidState`] if no triblock or no quadblock is
/// present; no object is renamed in that case.
pub fn tag_objects(objects: &mut [MeshObject]) -> Result<ValidationReport> {
    let report = validate_objects(objects);
    for (kind, label) in [(BlockKind::TriBlock, "triblock"), (BlockKind::QuadBlock, "quadblock")] {
        if report.count(Some(kind)) == 0 {
            return Err(VertexError::InvalidState(format!(
                "no {} found; both block types must be present before tagging",
                label
            )));
        }
    }

    for (object, (name, verdict)) in objects.iter_mut().zip(&report.verdicts) {
        if let Verdict::Invalid(defect) = verdict {
            log::info!("{} is invalid: {}", name, defect);
        }
        object.set_name(tag_name(name, *verdict));
    }
    Ok(report)
}
