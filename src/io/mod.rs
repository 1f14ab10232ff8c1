//! Mesh object file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | PLY | `.ply` | ✓ | ✓ | Polygons of any size, ASCII output |
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII input, binary output |
//!
//! Loaded objects are named after the file stem and carry an identity
//! transform.
//!
//! # Usage
//!
//! ```no_run
//! use trackverts::io::{load, save};
//!
//! let block = load("quad_12.ply").unwrap();
//! save(&block, "quad_12_out.ply").unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{Result, VertexError};
use crate::mesh::MeshObject;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| VertexError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

pub(crate) fn object_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("object")
        .to_string()
}

/// Load an object with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshObject> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::load(path),
        Format::Stl => stl::load(path),
    }
}

/// Save an object with automatic format detection.
pub fn save<P: AsRef<Path>>(object: &MeshObject, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Ply => ply::save(object, path),
        Format::Stl => stl::save(object, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/quad.PLY"), Some(Format::Ply));
        assert_eq!(Format::from_path("kerb.stl"), Some(Format::Stl));
        assert_eq!(Format::from_path("scene.blend"), None);
        assert!(matches!(
            load("scene.blend"),
            Err(VertexError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            load("no_extension"),
            Err(VertexError::UnsupportedFormat { extension }) if extension == "(none)"
        ));
    }

    #[test]
    fn test_object_name() {
        assert_eq!(object_name(Path::new("/tmp/quad_12.ply")), "quad_12");
    }
}
