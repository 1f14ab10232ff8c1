//! STL (stereolithography) format support.
//!
//! STL stores an independent copy of every triangle corner. On load, corners
//! with bit-identical coordinates are shared; nearly coincident corners stay
//! separate, which is what [`crate::algo::weld`] is for. Both binary and
//! ASCII files are read; files are saved as binary.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{Result, VertexError};
use crate::mesh::MeshObject;

use super::object_name;

/// Load an object from an STL file.
///
/// # Example
///
/// ```no_run
/// use trackverts::io::stl;
///
/// let kerb = stl::load("kerb.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshObject> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| VertexError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // Share corners by exact bit pattern
    let mut shared: HashMap<[u32; 3], usize> = HashMap::new();
    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let remap: Vec<usize> = stl
        .vertices
        .iter()
        .map(|v| {
            let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
            *shared.entry(key).or_insert_with(|| {
                vertices.push(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
                vertices.len() - 1
            })
        })
        .collect();
    let faces: Vec<Vec<usize>> = stl
        .faces
        .iter()
        .map(|f| f.vertices.iter().map(|&i| remap[i]).collect())
        .collect();

    if faces.is_empty() {
        return Err(VertexError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no triangles".to_string(),
        });
    }

    log::debug!("loaded {} triangles from {}", faces.len(), path.display());

    MeshObject::from_points(object_name(path), vertices)
        .with_faces(faces)
        .map_err(|e| VertexError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Save an object to a binary STL file.
///
/// Polygons are fan-triangulated. Coordinates are written in local space at
/// single precision.
///
/// # Errors
///
/// Returns [`VertexError::SaveError`] if the object has no faces.
///
/// # Example
///
/// ```no_run
/// use trackverts::io::{ply, stl};
///
/// let block = ply::load("quad_12.ply").unwrap();
/// stl::save(&block, "quad_12.stl").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(object: &MeshObject, path: P) -> Result<()> {
    let path = path.as_ref();
    if object.faces().is_empty() {
        return Err(VertexError::SaveError {
            path: path.to_path_buf(),
            message: "STL needs at least one face".to_string(),
        });
    }

    let vertices = object.vertices();
    let mut triangles: Vec<stl_io::Triangle> = Vec::new();
    for f in object.faces() {
        for i in 1..f.len().saturating_sub(1) {
            let p0 = &vertices[f[0]];
            let p1 = &vertices[f[i]];
            let p2 = &vertices[f[i + 1]];

            // Degenerate triangles get a zero normal
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    stl_io::Vertex::new([p0.x as f32, p0.y as f32, p0.z as f32]),
                    stl_io::Vertex::new([p1.x as f32, p1.y as f32, p1.z as f32]),
                    stl_io::Vertex::new([p2.x as f32, p2.y as f32, p2.z as f32]),
                ],
            });
        }
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| VertexError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PointSource;

    #[test]
    fn test_round_trip_shares_exact_corners() {
        let object = MeshObject::from_points(
            "quad",
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
        .with_faces(vec![vec![0, 1, 2, 3]])
        .unwrap();

        let path = std::env::temp_dir().join(format!("trackverts_quad_{}.stl", std::process::id()));
        save(&object, &path).unwrap();
        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // The quad is split into two triangles sharing an edge
        assert_eq!(loaded.faces().len(), 2);
        assert_eq!(loaded.len(), 4);
    }

    #[test]
    fn test_save_requires_faces() {
        let object = MeshObject::from_points("cloud", vec![Point3::origin()]);
        let path = std::env::temp_dir().join("trackverts_cloud.stl");
        assert!(matches!(save(&object, &path), Err(VertexError::SaveError { .. })));
    }
}
