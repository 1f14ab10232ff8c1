//! PLY (Stanford polygon) format support.
//!
//! Vertices and polygon faces are read as stored: faces of any arity are kept
//! as index lists, and a file with only a vertex element loads as a point
//! object.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{Result, VertexError};
use crate::mesh::{MeshObject, PointSource};

use super::object_name;

/// Load an object from a PLY file.
///
/// The object is named after the file stem.
///
/// # Example
///
/// ```no_run
/// use trackverts::io::ply;
///
/// let block = ply::load("quad_12.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<MeshObject> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let load_error = |message: &str| VertexError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let x = get_float_property(vertex, "x").ok_or_else(|| load_error("vertex missing x coordinate"))?;
        let y = get_float_property(vertex, "y").ok_or_else(|| load_error("vertex missing y coordinate"))?;
        let z = get_float_property(vertex, "z").ok_or_else(|| load_error("vertex missing z coordinate"))?;
        vertices.push(Point3::new(x, y, z));
    }

    let mut faces: Vec<Vec<usize>> = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        faces.reserve(face_element.len());
        for face in face_element {
            let indices = get_list_property(face, "vertex_indices")
                .or_else(|| get_list_property(face, "vertex_index"))
                .ok_or_else(|| load_error("face missing vertex_indices property"))?;
            faces.push(indices);
        }
    }

    log::debug!(
        "loaded {} vertices and {} faces from {}",
        vertices.len(),
        faces.len(),
        path.display()
    );

    MeshObject::from_points(object_name(path), vertices)
        .with_faces(faces)
        .map_err(|e| load_error(&e.to_string()))
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save an object to a PLY file (ASCII format).
///
/// Local-space vertices are written at double precision so that welded
/// coordinates survive a round trip exactly.
///
/// # Example
///
/// ```no_run
/// use trackverts::io::ply;
/// use trackverts::mesh::MeshObject;
///
/// let block = MeshObject::from_points("empty", Vec::new());
/// ply::save(&block, "output.ply").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(object: &MeshObject, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let vertices = object.vertices();
    let faces = object.faces();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by trackverts")?;
    writeln!(writer, "comment object {}", object.name())?;
    writeln!(writer, "element vertex {}", vertices.len())?;
    writeln!(writer, "property double x")?;
    writeln!(writer, "property double y")?;
    writeln!(writer, "property double z")?;
    if !faces.is_empty() {
        writeln!(writer, "element face {}", faces.len())?;
        writeln!(writer, "property list uchar int vertex_indices")?;
    }
    writeln!(writer, "end_header")?;

    for v in vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    for f in faces {
        if f.len() > u8::MAX as usize {
            return Err(VertexError::SaveError {
                path: path.to_path_buf(),
                message: format!("face with {} vertices exceeds the PLY list limit", f.len()),
            });
        }
        write!(writer, "{}", f.len())?;
        for i in f {
            write!(writer, " {}", i)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
