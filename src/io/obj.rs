//! Wavefront OBJ format support.
//!
//! Only `v` and `f` records are read; texture coordinates, normals, groups and
//! materials are skipped. Face corners may use the `v`, `v/vt`, `v//vn` and
//! `v/vt/vn` forms, and indices may be negative (relative to the end of the
//! vertex list read so far).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh};

/// Load a polygon mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use gregory::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// println!("{} faces", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let (vertices, faces) = parse(reader).map_err(|e| match e {
        ParseError::Io(e) => MeshError::Io(e),
        ParseError::Syntax { line, message } => MeshError::LoadError {
            path: path.to_path_buf(),
            message: format!("line {}: {}", line, message),
        },
    })?;
    build_from_polygons(&vertices, &faces)
}

enum ParseError {
    Io(std::io::Error),
    Syntax { line: usize, message: String },
}

type Polygons = (Vec<Point3<f64>>, Vec<Vec<usize>>);

fn parse<R: BufRead>(reader: R) -> std::result::Result<Polygons, ParseError> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(ParseError::Io)?;
        let syntax = |message: String| ParseError::Syntax {
            line: i + 1,
            message,
        };

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for c in &mut coords {
                    let token = tokens
                        .next()
                        .ok_or_else(|| syntax("vertex needs three coordinates".to_string()))?;
                    *c = token
                        .parse()
                        .map_err(|_| syntax(format!("bad coordinate '{}'", token)))?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = tokens
                    .map(|token| resolve_index(token, vertices.len()).map_err(&syntax))
                    .collect::<std::result::Result<Vec<usize>, _>>()?;
                faces.push(face);
            }
            _ => {}
        }
    }

    Ok((vertices, faces))
}

/// Zero-based vertex index of one face corner token.
fn resolve_index(token: &str, vertex_count: usize) -> std::result::Result<usize, String> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head
        .parse()
        .map_err(|_| format!("bad face index '{}'", token))?;

    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(vertex_count as i64 + i),
    };
    resolved
        .filter(|&i| i >= 0)
        .map(|i| i as usize)
        .ok_or_else(|| format!("face index '{}' is out of range", token))
}

/// Save a polygon mesh to an OBJ file.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let (vertices, faces) = to_face_vertex(mesh);

    writeln!(writer, "# Generated by gregory")?;
    for v in &vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for f in &faces {
        write!(writer, "f")?;
        for i in f {
            write!(writer, " {}", i + 1)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}
