//! Mesh and patch buffer file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Polygons kept intact |
//! | PLY | `.ply` | ✓ | ✓ | Stanford polygon format |
//! | Patch buffer | `.grpt` | ✓ | ✓ | See [`patches`] |
//!
//! # Usage
//!
//! ```no_run
//! use gregory::io::{load, save};
//!
//! let mesh = load("model.obj").unwrap();
//! save(&mesh, "model.ply").unwrap();
//! ```

pub mod obj;
pub mod patches;
pub mod ply;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "ply" => Some(Format::Ply),
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

fn format_of(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file, choosing the format by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    match format_of(path)? {
        Format::Obj => obj::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a mesh to a file, choosing the format by extension.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match format_of(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Ply => ply::save(mesh, path),
    }
}

/// A unique scratch file path for tests.
#[cfg(test)]
pub(crate) fn test_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("gregory-{}-{}", std::process::id(), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/model.OBJ"), Some(Format::Obj));
        assert_eq!(Format::from_path("model.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("model.stl"), None);
        assert_eq!(Format::from_path("model"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("model.stl").unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFormat { extension } if extension == "stl"));
    }
}
