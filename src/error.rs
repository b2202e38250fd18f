//! Error types for gregory.
//!
//! [`MeshError`] covers building and loading meshes. [`PatchError`] covers the
//! patch pipeline: stencil capacity, mesh topology the builders cannot handle,
//! and GPU packing.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::{FaceId, HalfEdgeId, VertexId};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Result type alias using [`PatchError`].
pub type PatchResult<T> = std::result::Result<T, PatchError>;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 corners or duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) is used twice in the same direction")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

/// Errors raised while classifying, assembling, or packing patches.
#[derive(Error, Debug)]
pub enum PatchError {
    /// A single control point needs more than 32 distinct vertices.
    #[error("control point stencil overflow: vertex {vertex:?} does not fit in {capacity} slots")]
    StencilOverflow {
        /// The vertex that could not be added.
        vertex: VertexId,
        /// Stencil capacity.
        capacity: usize,
    },

    /// The 20 control points of a patch reference more than 32 distinct vertices.
    #[error("patch for face {face:?} references {count} vertices, at most {capacity} fit")]
    PatchVertexOverflow {
        /// The patch face.
        face: FaceId,
        /// Number of distinct vertices referenced.
        count: usize,
        /// Per-patch vertex capacity.
        capacity: usize,
    },

    /// A stencil references a vertex missing from the patch's input list.
    #[error("vertex {vertex:?} is not in the input list of the patch for face {face:?}")]
    UnmappedVertex {
        /// The patch face.
        face: FaceId,
        /// The vertex that has no local slot.
        vertex: VertexId,
    },

    /// Adjacency required by a builder is missing.
    #[error("mesh topology error at {halfedge:?}: {details}")]
    MeshTopology {
        /// The half-edge where traversal failed.
        halfedge: HalfEdgeId,
        /// What was expected.
        details: &'static str,
    },

    /// A patch corner has a configuration no builder handles.
    #[error("vertex {vertex:?} is a boundary vertex with {faces} faces, which has no patch rule")]
    UnsupportedVertex {
        /// The vertex.
        vertex: VertexId,
        /// Number of faces around it.
        faces: usize,
    },

    /// A patch was requested for a face that is not a quad.
    #[error("face {face:?} has {len} edges, patches need 4")]
    NotAQuad {
        /// The face.
        face: FaceId,
        /// Its edge count.
        len: usize,
    },

    /// Mesh connectivity failed validation.
    #[error("mesh connectivity is inconsistent")]
    InvalidMesh,

    /// Mesh construction or I/O failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl PatchError {
    /// Create a topology error at `halfedge`.
    pub fn topology(halfedge: HalfEdgeId, details: &'static str) -> Self {
        PatchError::MeshTopology { halfedge, details }
    }
}
