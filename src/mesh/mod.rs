//! Core mesh data structures.
//!
//! This module provides the polygon half-edge mesh that the patch builders walk.
//!
//! # Overview
//!
//! [`HalfEdgeMesh`] stores faces as closed half-edge loops. Unlike a classic
//! doubly-connected edge list it creates no half-edges outside faces: a boundary
//! edge is a half-edge whose twin is invalid. Each vertex keeps the list of every
//! half-edge touching it, which is what valence and boundary queries read.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe 32-bit index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use gregory::mesh::{build_from_quads, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2, 3]];
//!
//! let mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//! assert!(mesh.is_valid());
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{FaceId, HalfEdgeId, VertexId, INVALID_INDEX};
