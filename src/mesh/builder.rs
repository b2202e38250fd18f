//! Mesh construction utilities.
//!
//! Builds a [`HalfEdgeMesh`] from face-vertex lists as found in mesh files.
//! Faces may have any number of corners; triangles and quads are the common
//! cases and get fixed-size convenience wrappers.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygon faces.
///
/// Faces are vertex-index loops, consistently oriented. Edges used by a single
/// face become twinless boundary half-edges.
///
/// # Errors
///
/// - [`MeshError::EmptyMesh`] when `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for out-of-range corners
/// - [`MeshError::DegenerateFace`] for faces with fewer than 3 corners or a
///   repeated corner
/// - [`MeshError::NonManifoldEdge`] when a directed edge appears twice
///   (inconsistent orientation or more than two faces on one edge)
///
/// # Example
/// ```
/// use gregory::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_halfedges(), 7);
/// ```
pub fn build_from_polygons<F: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (i, &vi) in face.iter().enumerate() {
            if face[i + 1..].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }
    }

    let num_halfedges: usize = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), num_halfedges, faces.len());
    mesh.vertices.extend(vertices.iter().map(|&p| Vertex::new(p)));

    // Directed edge (v0, v1) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(num_halfedges);

    for face in faces {
        let face = face.as_ref();
        let n = face.len();
        let base = mesh.halfedges.len();
        let face_id = FaceId::new(mesh.faces.len());

        mesh.faces.push(Face {
            halfedge: HalfEdgeId::new(base),
            len: n,
        });

        for (i, &v0) in face.iter().enumerate() {
            let v1 = face[(i + 1) % n];
            let he = HalfEdgeId::new(base + i);

            mesh.halfedges.push(HalfEdge {
                origin: VertexId::new(v0),
                twin: HalfEdgeId::invalid(),
                next: HalfEdgeId::new(base + (i + 1) % n),
                prev: HalfEdgeId::new(base + (i + n - 1) % n),
                face: face_id,
            });

            if edge_map.insert((v0, v1), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0, v1 });
            }
        }
    }

    link_twins(&mut mesh, &edge_map);
    build_incident_lists(&mut mesh);

    Ok(mesh)
}

/// Pair every directed edge with its reverse, if present.
fn link_twins(mesh: &mut HalfEdgeMesh, edge_map: &HashMap<(usize, usize), HalfEdgeId>) {
    for (&(v0, v1), &he) in edge_map {
        if let Some(&twin) = edge_map.get(&(v1, v0)) {
            mesh.halfedges[he.index()].twin = twin;
        }
    }
}

/// Record each half-edge at both of its endpoints, in half-edge order.
fn build_incident_lists(mesh: &mut HalfEdgeMesh) {
    for i in 0..mesh.halfedges.len() {
        let he = HalfEdgeId::new(i);
        let [a, b] = mesh.endpoints(he);
        mesh.vertices[a.index()].edges.push(he);
        mesh.vertices[b.index()].edges.push(he);
    }
}

/// Build a half-edge mesh from vertices and quad faces.
///
/// # Example
/// ```
/// use gregory::mesh::build_from_quads;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
/// assert_eq!(mesh.face_len(mesh.face_ids().next().unwrap()), 4);
/// ```
pub fn build_from_quads(vertices: &[Point3<f64>], faces: &[[usize; 4]]) -> Result<HalfEdgeMesh> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and triangle faces.
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    build_from_polygons(vertices, faces)
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns `(vertices, faces)` with faces in loop order.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let vertices = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    (vertices, faces)
}
