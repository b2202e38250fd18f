//! Half-edge mesh data structure for polygon meshes.
//!
//! Every face is a closed loop of half-edges linked by `next`/`prev`. Two faces
//! sharing an edge have their half-edges linked as twins.
//!
//! # Boundary Handling
//!
//! No half-edges exist outside faces. A half-edge on the mesh boundary simply has
//! an invalid `twin`, so "is this edge on the boundary" is a single sentinel check
//! and a boundary vertex is one touched by at least one twinless half-edge.
//!
//! # Incident Lists
//!
//! Each vertex records every half-edge that starts *or* ends at it. An interior
//! vertex of valence `n` therefore lists `2n` half-edges, a boundary vertex
//! touching `k` faces lists `2k`, and [`HalfEdgeMesh::valence`] is the list
//! length halved.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Every half-edge whose origin or destination is this vertex.
    pub edges: Vec<HalfEdgeId>,
}

impl Vertex {
    /// Create an isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            edges: Vec::new(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge starts at.
    pub origin: VertexId,

    /// The opposite half-edge in the neighboring face, invalid on the boundary.
    pub twin: HalfEdgeId,

    /// The next half-edge around the face.
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The face this half-edge belongs to. Always valid.
    pub face: FaceId,
}

/// A polygonal face.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// The first half-edge of the face loop. Corner 0 is its origin.
    pub halfedge: HalfEdgeId,

    /// Number of edges (and vertices) in the loop.
    pub len: usize,
}

impl Default for Face {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            len: 0,
        }
    }
}

/// A half-edge mesh of arbitrary polygons.
///
/// Built by [`build_from_polygons`](super::build_from_polygons) and friends; the
/// element arrays are read-only afterwards except for vertex positions.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    // ==================== Half-edge Queries ====================

    /// The opposite half-edge, invalid on the boundary.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// The next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// The previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// The vertex a half-edge starts at.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// The vertex a half-edge ends at.
    ///
    /// Taken from the next half-edge of the loop so it is defined on the boundary.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.next(he))
    }

    /// `[origin, dest]` of a half-edge.
    #[inline]
    pub fn endpoints(&self, he: HalfEdgeId) -> [VertexId; 2] {
        [self.origin(he), self.dest(he)]
    }

    /// The face a half-edge belongs to.
    #[inline]
    pub fn halfedge_face(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Whether the half-edge has an opposite half-edge.
    #[inline]
    pub fn has_twin(&self, he: HalfEdgeId) -> bool {
        self.twin(he).is_valid()
    }

    /// The half-edge preceding `he` in its own face.
    #[inline]
    pub fn left_neighbor(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.prev(he)
    }

    /// The half-edge following the twin of `he`, or `None` on the boundary.
    #[inline]
    pub fn right_neighbor(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.twin(he).valid().map(|t| self.next(t))
    }

    // ==================== Vertex Queries ====================

    /// All half-edges starting or ending at `v`.
    #[inline]
    pub fn incident_halfedges(&self, v: VertexId) -> &[HalfEdgeId] {
        &self.vertex(v).edges
    }

    /// Number of edges meeting at `v`, counted as the incident list length halved.
    ///
    /// On the boundary this is the number of faces around `v`, one less than
    /// the number of distinct edges.
    #[inline]
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex(v).edges.len() / 2
    }

    /// Whether any half-edge touching `v` lacks a twin.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.incident_halfedges(v)
            .iter()
            .any(|&he| !self.has_twin(he))
    }

    /// Distinct faces around `v`, sorted by index.
    pub fn vertex_faces(&self, v: VertexId) -> Vec<FaceId> {
        let mut faces: Vec<FaceId> = self
            .incident_halfedges(v)
            .iter()
            .map(|&he| self.halfedge_face(he))
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    /// The twinless half-edges touching `v`, in incident-list order.
    pub fn boundary_halfedges(&self, v: VertexId) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.incident_halfedges(v)
            .iter()
            .copied()
            .filter(move |&he| !self.has_twin(he))
    }

    // ==================== Face Queries ====================

    /// Number of edges of a face.
    #[inline]
    pub fn face_len(&self, f: FaceId) -> usize {
        self.face(f).len
    }

    /// The `k`-th half-edge of a face, walking `next` from its first half-edge.
    ///
    /// `k` wraps around the loop, so `face_corner(f, len)` is corner 0 again.
    pub fn face_corner(&self, f: FaceId, k: usize) -> HalfEdgeId {
        let face = self.face(f);
        let mut he = face.halfedge;
        for _ in 0..k % face.len.max(1) {
            he = self.next(he);
        }
        he
    }

    /// Iterate over the half-edges of a face in loop order.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Vertices of a face in loop order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Centroid of the vertices of a face.
    pub fn face_center(&self, f: FaceId) -> Point3<f64> {
        let sum: Vector3<f64> = self.face_vertices(f).map(|v| self.position(v).coords).sum();
        Point3::from(sum / self.face_len(f).max(1) as f64)
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    // ==================== Geometry ====================

    /// Midpoint of the edge carrying `he`.
    pub fn edge_midpoint(&self, he: HalfEdgeId) -> Point3<f64> {
        let [a, b] = self.endpoints(he);
        Point3::from((self.position(a).coords + self.position(b).coords) * 0.5)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    ///
    /// Verifies loop closure, `next`/`prev` inversion, twin symmetry, and that
    /// every vertex's incident list holds exactly the half-edges touching it.
    pub fn is_valid(&self) -> bool {
        let nv = self.vertices.len();
        let nh = self.halfedges.len();
        let in_range = |he: HalfEdgeId| he.is_valid() && he.index() < nh;

        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::new(i);
            if !he.origin.is_valid() || he.origin.index() >= nv {
                return false;
            }
            if !in_range(he.next) || !in_range(he.prev) {
                return false;
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            if !he.face.is_valid() || he.face.index() >= self.faces.len() {
                return false;
            }
            if he.twin.is_valid() {
                if !in_range(he.twin) || self.twin(he.twin) != id {
                    return false;
                }
                if self.origin(he.twin) != self.dest(id) || self.dest(he.twin) != he.origin {
                    return false;
                }
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            if !in_range(face.halfedge) || face.len < 3 {
                return false;
            }
            let f = FaceId::new(i);
            let mut he = face.halfedge;
            for _ in 0..face.len {
                if self.halfedge_face(he) != f {
                    return false;
                }
                he = self.next(he);
            }
            if he != face.halfedge {
                return false;
            }
        }

        let mut touching = vec![0usize; nv];
        for i in 0..nh {
            let [a, b] = self.endpoints(HalfEdgeId::new(i));
            touching[a.index()] += 1;
            touching[b.index()] += 1;
        }
        self.vertex_ids().all(|v| {
            let edges = self.incident_halfedges(v);
            edges.len() == touching[v.index()]
                && edges.iter().all(|&he| {
                    in_range(he) && self.endpoints(he).contains(&v)
                })
        })
    }
}

/// Iterator over the half-edges of a face.
///
/// Bounded by the face length, so a corrupted loop cannot spin forever.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    current: HalfEdgeId,
    remaining: usize,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let face = mesh.face(f);
        Self {
            mesh,
            current: face.halfedge,
            remaining: if face.halfedge.is_valid() { face.len } else { 0 },
        }
    }
}

impl Iterator for FaceHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.current;
        self.current = self.mesh.next(self.current);
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FaceHalfEdgeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_quads;

    /// Two quads sharing the edge 1-4:
    ///
    /// ```text
    /// 3---4---5
    /// |   |   |
    /// 0---1---2
    /// ```
    fn create_quad_strip() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 4, 3], [1, 2, 5, 4]];
        build_from_quads(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_no_boundary_halfedges() {
        let mesh = create_quad_strip();
        assert_eq!(mesh.num_halfedges(), 8);
        let twinless = mesh.halfedge_ids().filter(|&he| !mesh.has_twin(he)).count();
        assert_eq!(twinless, 6);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_incident_lists_count_both_ends() {
        let mesh = create_quad_strip();

        // Grid corner: one face, two half-edges.
        assert_eq!(mesh.incident_halfedges(VertexId::new(0)).len(), 2);
        assert_eq!(mesh.valence(VertexId::new(0)), 1);

        // Shared boundary vertex: two faces, four half-edges.
        assert_eq!(mesh.incident_halfedges(VertexId::new(1)).len(), 4);
        assert_eq!(mesh.valence(VertexId::new(1)), 2);
        assert_eq!(mesh.vertex_faces(VertexId::new(1)).len(), 2);
        assert_eq!(mesh.boundary_halfedges(VertexId::new(1)).count(), 2);
    }

    #[test]
    fn test_face_corner_wraps() {
        let mesh = create_quad_strip();
        let f = FaceId::new(1);
        let corners: Vec<VertexId> = (0..4).map(|k| mesh.origin(mesh.face_corner(f, k))).collect();
        let verts: Vec<VertexId> = mesh.face_vertices(f).collect();
        assert_eq!(corners, verts);
        assert_eq!(mesh.face_corner(f, 4), mesh.face_corner(f, 0));
        assert_eq!(mesh.face_corner(f, 6), mesh.face_corner(f, 2));
    }

    #[test]
    fn test_neighbors_across_shared_edge() {
        let mesh = create_quad_strip();
        // Half-edge 1 -> 4 in face 0.
        let he = mesh.face_corner(FaceId::new(0), 1);
        assert_eq!(mesh.endpoints(he), [VertexId::new(1), VertexId::new(4)]);

        let twin = mesh.twin(he);
        assert_eq!(mesh.halfedge_face(twin), FaceId::new(1));
        assert_eq!(mesh.left_neighbor(he), mesh.prev(he));

        let right = mesh.right_neighbor(he).unwrap();
        assert_eq!(mesh.origin(right), VertexId::new(1));
        assert_eq!(mesh.dest(right), VertexId::new(2));

        let boundary = mesh.face_corner(FaceId::new(0), 0);
        assert!(mesh.right_neighbor(boundary).is_none());
    }

    #[test]
    fn test_face_center() {
        let mesh = create_quad_strip();
        let c = mesh.face_center(FaceId::new(1));
        assert!((c - Point3::new(1.5, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_boundary_vertices() {
        let mesh = create_quad_strip();
        assert!(mesh.vertex_ids().all(|v| mesh.is_boundary_vertex(v)));
    }

    #[test]
    fn test_broken_twin_detected() {
        let mut mesh = create_quad_strip();
        let he = mesh.face_corner(FaceId::new(0), 1);
        mesh.halfedges[he.index()].twin = HalfEdgeId::invalid();
        assert!(!mesh.is_valid());
    }

    #[test]
    fn test_edge_midpoint() {
        let mesh = create_quad_strip();
        let he = mesh.face_corner(FaceId::new(0), 0);
        let m = mesh.edge_midpoint(he);
        assert!((m - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    }
}
