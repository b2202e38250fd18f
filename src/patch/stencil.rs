//! Control-point stencil builders.
//!
//! Each builder produces the [`ControlPointWeights`] of one Gregory patch control
//! point as a combination of mesh vertices. Builders are parameterized by the
//! patch corner `k` (0..4, the origin of the face's `k`-th half-edge) and a
//! [`Side`], rather than hard-coding one function per named point.
//!
//! # Vertex rings
//!
//! Around a corner vertex `v`, the outgoing half-edges ("spokes") are visited by
//! [`ring_next`] (`twin(prev(h))`) and [`ring_prev`] (`next(twin(h))`). Starting
//! from the corner's own half-edge, `ring_next` steps across the previous edge
//! of the face, so the face of spoke `i` always lies between spokes `i` and
//! `i + 1`.
//!
//! # Point families
//!
//! - Corner points are limit positions, weights sum to 1.
//! - Edge points are `p + 2/3 * tangent`, weights sum to 1.
//! - Twist points are cross-boundary difference vectors, weights sum to 0. The
//!   tessellation stage combines them with `p`, `e`, and the corner valences.

use std::f32::consts::PI;

use super::model::{Patch, Side};
use super::weights::ControlPointWeights;
use crate::error::{PatchError, PatchResult};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

use nalgebra::Point3;

/// Tangent scale `λ(n)` of an interior vertex of valence `n`.
///
/// `(5 + cos(2π/n) + cos(π/n) * sqrt(18 + 2cos(2π/n))) / 16`; 0.5 for `n = 4`.
pub fn lambda(n: usize) -> f32 {
    let n = n as f32;
    let c2 = (2.0 * PI / n).cos();
    let c1 = (PI / n).cos();
    (5.0 + c2 + c1 * (18.0 + 2.0 * c2).sqrt()) / 16.0
}

/// Mid-edge/face balance `σ(n) = 1 / sqrt(4 + cos²(π/n))`.
pub fn sigma(n: usize) -> f32 {
    let c = (PI / n as f32).cos();
    1.0 / (4.0 + c * c).sqrt()
}

/// Local configuration of a patch corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// Boundary vertex in a single face.
    Corner,
    /// Boundary vertex shared by exactly two faces.
    TJunction,
    /// Vertex surrounded by faces.
    Interior {
        /// Number of edges around the vertex.
        valence: usize,
    },
    /// Boundary vertex in three or more faces, or with a non-manifold fan.
    Boundary {
        /// Number of faces around the vertex.
        faces: usize,
    },
}

impl VertexKind {
    /// Determine the configuration of `v`.
    pub fn classify(mesh: &HalfEdgeMesh, v: VertexId) -> Self {
        let faces = mesh.valence(v);
        match mesh.boundary_halfedges(v).count() {
            0 => VertexKind::Interior { valence: faces },
            2 if faces == 1 => VertexKind::Corner,
            2 if faces == 2 => VertexKind::TJunction,
            _ => VertexKind::Boundary { faces },
        }
    }
}

// ==================== Traversal ====================

/// The spoke after `h` around its origin, `None` across the boundary.
#[inline]
pub fn ring_next(mesh: &HalfEdgeMesh, h: HalfEdgeId) -> Option<HalfEdgeId> {
    mesh.twin(mesh.prev(h)).valid()
}

/// The spoke before `h` around its origin, `None` across the boundary.
#[inline]
pub fn ring_prev(mesh: &HalfEdgeMesh, h: HalfEdgeId) -> Option<HalfEdgeId> {
    mesh.right_neighbor(h)
}

/// All spokes of an interior vertex, starting at `start`.
///
/// # Errors
///
/// [`PatchError::MeshTopology`] if the walk meets the boundary, fails to
/// return to `start` within the vertex's valence, or closes early around a
/// vertex shared by separate fans.
pub fn vertex_ring(mesh: &HalfEdgeMesh, start: HalfEdgeId) -> PatchResult<Vec<HalfEdgeId>> {
    let valence = mesh.valence(mesh.origin(start));
    let mut spokes = Vec::with_capacity(valence);
    let mut current = start;

    loop {
        spokes.push(current);
        current = ring_next(mesh, current)
            .ok_or_else(|| PatchError::topology(current, "vertex ring reaches the boundary"))?;
        if current == start {
            if spokes.len() != valence {
                return Err(PatchError::topology(
                    start,
                    "vertex ring does not cover every incident edge",
                ));
            }
            return Ok(spokes);
        }
        if spokes.len() >= valence {
            return Err(PatchError::topology(start, "vertex ring does not close"));
        }
    }
}

/// The two half-edges of `face` at corner `k`: `(outgoing, incoming)`.
#[inline]
fn corner_edges(mesh: &HalfEdgeMesh, face: FaceId, k: usize) -> (HalfEdgeId, HalfEdgeId) {
    let h = mesh.face_corner(face, k);
    (h, mesh.prev(h))
}

/// The endpoint of `edge` that is not `v`.
#[inline]
fn far_end(mesh: &HalfEdgeMesh, edge: HalfEdgeId, v: VertexId) -> VertexId {
    let [a, b] = mesh.endpoints(edge);
    if a == v {
        b
    } else {
        a
    }
}

/// Add `w` at the midpoint of `edge` (half to each endpoint).
fn add_midpoint(
    cp: &mut ControlPointWeights,
    mesh: &HalfEdgeMesh,
    edge: HalfEdgeId,
    w: f32,
) -> PatchResult<()> {
    cp.add_spread(mesh.endpoints(edge), 0.5 * w)
}

/// Add `w` at the centroid of `face` (spread over its vertices).
fn add_centroid(
    cp: &mut ControlPointWeights,
    mesh: &HalfEdgeMesh,
    face: FaceId,
    w: f32,
) -> PatchResult<()> {
    cp.add_spread(mesh.face_vertices(face), w / mesh.face_len(face) as f32)
}

// ==================== Corner points ====================

/// Limit-position stencil of the origin of corner half-edge `h`.
///
/// - mesh corner: the vertex itself
/// - T-junction: `4/6` on the vertex, `1/6` on each boundary neighbor
/// - interior, valence `n`: `(n-3)/(n+5)` on the vertex plus `4/(n(n+5))` at
///   each edge midpoint and each face centroid of the ring
pub fn corner_point(mesh: &HalfEdgeMesh, h: HalfEdgeId) -> PatchResult<ControlPointWeights> {
    let v = mesh.origin(h);
    match VertexKind::classify(mesh, v) {
        VertexKind::Corner => Ok(ControlPointWeights::single(v)),
        VertexKind::TJunction => {
            let mut cp = ControlPointWeights::new();
            cp.add_weight(v, 4.0 / 6.0)?;
            for edge in mesh.boundary_halfedges(v) {
                cp.add_weight(far_end(mesh, edge, v), 1.0 / 6.0)?;
            }
            Ok(cp)
        }
        VertexKind::Interior { valence } => {
            let n = valence as f32;
            let ring_weight = 4.0 / (n * (n + 5.0));

            let mut cp = ControlPointWeights::new();
            cp.add_weight(v, (n - 3.0) / (n + 5.0))?;
            for spoke in vertex_ring(mesh, h)? {
                add_midpoint(&mut cp, mesh, spoke, ring_weight)?;
                add_centroid(&mut cp, mesh, mesh.halfedge_face(spoke), ring_weight)?;
            }
            Ok(cp)
        }
        VertexKind::Boundary { faces } => Err(PatchError::UnsupportedVertex { vertex: v, faces }),
    }
}

// ==================== Edge points ====================

/// First spoke of the ring for `side` at corner half-edge `h`.
fn side_spoke(mesh: &HalfEdgeMesh, h: HalfEdgeId, side: Side) -> PatchResult<HalfEdgeId> {
    match side {
        Side::Plus => Ok(h),
        Side::Minus => ring_next(mesh, h)
            .ok_or_else(|| PatchError::topology(h, "previous edge of the corner has no twin")),
    }
}

/// Tangent stencil at interior corner `k` of `face`, along `side`.
///
/// `λ(n) (2/n) Σ_i [(1 - σ cos(π/n)) cos(2πi/n) m_i + 2σ cos((2πi + π)/n) c_i]`
/// over the mid-edges `m_i` and face centroids `c_i` of the ring, starting at
/// the edge in the `side` direction. The weights sum to 0.
pub fn tangent(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    k: usize,
    side: Side,
) -> PatchResult<ControlPointWeights> {
    let (h, _) = corner_edges(mesh, face, k);
    let ring = vertex_ring(mesh, side_spoke(mesh, h, side)?)?;
    let n = ring.len();
    let nf = n as f32;
    let s = sigma(n);
    let edge_scale = 1.0 - s * (PI / nf).cos();

    let mut q = ControlPointWeights::new();
    for (i, &spoke) in ring.iter().enumerate() {
        let angle = 2.0 * PI * i as f32 / nf;
        add_midpoint(&mut q, mesh, spoke, edge_scale * angle.cos())?;
        add_centroid(
            &mut q,
            mesh,
            mesh.halfedge_face(spoke),
            2.0 * s * (angle + PI / nf).cos(),
        )?;
    }
    q.scale(lambda(n) * 2.0 / nf);
    Ok(q)
}

/// Edge point `e = p + 2/3 * tangent` at interior corner `k` of `face`.
///
/// `corner` is the already built corner point `p_k`.
pub fn edge_point(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    k: usize,
    side: Side,
    corner: &ControlPointWeights,
) -> PatchResult<ControlPointWeights> {
    let mut e = corner.clone();
    e.merge(&tangent(mesh, face, k, side)?.scaled(2.0 / 3.0))?;
    Ok(e)
}

/// Edge point at corner `k` of `face` when the corner is on the mesh boundary.
///
/// The edge in the `side` direction runs from the corner `v` to `far`:
///
/// - the edge is on the boundary, or `v` is a mesh corner: `2/3 v + 1/3 far`,
///   the Bézier point of the boundary curve
/// - `v` is a T-junction and the edge is interior: `4/9 v + 2/9 far`, plus `1/6`
///   per adjacent face spread over that face's remaining vertices
pub fn boundary_edge_point(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    k: usize,
    side: Side,
) -> PatchResult<ControlPointWeights> {
    let (out, inc) = corner_edges(mesh, face, k);
    let v = mesh.origin(out);
    let edge = match side {
        Side::Plus => out,
        Side::Minus => inc,
    };
    let far = far_end(mesh, edge, v);

    let mut cp = ControlPointWeights::new();
    match (VertexKind::classify(mesh, v), mesh.twin(edge).valid()) {
        (VertexKind::TJunction, Some(twin)) => {
            for f in [mesh.halfedge_face(edge), mesh.halfedge_face(twin)] {
                let others: Vec<VertexId> = mesh
                    .face_vertices(f)
                    .filter(|&x| x != v && x != far)
                    .collect();
                if !others.is_empty() {
                    cp.add_spread(others.iter().copied(), (1.0 / 6.0) / others.len() as f32)?;
                }
            }
            cp.add_weight(v, 4.0 / 9.0)?;
            cp.add_weight(far, 2.0 / 9.0)?;
        }
        (VertexKind::Corner | VertexKind::TJunction, _) => {
            cp.add_weight(v, 2.0 / 3.0)?;
            cp.add_weight(far, 1.0 / 3.0)?;
        }
        (VertexKind::Interior { .. }, _) => {
            return Err(PatchError::topology(out, "corner is not on the boundary"));
        }
        (VertexKind::Boundary { faces }, _) => {
            return Err(PatchError::UnsupportedVertex { vertex: v, faces });
        }
    }
    Ok(cp)
}

// ==================== Twist points ====================

/// Twist vector across the edge of `spoke`, evaluated at its origin.
///
/// `(1/3)(m_left - m_right) + (2/3)(c_near - c_far)`, multiplied by `flip`:
/// `near` is the face of `spoke`, `far` the face across it, `left` the next
/// spoke (or the boundary edge of `near` when the ring stops there) and `right`
/// the spoke before.
pub fn ring_twist(
    mesh: &HalfEdgeMesh,
    spoke: HalfEdgeId,
    flip: f32,
) -> PatchResult<ControlPointWeights> {
    let left = ring_next(mesh, spoke).unwrap_or_else(|| mesh.prev(spoke));
    let right = ring_prev(mesh, spoke)
        .ok_or_else(|| PatchError::topology(spoke, "twist edge has no twin"))?;
    let near = mesh.halfedge_face(spoke);
    let far = mesh.halfedge_face(right);

    let mut cp = ControlPointWeights::new();
    add_midpoint(&mut cp, mesh, left, flip / 3.0)?;
    add_midpoint(&mut cp, mesh, right, -flip / 3.0)?;
    add_centroid(&mut cp, mesh, near, 2.0 * flip / 3.0)?;
    add_centroid(&mut cp, mesh, far, -2.0 * flip / 3.0)?;
    Ok(cp)
}

/// Twist point at corner `k` of `face` from the vertex rings.
///
/// `Plus` measures across the edge `k -> k+1`, `Minus` across `k-1 -> k`; both
/// point into `face`.
pub fn twist_point(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    k: usize,
    side: Side,
) -> PatchResult<ControlPointWeights> {
    let (h, _) = corner_edges(mesh, face, k);
    ring_twist(mesh, side_spoke(mesh, h, side)?, side.sign())
}

/// Twist point at corner `k` from the quad itself.
///
/// Half the sum of the two face edges parallel to the twist direction:
/// `Plus` = `½(-v_k + v_k-1 - v_k+1 + v_k+2)`, `Minus` = `½(-v_k + v_k+1 - v_k-1 + v_k+2)`.
/// Used where the edge in that direction lies on the mesh boundary.
pub fn face_twist(
    mesh: &HalfEdgeMesh,
    face: FaceId,
    k: usize,
    side: Side,
) -> PatchResult<ControlPointWeights> {
    let len = mesh.face_len(face);
    if len != 4 {
        return Err(PatchError::NotAQuad { face, len });
    }
    let corner = |i: usize| mesh.origin(mesh.face_corner(face, i));
    let (here, next, opposite, prev) = (corner(k), corner(k + 1), corner(k + 2), corner(k + 3));
    let (toward, away) = match side {
        Side::Plus => (prev, next),
        Side::Minus => (next, prev),
    };

    let mut cp = ControlPointWeights::new();
    cp.add_weight(here, -0.5)?;
    cp.add_weight(toward, 0.5)?;
    cp.add_weight(away, -0.5)?;
    cp.add_weight(opposite, 0.5)?;
    Ok(cp)
}

// ==================== Diagnostics ====================

/// Evaluate `P + 2/3 Q` for corner `k` of an assembled patch.
///
/// `P` is the stored corner point and `Q` the tangent recomputed from the mesh.
/// For interior corners this reproduces the stored edge point, which makes it a
/// cross-check of the stencils against plain positions.
pub fn extrapolated_edge_point(
    mesh: &HalfEdgeMesh,
    patch: &Patch,
    k: usize,
    side: Side,
) -> PatchResult<Point3<f64>> {
    use super::model::GregoryQuadPatchPoint as Gp;

    let p = patch.point(Gp::corner(k)).apply_weights(mesh);
    let q = tangent(mesh, patch.face, k, side)?.apply_vector(mesh);
    Ok(p + q * (2.0 / 3.0))
}
