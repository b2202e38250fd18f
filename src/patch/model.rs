//! Patch data model: named control points, assembled patches, and face groups.

use std::fmt;

use super::weights::ControlPointWeights;
use crate::error::{PatchError, PatchResult};
use crate::mesh::{FaceId, VertexId};

/// Number of control points of a Gregory quad patch.
pub const PATCH_POINT_COUNT: usize = 20;

/// Maximum number of distinct mesh vertices one patch may reference.
pub const MAX_PATCH_VERTICES: usize = 32;

/// Which of the two directions at a patch corner a point belongs to.
///
/// At corner `k`, `Plus` runs along the patch edge `k -> k+1` and `Minus` along
/// the edge `k -> k-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Toward the previous corner.
    Minus,
    /// Toward the next corner.
    Plus,
}

impl Side {
    /// Both sides, `Minus` first (slot order).
    pub const ALL: [Side; 2] = [Side::Minus, Side::Plus];

    /// `+1.0` for `Plus`, `-1.0` for `Minus`.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Minus => -1.0,
            Side::Plus => 1.0,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            Side::Minus => 0,
            Side::Plus => 1,
        }
    }
}

/// The three families of control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    /// Limit position at a corner (`p`).
    Corner,
    /// Tangent point along a patch edge (`e`).
    Edge,
    /// Cross-boundary twist vector (`r`).
    Twist,
}

/// Named control points of a Gregory quad patch, in storage slot order.
///
/// The discriminant is the slot in [`Patch::control_points`] and in the GPU
/// record, so the order is part of the buffer layout.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum GregoryQuadPatchPoint {
    P0 = 0,
    P1,
    P2,
    P3,
    E0Minus,
    E0Plus,
    E1Minus,
    E1Plus,
    E2Minus,
    E2Plus,
    E3Minus,
    E3Plus,
    R0Minus,
    R0Plus,
    R1Minus,
    R1Plus,
    R2Minus,
    R2Plus,
    R3Minus,
    R3Plus,
}

impl GregoryQuadPatchPoint {
    /// Every point in slot order.
    pub const ALL: [GregoryQuadPatchPoint; PATCH_POINT_COUNT] = {
        use GregoryQuadPatchPoint::*;
        [
            P0, P1, P2, P3, E0Minus, E0Plus, E1Minus, E1Plus, E2Minus, E2Plus, E3Minus, E3Plus,
            R0Minus, R0Plus, R1Minus, R1Plus, R2Minus, R2Plus, R3Minus, R3Plus,
        ]
    };

    /// Corner point `p_k` (`k` taken mod 4).
    #[inline]
    pub fn corner(k: usize) -> Self {
        Self::ALL[k % 4]
    }

    /// Tangent point `e_k` on `side`.
    #[inline]
    pub fn edge(k: usize, side: Side) -> Self {
        Self::ALL[4 + 2 * (k % 4) + side.slot()]
    }

    /// Twist point `r_k` on `side`.
    #[inline]
    pub fn twist(k: usize, side: Side) -> Self {
        Self::ALL[12 + 2 * (k % 4) + side.slot()]
    }

    /// Storage slot.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Family of this point.
    pub fn kind(self) -> PointKind {
        match self.index() {
            0..=3 => PointKind::Corner,
            4..=11 => PointKind::Edge,
            _ => PointKind::Twist,
        }
    }

    /// The patch corner this point is attached to.
    pub fn corner_index(self) -> usize {
        match self.kind() {
            PointKind::Corner => self.index(),
            PointKind::Edge => (self.index() - 4) / 2,
            PointKind::Twist => (self.index() - 12) / 2,
        }
    }
}

/// Control-point stencils of one Gregory patch, built for one quad face.
#[derive(Debug, Clone)]
pub struct Patch {
    /// The mesh face this patch covers.
    pub face: FaceId,

    /// Faces across the two edges at each corner: slot `2k` is across the edge
    /// `k -> k+1`, slot `2k+1` across `k-1 -> k`. Invalid on the boundary.
    pub neighbor_faces: [FaceId; 8],

    /// Stencils indexed by [`GregoryQuadPatchPoint`].
    pub control_points: [ControlPointWeights; PATCH_POINT_COUNT],

    /// Sorted distinct vertices referenced by any control point, padded by
    /// repeating the first entry. Filled by [`collect_input_vertices`](Self::collect_input_vertices).
    pub input_vertices: [VertexId; MAX_PATCH_VERTICES],

    /// Number of distinct entries at the front of `input_vertices`.
    pub vert_count: usize,
}

impl Patch {
    /// An empty patch for `face`.
    pub fn new(face: FaceId) -> Self {
        Self {
            face,
            neighbor_faces: [FaceId::invalid(); 8],
            control_points: std::array::from_fn(|_| ControlPointWeights::new()),
            input_vertices: [VertexId::invalid(); MAX_PATCH_VERTICES],
            vert_count: 0,
        }
    }

    /// Stencil of a named point.
    #[inline]
    pub fn point(&self, p: GregoryQuadPatchPoint) -> &ControlPointWeights {
        &self.control_points[p.index()]
    }

    /// Mutable stencil of a named point.
    #[inline]
    pub fn point_mut(&mut self, p: GregoryQuadPatchPoint) -> &mut ControlPointWeights {
        &mut self.control_points[p.index()]
    }

    /// Every vertex referenced by any control point, sorted and deduplicated.
    pub fn referenced_vertices(&self) -> Vec<VertexId> {
        let mut all: Vec<VertexId> = self
            .control_points
            .iter()
            .flat_map(|cp| cp.indices())
            .filter(|v| v.is_valid())
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// Rebuild `input_vertices` and `vert_count` from the control points.
    ///
    /// Deterministic, so running it again yields the same array.
    ///
    /// # Errors
    ///
    /// [`PatchError::PatchVertexOverflow`] if more than [`MAX_PATCH_VERTICES`]
    /// distinct vertices are referenced.
    pub fn collect_input_vertices(&mut self) -> PatchResult<()> {
        let unique = self.referenced_vertices();
        if unique.len() > MAX_PATCH_VERTICES {
            return Err(PatchError::PatchVertexOverflow {
                face: self.face,
                count: unique.len(),
                capacity: MAX_PATCH_VERTICES,
            });
        }

        let pad = unique.first().copied().unwrap_or_default();
        self.input_vertices = [pad; MAX_PATCH_VERTICES];
        self.input_vertices[..unique.len()].copy_from_slice(&unique);
        self.vert_count = unique.len();
        Ok(())
    }

    /// Position of `v` in `input_vertices` (first occurrence).
    pub fn local_slot(&self, v: VertexId) -> Option<usize> {
        if !v.is_valid() {
            return None;
        }
        self.input_vertices.iter().position(|&x| x == v)
    }
}

/// Mesh faces partitioned by the kind of patch they need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchGroups {
    /// Interior quads whose four corners have valence 4.
    pub quad_patches: Vec<FaceId>,
    /// Interior quads with at least one corner of valence other than 4.
    pub irregular_quad: Vec<FaceId>,
    /// Quads with at least one corner on the mesh boundary.
    pub edge_quad_patches: Vec<FaceId>,
    /// Interior triangles whose corners all have valence 6.
    pub tri_patches: Vec<FaceId>,
    /// Interior triangles with an irregular corner.
    pub irregular_tri: Vec<FaceId>,
    /// Triangles with a corner on the mesh boundary.
    pub edge_tri_patches: Vec<FaceId>,
    /// Faces that are neither triangles nor quads.
    pub unclassified: Vec<FaceId>,
}

impl PatchGroups {
    /// Number of faces placed in one of the six patch groups.
    pub fn total_classified(&self) -> usize {
        self.quad_count() + self.triangle_count()
    }

    /// Number of quads across the three quad groups.
    pub fn quad_count(&self) -> usize {
        self.quad_patches.len() + self.irregular_quad.len() + self.edge_quad_patches.len()
    }

    /// Number of triangles across the three triangle groups.
    pub fn triangle_count(&self) -> usize {
        self.tri_patches.len() + self.irregular_tri.len() + self.edge_tri_patches.len()
    }

    /// Number of faces seen, including unclassified ones.
    pub fn len(&self) -> usize {
        self.total_classified() + self.unclassified.len()
    }

    /// Whether no faces were seen.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PatchGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quads: {} regular, {} irregular, {} boundary; triangles: {} regular, {} irregular, {} boundary; {} unclassified",
            self.quad_patches.len(),
            self.irregular_quad.len(),
            self.edge_quad_patches.len(),
            self.tri_patches.len(),
            self.irregular_tri.len(),
            self.edge_tri_patches.len(),
            self.unclassified.len()
        )
    }
}
