//! GPU packing of assembled patches.
//!
//! A [`GpuPatch`] stores, for each of the 20 control points, 32 half-float
//! weights indexed by the patch's local vertex slots. The parallel index buffer
//! holds 32 mesh-vertex indices per patch, so slot `j` of patch `i` resolves to
//! `indices[i * 32 + j]`. Unused slots repeat the first vertex with weight 0.

use bytemuck::{Pod, Zeroable};
use half::f16;
use log::debug;

use super::model::{GregoryQuadPatchPoint, Patch, MAX_PATCH_VERTICES, PATCH_POINT_COUNT};
use crate::error::{PatchError, PatchResult};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Valences below this are raised to it before packing.
pub const MIN_PACKED_VALENCE: usize = 4;

/// Half-float weights of one control point, by local vertex slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuControlPoint {
    /// `f16` bit patterns.
    pub weights: [u16; MAX_PATCH_VERTICES],
}

impl GpuControlPoint {
    /// Decoded weight of local slot `slot`.
    #[inline]
    pub fn weight(&self, slot: usize) -> f32 {
        f16::from_bits(self.weights[slot]).to_f32()
    }
}

/// One patch as read by the tessellation shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuPatch {
    /// Control points in [`GregoryQuadPatchPoint`] order.
    pub control_points: [GpuControlPoint; PATCH_POINT_COUNT],
    /// Corner valences, one byte each, corner 0 in the low byte.
    pub pn: u32,
}

impl GpuPatch {
    /// Unpacked corner valences.
    pub fn valences(&self) -> [u32; 4] {
        std::array::from_fn(|i| (self.pn >> (8 * i)) & 0xff)
    }
}

/// Pack four valences into one word, corner `i` in byte `i`.
///
/// Each value is masked to 8 bits.
#[inline]
pub fn pack_valences(valences: [u32; 4]) -> u32 {
    valences
        .iter()
        .enumerate()
        .fold(0, |word, (i, &v)| word | ((v & 0xff) << (8 * i)))
}

/// Local slot of mesh vertex `v` in `patch.input_vertices`.
///
/// # Errors
///
/// [`PatchError::UnmappedVertex`] if `v` is not one of the patch's vertices.
pub fn map_index_to_local(patch: &Patch, v: VertexId) -> PatchResult<usize> {
    patch
        .local_slot(v)
        .filter(|&slot| slot < patch.vert_count)
        .ok_or(PatchError::UnmappedVertex {
            face: patch.face,
            vertex: v,
        })
}

/// Pack `patch` and append it to `patches`, its 32 vertex indices to `indices`.
///
/// Nothing is appended if an error is returned.
///
/// # Errors
///
/// [`PatchError::UnmappedVertex`] if a stencil references a vertex missing from
/// `input_vertices` (the patch was not finalized).
pub fn create_gpu_patch(
    patch: &Patch,
    mesh: &HalfEdgeMesh,
    patches: &mut Vec<GpuPatch>,
    indices: &mut Vec<u32>,
) -> PatchResult<()> {
    let mut gpu = GpuPatch::zeroed();

    for (point, out) in patch.control_points.iter().zip(gpu.control_points.iter_mut()) {
        for (v, w) in point.iter() {
            let slot = map_index_to_local(patch, v)?;
            out.weights[slot] = f16::from_f32(w).to_bits();
        }
    }

    let valences: [u32; 4] = std::array::from_fn(|k| {
        let v = mesh.origin(mesh.face_corner(patch.face, k));
        mesh.valence(v).max(MIN_PACKED_VALENCE) as u32
    });
    gpu.pn = pack_valences(valences);

    patches.push(gpu);
    indices.extend(patch.input_vertices.iter().map(|v| v.raw()));
    Ok(())
}

/// GPU buffers for a list of patches.
#[derive(Debug, Clone, Default)]
pub struct PackedPatches {
    /// One record per patch.
    pub patches: Vec<GpuPatch>,
    /// [`MAX_PATCH_VERTICES`] mesh-vertex indices per patch.
    pub indices: Vec<u32>,
}

impl PackedPatches {
    /// Number of packed patches.
    #[inline]
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    /// Whether no patches are packed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Decoded weight of local slot `slot` in control point `point` of patch `patch`.
    pub fn weight(&self, patch: usize, point: GregoryQuadPatchPoint, slot: usize) -> f32 {
        self.patches[patch].control_points[point.index()].weight(slot)
    }

    /// The 32 mesh-vertex indices of patch `patch`.
    pub fn patch_indices(&self, patch: usize) -> &[u32] {
        &self.indices[patch * MAX_PATCH_VERTICES..(patch + 1) * MAX_PATCH_VERTICES]
    }

    /// The patch buffer as raw bytes.
    pub fn patch_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.patches)
    }

    /// The index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Pack every patch in order.
///
/// # Errors
///
/// The first error from [`create_gpu_patch`].
pub fn pack_patches(patches: &[Patch], mesh: &HalfEdgeMesh) -> PatchResult<PackedPatches> {
    let mut packed = PackedPatches {
        patches: Vec::with_capacity(patches.len()),
        indices: Vec::with_capacity(patches.len() * MAX_PATCH_VERTICES),
    };
    for patch in patches {
        create_gpu_patch(patch, mesh, &mut packed.patches, &mut packed.indices)?;
    }
    debug!(
        "packed {} patches into {} bytes",
        packed.patch_count(),
        packed.patch_bytes().len() + packed.index_bytes().len()
    );
    Ok(packed)
}
