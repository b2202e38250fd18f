//! Gregory patch construction.
//!
//! Approximates a Catmull-Clark limit surface with one Gregory patch per quad.
//! Each patch has 20 control points, every one a weighted combination of mesh
//! vertices (a *stencil*), so the patches stay valid when vertices move and
//! only the topology needs this pipeline:
//!
//! 1. [`classify_patches`] sorts faces into [`PatchGroups`].
//! 2. [`create_gregory_patches`] builds a [`Patch`] for each supported face.
//! 3. [`pack_patches`] converts them into fixed-size [`GpuPatch`] records plus
//!    a vertex index buffer.
//!
//! [`tessellate`] runs all three.
//!
//! # Control point layout
//!
//! For corner `k` of a quad (the origin of its `k`-th half-edge), `p_k` is the
//! limit position, `e_k±` the edge points toward the next (`+`) and previous
//! (`−`) corner, and `r_k±` the twist points across those edges. See
//! [`GregoryQuadPatchPoint`] for the storage order.

mod assemble;
mod classify;
mod gpu;
mod model;
mod pipeline;
mod progress;
pub mod stencil;
mod weights;

#[cfg(test)]
pub(crate) mod fixtures;

pub use assemble::{
    build_boundary_patch, build_regular_patch, create_gregory_patches,
    create_gregory_patches_with_progress, GregoryOptions,
};
pub use classify::{
    classify_face, classify_patches, classify_patches_with_progress, FaceClass,
    REGULAR_QUAD_VALENCE, REGULAR_TRI_VALENCE,
};
pub use gpu::{
    create_gpu_patch, map_index_to_local, pack_patches, pack_valences, GpuControlPoint, GpuPatch,
    PackedPatches, MIN_PACKED_VALENCE,
};
pub use model::{
    GregoryQuadPatchPoint, Patch, PatchGroups, PointKind, Side, MAX_PATCH_VERTICES,
    PATCH_POINT_COUNT,
};
pub use pipeline::{tessellate, tessellate_with_progress, Tessellation};
pub use progress::Progress;
pub use stencil::VertexKind;
pub use weights::{ControlPointWeights, MAX_STENCIL_SIZE};
