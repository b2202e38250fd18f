//! Classify, assemble and pack in one call.

use log::info;

use super::assemble::{assemble_in_step, GregoryOptions};
use super::classify::classify_in_step;
use super::gpu::{pack_patches, PackedPatches};
use super::model::{Patch, PatchGroups};
use super::progress::Progress;
use crate::error::PatchResult;
use crate::mesh::HalfEdgeMesh;

/// Classify, assemble, pack.
const STEPS: usize = 3;

/// Everything produced for one mesh.
#[derive(Debug, Clone)]
pub struct Tessellation {
    /// Face classification.
    pub groups: PatchGroups,
    /// Assembled patches, in [`create_gregory_patches`](super::create_gregory_patches) order.
    pub patches: Vec<Patch>,
    /// GPU buffers, parallel to `patches`.
    pub packed: PackedPatches,
}

/// Run the whole pipeline on `mesh`.
///
/// # Example
///
/// ```
/// use gregory::mesh::build_from_quads;
/// use gregory::patch::{tessellate, GregoryOptions};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
///
/// let result = tessellate(&mesh, &GregoryOptions::default()).unwrap();
/// assert_eq!(result.packed.patch_count(), 1);
/// assert_eq!(result.packed.indices.len(), 32);
/// ```
pub fn tessellate(mesh: &HalfEdgeMesh, options: &GregoryOptions) -> PatchResult<Tessellation> {
    tessellate_with_progress(mesh, options, &Progress::none())
}

/// [`tessellate`] with progress reporting.
///
/// The three stages are reported as consecutive thirds of one run, so `current`
/// never decreases.
pub fn tessellate_with_progress(
    mesh: &HalfEdgeMesh,
    options: &GregoryOptions,
    progress: &Progress,
) -> PatchResult<Tessellation> {
    let groups = classify_in_step(mesh, progress, 0, STEPS)?;
    let patches = assemble_in_step(mesh, &groups, options, progress, 1, STEPS)?;

    progress.report_stage(0, 1, 2, STEPS, "Packing patches");
    let packed = pack_patches(&patches, mesh)?;
    progress.report_stage(1, 1, 2, STEPS, "Packing patches");

    info!(
        "tessellation ready: {} patches, {} of {} faces covered",
        packed.patch_count(),
        patches.len(),
        mesh.num_faces()
    );

    Ok(Tessellation {
        groups,
        patches,
        packed,
    })
}
