//! Face classification.
//!
//! Every face is sorted into the group whose patch construction it needs:
//!
//! | Face | Any corner on the boundary | Else any irregular corner | Else |
//! |------|----------------------------|---------------------------|------|
//! | quad | `edge_quad_patches` | `irregular_quad` (valence != 4) | `quad_patches` |
//! | triangle | `edge_tri_patches` | `irregular_tri` (valence != 6) | `tri_patches` |
//!
//! Faces with any other edge count are kept in `unclassified` and logged.

use log::{debug, info, warn};

use super::model::PatchGroups;
use super::progress::Progress;
use crate::error::{PatchError, PatchResult};
use crate::mesh::{FaceId, HalfEdgeMesh};

/// Valence of every vertex in a regular quad mesh.
pub const REGULAR_QUAD_VALENCE: usize = 4;

/// Valence of every vertex in a regular triangle mesh.
pub const REGULAR_TRI_VALENCE: usize = 6;

/// Classification of a single face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClass {
    /// Interior quad, all corners valence 4.
    RegularQuad,
    /// Interior quad with an extraordinary corner.
    IrregularQuad,
    /// Quad touching the mesh boundary.
    BoundaryQuad,
    /// Interior triangle, all corners valence 6.
    RegularTri,
    /// Interior triangle with an extraordinary corner.
    IrregularTri,
    /// Triangle touching the mesh boundary.
    BoundaryTri,
    /// Neither triangle nor quad.
    Unsupported {
        /// Edge count of the face.
        len: usize,
    },
}

/// Classify one face by its edge count and the state of its corners.
pub fn classify_face(mesh: &HalfEdgeMesh, f: FaceId) -> FaceClass {
    let len = mesh.face_len(f);
    let regular_valence = match len {
        4 => REGULAR_QUAD_VALENCE,
        3 => REGULAR_TRI_VALENCE,
        _ => return FaceClass::Unsupported { len },
    };

    let on_boundary = mesh.face_vertices(f).any(|v| mesh.is_boundary_vertex(v));
    let irregular = !on_boundary && mesh.face_vertices(f).any(|v| mesh.valence(v) != regular_valence);

    match (len, on_boundary, irregular) {
        (4, true, _) => FaceClass::BoundaryQuad,
        (4, false, true) => FaceClass::IrregularQuad,
        (4, false, false) => FaceClass::RegularQuad,
        (_, true, _) => FaceClass::BoundaryTri,
        (_, false, true) => FaceClass::IrregularTri,
        (_, false, false) => FaceClass::RegularTri,
    }
}

/// Partition every face of `mesh` into [`PatchGroups`].
///
/// # Errors
///
/// [`PatchError::InvalidMesh`] if the mesh connectivity is inconsistent. This is
/// checked once here so the builders can rely on it.
///
/// # Example
///
/// ```
/// use gregory::mesh::build_from_quads;
/// use gregory::patch::classify_patches;
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
/// let groups = classify_patches(&mesh).unwrap();
/// assert_eq!(groups.edge_quad_patches.len(), 1);
/// ```
pub fn classify_patches(mesh: &HalfEdgeMesh) -> PatchResult<PatchGroups> {
    classify_patches_with_progress(mesh, &Progress::none())
}

/// [`classify_patches`] with progress reporting.
pub fn classify_patches_with_progress(
    mesh: &HalfEdgeMesh,
    progress: &Progress,
) -> PatchResult<PatchGroups> {
    classify_in_step(mesh, progress, 0, 1)
}

/// Classification reported as step `step` of a `steps`-step run.
pub(crate) fn classify_in_step(
    mesh: &HalfEdgeMesh,
    progress: &Progress,
    step: usize,
    steps: usize,
) -> PatchResult<PatchGroups> {
    if !mesh.is_valid() {
        return Err(PatchError::InvalidMesh);
    }

    let total = mesh.num_faces();
    let mut groups = PatchGroups::default();

    for (i, f) in mesh.face_ids().enumerate() {
        let class = classify_face(mesh, f);
        let group = match class {
            FaceClass::RegularQuad => &mut groups.quad_patches,
            FaceClass::IrregularQuad => &mut groups.irregular_quad,
            FaceClass::BoundaryQuad => &mut groups.edge_quad_patches,
            FaceClass::RegularTri => &mut groups.tri_patches,
            FaceClass::IrregularTri => &mut groups.irregular_tri,
            FaceClass::BoundaryTri => &mut groups.edge_tri_patches,
            FaceClass::Unsupported { len } => {
                warn!("face {:?} has {} edges and gets no patch", f, len);
                &mut groups.unclassified
            }
        };
        group.push(f);

        if i % 1024 == 0 {
            progress.report_stage(i, total, step, steps, "Classifying faces");
        }
    }
    progress.report_stage(total, total, step, steps, "Classifying faces");

    info!("classified {} faces: {}", total, groups);
    if !groups.unclassified.is_empty() {
        debug!("unclassified faces: {:?}", groups.unclassified);
    }

    Ok(groups)
}
