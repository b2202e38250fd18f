//! Gregory patch assembly.
//!
//! Turns the face groups produced by [`classify_patches`](super::classify_patches)
//! into [`Patch`]es. Each corner of a quad is built according to its
//! [`VertexKind`]:
//!
//! | Corner | `p` | `e` | `r` |
//! |--------|-----|-----|-----|
//! | interior | limit mask | `p + 2/3 tangent` | vertex ring |
//! | T-junction | `4/6, 1/6, 1/6` | [`boundary_edge_point`] | ring when the edge has a twin, else quad |
//! | mesh corner | the vertex | [`boundary_edge_point`] | quad |
//!
//! Boundary vertices shared by three or more faces are rejected with
//! [`PatchError::UnsupportedVertex`].

use log::{debug, info, warn};
use rayon::prelude::*;

use super::model::{GregoryQuadPatchPoint as Gp, Patch, PatchGroups, Side};
use super::progress::Progress;
use super::stencil::{
    boundary_edge_point, corner_point, edge_point, face_twist, twist_point, VertexKind,
};
use crate::error::{PatchError, PatchResult};
use crate::mesh::{FaceId, HalfEdgeMesh};

/// Options for patch assembly.
#[derive(Debug, Clone)]
pub struct GregoryOptions {
    /// Whether to build patches on the rayon thread pool (default: true).
    pub parallel: bool,

    /// Whether interior quads with extraordinary corners get patches too
    /// (default: false).
    pub include_irregular_quads: bool,
}

impl Default for GregoryOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            include_irregular_quads: false,
        }
    }
}

impl GregoryOptions {
    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Also assemble interior quads with extraordinary corners.
    pub fn with_irregular_quads(mut self) -> Self {
        self.include_irregular_quads = true;
        self
    }
}

fn require_quad(mesh: &HalfEdgeMesh, face: FaceId) -> PatchResult<()> {
    let len = mesh.face_len(face);
    if len == 4 {
        Ok(())
    } else {
        Err(PatchError::NotAQuad { face, len })
    }
}

/// Record the faces across both edges of every corner.
fn record_neighbors(mesh: &HalfEdgeMesh, patch: &mut Patch) {
    for k in 0..4 {
        let out = mesh.face_corner(patch.face, k);
        let across = |he| {
            mesh.twin(he)
                .valid()
                .map_or(FaceId::invalid(), |t| mesh.halfedge_face(t))
        };
        patch.neighbor_faces[2 * k] = across(out);
        patch.neighbor_faces[2 * k + 1] = across(mesh.prev(out));
    }
}

/// Fill the five points of corner `k`.
fn build_corner(mesh: &HalfEdgeMesh, patch: &mut Patch, k: usize) -> PatchResult<()> {
    let face = patch.face;
    let out = mesh.face_corner(face, k);
    let v = mesh.origin(out);
    let p = corner_point(mesh, out)?;

    match VertexKind::classify(mesh, v) {
        VertexKind::Interior { .. } => {
            for side in Side::ALL {
                *patch.point_mut(Gp::edge(k, side)) = edge_point(mesh, face, k, side, &p)?;
                *patch.point_mut(Gp::twist(k, side)) = twist_point(mesh, face, k, side)?;
            }
        }
        VertexKind::Corner | VertexKind::TJunction => {
            for side in Side::ALL {
                let side_edge = match side {
                    Side::Plus => out,
                    Side::Minus => mesh.prev(out),
                };
                *patch.point_mut(Gp::edge(k, side)) = boundary_edge_point(mesh, face, k, side)?;
                *patch.point_mut(Gp::twist(k, side)) = if mesh.has_twin(side_edge) {
                    twist_point(mesh, face, k, side)?
                } else {
                    face_twist(mesh, face, k, side)?
                };
            }
        }
        VertexKind::Boundary { faces } => {
            return Err(PatchError::UnsupportedVertex { vertex: v, faces });
        }
    }

    *patch.point_mut(Gp::corner(k)) = p;
    Ok(())
}

/// Build the patch of an interior quad.
///
/// Every corner must be an interior vertex. Regular quads (all valence 4) are
/// the intended input; irregular interior quads go through the same stencils.
///
/// # Errors
///
/// - [`PatchError::NotAQuad`] if `face` does not have four edges
/// - [`PatchError::MeshTopology`] if a corner lies on the boundary
/// - [`PatchError::StencilOverflow`] / [`PatchError::PatchVertexOverflow`] if
///   the neighborhood is too large
pub fn build_regular_patch(mesh: &HalfEdgeMesh, face: FaceId) -> PatchResult<Patch> {
    require_quad(mesh, face)?;
    for k in 0..4 {
        let out = mesh.face_corner(face, k);
        if mesh.is_boundary_vertex(mesh.origin(out)) {
            return Err(PatchError::topology(out, "interior patch corner is on the boundary"));
        }
    }

    let mut patch = Patch::new(face);
    record_neighbors(mesh, &mut patch);
    for k in 0..4 {
        build_corner(mesh, &mut patch, k)?;
    }
    patch.collect_input_vertices()?;
    Ok(patch)
}

/// Build the patch of a quad with at least one corner on the mesh boundary.
///
/// Interior corners of such a quad use the same stencils as
/// [`build_regular_patch`].
///
/// # Errors
///
/// As for [`build_regular_patch`], plus [`PatchError::UnsupportedVertex`] for
/// boundary corners shared by three or more faces.
pub fn build_boundary_patch(mesh: &HalfEdgeMesh, face: FaceId) -> PatchResult<Patch> {
    require_quad(mesh, face)?;

    let mut patch = Patch::new(face);
    record_neighbors(mesh, &mut patch);
    for k in 0..4 {
        build_corner(mesh, &mut patch, k)?;
    }
    patch.collect_input_vertices()?;
    Ok(patch)
}

type Builder = fn(&HalfEdgeMesh, FaceId) -> PatchResult<Patch>;

fn build_group<F>(
    mesh: &HalfEdgeMesh,
    faces: &[FaceId],
    options: &GregoryOptions,
    build: F,
) -> PatchResult<Vec<Patch>>
where
    F: Fn(&HalfEdgeMesh, FaceId) -> PatchResult<Patch> + Sync,
{
    if options.parallel {
        faces.par_iter().map(|&f| build(mesh, f)).collect()
    } else {
        faces.iter().map(|&f| build(mesh, f)).collect()
    }
}

/// Assemble patches for every supported face group.
///
/// The result holds the regular patches, then the boundary patches, then (when
/// enabled) the irregular interior patches, each in group order. Triangle
/// groups are classified but not assembled.
///
/// # Errors
///
/// The first error reported by any patch builder.
///
/// # Example
///
/// ```
/// use gregory::mesh::build_from_quads;
/// use gregory::patch::{classify_patches, create_gregory_patches, GregoryOptions};
/// use nalgebra::Point3;
///
/// let vertices: Vec<Point3<f64>> = (0..3)
///     .flat_map(|j| (0..3).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
///     .collect();
/// let faces = [[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6], [4, 5, 8, 7]];
/// let mesh = build_from_quads(&vertices, &faces).unwrap();
///
/// let groups = classify_patches(&mesh).unwrap();
/// let patches = create_gregory_patches(&mesh, &groups, &GregoryOptions::default()).unwrap();
/// assert_eq!(patches.len(), 4);
/// ```
pub fn create_gregory_patches(
    mesh: &HalfEdgeMesh,
    groups: &PatchGroups,
    options: &GregoryOptions,
) -> PatchResult<Vec<Patch>> {
    create_gregory_patches_with_progress(mesh, groups, options, &Progress::none())
}

/// [`create_gregory_patches`] with progress reporting.
pub fn create_gregory_patches_with_progress(
    mesh: &HalfEdgeMesh,
    groups: &PatchGroups,
    options: &GregoryOptions,
    progress: &Progress,
) -> PatchResult<Vec<Patch>> {
    assemble_in_step(mesh, groups, options, progress, 0, 1)
}

/// Assembly reported as step `step` of a `steps`-step run, advancing by faces
/// built across all groups.
pub(crate) fn assemble_in_step(
    mesh: &HalfEdgeMesh,
    groups: &PatchGroups,
    options: &GregoryOptions,
    progress: &Progress,
    step: usize,
    steps: usize,
) -> PatchResult<Vec<Patch>> {
    let mut stages: Vec<(&[FaceId], Builder, &str)> = vec![
        (
            groups.quad_patches.as_slice(),
            build_regular_patch as Builder,
            "Building regular patches",
        ),
        (
            groups.edge_quad_patches.as_slice(),
            build_boundary_patch as Builder,
            "Building boundary patches",
        ),
    ];
    if options.include_irregular_quads {
        stages.push((
            groups.irregular_quad.as_slice(),
            build_regular_patch as Builder,
            "Building irregular patches",
        ));
    } else if !groups.irregular_quad.is_empty() {
        debug!("skipping {} irregular quads", groups.irregular_quad.len());
    }

    let triangles = groups.triangle_count();
    if triangles > 0 {
        warn!("{} triangle faces are classified but not assembled", triangles);
    }

    let total: usize = stages.iter().map(|(faces, _, _)| faces.len()).sum();
    let mut patches = Vec::with_capacity(total);
    for (faces, build, message) in stages {
        progress.report_stage(patches.len(), total, step, steps, message);
        patches.extend(build_group(mesh, faces, options, build)?);
    }
    progress.report_stage(total, total, step, steps, "Patches assembled");

    info!(
        "assembled {} patches ({} regular, {} boundary)",
        patches.len(),
        groups.quad_patches.len(),
        groups.edge_quad_patches.len()
    );
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_quads, build_from_triangles, VertexId};
    use crate::patch::classify::classify_patches;
    use crate::patch::fixtures::{
        cubes_sharing_vertex, fan, grid_vertex, quad_grid, refine, subdivided_cube, torus,
    };
    use crate::patch::model::MAX_PATCH_VERTICES;
    use crate::patch::weights::MAX_STENCIL_SIZE;
    use crate::patch::model::PointKind;
    use crate::patch::stencil::extrapolated_edge_point;
    use nalgebra::Point3;

    fn assert_partition(patch: &Patch) {
        for point in Gp::ALL {
            let expected = match point.kind() {
                PointKind::Corner | PointKind::Edge => 1.0,
                PointKind::Twist => 0.0,
            };
            let sum = patch.point(point).weight_sum();
            assert!(
                (sum - expected).abs() < 1e-4,
                "face {:?} point {:?}: sum {}",
                patch.face,
                point,
                sum
            );
        }
    }

    fn assemble(mesh: &HalfEdgeMesh, options: &GregoryOptions) -> PatchResult<Vec<Patch>> {
        let groups = classify_patches(mesh)?;
        create_gregory_patches(mesh, &groups, options)
    }

    #[test]
    fn test_grid_patch_count_and_order() {
        let mesh = quad_grid(3);
        let patches = assemble(&mesh, &GregoryOptions::default()).unwrap();

        assert_eq!(patches.len(), 9);
        assert_eq!(patches[0].face, FaceId::new(4));
        for patch in &patches {
            assert_partition(patch);
        }
    }

    #[test]
    fn test_regular_patch_on_flat_grid() {
        let mesh = quad_grid(3);
        let face = FaceId::new(4);
        let patch = build_regular_patch(&mesh, face).unwrap();

        // 4x4 vertex neighborhood.
        assert_eq!(patch.vert_count, 16);
        assert!(patch.neighbor_faces.iter().all(|f| f.is_valid()));

        for k in 0..4 {
            let v = mesh.origin(mesh.face_corner(face, k));
            let p = patch.point(Gp::corner(k)).apply_weights(&mesh);
            assert!((p - mesh.position(v)).norm() < 1e-6);

            for side in Side::ALL {
                let stored = patch.point(Gp::edge(k, side)).apply_weights(&mesh);
                let rebuilt = extrapolated_edge_point(&mesh, &patch, k, side).unwrap();
                assert!((stored - rebuilt).norm() < 1e-5);
            }
        }
    }

    #[test]
    fn test_regular_builder_rejects_boundary_faces() {
        let mesh = quad_grid(3);
        assert!(matches!(
            build_regular_patch(&mesh, FaceId::new(0)),
            Err(PatchError::MeshTopology { .. })
        ));
    }

    #[test]
    fn test_boundary_patch_at_grid_corner() {
        let mesh = quad_grid(3);
        let patch = build_boundary_patch(&mesh, FaceId::new(0)).unwrap();
        assert_partition(&patch);

        let inv = FaceId::invalid();
        assert_eq!(
            patch.neighbor_faces,
            [inv, inv, FaceId::new(1), inv, FaceId::new(3), FaceId::new(1), inv, FaceId::new(3)]
        );

        // Mesh corner: the point is the vertex, edges are boundary thirds.
        let p0 = patch.point(Gp::corner(0));
        assert_eq!(p0.weight_of(grid_vertex(3, 0, 0)), Some(1.0));
        let e0 = patch.point(Gp::edge(0, Side::Plus)).apply_weights(&mesh);
        assert!((e0 - Point3::new(1.0 / 3.0, 0.0, 0.0)).norm() < 1e-6);

        // The interior corner (1,1) is built like a regular one.
        let p2 = patch.point(Gp::corner(2)).apply_weights(&mesh);
        assert!((p2 - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_concave_boundary_corner_is_rejected() {
        let vertices: Vec<Point3<f64>> = (0..3)
            .flat_map(|j| (0..3).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
            .collect();
        let faces = [[0, 1, 4, 3], [1, 2, 5, 4], [3, 4, 7, 6]];
        let mesh = build_from_quads(&vertices, &faces).unwrap();

        let err = assemble(&mesh, &GregoryOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PatchError::UnsupportedVertex { vertex, faces: 3 } if vertex == VertexId::new(4)
        ));
    }

    #[test]
    fn test_triangles_are_not_quads() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        assert!(matches!(
            build_boundary_patch(&mesh, FaceId::new(0)),
            Err(PatchError::NotAQuad { len: 3, .. })
        ));

        // Classified as a boundary triangle and skipped without error.
        assert!(assemble(&mesh, &GregoryOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_irregular_quads_are_opt_in() {
        let mesh = subdivided_cube(3);

        let default = assemble(&mesh, &GregoryOptions::default()).unwrap();
        assert_eq!(default.len(), 30);

        let all = assemble(&mesh, &GregoryOptions::default().with_irregular_quads()).unwrap();
        assert_eq!(all.len(), 54);
        for patch in &all {
            assert_partition(patch);
            assert!(patch.vert_count <= 32);
        }
    }

    #[test]
    fn test_extraordinary_fan() {
        for n in [3usize, 5] {
            let mesh = refine(&fan(n));
            let groups = classify_patches(&mesh).unwrap();
            assert_eq!(groups.irregular_quad.len(), n);
            assert_eq!(groups.edge_quad_patches.len(), 3 * n);

            let options = GregoryOptions::default().with_irregular_quads();
            let patches = create_gregory_patches(&mesh, &groups, &options).unwrap();
            assert_eq!(patches.len(), 4 * n);
            for patch in &patches {
                assert_partition(patch);
            }
        }
    }

    #[test]
    fn test_pinched_vertex_is_rejected() {
        let mesh = cubes_sharing_vertex();

        // All twelve faces touch valence-3 corners.
        let groups = classify_patches(&mesh).unwrap();
        assert_eq!(groups.irregular_quad.len(), 12);
        assert!(assemble(&mesh, &GregoryOptions::default()).unwrap().is_empty());

        for options in [
            GregoryOptions::default().with_irregular_quads(),
            GregoryOptions::default().with_irregular_quads().sequential(),
        ] {
            assert!(matches!(
                create_gregory_patches(&mesh, &groups, &options),
                Err(PatchError::MeshTopology { .. })
            ));
        }
    }

    #[test]
    fn test_high_valence_overflows_stencil() {
        // 16 spokes and 16 faces around the center: 33 vertices in its limit mask.
        let mesh = refine(&fan(16));
        assert!(assemble(&mesh, &GregoryOptions::default()).is_ok());

        let options = GregoryOptions::default().with_irregular_quads().sequential();
        assert!(matches!(
            assemble(&mesh, &options),
            Err(PatchError::StencilOverflow { capacity: MAX_STENCIL_SIZE, .. })
        ));
    }

    #[test]
    fn test_high_valence_overflows_patch() {
        // Each stencil fits (2n + 1 = 27) but the patch spans 2n + 8 = 34 vertices.
        let n = 13;
        let mesh = refine(&fan(n));
        let options = GregoryOptions::default().with_irregular_quads().sequential();

        match assemble(&mesh, &options) {
            Err(PatchError::PatchVertexOverflow { count, capacity, .. }) => {
                assert_eq!(count, 2 * n + 8);
                assert_eq!(capacity, MAX_PATCH_VERTICES);
            }
            other => panic!("expected patch vertex overflow, got {:?}", other.map(|p| p.len())),
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mesh = torus(8, 6);
        let parallel = assemble(&mesh, &GregoryOptions::default()).unwrap();
        let sequential = assemble(&mesh, &GregoryOptions::default().sequential()).unwrap();

        assert_eq!(parallel.len(), mesh.num_faces());
        assert_eq!(parallel.len(), sequential.len());
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.face, b.face);
            assert_eq!(a.control_points, b.control_points);
            assert_eq!(a.input_vertices, b.input_vertices);
            assert_eq!(a.vert_count, b.vert_count);
        }
    }

    #[test]
    fn test_collect_input_vertices_is_idempotent() {
        let mesh = torus(8, 6);
        let mut patch = build_regular_patch(&mesh, FaceId::new(10)).unwrap();
        let before = (patch.input_vertices, patch.vert_count);

        patch.collect_input_vertices().unwrap();
        assert_eq!((patch.input_vertices, patch.vert_count), before);

        // Every referenced vertex maps into the first vert_count slots.
        for cp in &patch.control_points {
            for v in cp.indices() {
                assert!(patch.local_slot(v).unwrap() < patch.vert_count);
            }
        }
    }
}
