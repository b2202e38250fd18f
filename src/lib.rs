//! # Gregory
//!
//! Gregory patch construction for rendering Catmull-Clark subdivision surfaces
//! with hardware tessellation.
//!
//! Gregory turns a polygon mesh into one bicubic Gregory patch per quad. Every
//! control point is stored as a stencil over mesh vertices, so animating the
//! mesh only means re-evaluating the stencils; the topology work below runs once.
//!
//! ## Features
//!
//! - **Polygon half-edge mesh**: quads, triangles and n-gons with O(1) adjacency
//! - **Face classification**: regular, irregular and boundary groups
//! - **Stencil builders**: limit, tangent and twist points for any interior
//!   valence, mesh corners and T-junctions
//! - **GPU packing**: fixed-size half-float weight tables and index buffers
//! - **File formats**: OBJ and PLY meshes, binary patch buffers
//!
//! ## Quick Start
//!
//! ```no_run
//! use gregory::prelude::*;
//!
//! let mesh = gregory::io::load("model.obj").unwrap();
//! let result = tessellate(&mesh, &GregoryOptions::default()).unwrap();
//!
//! println!("{}", result.groups);
//! gregory::io::patches::save(&result.packed, "model.grpt").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use gregory::prelude::*;
//! use nalgebra::Point3;
//!
//! // 3x3 grid of quads; only the middle one is away from the boundary.
//! let vertices: Vec<Point3<f64>> = (0..4)
//!     .flat_map(|j| (0..4).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
//!     .collect();
//! let mut faces = Vec::new();
//! for j in 0..3 {
//!     for i in 0..3 {
//!         let v = j * 4 + i;
//!         faces.push([v, v + 1, v + 5, v + 4]);
//!     }
//! }
//! let mesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! let groups = classify_patches(&mesh).unwrap();
//! assert_eq!(groups.quad_patches.len(), 1);
//! assert_eq!(groups.edge_quad_patches.len(), 8);
//!
//! let patches = create_gregory_patches(&mesh, &groups, &GregoryOptions::default()).unwrap();
//! let packed = pack_patches(&patches, &mesh).unwrap();
//! assert_eq!(packed.patch_count(), 9);
//!
//! // The middle patch's corner sits on the limit surface, here the grid plane.
//! let p0 = patches[0].point(GregoryQuadPatchPoint::corner(0)).apply_weights(&mesh);
//! assert!((p0 - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod patch;

/// Prelude module for convenient imports.
///
/// ```
/// use gregory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, PatchError, PatchResult, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, FaceId, HalfEdgeId,
        HalfEdgeMesh, VertexId,
    };
    pub use crate::patch::{
        classify_patches, create_gregory_patches, pack_patches, tessellate, ControlPointWeights,
        GregoryOptions, GregoryQuadPatchPoint, PackedPatches, Patch, PatchGroups, Side,
        Tessellation,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_cube_is_all_irregular() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 3, 2, 1], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [1, 2, 6, 5], // right
            [2, 3, 7, 6], // back
            [3, 0, 4, 7], // left
        ];

        let mesh = build_from_quads(&vertices, &faces).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_halfedges(), 24);

        let result = tessellate(&mesh, &GregoryOptions::default()).unwrap();
        assert_eq!(result.groups.irregular_quad.len(), 6);
        assert!(result.patches.is_empty());

        let result = tessellate(&mesh, &GregoryOptions::default().with_irregular_quads()).unwrap();
        assert_eq!(result.packed.patch_count(), 6);
        assert!(result.packed.patches.iter().all(|p| p.pn == 0x0404_0404));
    }
}
