//! Test meshes shared by the patch tests.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::mesh::{build_from_quads, HalfEdgeMesh, VertexId};

/// Flat `n x n` quad grid with unit spacing in the XY plane.
///
/// Vertex `(i, j)` has index `j * (n + 1) + i`; face `(i, j)` has index `j * n + i`.
pub fn quad_grid(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            faces.push([v00, v10, v11, v01]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

/// Vertex index of grid point `(i, j)` in [`quad_grid`]`(n)`.
pub fn grid_vertex(n: usize, i: usize, j: usize) -> VertexId {
    VertexId::new(j * (n + 1) + i)
}

/// Closed torus of `nu x nv` quads; every vertex has valence 4.
pub fn torus(nu: usize, nv: usize) -> HalfEdgeMesh {
    let (major, minor) = (3.0, 1.0);
    let mut vertices = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        let phi = j as f64 * std::f64::consts::TAU / nv as f64;
        for i in 0..nu {
            let theta = i as f64 * std::f64::consts::TAU / nu as f64;
            let r = major + minor * phi.cos();
            vertices.push(Point3::new(r * theta.cos(), r * theta.sin(), minor * phi.sin()));
        }
    }

    let idx = |i: usize, j: usize| (j % nv) * nu + (i % nu);
    let mut faces = Vec::with_capacity(nu * nv);
    for j in 0..nv {
        for i in 0..nu {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

/// Surface of the cube `[0, n]^3` split into `n x n` quads per side.
///
/// The 8 cube corners have valence 3, every other vertex valence 4.
pub fn subdivided_cube(n: usize) -> HalfEdgeMesh {
    let mut lookup: HashMap<[usize; 3], usize> = HashMap::new();
    let mut vertices = Vec::new();
    let mut vertex = |p: [usize; 3]| -> usize {
        *lookup.entry(p).or_insert_with(|| {
            vertices.push(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64));
            vertices.len() - 1
        })
    };

    let mut faces = Vec::with_capacity(6 * n * n);
    for axis in 0..3 {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        for (level, outward) in [(0, false), (n, true)] {
            for a in 0..n {
                for b in 0..n {
                    let corner = |du: usize, dv: usize| {
                        let mut p = [0; 3];
                        p[axis] = level;
                        p[u] = a + du;
                        p[v] = b + dv;
                        p
                    };
                    let quad = [
                        vertex(corner(0, 0)),
                        vertex(corner(1, 0)),
                        vertex(corner(1, 1)),
                        vertex(corner(0, 1)),
                    ];
                    if outward {
                        faces.push(quad);
                    } else {
                        faces.push([quad[0], quad[3], quad[2], quad[1]]);
                    }
                }
            }
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}

/// Two unit cubes touching at the single vertex `(1, 1, 1)`, index 6.
///
/// Every edge has a twin, so the mesh is closed, but the shared vertex has two
/// separate rings of three faces each.
pub fn cubes_sharing_vertex() -> HalfEdgeMesh {
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let cube = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [1, 2, 6, 5],
        [2, 3, 7, 6],
        [3, 0, 4, 7],
    ];

    let mut vertices: Vec<Point3<f64>> =
        corners.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect();
    // The second cube's corner 0 is the first cube's corner 6.
    vertices.extend(corners[1..].iter().map(|&[x, y, z]| Point3::new(x + 1.0, y + 1.0, z + 1.0)));
    let second = |i: usize| if i == 0 { 6 } else { 7 + i };

    let mut faces: Vec<[usize; 4]> = cube.to_vec();
    faces.extend(cube.iter().map(|q| q.map(second)));

    build_from_quads(&vertices, &faces).unwrap()
}

/// Flat fan of `n` quads around vertex 0, which has valence `n`.
///
/// Face `k` is `[0, a_k, d_k, a_k+1]` with `a_k` on the unit circle and `d_k`
/// further out between two spokes. Every vertex except 0 is on the boundary.
pub fn fan(n: usize) -> HalfEdgeMesh {
    let tau = std::f64::consts::TAU;
    let at = |radius: f64, turn: f64| {
        let a = turn * tau / n as f64;
        Point3::new(radius * a.cos(), radius * a.sin(), 0.0)
    };

    let mut vertices = vec![Point3::origin()];
    vertices.extend((0..n).map(|k| at(1.0, k as f64)));
    vertices.extend((0..n).map(|k| at(1.6, k as f64 + 0.5)));

    let spoke = |k: usize| 1 + k % n;
    let diagonal = |k: usize| 1 + n + k % n;
    let faces: Vec<[usize; 4]> = (0..n)
        .map(|k| [0, spoke(k), diagonal(k), spoke(k + 1)])
        .collect();

    build_from_quads(&vertices, &faces).unwrap()
}

/// One step of Catmull-Clark *topological* refinement with linear positions.
///
/// Old vertices keep their index and position, followed by one vertex per edge
/// (at its midpoint) and one per face (at its centroid). Every `k`-gon becomes
/// `k` quads, so extraordinary vertices keep their valence while their
/// neighborhood becomes regular.
pub fn refine(mesh: &HalfEdgeMesh) -> HalfEdgeMesh {
    let mut vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let mut edge_points: HashMap<(usize, usize), usize> = HashMap::new();
    for he in mesh.halfedge_ids() {
        let [a, b] = mesh.endpoints(he);
        let key = (a.index().min(b.index()), a.index().max(b.index()));
        if !edge_points.contains_key(&key) {
            edge_points.insert(key, vertices.len());
            vertices.push(mesh.edge_midpoint(he));
        }
    }
    let edge_point = |a: VertexId, b: VertexId| {
        edge_points[&(a.index().min(b.index()), a.index().max(b.index()))]
    };

    let mut faces = Vec::new();
    for f in mesh.face_ids() {
        let face_point = vertices.len();
        vertices.push(mesh.face_center(f));

        let corners: Vec<VertexId> = mesh.face_vertices(f).collect();
        let k = corners.len();
        for i in 0..k {
            let prev = corners[(i + k - 1) % k];
            let here = corners[i];
            let next = corners[(i + 1) % k];
            faces.push([
                here.index(),
                edge_point(here, next),
                face_point,
                edge_point(prev, here),
            ]);
        }
    }

    build_from_quads(&vertices, &faces).unwrap()
}
