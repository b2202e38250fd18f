//! Fixed-capacity sparse vertex stencils.
//!
//! A [`ControlPointWeights`] is a linear combination of mesh vertices: a small
//! map from [`VertexId`] to an `f32` weight. Every control point of a Gregory
//! patch is one of these. They are built by accumulation, so the operations are
//! the ones accumulation needs: add, scale, merge, and evaluate.
//!
//! Capacity is [`MAX_STENCIL_SIZE`] entries, stored inline so tens of thousands
//! of patches cost no per-point allocation. Adding a 33rd distinct vertex is an
//! error, never a silent drop.
//!
//! # Example
//!
//! ```
//! use gregory::mesh::VertexId;
//! use gregory::patch::ControlPointWeights;
//!
//! let mut cp = ControlPointWeights::new();
//! cp.add_weight(VertexId::new(3), 0.5).unwrap();
//! cp.add_weight(VertexId::new(7), 0.25).unwrap();
//! cp.add_weight(VertexId::new(3), 0.25).unwrap();
//!
//! assert_eq!(cp.len(), 2);
//! assert_eq!(cp.weight_of(VertexId::new(3)), Some(0.75));
//! assert!((cp.weight_sum() - 1.0).abs() < 1e-6);
//! ```

use arrayvec::ArrayVec;
use nalgebra::{Point3, Vector3};

use crate::error::{PatchError, PatchResult};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Maximum number of distinct vertices in one control-point stencil.
pub const MAX_STENCIL_SIZE: usize = 32;

/// A sparse weighted combination of mesh vertices.
///
/// Entries are kept in insertion order and each vertex appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlPointWeights {
    entries: ArrayVec<(VertexId, f32), MAX_STENCIL_SIZE>,
}

impl ControlPointWeights {
    /// Create an empty stencil.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stencil with weight 1.0 on a single vertex.
    pub fn single(v: VertexId) -> Self {
        let mut cp = Self::new();
        cp.entries.push((v, 1.0));
        cp
    }

    /// Add `w` to the weight of `v`, appending `v` if it is not present.
    ///
    /// # Errors
    ///
    /// [`PatchError::StencilOverflow`] when `v` is new and all slots are taken.
    /// The stencil is unchanged in that case.
    pub fn add_weight(&mut self, v: VertexId, w: f32) -> PatchResult<()> {
        if let Some(entry) = self.entries.iter_mut().find(|(idx, _)| *idx == v) {
            entry.1 += w;
            return Ok(());
        }
        self.entries
            .try_push((v, w))
            .map_err(|_| PatchError::StencilOverflow {
                vertex: v,
                capacity: MAX_STENCIL_SIZE,
            })
    }

    /// Add `w` to every vertex yielded by `vertices`.
    pub fn add_spread<I>(&mut self, vertices: I, w: f32) -> PatchResult<()>
    where
        I: IntoIterator<Item = VertexId>,
    {
        for v in vertices {
            self.add_weight(v, w)?;
        }
        Ok(())
    }

    /// Multiply the weight of `v` by `s`. Does nothing if `v` is absent.
    pub fn scale_weight(&mut self, v: VertexId, s: f32) {
        if let Some(entry) = self.entries.iter_mut().find(|(idx, _)| *idx == v) {
            entry.1 *= s;
        }
    }

    /// Multiply every weight by `s`.
    pub fn scale(&mut self, s: f32) {
        for entry in &mut self.entries {
            entry.1 *= s;
        }
    }

    /// A copy of this stencil with every weight multiplied by `s`.
    pub fn scaled(&self, s: f32) -> Self {
        let mut cp = self.clone();
        cp.scale(s);
        cp
    }

    /// Add every entry of `other` into this stencil.
    ///
    /// On overflow the entries merged so far are kept.
    pub fn merge(&mut self, other: &ControlPointWeights) -> PatchResult<()> {
        for &(v, w) in &other.entries {
            self.add_weight(v, w)?;
        }
        Ok(())
    }

    /// Sum of all weights.
    ///
    /// Positional stencils sum to 1; difference stencils (twist vectors) sum to 0.
    pub fn weight_sum(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w).sum()
    }

    /// The weight of `v`, if present.
    pub fn weight_of(&self, v: VertexId) -> Option<f32> {
        self.entries
            .iter()
            .find(|(idx, _)| *idx == v)
            .map(|&(_, w)| w)
    }

    /// Number of populated entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are populated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(vertex, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Iterate over the referenced vertices.
    pub fn indices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.entries.iter().map(|&(v, _)| v)
    }

    /// Evaluate the stencil against mesh positions: `Σ w · position(v)`.
    pub fn apply_weights(&self, mesh: &HalfEdgeMesh) -> Point3<f64> {
        Point3::from(self.apply_vector(mesh))
    }

    /// Like [`apply_weights`](Self::apply_weights), returned as a vector.
    ///
    /// Convenient for difference stencils, which are directions, not points.
    pub fn apply_vector(&self, mesh: &HalfEdgeMesh) -> Vector3<f64> {
        self.entries
            .iter()
            .map(|&(v, w)| mesh.position(v).coords * w as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_quads;

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    #[test]
    fn test_add_accumulates() {
        let mut cp = ControlPointWeights::new();
        cp.add_weight(v(1), 0.25).unwrap();
        cp.add_weight(v(2), 0.5).unwrap();
        cp.add_weight(v(1), 0.25).unwrap();

        assert_eq!(cp.len(), 2);
        assert_eq!(cp.weight_of(v(1)), Some(0.5));
        assert_eq!(cp.weight_of(v(2)), Some(0.5));
        assert_eq!(cp.weight_of(v(3)), None);
        assert_eq!(cp.indices().collect::<Vec<_>>(), vec![v(1), v(2)]);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut cp = ControlPointWeights::new();
        for i in 0..MAX_STENCIL_SIZE {
            cp.add_weight(v(i), 1.0).unwrap();
        }

        // Existing entries still accept weight.
        cp.add_weight(v(0), 1.0).unwrap();
        assert_eq!(cp.weight_of(v(0)), Some(2.0));

        let err = cp.add_weight(v(MAX_STENCIL_SIZE), 1.0).unwrap_err();
        assert!(matches!(
            err,
            PatchError::StencilOverflow { capacity: MAX_STENCIL_SIZE, .. }
        ));
        assert_eq!(cp.len(), MAX_STENCIL_SIZE);
    }

    #[test]
    fn test_scale_and_scale_weight() {
        let mut cp = ControlPointWeights::new();
        cp.add_spread([v(0), v(1), v(2)], 1.0).unwrap();

        cp.scale_weight(v(1), 3.0);
        cp.scale_weight(v(9), 100.0);
        assert_eq!(cp.weight_of(v(1)), Some(3.0));
        assert_eq!(cp.len(), 3);

        cp.scale(0.5);
        assert_eq!(cp.weight_of(v(0)), Some(0.5));
        assert_eq!(cp.weight_of(v(1)), Some(1.5));

        let doubled = cp.scaled(2.0);
        assert_eq!(doubled.weight_of(v(2)), Some(1.0));
        assert_eq!(cp.weight_of(v(2)), Some(0.5));
    }

    #[test]
    fn test_merge() {
        let mut a = ControlPointWeights::single(v(0));
        let mut b = ControlPointWeights::new();
        b.add_weight(v(0), -0.5).unwrap();
        b.add_weight(v(4), 0.5).unwrap();

        a.merge(&b).unwrap();
        assert_eq!(a.weight_of(v(0)), Some(0.5));
        assert_eq!(a.weight_of(v(4)), Some(0.5));
        assert!((a.weight_sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_apply_weights() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();

        let mut center = ControlPointWeights::new();
        center.add_spread(mesh.vertex_ids(), 0.25).unwrap();
        let p = center.apply_weights(&mesh);
        assert!((p - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-6);

        let mut diff = ControlPointWeights::new();
        diff.add_weight(v(1), 1.0).unwrap();
        diff.add_weight(v(0), -1.0).unwrap();
        let d = diff.apply_vector(&mesh);
        assert!((d - Vector3::new(2.0, 0.0, 0.0)).norm() < 1e-6);
        assert!(diff.weight_sum().abs() < 1e-6);
    }
}
