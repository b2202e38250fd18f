//! Index types for mesh elements.
//!
//! Vertices, half-edges, and faces are addressed by 32-bit indices into flat
//! arrays. The all-bits-set value is reserved as the "no element" sentinel, which
//! is also how a missing twin (a boundary half-edge) is encoded.
//!
//! The width is fixed at 32 bits because patch index buffers are uploaded to the
//! GPU as `u32`.

use std::fmt::{self, Debug};

/// Raw value of the invalid sentinel shared by all index types.
pub const INVALID_INDEX: u32 = u32::MAX;

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create an index from an array position.
            ///
            /// Positions that do not fit below the sentinel map to the sentinel.
            #[inline]
            pub fn new(index: usize) -> Self {
                match u32::try_from(index) {
                    Ok(raw) if raw != INVALID_INDEX => Self(raw),
                    _ => Self(INVALID_INDEX),
                }
            }

            /// The invalid/null index.
            #[inline]
            pub const fn invalid() -> Self {
                Self(INVALID_INDEX)
            }

            /// Array position of this index.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// The raw 32-bit value, including the sentinel.
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            /// Whether this index refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID_INDEX
            }

            /// `Some(self)` when valid, `None` for the sentinel.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                self.is_valid().then_some(self)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.0)
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
