//! Index types for mesh elements.
//!
//! Every entity in the mesh lives in a dense arena and is addressed by a
//! type-safe index wrapper. The wrappers are generic over the underlying
//! integer type so small meshes can use `u16` and huge ones `u64`.
//!
//! Half-edge indices are not arbitrary: a half-edge in slot `k` of triangle
//! `t` always has index `3 * t + k`, so the triangle and slot can be
//! recovered from the index alone.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Trait for types that can be used as mesh indices.
///
/// Implemented for `u16`, `u32` and `u64`.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The largest element count this index type can address.
    const CAPACITY: usize;

    /// Convert from usize to this index type.
    ///
    /// # Panics
    /// Panics in debug builds if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const CAPACITY: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                <$ty>::MAX as usize
            } else {
                usize::MAX
            };

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v <= Self::CAPACITY,
                    "index {} too large for {}",
                    v,
                    stringify!($ty)
                );
                v as $ty
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    };
}

impl_mesh_index!(u16);
impl_mesh_index!(u32);
impl_mesh_index!(u64);

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A type-safe half-edge index (`3 * triangle + slot`).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe triangle index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TriangleId<I: MeshIndex = u32>(I);

/// A type-safe index for an undirected edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Get the raw value of the underlying type.
            #[inline]
            pub fn raw(self) -> I {
                self.0
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.index())
            }
        }

        impl<I: MeshIndex> Display for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display, self.index())
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "H");
impl_index_type!(TriangleId, "T");
impl_index_type!(EdgeId, "E");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The half-edge occupying `slot` (0, 1 or 2) of triangle `t`.
    #[inline]
    pub fn on_triangle(t: TriangleId<I>, slot: usize) -> Self {
        debug_assert!(slot < 3);
        Self::new(3 * t.index() + slot)
    }

    /// The triangle owning this half-edge.
    #[inline]
    pub fn triangle(self) -> TriangleId<I> {
        TriangleId::new(self.index() / 3)
    }

    /// The slot of this half-edge within its triangle.
    #[inline]
    pub fn slot(self) -> usize {
        self.index() % 3
    }

    /// Slot of the triangle vertex opposite this half-edge.
    ///
    /// Half-edge `k` runs `v_k -> v_(k+1)`, so the opposite vertex is `v_(k+2)`.
    #[inline]
    pub fn opposite_slot(self) -> usize {
        (self.slot() + 2) % 3
    }

    /// Next half-edge counter-clockwise around the owning triangle.
    #[inline]
    pub fn next_in_triangle(self) -> Self {
        Self::on_triangle(self.triangle(), (self.slot() + 1) % 3)
    }
}

impl<I: MeshIndex> TriangleId<I> {
    /// The three half-edges of this triangle, in slot order.
    #[inline]
    pub fn halfedges(self) -> [HalfEdgeId<I>; 3] {
        [
            HalfEdgeId::on_triangle(self, 0),
            HalfEdgeId::on_triangle(self, 1),
            HalfEdgeId::on_triangle(self, 2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(v.raw(), 42u32);
    }

    #[test]
    fn test_type_safety() {
        let v: VertexId = VertexId::new(0);
        let he: HalfEdgeId = HalfEdgeId::new(0);
        let t: TriangleId = TriangleId::new(0);

        assert_eq!(v.index(), he.index());
        assert_eq!(he.index(), t.index());
    }

    #[test]
    fn test_small_indices() {
        let v: VertexId<u16> = VertexId::new(1000);
        assert_eq!(v.index(), 1000);
        assert_eq!(<u16 as MeshIndex>::CAPACITY, 65535);
    }

    #[test]
    fn test_halfedge_slots() {
        let t: TriangleId = TriangleId::new(4);
        let he = HalfEdgeId::on_triangle(t, 2);
        assert_eq!(he.index(), 14);
        assert_eq!(he.triangle(), t);
        assert_eq!(he.slot(), 2);
        assert_eq!(he.opposite_slot(), 1);
        assert_eq!(he.next_in_triangle(), HalfEdgeId::on_triangle(t, 0));
        assert_eq!(t.halfedges()[1].index(), 13);
    }

    #[test]
    fn test_formatting() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(format!("{:?}", v), "V(42)");
        assert_eq!(format!("{}", v), "V42");

        let t: TriangleId<u64> = TriangleId::new(7);
        assert_eq!(format!("{}", t), "T7");
    }
}
