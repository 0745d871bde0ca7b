//! Index handles for mesh elements.
//!
//! Vertices, half-edges, faces and edges are addressed by typed handles over a
//! plain integer. The integer type is generic so small meshes can use `u16`
//! and very large ones `u64`; `u32` is the default.
//!
//! Half-edges are always allocated in pairs, so the opposite half-edge and the
//! undirected edge of a half-edge are pure index arithmetic:
//! `pair(h) = h ^ 1` and `edge(h) = h / 2`.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as mesh indices.
///
/// The largest value of the type is reserved as the "none" sentinel.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// Sentinel meaning "no element".
    const INVALID: Self;

    /// Convert from usize.
    ///
    /// # Panics
    /// Panics in debug builds if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Whether this is a real index rather than the sentinel.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($ty:ty) => {
        impl MeshIndex for $ty {
            const MAX: Self = <$ty>::MAX - 1;
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v <= Self::MAX as usize,
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

/// A vertex handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A half-edge handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A face handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// An undirected edge handle. Edge `e` owns half-edges `2e` and `2e + 1`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create a handle from a raw index.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The "none" handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// The raw index.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this handle refers to an element at all.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }

            /// `Some(self)` for a real handle, `None` for the sentinel.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                self.is_valid().then_some(self)
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(NONE)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
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
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");

impl<I: MeshIndex> HalfEdgeId<I> {
    /// The opposite half-edge of the same undirected edge.
    #[inline]
    pub fn pair(self) -> Self {
        Self::new(self.index() ^ 1)
    }

    /// The undirected edge this half-edge belongs to.
    #[inline]
    pub fn edge(self) -> EdgeId<I> {
        EdgeId::new(self.index() / 2)
    }
}

impl<I: MeshIndex> EdgeId<I> {
    /// The even half-edge of this edge.
    #[inline]
    pub fn halfedge(self) -> HalfEdgeId<I> {
        HalfEdgeId::new(self.index() * 2)
    }

    /// Both half-edges of this edge, even one first.
    #[inline]
    pub fn halfedges(self) -> [HalfEdgeId<I>; 2] {
        let h = self.halfedge();
        [h, h.pair()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert!(v.is_valid());
        assert_eq!(v.valid(), Some(v));

        let none: VertexId = VertexId::invalid();
        assert!(!none.is_valid());
        assert_eq!(none.valid(), None);
    }

    #[test]
    fn test_pair_is_involution() {
        for i in 0..16 {
            let h: HalfEdgeId = HalfEdgeId::new(i);
            assert_ne!(h.pair(), h);
            assert_eq!(h.pair().pair(), h);
            assert_eq!(h.edge(), h.pair().edge());
        }
    }

    #[test]
    fn test_edge_halfedges() {
        let e: EdgeId<u16> = EdgeId::new(5);
        let [a, b] = e.halfedges();
        assert_eq!(a.index(), 10);
        assert_eq!(b.index(), 11);
        assert_eq!(a.edge(), e);
    }

    #[test]
    fn test_debug_format() {
        let f: FaceId = FaceId::new(3);
        assert_eq!(format!("{:?}", f), "F(3)");

        let none: FaceId = FaceId::invalid();
        assert_eq!(format!("{:?}", none), "F(NONE)");
    }
}
