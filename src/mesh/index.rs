//! Index types for mesh elements.
//!
//! Vertices and faces live in arenas and are addressed by stable integer
//! indices. The indices are generic over the underlying integer type so that
//! small scans can use `u16` and very large ones `u64`. The largest value of
//! each type is reserved as the "no element" sentinel, e.g. for a border
//! edge without a neighbour face.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can address mesh elements.
///
/// Implemented for `u16`, `u32`, and `u64`.
pub trait MeshIndex: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Sentinel for "no element". Never a valid id.
    const INVALID: Self;

    /// Convert an arena position, or `None` if it does not fit below
    /// [`INVALID`](Self::INVALID).
    fn try_from_usize(v: usize) -> Option<Self>;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Convert an arena position, mapping overflow to [`INVALID`](Self::INVALID).
    ///
    /// Overflow is a bug in the caller; debug builds assert on it.
    #[inline]
    fn from_usize(v: usize) -> Self {
        let index = Self::try_from_usize(v);
        debug_assert!(index.is_some(), "index {} too large for {:?}", v, Self::INVALID);
        index.unwrap_or(Self::INVALID)
    }

    /// Number of elements an arena indexed by this type can hold.
    #[inline]
    fn capacity() -> usize {
        Self::INVALID.to_usize()
    }

    /// Check if this is a valid (non-sentinel) index.
    #[inline]
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($ty:ty),*) => {$(
        impl MeshIndex for $ty {
            const INVALID: Self = <$ty>::MAX;

            #[inline]
            fn try_from_usize(v: usize) -> Option<Self> {
                <$ty>::try_from(v).ok().filter(|&i| i != Self::INVALID)
            }

            #[inline]
            fn to_usize(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_mesh_index!(u16, u32, u64);

/// A vertex of a mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// A triangular face of a mesh.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Id of the element at an arena position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// Id of the element at an arena position, or `None` if the
            /// position cannot be addressed by `I`.
            #[inline]
            pub fn try_new(index: usize) -> Option<Self> {
                I::try_from_usize(index).map(Self)
            }

            /// The "no element" id.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Arena position.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Check if this refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(-)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(FaceId, "F");
