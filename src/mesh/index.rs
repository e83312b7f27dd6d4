//! Index types for mesh elements.
//!
//! Vertices, half-edges, faces and edges live in per-mesh arenas and are only
//! ever referred to by position in those arenas. The wrappers here keep the
//! four kinds of position apart at compile time. They are generic over the
//! underlying integer so that render buffers can be emitted as `u16`, `u32`
//! or `u64` without conversion.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Trait for integer types that can be used as mesh indices.
///
/// Implemented for `u16`, `u32` and `u64`. The largest representable value is
/// reserved: it marks absent references (a half-edge without twin) and
/// terminates each face in the polygon index buffer.
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + bytemuck::Pod + 'static
{
    /// The maximum valid index value.
    const MAX: Self;

    /// A sentinel value representing an invalid/null index.
    const INVALID: Self;

    /// Terminator written after every face in the polygon index buffer.
    const END_OF_FACE: Self = Self::INVALID;

    /// Convert from usize to this index type.
    ///
    /// Callers are expected to have checked the value against
    /// [`MeshIndex::capacity`]; out-of-range values are a contract violation.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Number of distinct valid indices (`MAX + 1`).
    fn capacity() -> usize {
        Self::MAX.to_usize().saturating_add(1)
    }

    /// Check if this is a valid (non-sentinel) index.
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
                    v <= <Self as MeshIndex>::MAX as usize,
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

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

/// A type-safe index of an undirected edge (a twin pair, or a lone
/// boundary half-edge).
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

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
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

            /// Check if this is a valid (non-null) index.
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
                    write!(f, "{}(INVALID)", $display)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_id() {
        let v: VertexId = VertexId::new(42);
        assert_eq!(v.index(), 42);
        assert_eq!(v.raw(), 42u32);
        assert!(v.is_valid());

        let invalid: VertexId = VertexId::invalid();
        assert!(!invalid.is_valid());
        assert_eq!(HalfEdgeId::<u32>::default(), HalfEdgeId::invalid());
    }

    #[test]
    fn test_end_of_face_is_max_value() {
        assert_eq!(<u16 as MeshIndex>::END_OF_FACE, u16::MAX);
        assert_eq!(<u32 as MeshIndex>::END_OF_FACE, u32::MAX);
        assert_eq!(<u64 as MeshIndex>::END_OF_FACE, u64::MAX);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(<u16 as MeshIndex>::capacity(), u16::MAX as usize);
        assert_eq!(<u32 as MeshIndex>::capacity(), u32::MAX as usize);
    }

    #[test]
    fn test_debug_format() {
        let f: FaceId = FaceId::new(7);
        assert_eq!(format!("{:?}", f), "F(7)");

        let invalid: EdgeId = EdgeId::invalid();
        assert_eq!(format!("{:?}", invalid), "E(INVALID)");
    }
}
