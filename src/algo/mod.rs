//! Algorithms operating on a built [`HalfEdgeMesh`](crate::mesh::HalfEdgeMesh).
//!
//! - **Subdivision**: Catmull-Clark refinement, limit projection and a
//!   cache of successive levels
//! - **Patches**: extraction of regular bicubic patches for GPU tessellation

pub mod patches;
mod progress;
pub mod subdivide;

pub use progress::Progress;
