//! Mesh subdivision algorithms.
//!
//! Every algorithm here is a pure function from one mesh to a new one: the
//! control mesh is only read, and the result owns fresh arenas. Control meshes
//! therefore stay usable for re-subdividing or stepping back through history.
//!
//! # Catmull-Clark Subdivision
//!
//! Catmull-Clark subdivision (Catmull & Clark, 1978) is an approximating
//! scheme for polygon meshes of any face valence. Each level:
//!
//! 1. Creates a face point at each face centroid
//! 2. Creates an edge point per edge from its endpoints and adjacent face points
//! 3. Moves every original vertex to a weighted vertex point
//! 4. Splits each n-sided face into n quads
//!
//! After one level the mesh is all quads. The limit surface is C² except at
//! extraordinary vertices (valence ≠ 4), where it is C¹.
//!
//! # Limit Projection
//!
//! [`limit_positions`] moves every vertex of a mesh to the point it would
//! converge to under infinitely many Catmull-Clark levels, without changing
//! connectivity.
//!
//! # Parallelism
//!
//! Face points, edge points, vertex points and limit positions are computed
//! with rayon when [`SubdivideOptions::parallel`] is set. Results are
//! identical to the sequential path. The connectivity rebuild always runs
//! after all positions are known.
//!
//! # Example
//!
//! ```
//! use subsurf::prelude::*;
//! use subsurf::algo::subdivide::{catmull_clark_subdivide, limit_positions, SubdivideOptions};
//!
//! let cube: HalfEdgeMesh = subsurf::mesh::primitives::cube().unwrap();
//!
//! let options = SubdivideOptions::new(2);
//! let refined = catmull_clark_subdivide(&cube, &options).unwrap();
//! assert_eq!(refined.num_faces(), 96);
//!
//! let limit = limit_positions(&refined, &options);
//! assert_eq!(limit.num_vertices(), refined.num_vertices());
//! ```
//!
//! # References
//!
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.
//! - Halstead, M., Kass, M. & DeRose, T. (1993). "Efficient, fair interpolation
//!   using Catmull-Clark surfaces." SIGGRAPH '93.

mod catmull_clark;
mod hierarchy;
mod limit;

pub use catmull_clark::{
    catmull_clark_step, catmull_clark_subdivide, catmull_clark_subdivide_with_progress,
    CatmullClarkSubdivider,
};
pub use hierarchy::SubdivisionHierarchy;
pub use limit::{limit_position, limit_positions, LimitPositionSubdivider};

use rayon::prelude::*;

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for subdivision algorithms.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision iterations.
    pub iterations: usize,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl SubdivideOptions {
    /// Create options with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            parallel: true,
        }
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

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
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

/// A transformation from a control mesh to a new mesh.
///
/// Implementations never modify their input.
pub trait Subdivider<I: MeshIndex> {
    /// Produce a new mesh from `mesh`.
    fn subdivide(&self, mesh: &HalfEdgeMesh<I>) -> Result<HalfEdgeMesh<I>>;

    /// Short human-readable name, used in logs and progress messages.
    fn name(&self) -> &'static str;
}

/// Evaluate `f` for every index in `0..len`, in parallel if requested.
pub(crate) fn map_indices<T, F>(len: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}
