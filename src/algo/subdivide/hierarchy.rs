//! Cache of successive subdivision levels.

use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

use super::{catmull_clark_step, limit_positions, SubdivideOptions};

/// A control mesh together with every Catmull-Clark level derived from it.
///
/// Level 0 is the control mesh. Level `k + 1` is only ever computed from
/// level `k`, and computed levels are reused until [`truncate`](Self::truncate)
/// drops them, so stepping the level count up and down is cheap.
///
/// ```
/// use subsurf::algo::subdivide::SubdivisionHierarchy;
/// use subsurf::mesh::{primitives, HalfEdgeMesh};
///
/// let cube: HalfEdgeMesh = primitives::cube().unwrap();
/// let mut hierarchy = SubdivisionHierarchy::new(cube);
///
/// assert_eq!(hierarchy.level(2).unwrap().num_faces(), 96);
/// assert_eq!(hierarchy.num_levels(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SubdivisionHierarchy<I: MeshIndex = u32> {
    levels: Vec<HalfEdgeMesh<I>>,
    limits: Vec<Option<HalfEdgeMesh<I>>>,
    options: SubdivideOptions,
}

impl<I: MeshIndex> SubdivisionHierarchy<I> {
    /// Start a hierarchy from a control mesh with default options.
    pub fn new(base: HalfEdgeMesh<I>) -> Self {
        Self::with_options(base, SubdivideOptions::default())
    }

    /// Start a hierarchy from a control mesh.
    ///
    /// `options.iterations` is ignored; levels are grown one at a time.
    pub fn with_options(base: HalfEdgeMesh<I>, options: SubdivideOptions) -> Self {
        Self {
            levels: vec![base],
            limits: vec![None],
            options,
        }
    }

    /// Number of stored meshes, the control mesh included.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// The control mesh.
    pub fn base(&self) -> &HalfEdgeMesh<I> {
        &self.levels[0]
    }

    /// The finest level computed so far.
    pub fn finest(&self) -> &HalfEdgeMesh<I> {
        &self.levels[self.levels.len() - 1]
    }

    /// Mesh after `k` levels of subdivision, computing missing levels.
    pub fn level(&mut self, k: usize) -> Result<&HalfEdgeMesh<I>> {
        while self.levels.len() <= k {
            let refined = catmull_clark_step(self.finest(), self.options.parallel)?;
            log::trace!(
                "Subdivision level {}: {} vertices, {} faces",
                self.levels.len(),
                refined.num_vertices(),
                refined.num_faces()
            );
            self.levels.push(refined);
            self.limits.push(None);
        }
        Ok(&self.levels[k])
    }

    /// Limit projection of level `k`, computing and caching it on first use.
    pub fn limit_surface(&mut self, k: usize) -> Result<&HalfEdgeMesh<I>> {
        self.level(k)?;
        let level = &self.levels[k];
        let options = &self.options;
        Ok(&*self.limits[k].get_or_insert_with(|| limit_positions(level, options)))
    }

    /// Drop every level finer than `k`.
    pub fn truncate(&mut self, k: usize) {
        let len = k.saturating_add(1);
        self.levels.truncate(len);
        self.limits.truncate(len);
    }

    /// Consume the hierarchy, returning the finest level.
    pub fn into_finest(mut self) -> HalfEdgeMesh<I> {
        self.limits.clear();
        self.levels.pop().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::mesh::primitives;

    #[test]
    fn test_levels_grow_lazily() {
        let cube: HalfEdgeMesh = primitives::cube().unwrap();
        let mut hierarchy = SubdivisionHierarchy::new(cube);
        assert_eq!(hierarchy.num_levels(), 1);

        assert_eq!(hierarchy.level(1).unwrap().num_faces(), 24);
        assert_eq!(hierarchy.num_levels(), 2);

        assert_eq!(hierarchy.level(3).unwrap().num_faces(), 384);
        assert_eq!(hierarchy.num_levels(), 4);

        // Already computed
        assert_eq!(hierarchy.level(2).unwrap().num_faces(), 96);
        assert_eq!(hierarchy.num_levels(), 4);
        assert_eq!(hierarchy.base().num_faces(), 6);
        assert_eq!(hierarchy.finest().num_faces(), 384);
    }

    #[test]
    fn test_truncate_keeps_coarse_levels() {
        let cube: HalfEdgeMesh = primitives::cube().unwrap();
        let mut hierarchy = SubdivisionHierarchy::new(cube);
        hierarchy.level(3).unwrap();

        hierarchy.truncate(1);
        assert_eq!(hierarchy.num_levels(), 2);
        assert_eq!(hierarchy.finest().num_faces(), 24);

        // Truncating past the end is a no-op
        hierarchy.truncate(10);
        assert_eq!(hierarchy.num_levels(), 2);
        hierarchy.truncate(usize::MAX);
        assert_eq!(hierarchy.num_levels(), 2);

        // Regrowing reproduces the dropped level
        assert_eq!(hierarchy.level(2).unwrap().num_vertices(), 98);
    }

    #[test]
    fn test_limit_surface_matches_level() {
        let grid: HalfEdgeMesh = primitives::quad_grid(2, 2).unwrap();
        let options = SubdivideOptions::default().sequential();
        let mut hierarchy = SubdivisionHierarchy::with_options(grid, options);

        let limit = hierarchy.limit_surface(1).unwrap().clone();
        let level = hierarchy.level(1).unwrap();
        assert_eq!(limit.num_faces(), level.num_faces());
        assert_eq!(limit.num_vertices(), level.num_vertices());

        let expected = limit_positions(level, &SubdivideOptions::default());
        for v in limit.vertex_ids() {
            assert!((limit.position(v) - expected.position(v)).norm() < 1e-10);
        }
    }

    #[test]
    fn test_overflow_keeps_computed_levels() {
        let torus: HalfEdgeMesh<u16> = primitives::torus(8, 8, 2.0, 0.5).unwrap();
        let mut hierarchy = SubdivisionHierarchy::new(torus);

        let result = hierarchy.level(4);
        assert!(matches!(result, Err(MeshError::IndexOverflow { .. })));
        assert_eq!(hierarchy.num_levels(), 4);
        assert_eq!(hierarchy.finest().num_faces(), 4096);
    }

    #[test]
    fn test_into_finest() {
        let cube: HalfEdgeMesh = primitives::cube().unwrap();
        let mut hierarchy = SubdivisionHierarchy::new(cube);
        hierarchy.level(1).unwrap();
        assert_eq!(hierarchy.into_finest().num_faces(), 24);
    }
}
