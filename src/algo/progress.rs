//! Progress reporting for multi-level subdivision.
//!
//! ```
//! use subsurf::algo::Progress;
//! use subsurf::algo::subdivide::{catmull_clark_subdivide_with_progress, SubdivideOptions};
//! use subsurf::mesh::{primitives, HalfEdgeMesh};
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let cube: HalfEdgeMesh = primitives::cube().unwrap();
//! let options = SubdivideOptions::new(2);
//! let refined = catmull_clark_subdivide_with_progress(&cube, &options, &progress).unwrap();
//! assert_eq!(refined.num_faces(), 96);
//! ```

/// A callback receiving `(current, total, message)` updates.
///
/// `current` counts completed steps, so the last report has
/// `current == total`.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress of a sub-task occupying step `range_current` of
    /// `range_total`.
    ///
    /// The sub-task's `sub_current / sub_total` is scaled by 1000 and folded
    /// into the outer step, so the callback sees `(effective, range_total * 1000)`.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        let sub_fraction = (sub_current * 1000) / sub_total;
        (self.callback)(range_current * 1000 + sub_fraction, range_total * 1000, message);
    }

    /// A reporter that discards every update.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
