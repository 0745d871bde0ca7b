//! Per-iteration progress for
//! [`catmull_clark_with_progress`](crate::algo::subdivide::catmull_clark_with_progress).
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use subdmesh::prelude::*;
//! use subdmesh::algo::Progress;
//! use subdmesh::algo::subdivide::{catmull_clark_with_progress, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let progress = Progress::new(move |done, total, _| sink.lock().unwrap().push((done, total)));
//!
//! catmull_clark_with_progress(&mesh, &SubdivideOptions::new(2), &progress).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![(0, 2), (1, 2), (2, 2)]);
//! ```

/// Callback invoked as `(iterations done, iterations requested, label)`,
/// once before the first iteration and once after each.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Invoke the callback.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// A callback that ignores every report.
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
