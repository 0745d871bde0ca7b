//! Mesh subdivision.
//!
//! # Catmull-Clark Subdivision
//!
//! Catmull-Clark subdivision (Catmull & Clark, 1978) is an approximating
//! scheme for polygon meshes of any face degree. Each iteration:
//!
//! 1. Creates a face point at each face center
//! 2. Creates an edge point per edge from its end points and the two face points
//! 3. Moves each original vertex towards its neighbours and face points
//! 4. Splits every face of degree `d` into `d` quads
//!
//! After one iteration the mesh is all quads.
//!
//! # Sharp Vertices
//!
//! Boundary vertices never move, and neither do vertices pinned through
//! [`SubdivideOptions`]: fixed vertices, both ends of fixed edges and all
//! corners of fixed faces. Edge points between two sharp vertices stay on the
//! edge midpoint and are sharp themselves, so pinned creases persist over
//! iterations.
//!
//! # Example
//!
//! ```
//! use subdmesh::prelude::*;
//! use subdmesh::algo::subdivide::{catmull_clark, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//!
//! let options = SubdivideOptions::new(2);
//! let fine = catmull_clark(&mesh, &options).unwrap();
//! assert_eq!(fine.num_faces(), 16);
//! ```
//!
//! # References
//!
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.

mod catmull_clark;

pub use catmull_clark::{catmull_clark, catmull_clark_with_progress, CatmullClarkSteps};

use crate::error::{MeshError, Result};

/// Options for Catmull-Clark subdivision.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision iterations.
    pub iterations: usize,

    /// Vertex indices (of the input mesh) that keep their position.
    pub fixed_vertices: Vec<usize>,

    /// Edge indices whose end points keep their position.
    /// Edge `e` is the half-edge pair `2e`, `2e + 1`.
    pub fixed_edges: Vec<usize>,

    /// Face indices whose corners keep their position.
    pub fixed_faces: Vec<usize>,

    /// Whether to compute new points with rayon (default: false).
    pub parallel: bool,
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SubdivideOptions {
    /// Create options with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            fixed_vertices: Vec::new(),
            fixed_edges: Vec::new(),
            fixed_faces: Vec::new(),
            parallel: false,
        }
    }

    /// Create options from a signed iteration count, as hosts often pass it.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidParameter`] for a negative count.
    pub fn try_new(iterations: i64) -> Result<Self> {
        usize::try_from(iterations)
            .map(Self::new)
            .map_err(|_| MeshError::invalid_param("iterations", iterations, "must not be negative"))
    }

    /// Pin vertices in place.
    pub fn with_fixed_vertices(mut self, vertices: impl IntoIterator<Item = usize>) -> Self {
        self.fixed_vertices.extend(vertices);
        self
    }

    /// Pin the end points of edges.
    pub fn with_fixed_edges(mut self, edges: impl IntoIterator<Item = usize>) -> Self {
        self.fixed_edges.extend(edges);
        self
    }

    /// Pin the corners of faces.
    pub fn with_fixed_faces(mut self, faces: impl IntoIterator<Item = usize>) -> Self {
        self.fixed_faces.extend(faces);
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_try_new_rejects_negative() {
        let err = SubdivideOptions::try_new(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        let options = SubdivideOptions::try_new(3).unwrap();
        assert_eq!(options.iterations, 3);
        assert!(!options.parallel);
    }

    #[test]
    fn test_builders_accumulate() {
        let options = SubdivideOptions::new(1)
            .with_fixed_vertices([0, 2])
            .with_fixed_vertices(vec![5])
            .with_fixed_edges([1])
            .with_fixed_faces([0])
            .with_parallel(true);

        assert_eq!(options.fixed_vertices, vec![0, 2, 5]);
        assert_eq!(options.fixed_edges, vec![1]);
        assert_eq!(options.fixed_faces, vec![0]);
        assert!(options.parallel);
    }
}
