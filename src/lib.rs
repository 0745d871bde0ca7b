//! # subdmesh
//!
//! Polygon mesh topology and subdivision-style operators.
//!
//! subdmesh stores polygon meshes as a half-edge structure and derives new
//! meshes from them: Catmull-Clark subdivision, duals, vertex truncation and
//! window frames.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Mixed polygons**: triangles, quads and n-gons in one mesh
//! - **Editing**: face and vertex deletion with explicit compaction
//!
//! ## Quick Start
//!
//! ```
//! use subdmesh::prelude::*;
//! use subdmesh::algo::dual::{dual, CenterMode};
//! use subdmesh::algo::subdivide::{catmull_clark, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert!(mesh.is_closed());
//!
//! // One Catmull-Clark step turns every triangle into three quads.
//! let smooth = catmull_clark(&mesh, &SubdivideOptions::new(1)).unwrap();
//! assert_eq!(smooth.num_faces(), 12);
//!
//! // The dual of a tetrahedron is a tetrahedron.
//! let d = dual(&mesh, CenterMode::Barycenter).unwrap();
//! assert_eq!(d.num_faces(), 4);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use subdmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! # ];
//! # let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! // Neighbours of a vertex, counter-clockwise
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Corners of a face
//! let f = FaceId::new(0);
//! let corners: Vec<VertexId> = mesh.face_vertices(f).collect();
//! assert_eq!(corners.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use subdmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorKind, MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, EdgeId,
        Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Polygon, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
