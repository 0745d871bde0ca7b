//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the operations
//! that keep it consistent: incremental face insertion, deletion, compaction
//! and adjacency queries.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a polygon mesh stored as a half-edge
//! (doubly-connected edge list) structure. Faces may have any degree of three
//! or more; triangles, quads and n-gons mix freely.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies an undirected edge (a half-edge pair)
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use subdmesh::mesh::{build_from_polygons, to_face_vertex, HalfEdgeMesh, Polygon};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
//! let (_, polygons) = to_face_vertex(&mesh);
//! assert_eq!(polygons, vec![Polygon::Triangle([0, 1, 2])]);
//! ```

mod builder;
mod edit;
mod halfedge;
mod index;
mod query;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, Polygon,
};
pub use halfedge::{
    Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
