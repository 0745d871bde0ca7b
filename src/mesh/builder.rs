//! Mesh construction utilities.
//!
//! This module converts between the half-edge store and the face-vertex
//! representation used by callers: a position list plus one vertex-index loop
//! per face.

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// A face given as a loop of vertex indices.
///
/// Triangles and quads get fixed-size variants; any other degree is an
/// [`Polygon::Ngon`]. All variants expose the same slice view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Polygon {
    /// Three vertex indices.
    Triangle([usize; 3]),
    /// Four vertex indices.
    Quad([usize; 4]),
    /// Any number of vertex indices.
    Ngon(Vec<usize>),
}

impl Polygon {
    /// Build the tightest variant for a vertex loop.
    pub fn from_slice(indices: &[usize]) -> Self {
        match *indices {
            [a, b, c] => Polygon::Triangle([a, b, c]),
            [a, b, c, d] => Polygon::Quad([a, b, c, d]),
            _ => Polygon::Ngon(indices.to_vec()),
        }
    }

    /// The vertex indices of the loop.
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Polygon::Triangle(v) => v,
            Polygon::Quad(v) => v,
            Polygon::Ngon(v) => v,
        }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the loop is empty.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl AsRef<[usize]> for Polygon {
    fn as_ref(&self) -> &[usize] {
        self.as_slice()
    }
}

impl From<[usize; 3]> for Polygon {
    fn from(v: [usize; 3]) -> Self {
        Polygon::Triangle(v)
    }
}

impl From<[usize; 4]> for Polygon {
    fn from(v: [usize; 4]) -> Self {
        Polygon::Quad(v)
    }
}

impl From<Vec<usize>> for Polygon {
    fn from(v: Vec<usize>) -> Self {
        Polygon::from_slice(&v)
    }
}

/// Build a half-edge mesh from vertex positions and polygon faces.
///
/// Faces are inserted in order with [`HalfEdgeMesh::add_face`], so face `i`
/// of the input becomes `FaceId(i)` and its first half-edge leaves the first
/// listed vertex.
///
/// # Errors
///
/// - [`MeshError::InvalidVertexIndex`] if a face references a vertex past the
///   end of `vertices`
/// - [`MeshError::CapacityExceeded`] if the vertices or faces do not fit the
///   index type
/// - [`MeshError::FaceInsertion`] wrapping the topology error of the first
///   face that could not be inserted
///
/// # Example
/// ```
/// use subdmesh::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 2.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 5);
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_polygons<I: MeshIndex, P: AsRef<[usize]>>(
    vertices: &[Point3<f64>],
    faces: &[P],
) -> Result<HalfEdgeMesh<I>> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.as_ref().iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    HalfEdgeMesh::<I>::check_capacity(vertices.len(), 0, faces.len())?;
    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.add_vertex(pos);
    }

    let mut loop_ids: Vec<VertexId<I>> = Vec::new();
    for (fi, face) in faces.iter().enumerate() {
        loop_ids.clear();
        loop_ids.extend(face.as_ref().iter().map(|&vi| VertexId::new(vi)));

        mesh.add_face(&loop_ids)
            .map_err(|source| MeshError::FaceInsertion {
                face: fi,
                source: Box::new(source),
            })?;
    }

    Ok(mesh)
}

/// Build a half-edge mesh from vertices and triangle faces.
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Build a half-edge mesh from vertices and quad faces (counter-clockwise).
pub fn build_from_quads<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(vertices, faces)
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns positions of all vertex slots and one [`Polygon`] per live face.
/// Call [`HalfEdgeMesh::compact`] first if the mesh holds deleted elements,
/// otherwise the indices refer to the uncompacted slots.
pub fn to_face_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<Polygon>) {
    let vertices: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();

    let faces: Vec<Polygon> = mesh
        .face_ids()
        .map(|f| {
            let loop_indices: Vec<usize> = mesh.face_vertices(f).map(|v| v.index()).collect();
            Polygon::from(loop_indices)
        })
        .collect();

    (vertices, faces)
}
