//! Dual mesh construction.
//!
//! The dual has one vertex per primal face and one face per primal vertex.
//!
//! For closed meshes the dual is built directly on the primal half-edge
//! indices, so primal half-edge `h` and dual half-edge `h` cross the same
//! edge and pairs stay pairs:
//!
//! | dual        | primal           |
//! |-------------|------------------|
//! | `origin(h)` | `face(pair(h))`  |
//! | `face(h)`   | `origin(h)`      |
//! | `next(h)`   | `pair(prev(h))`  |
//! | `prev(h)`   | `next(pair(h))`  |
//!
//! Open meshes get a dual face only for interior vertices. Those faces are
//! inserted one by one, which yields a complete half-edge structure with its
//! own boundary loops.

use log::debug;
use nalgebra::Point3;

use crate::error::Result;
use crate::mesh::{
    Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
};

/// Where to place the dual vertex of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterMode {
    /// Mean of the face's vertex positions.
    #[default]
    Barycenter,
    /// Circumcenter of the first three face vertices, or the barycenter when
    /// they are collinear.
    Circumcenter,
}

/// Build the dual of a mesh.
///
/// # Errors
///
/// - [`MeshError::InvalidState`](crate::error::MeshError::InvalidState) if the
///   mesh holds deleted elements
/// - a topology error if an interior vertex of an open mesh has fewer than
///   three incident faces
pub fn dual<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, mode: CenterMode) -> Result<HalfEdgeMesh<I>> {
    mesh.ensure_compact("dual")?;
    // Faces become vertices and vertices become faces; edges map one to one.
    HalfEdgeMesh::<I>::check_capacity(
        mesh.num_faces(),
        mesh.num_halfedges(),
        mesh.num_vertices(),
    )?;

    let centers: Vec<Point3<f64>> = mesh
        .face_ids()
        .map(|f| match mode {
            CenterMode::Barycenter => mesh.face_centroid(f),
            CenterMode::Circumcenter => mesh.face_circumcenter_unchecked(f),
        })
        .collect();

    let closed = mesh.is_closed() && mesh.vertex_ids().all(|v| !mesh.is_isolated(v));
    if closed {
        debug!(
            "dual: closed mesh, {} faces become vertices, {} vertices become faces",
            mesh.num_faces(),
            mesh.num_vertices()
        );
        Ok(closed_dual(mesh, centers))
    } else {
        debug!("dual: open mesh, dual faces for interior vertices only");
        open_dual(mesh, centers)
    }
}

fn closed_dual<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, centers: Vec<Point3<f64>>) -> HalfEdgeMesh<I> {
    let mut result = HalfEdgeMesh::with_capacity(mesh.num_faces(), mesh.num_vertices());

    for (fid, position) in centers.into_iter().enumerate() {
        let mut vertex = Vertex::new(position);
        vertex.halfedge = mesh.face(FaceId::new(fid)).halfedge.pair();
        result.vertices.push(vertex);
    }

    for v in mesh.vertex_ids() {
        result.faces.push(Face::new(mesh.vertex(v).halfedge));
    }

    result.halfedges = (0..mesh.num_halfedges())
        .map(|i| {
            let he = HalfEdgeId::new(i);
            let mut dual_he = HalfEdge::new(VertexId::new(mesh.face_of(he.pair()).index()));
            dual_he.face = FaceId::new(mesh.origin(he).index());
            dual_he.next = mesh.prev(he).pair();
            dual_he.prev = mesh.next(he.pair());
            dual_he
        })
        .collect();

    result
}

fn open_dual<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    centers: Vec<Point3<f64>>,
) -> Result<HalfEdgeMesh<I>> {
    let mut result = HalfEdgeMesh::with_capacity(mesh.num_faces(), mesh.num_vertices());
    for position in centers {
        result.add_vertex(position);
    }

    let mut ring: Vec<VertexId<I>> = Vec::new();
    for v in mesh.vertex_ids() {
        if mesh.is_isolated(v) || mesh.is_boundary_vertex(v) {
            continue;
        }
        ring.clear();
        ring.extend(
            mesh.vertex_halfedges(v)
                .map(|he| VertexId::new(mesh.face_of(he).index())),
        );
        result.add_face(&ring)?;
    }

    Ok(result)
}
