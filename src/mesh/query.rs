//! Derived adjacency and geometry queries.
//!
//! Every query that takes an element handle validates it first and fails with
//! an index error for unknown or removed elements. Orders follow the store:
//! vertex rings rotate counter-clockwise from the stored outgoing half-edge,
//! face loops start at the face's first half-edge.

use log::warn;
use nalgebra::{Point3, Vector3};

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::Result;

impl<I: MeshIndex> HalfEdgeMesh<I> {
    // ==================== Vertex Queries ====================

    /// One-ring neighbours of a vertex in rotation order.
    pub fn vertex_neighbours_checked(&self, v: VertexId<I>) -> Result<Vec<VertexId<I>>> {
        self.check_vertex(v.index())?;
        Ok(self.vertex_neighbors(v).collect())
    }

    /// The face of each outgoing half-edge, in rotation order.
    ///
    /// `None` marks the boundary gap. A boundary vertex starts with it.
    pub fn vertex_faces(&self, v: VertexId<I>) -> Result<Vec<Option<FaceId<I>>>> {
        self.check_vertex(v.index())?;
        Ok(self
            .vertex_halfedges(v)
            .map(|he| self.face_of(he).valid())
            .collect())
    }

    /// Outgoing half-edges of a vertex, in rotation order.
    pub fn vertex_halfedges_checked(&self, v: VertexId<I>) -> Result<Vec<HalfEdgeId<I>>> {
        self.check_vertex(v.index())?;
        Ok(self.vertex_halfedges(v).collect())
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId<I>) -> Result<usize> {
        self.check_vertex(v.index())?;
        Ok(self.vertex_halfedges(v).count())
    }

    /// Number of outgoing half-edges whose pair has no face.
    pub fn naked_edge_count(&self, v: VertexId<I>) -> Result<usize> {
        self.check_vertex(v.index())?;
        Ok(self
            .vertex_halfedges(v)
            .filter(|he| self.is_boundary_halfedge(he.pair()))
            .count())
    }

    // ==================== Face Queries ====================

    /// Arithmetic mean of the face's vertex positions.
    pub fn face_center(&self, f: FaceId<I>) -> Result<Point3<f64>> {
        self.check_face(f.index())?;
        Ok(self.face_centroid(f))
    }

    /// Circumcenter of the triangle spanned by the first three face vertices.
    ///
    /// Falls back to [`face_center`](Self::face_center) when those vertices
    /// are collinear.
    pub fn face_circumcenter(&self, f: FaceId<I>) -> Result<Point3<f64>> {
        self.check_face(f.index())?;
        Ok(self.face_circumcenter_unchecked(f))
    }

    /// Number of face edges that lie on the boundary.
    pub fn face_naked_edge_count(&self, f: FaceId<I>) -> Result<usize> {
        self.check_face(f.index())?;
        Ok(self
            .face_halfedges(f)
            .filter(|he| self.is_boundary_halfedge(he.pair()))
            .count())
    }

    /// Faces across the non-boundary edges of a face, in loop order.
    pub fn face_neighbours(&self, f: FaceId<I>) -> Result<Vec<FaceId<I>>> {
        self.check_face(f.index())?;
        Ok(self
            .face_halfedges(f)
            .filter_map(|he| self.face_of(he.pair()).valid())
            .collect())
    }

    /// Vertex handles of a face, in loop order.
    pub fn face_vertices_checked(&self, f: FaceId<I>) -> Result<Vec<VertexId<I>>> {
        self.check_face(f.index())?;
        Ok(self.face_vertices(f).collect())
    }

    /// Half-edges of a face, in loop order.
    pub fn face_halfedges_checked(&self, f: FaceId<I>) -> Result<Vec<HalfEdgeId<I>>> {
        self.check_face(f.index())?;
        Ok(self.face_halfedges(f).collect())
    }

    /// Face outline as a closed polyline (first point repeated at the end).
    pub fn face_polyline(&self, f: FaceId<I>) -> Result<Vec<Point3<f64>>> {
        self.check_face(f.index())?;
        let mut points: Vec<Point3<f64>> =
            self.face_vertices(f).map(|v| *self.position(v)).collect();
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Ok(points)
    }

    // ==================== Edge Queries ====================

    /// The faces on either side of an edge, skipping boundary sides.
    pub fn edge_faces(&self, e: EdgeId<I>) -> Result<Vec<FaceId<I>>> {
        self.check_edge(e.index())?;
        Ok(e.halfedges()
            .into_iter()
            .filter_map(|he| self.face_of(he).valid())
            .collect())
    }

    /// The end points of an edge: origin and destination of its even half-edge.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> Result<(VertexId<I>, VertexId<I>)> {
        self.check_edge(e.index())?;
        let he = e.halfedge();
        Ok((self.origin(he), self.dest(he)))
    }

    /// One half-edge per live edge, with whether the edge is on the boundary.
    pub fn edges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, bool)> + '_ {
        self.edge_ids().map(|e| {
            let he = e.halfedge();
            (he, self.is_boundary_edge(he))
        })
    }

    // ==================== Whole-Mesh Queries ====================

    /// Whether no live half-edge lies on a boundary.
    pub fn is_closed(&self) -> bool {
        self.halfedges().all(|(_, he)| !he.is_boundary())
    }

    /// Signed volume enclosed by the faces.
    ///
    /// Triangles contribute their signed tetrahedron against the origin;
    /// larger faces are fanned around their center first. Only meaningful for
    /// closed, consistently oriented meshes. Outward orientation is positive.
    pub fn volume(&self) -> f64 {
        let mut six_volume = 0.0;
        for f in self.face_ids() {
            let points: Vec<Vector3<f64>> =
                self.face_vertices(f).map(|v| self.position(v).coords).collect();
            if points.len() == 3 {
                six_volume += points[0].dot(&points[1].cross(&points[2]));
            } else {
                let c = self.face_centroid(f).coords;
                for i in 0..points.len() {
                    let j = (i + 1) % points.len();
                    six_volume += c.dot(&points[i].cross(&points[j]));
                }
            }
        }
        six_volume / 6.0
    }

    // ==================== Unchecked Helpers ====================

    pub(crate) fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        if count == 0 {
            return Point3::origin();
        }
        Point3::from(sum / count as f64)
    }

    pub(crate) fn face_circumcenter_unchecked(&self, f: FaceId<I>) -> Point3<f64> {
        let corners: Vec<Point3<f64>> =
            self.face_vertices(f).take(3).map(|v| *self.position(v)).collect();
        if corners.len() < 3 {
            return self.face_centroid(f);
        }

        let a = corners[1] - corners[0];
        let b = corners[2] - corners[0];
        let axb = a.cross(&b);
        let denom = 2.0 * axb.norm_squared();

        if denom <= f64::EPSILON * a.norm_squared() * b.norm_squared() {
            warn!("face {:?} has collinear corners, using its center", f);
            return self.face_centroid(f);
        }

        let offset = (b * a.norm_squared() - a * b.norm_squared()).cross(&axb) / denom;
        corners[0] + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, MeshError};
    use crate::mesh::{build_from_polygons, build_from_quads};

    fn unit_cube() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ];
        build_from_quads(&vertices, &faces).unwrap()
    }

    fn single_quad() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap()
    }

    /// A 3x3 grid of quads over 4x4 vertices. Vertices 5, 6, 9, 10 are interior.
    fn quad_grid() -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                vertices.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                let i = y * 4 + x;
                faces.push([i, i + 1, i + 5, i + 4]);
            }
        }
        build_from_quads(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_single_quad_is_all_boundary() {
        let mesh = single_quad();
        assert!(!mesh.is_closed());
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
            assert_eq!(mesh.valence(v).unwrap(), 2);
            assert_eq!(mesh.naked_edge_count(v).unwrap(), 2);
        }
        assert_eq!(mesh.face_naked_edge_count(FaceId::new(0)).unwrap(), 4);
        assert!(mesh.edges().all(|(_, boundary)| boundary));
        assert_eq!(mesh.edges().count(), 4);
    }

    #[test]
    fn test_boundary_vertex_faces_start_with_gap() {
        let mesh = single_quad();
        let faces = mesh.vertex_faces(VertexId::new(0)).unwrap();
        assert_eq!(faces, vec![None, Some(FaceId::new(0))]);
    }

    #[test]
    fn test_interior_vertex_ring_is_ccw() {
        let mesh = quad_grid();
        let v = VertexId::new(5);
        assert!(!mesh.is_boundary_vertex(v));
        assert_eq!(mesh.valence(v).unwrap(), 4);
        assert_eq!(mesh.naked_edge_count(v).unwrap(), 0);

        let ring = mesh.vertex_neighbours_checked(v).unwrap();
        assert_eq!(ring.len(), 4);
        let center = mesh.position(v);
        let mut angles: Vec<f64> = ring
            .iter()
            .map(|&n| {
                let d = mesh.position(n) - center;
                d.y.atan2(d.x)
            })
            .collect();
        // Rotate so the smallest angle comes first, then it must increase.
        let start = angles
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        angles.rotate_left(start);
        assert!(angles.windows(2).all(|w| w[0] < w[1]));

        let faces = mesh.vertex_faces(v).unwrap();
        assert!(faces.iter().all(|f| f.is_some()));
    }

    #[test]
    fn test_face_neighbours() {
        let mesh = quad_grid();
        // Center face of the grid touches four others.
        assert_eq!(mesh.face_neighbours(FaceId::new(4)).unwrap().len(), 4);
        // Corner face touches two.
        assert_eq!(mesh.face_neighbours(FaceId::new(0)).unwrap().len(), 2);
        assert_eq!(mesh.face_naked_edge_count(FaceId::new(0)).unwrap(), 2);
    }

    #[test]
    fn test_edge_queries() {
        let mesh = quad_grid();
        for (he, boundary) in mesh.edges() {
            let e = he.edge();
            let faces = mesh.edge_faces(e).unwrap();
            assert_eq!(faces.len(), if boundary { 1 } else { 2 });

            let (a, b) = mesh.edge_vertices(e).unwrap();
            assert_eq!(a, mesh.origin(he));
            assert_eq!(b, mesh.origin(he.pair()));
        }
    }

    #[test]
    fn test_face_center_and_polyline() {
        let mesh = single_quad();
        let f = FaceId::new(0);
        let c = mesh.face_center(f).unwrap();
        assert!((c - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-10);

        let poly = mesh.face_polyline(f).unwrap();
        assert_eq!(poly.len(), 5);
        assert_eq!(poly[0], poly[4]);
    }

    #[test]
    fn test_circumcenter_right_triangle() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2]]).unwrap();
        let c = mesh.face_circumcenter(FaceId::new(0)).unwrap();
        // Midpoint of the hypotenuse
        assert!((c - Point3::new(1.0, 1.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_circumcenter_collinear_falls_back() {
        let _ = env_logger::builder().is_test(true).try_init();
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_polygons(&vertices, &[[0, 1, 2, 3]]).unwrap();
        let f = FaceId::new(0);
        let c = mesh.face_circumcenter(f).unwrap();
        assert!((c - mesh.face_center(f).unwrap()).norm() < 1e-12);
    }

    #[test]
    fn test_cube_is_closed_with_unit_volume() {
        let mesh = unit_cube();
        assert!(mesh.is_closed());
        assert!((mesh.volume() - 1.0).abs() < 1e-10);
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.valence(v).unwrap(), 3);
        }
    }

    #[test]
    fn test_query_index_errors() {
        let mesh = single_quad();
        let err = mesh.valence(VertexId::new(10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
        assert!(matches!(
            mesh.face_center(FaceId::new(1)).unwrap_err(),
            MeshError::IndexOutOfRange { .. }
        ));
        assert_eq!(mesh.edge_faces(EdgeId::new(4)).unwrap_err().kind(), ErrorKind::Index);

        let err = mesh.vertex_neighbours_checked(VertexId::new(4)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Index);
        assert_eq!(
            mesh.vertex_neighbours_checked(VertexId::new(0)).unwrap(),
            mesh.vertex_neighbors(VertexId::new(0)).collect::<Vec<_>>()
        );
    }
}
