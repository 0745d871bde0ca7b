//! Vertex truncation.
//!
//! Every corner of the mesh is cut off at parameter `t` along its edges. The
//! result has one vertex per primal half-edge `h`, placed at
//! `origin(h) + t * (dest(h) - origin(h))` and numbered like `h`.
//!
//! - a face of degree `d` becomes a `2d`-gon
//! - an interior vertex of valence `n` becomes an `n`-gon
//! - a boundary vertex of valence `n >= 3` becomes an `n`-gon whose closing
//!   edge lies on the new boundary; boundary vertices of valence 2 leave a
//!   plain cut corner

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Truncate all vertices of a mesh.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] unless `0 < t <= 0.5`
/// - [`MeshError::InvalidState`] if the mesh holds deleted elements
/// - [`MeshError::CapacityExceeded`] if the result does not fit the index type
///
/// # Example
/// ```
/// use subdmesh::prelude::*;
/// use subdmesh::algo::truncate::truncate_vertices;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
/// let tetra: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
///
/// let truncated = truncate_vertices(&tetra, 1.0 / 3.0).unwrap();
/// assert_eq!(truncated.num_vertices(), 12);
/// assert_eq!(truncated.num_faces(), 8);
/// ```
pub fn truncate_vertices<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, t: f64) -> Result<HalfEdgeMesh<I>> {
    if !(t > 0.0 && t <= 0.5) {
        return Err(MeshError::invalid_param("t", t, "must be in (0, 0.5]"));
    }
    mesh.ensure_compact("truncate_vertices")?;

    // One vertex per half-edge; edges are the primal edges plus one cut edge
    // per half-edge at most.
    let num_faces = mesh.num_faces() + mesh.num_vertices();
    HalfEdgeMesh::<I>::check_capacity(
        mesh.num_halfedges(),
        2 * (mesh.num_edges() + mesh.num_halfedges()),
        num_faces,
    )?;

    let mut result = HalfEdgeMesh::with_capacity(mesh.num_halfedges(), num_faces);
    for i in 0..mesh.num_halfedges() {
        let he = HalfEdgeId::new(i);
        let p = *mesh.position(mesh.origin(he));
        result.add_vertex(p + mesh.edge_vector(he) * t);
    }

    let cut = |he: HalfEdgeId<I>| VertexId::new(he.index());
    let mut polygon: Vec<VertexId<I>> = Vec::new();

    for f in mesh.face_ids() {
        polygon.clear();
        for he in mesh.face_halfedges(f) {
            polygon.push(cut(he));
            polygon.push(cut(he.pair()));
        }
        result.add_face(&polygon)?;
    }

    for v in mesh.vertex_ids() {
        polygon.clear();
        // Rotation starts at the boundary half-edge on boundary vertices, so
        // moving it to the end puts the open gap on the closing edge.
        polygon.extend(mesh.vertex_halfedges(v).map(cut));
        if mesh.is_boundary_vertex(v) {
            polygon.rotate_left(1);
        }
        if polygon.len() >= 3 {
            result.add_face(&polygon)?;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mesh::{build_from_quads, FaceId};
    use nalgebra::Point3;

    fn create_quad_cube() -> HalfEdgeMesh {
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

    fn quad_grid<I: MeshIndex>(n: usize) -> HalfEdgeMesh<I> {
        let mut vertices = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let i = y * (n + 1) + x;
                faces.push([i, i + 1, i + n + 2, i + n + 1]);
            }
        }
        build_from_quads(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_truncated_cube() {
        let cube = create_quad_cube();
        let result = truncate_vertices(&cube, 0.25).unwrap();

        assert_eq!(result.num_vertices(), 24);
        // 6 octagons + 8 triangles
        assert_eq!(result.num_faces(), 14);
        assert_eq!(result.num_edges(), 36);
        assert!(result.is_valid());
        assert!(result.is_closed());

        let mut degrees: Vec<usize> = result.face_ids().map(|f| result.face_degree(f)).collect();
        degrees.sort_unstable();
        assert_eq!(degrees, [vec![3; 8], vec![8; 6]].concat());
    }

    #[test]
    fn test_cut_points_lie_on_edges() {
        let cube = create_quad_cube();
        let t = 0.2;
        let result = truncate_vertices(&cube, t).unwrap();

        for he in cube.halfedge_ids() {
            let expected = *cube.position(cube.origin(he)) + cube.edge_vector(he) * t;
            let actual = result.position(VertexId::new(he.index()));
            assert!((actual - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn test_truncated_volume_shrinks() {
        let cube = create_quad_cube();
        let result = truncate_vertices(&cube, 0.5).unwrap();
        // Cuboctahedron from the unit cube: 1 - 8 * (1/48)
        assert!((result.volume() - 5.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_open_grid_caps() {
        let grid: HalfEdgeMesh = quad_grid(2);
        let result = truncate_vertices(&grid, 1.0 / 3.0).unwrap();
        assert!(result.is_valid());

        // 4 octagons, 1 interior cap (4-gon), 4 boundary edge caps (3-gons);
        // the 4 valence-2 corners get none.
        assert_eq!(result.num_faces(), 4 + 1 + 4);
        let octagons = result.face_ids().filter(|&f| result.face_degree(f) == 8).count();
        assert_eq!(octagons, 4);
        assert_eq!(result.face_degree(FaceId::new(4)), 3);
    }

    #[test]
    fn test_u16_result_too_large() {
        // 25920 half-edges fit u16; the truncated grid needs 77752.
        let grid: HalfEdgeMesh<u16> = quad_grid(80);
        let err = truncate_vertices(&grid, 0.25).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);

        let small: HalfEdgeMesh<u16> = quad_grid(10);
        assert!(truncate_vertices(&small, 0.25).unwrap().is_valid());
    }

    #[test]
    fn test_rejects_bad_parameter() {
        let cube = create_quad_cube();
        for t in [0.0, -0.1, 0.51, f64::NAN] {
            let err = truncate_vertices(&cube, t).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument);
        }
    }
}
