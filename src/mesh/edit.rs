//! Element deletion and compaction.
//!
//! Deletion only marks elements as removed and re-links the surrounding
//! boundary loops, so handles of surviving elements stay stable.
//! [`HalfEdgeMesh::compact`] then drops the tombstones and renumbers.

use log::trace;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Delete a face.
    ///
    /// The face's half-edges become boundary half-edges. Edges left without a
    /// face on either side are deleted together with both halves. Vertices
    /// that lose their last edge are deleted too when
    /// `delete_isolated_vertices` is set, otherwise they stay as isolated
    /// vertices.
    pub fn delete_face(&mut self, f: FaceId<I>, delete_isolated_vertices: bool) -> Result<()> {
        self.check_face(f.index())?;

        let halfedges: Vec<HalfEdgeId<I>> = self.face_halfedges(f).collect();
        let mut corners: Vec<VertexId<I>> = Vec::with_capacity(halfedges.len());
        let mut naked: Vec<HalfEdgeId<I>> = Vec::new();

        for &he in &halfedges {
            self.halfedge_mut(he).face = FaceId::invalid();
            if self.is_boundary_halfedge(he.pair()) {
                naked.push(he);
            }
            corners.push(self.origin(he));
        }

        let face = self.face_mut(f);
        face.removed = true;
        face.halfedge = HalfEdgeId::invalid();

        for h0 in naked {
            let h1 = h0.pair();
            let v0 = self.dest(h0);
            let v1 = self.origin(h0);

            let next0 = self.next(h0);
            let prev0 = self.prev(h0);
            let next1 = self.next(h1);
            let prev1 = self.prev(h1);

            // Splice the edge out of both loops.
            self.set_next(prev0, next1);
            self.set_next(prev1, next0);

            self.halfedge_mut(h0).removed = true;
            self.halfedge_mut(h1).removed = true;

            if self.vertex(v0).halfedge == h1 {
                if next0 == h1 {
                    self.isolate_vertex(v0, delete_isolated_vertices);
                } else {
                    self.vertex_mut(v0).halfedge = next0;
                }
            }

            if self.vertex(v1).halfedge == h0 {
                if next1 == h0 {
                    self.isolate_vertex(v1, delete_isolated_vertices);
                } else {
                    self.vertex_mut(v1).halfedge = next1;
                }
            }
        }

        for v in corners {
            let vertex = self.vertex(v);
            if !vertex.removed && vertex.halfedge.is_valid() {
                self.adjust_outgoing_halfedge(v);
            }
        }

        Ok(())
    }

    /// Delete a vertex together with every face around it.
    ///
    /// Neighbouring vertices left without edges are deleted as well.
    pub fn delete_vertex(&mut self, v: VertexId<I>) -> Result<()> {
        self.check_vertex(v.index())?;

        let mut faces: Vec<FaceId<I>> = self
            .vertex_halfedges(v)
            .filter_map(|he| self.face_of(he).valid())
            .collect();
        faces.dedup();

        for f in faces {
            if !self.face(f).removed {
                self.delete_face(f, true)?;
            }
        }

        self.isolate_vertex(v, true);
        Ok(())
    }

    fn isolate_vertex(&mut self, v: VertexId<I>, remove: bool) {
        let vertex = self.vertex_mut(v);
        vertex.halfedge = HalfEdgeId::invalid();
        if remove {
            vertex.removed = true;
        }
    }

    /// Drop removed elements and renumber the survivors contiguously.
    ///
    /// Surviving elements keep their relative order; every stored reference
    /// is rewritten. A compact mesh is left as is.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvariantViolation`] if the surviving half-edges no longer
    /// come in pairs or reference removed elements. The mesh is not modified
    /// in that case.
    pub fn compact(&mut self) -> Result<()> {
        self.check_survivors()?;

        if self.is_compact() {
            return Ok(());
        }

        let vertex_map = survivor_map(self.vertices.iter().map(|v| v.removed));
        let halfedge_map = survivor_map(self.halfedges.iter().map(|he| he.removed));
        let face_map = survivor_map(self.faces.iter().map(|f| f.removed));

        let remap_v = |v: VertexId<I>| -> VertexId<I> {
            v.valid()
                .and_then(|v| vertex_map[v.index()])
                .map_or_else(VertexId::invalid, VertexId::new)
        };
        let remap_he = |he: HalfEdgeId<I>| -> HalfEdgeId<I> {
            he.valid()
                .and_then(|he| halfedge_map[he.index()])
                .map_or_else(HalfEdgeId::invalid, HalfEdgeId::new)
        };
        let remap_f = |f: FaceId<I>| -> FaceId<I> {
            f.valid()
                .and_then(|f| face_map[f.index()])
                .map_or_else(FaceId::invalid, FaceId::new)
        };

        let before = (self.vertices.len(), self.halfedges.len(), self.faces.len());

        self.vertices.retain(|v| !v.removed);
        for v in &mut self.vertices {
            v.halfedge = remap_he(v.halfedge);
        }

        self.halfedges.retain(|he| !he.removed);
        for he in &mut self.halfedges {
            he.origin = remap_v(he.origin);
            he.next = remap_he(he.next);
            he.prev = remap_he(he.prev);
            he.face = remap_f(he.face);
        }

        self.faces.retain(|f| !f.removed);
        for f in &mut self.faces {
            f.halfedge = remap_he(f.halfedge);
        }

        trace!(
            "compact: vertices {} -> {}, half-edges {} -> {}, faces {} -> {}",
            before.0,
            self.vertices.len(),
            before.1,
            self.halfedges.len(),
            before.2,
            self.faces.len()
        );

        Ok(())
    }

    /// Verify that the survivors of a compaction form a closed reference set.
    fn check_survivors(&self) -> Result<()> {
        let live_halfedges = self.halfedges.iter().filter(|he| !he.removed).count();
        if self.halfedges.len() % 2 != 0 || live_halfedges % 2 != 0 {
            return Err(MeshError::InvariantViolation(format!(
                "{} surviving half-edges out of {} cannot form pairs",
                live_halfedges,
                self.halfedges.len()
            )));
        }

        let vertex_alive =
            |v: VertexId<I>| self.vertices.get(v.index()).is_some_and(|v| !v.removed);
        let halfedge_alive =
            |he: HalfEdgeId<I>| self.halfedges.get(he.index()).is_some_and(|he| !he.removed);
        let face_alive = |f: FaceId<I>| self.faces.get(f.index()).is_some_and(|f| !f.removed);

        for (he, data) in self.halfedges() {
            if !halfedge_alive(he.pair()) {
                return Err(MeshError::InvariantViolation(format!(
                    "half-edge {} survives but its pair {} was removed",
                    he.index(),
                    he.pair().index()
                )));
            }
            if !vertex_alive(data.origin) {
                return Err(MeshError::InvariantViolation(format!(
                    "half-edge {} starts at removed vertex {:?}",
                    he.index(),
                    data.origin
                )));
            }
            if !halfedge_alive(data.next) || !halfedge_alive(data.prev) {
                return Err(MeshError::InvariantViolation(format!(
                    "half-edge {} links to a removed half-edge",
                    he.index()
                )));
            }
            if data.face.is_valid() && !face_alive(data.face) {
                return Err(MeshError::InvariantViolation(format!(
                    "half-edge {} belongs to removed face {}",
                    he.index(),
                    data.face.index()
                )));
            }
        }

        for (v, data) in self.vertices() {
            if data.halfedge.is_valid() && !halfedge_alive(data.halfedge) {
                return Err(MeshError::InvariantViolation(format!(
                    "vertex {} points at removed half-edge {}",
                    v.index(),
                    data.halfedge.index()
                )));
            }
        }

        for (f, data) in self.faces_with_ids() {
            if !halfedge_alive(data.halfedge) {
                return Err(MeshError::InvariantViolation(format!(
                    "face {} points at removed half-edge {:?}",
                    f.index(),
                    data.halfedge
                )));
            }
        }

        Ok(())
    }
}

/// Map each old slot to its new index, `None` for removed slots.
fn survivor_map(removed: impl Iterator<Item = bool>) -> Vec<Option<usize>> {
    let mut next = 0;
    removed
        .map(|gone| {
            if gone {
                None
            } else {
                next += 1;
                Some(next - 1)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mesh::{build_from_quads, HalfEdge};
    use nalgebra::Point3;

    fn quad_grid(n: usize) -> HalfEdgeMesh {
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
    fn test_delete_single_face_removes_everything() {
        let mut mesh = quad_grid(1);
        mesh.delete_face(FaceId::new(0), true).unwrap();

        assert!(mesh.vertex_ids().next().is_none());
        assert!(mesh.halfedge_ids().next().is_none());
        assert!(mesh.face_ids().next().is_none());
        assert!(!mesh.is_compact());

        mesh.compact().unwrap();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
    }

    #[test]
    fn test_delete_face_keeps_isolated_vertices() {
        let mut mesh = quad_grid(1);
        mesh.delete_face(FaceId::new(0), false).unwrap();
        mesh.compact().unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_halfedges(), 0);
        for v in mesh.vertex_ids() {
            assert!(mesh.is_isolated(v));
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_delete_face_in_grid() {
        let mut mesh = quad_grid(2);
        let (nv, nh, nf) = (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces());

        // Corner face: two of its edges become naked on both sides.
        mesh.delete_face(FaceId::new(0), true).unwrap();
        assert!(mesh.is_valid());

        mesh.compact().unwrap();
        assert!(mesh.is_valid());
        assert!(mesh.num_vertices() < nv);
        assert!(mesh.num_halfedges() < nh);
        assert!(mesh.num_faces() < nf);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 20);
        assert_eq!(mesh.num_faces(), 3);

        // The former corner's neighbours are on the boundary and point there.
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
            assert!(mesh.is_boundary_halfedge(mesh.vertex(v).halfedge));
        }
    }

    #[test]
    fn test_delete_interior_vertex() {
        let mut mesh = quad_grid(2);
        // Center vertex of the 3x3 vertex grid.
        mesh.delete_vertex(VertexId::new(4)).unwrap();
        assert!(mesh.is_valid());

        mesh.compact().unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_vertices(), 0);
    }

    #[test]
    fn test_delete_vertex_in_larger_grid() {
        let mut mesh = quad_grid(3);
        // Vertex (1, 1) touches faces 0, 1, 3, 4.
        mesh.delete_vertex(VertexId::new(5)).unwrap();
        mesh.compact().unwrap();

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_faces(), 5);
        // (0, 0), (1, 0), (0, 1) and (1, 1) lose every face.
        assert_eq!(mesh.num_vertices(), 12);
    }

    #[test]
    fn test_delete_removed_face_fails() {
        let mut mesh = quad_grid(2);
        mesh.delete_face(FaceId::new(3), true).unwrap();
        let err = mesh.delete_face(FaceId::new(3), true).unwrap_err();
        assert!(matches!(err, MeshError::RemovedElement { .. }));
    }

    #[test]
    fn test_compact_is_idempotent() {
        let mut mesh = quad_grid(2);
        mesh.compact().unwrap();
        assert_eq!(mesh.num_faces(), 4);

        mesh.delete_face(FaceId::new(1), true).unwrap();
        mesh.compact().unwrap();
        let counts = (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces());

        mesh.compact().unwrap();
        assert_eq!(counts, (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces()));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_compact_rejects_orphan_halfedge() {
        let mut mesh = quad_grid(1);
        mesh.halfedges[1].removed = true;

        let err = mesh.compact().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invariant);
        // Untouched on failure.
        assert_eq!(mesh.num_halfedges(), 8);
        assert!(mesh.halfedges[1].removed);
    }

    #[test]
    fn test_compact_rejects_odd_halfedge_count() {
        let mut mesh = quad_grid(1);
        mesh.halfedges.push(HalfEdge::new(VertexId::new(0)));

        let err = mesh.compact().unwrap_err();
        assert!(matches!(err, MeshError::InvariantViolation(_)));
        assert_eq!(mesh.num_halfedges(), 9);
    }
}
