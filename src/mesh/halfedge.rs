//! Half-edge mesh data structure.
//!
//! This module provides the topology store: flat arrays of vertices,
//! half-edges and faces addressed by typed handles.
//!
//! # Structure
//!
//! - Each undirected edge is two **half-edges** allocated together at indices
//!   `2k` and `2k + 1`, so the **pair** of a half-edge is `h ^ 1`
//! - Each half-edge knows its **origin** vertex, its **face** (none on a
//!   boundary), and the **next**/**prev** half-edges of its loop
//! - Each vertex stores one outgoing half-edge
//! - Each face stores the first half-edge of its loop
//!
//! # Boundary Handling
//!
//! Boundary half-edges have no face and are linked into boundary loops through
//! `next`/`prev`, so every vertex can be circulated the same way. A boundary
//! vertex always stores a boundary half-edge as its outgoing half-edge.
//!
//! # Deletion
//!
//! Deleted elements stay in place as tombstones until
//! [`HalfEdgeMesh::compact`] reclaims them. Iteration helpers skip tombstones;
//! the `num_*` counters report slots, including tombstones.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{Element, MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge, or none for an isolated vertex.
    /// For boundary vertices this is a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) removed: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            removed: false,
        }
    }

    /// Create an isolated vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Whether this vertex has been deleted.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge starts at.
    pub origin: VertexId<I>,

    /// The next half-edge around the face (or boundary loop).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face (or boundary loop).
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to. None on a boundary.
    pub face: FaceId<I>,

    pub(crate) removed: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create an unlinked half-edge starting at `origin`.
    pub fn new(origin: VertexId<I>) -> Self {
        Self {
            origin,
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            removed: false,
        }
    }

    /// Whether this half-edge has no face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }

    /// Whether this half-edge has been deleted.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// The first half-edge of the face loop.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) removed: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face starting at the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            removed: false,
        }
    }

    /// Whether this face has been deleted.
    #[inline]
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A half-edge mesh of arbitrary polygons.
///
/// The mesh owns its index space. Operators that derive a new mesh copy
/// positions and rebuild topology instead of sharing indices.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Quads dominate here; on a closed quad mesh HE = 4F.
        let num_halfedges = num_faces * 4 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    /// Check that a mesh with the given slot counts is addressable with `I`.
    ///
    /// Operators call this before building their output, since handles are
    /// created with [`MeshIndex::from_usize`] and do not check their range.
    ///
    /// # Errors
    ///
    /// [`MeshError::CapacityExceeded`] naming the first element kind that
    /// does not fit.
    pub fn check_capacity(
        num_vertices: usize,
        num_halfedges: usize,
        num_faces: usize,
    ) -> Result<()> {
        let max = I::MAX.to_usize().saturating_add(1);
        for (element, required) in [
            (Element::Vertex, num_vertices),
            (Element::HalfEdge, num_halfedges),
            (Element::Face, num_faces),
        ] {
            if required > max {
                return Err(MeshError::CapacityExceeded {
                    element,
                    required,
                    max,
                });
            }
        }
        Ok(())
    }

    // ==================== Accessors ====================

    /// Number of vertex slots, including removed ones.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edge slots, including removed ones.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edge slots.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.halfedges.len() / 2
    }

    /// Number of face slots, including removed ones.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex. Topology is unaffected.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Topology Queries ====================

    /// The opposite half-edge.
    #[inline]
    pub fn pair(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        he.pair()
    }

    /// The next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// The previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// The start vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// The end vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(he.pair())
    }

    /// The face of a half-edge (none on a boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Whether a half-edge has no face.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Whether an edge (given by either half-edge) has a side without face.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(he) || self.is_boundary_halfedge(he.pair())
    }

    /// Whether a vertex starts a half-edge whose pair has no face.
    ///
    /// Isolated vertices have no incident edge and are not boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex_halfedges(v)
            .any(|he| self.is_boundary_halfedge(he.pair()))
    }

    /// Whether a vertex has no incident edge.
    #[inline]
    pub fn is_isolated(&self, v: VertexId<I>) -> bool {
        !self.vertex(v).halfedge.is_valid()
    }

    /// Whether a new face may be attached at this vertex.
    #[inline]
    fn is_open_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    /// Find the half-edge going from `from` to `to`, if any.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.dest(he) == to)
    }

    // ==================== Iteration ====================

    /// Iterate over live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over live vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.removed)
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.removed)
            .map(|(i, _)| HalfEdgeId::new(i))
    }

    /// Iterate over live undirected edges.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.num_edges())
            .map(EdgeId::new)
            .filter(|e: &EdgeId<I>| !self.halfedge(e.halfedge()).removed)
    }

    /// Iterate over live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.removed)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over outgoing half-edges of a vertex.
    ///
    /// The rotation is `h -> pair(prev(h))`, counter-clockwise for
    /// counter-clockwise faces. It starts at the stored outgoing half-edge, so
    /// on a boundary vertex the boundary half-edge comes first.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over the one-ring of a vertex, in rotation order.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over half-edges around a face, starting at its first half-edge.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Number of vertices of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    // ==================== Geometry ====================

    /// The vector from origin to destination of a half-edge.
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        self.position(self.dest(he)) - self.position(self.origin(he))
    }

    /// The midpoint of an edge.
    pub fn edge_midpoint(&self, he: HalfEdgeId<I>) -> Point3<f64> {
        let p0 = self.position(self.origin(he));
        let p1 = self.position(self.dest(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    // ==================== Checked Handles ====================

    /// Validate a raw vertex index.
    pub fn check_vertex(&self, index: usize) -> Result<VertexId<I>> {
        match self.vertices.get(index) {
            None => Err(MeshError::out_of_range(
                Element::Vertex,
                index,
                self.vertices.len(),
            )),
            Some(v) if v.removed => Err(MeshError::RemovedElement {
                element: Element::Vertex,
                index,
            }),
            Some(_) => Ok(VertexId::new(index)),
        }
    }

    /// Validate a raw half-edge index.
    pub fn check_halfedge(&self, index: usize) -> Result<HalfEdgeId<I>> {
        match self.halfedges.get(index) {
            None => Err(MeshError::out_of_range(
                Element::HalfEdge,
                index,
                self.halfedges.len(),
            )),
            Some(he) if he.removed => Err(MeshError::RemovedElement {
                element: Element::HalfEdge,
                index,
            }),
            Some(_) => Ok(HalfEdgeId::new(index)),
        }
    }

    /// Validate a raw edge index.
    pub fn check_edge(&self, index: usize) -> Result<EdgeId<I>> {
        if index >= self.num_edges() {
            return Err(MeshError::out_of_range(Element::Edge, index, self.num_edges()));
        }
        let e = EdgeId::new(index);
        if self.halfedge(e.halfedge()).removed {
            return Err(MeshError::RemovedElement {
                element: Element::Edge,
                index,
            });
        }
        Ok(e)
    }

    /// Validate a raw face index.
    pub fn check_face(&self, index: usize) -> Result<FaceId<I>> {
        match self.faces.get(index) {
            None => Err(MeshError::out_of_range(Element::Face, index, self.faces.len())),
            Some(f) if f.removed => Err(MeshError::RemovedElement {
                element: Element::Face,
                index,
            }),
            Some(_) => Ok(FaceId::new(index)),
        }
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    ///
    /// The vertex count must stay within the index type; see
    /// [`HalfEdgeMesh::check_capacity`].
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Add a face given its vertex loop.
    ///
    /// Existing boundary half-edges between consecutive vertices are reused;
    /// missing edges are allocated as half-edge pairs. The face's first
    /// half-edge is the one leaving `vertices[0]`.
    ///
    /// # Errors
    ///
    /// - [`MeshError::DegenerateFace`] if fewer than 3 vertices are given or a
    ///   vertex repeats
    /// - an index error for unknown or removed vertices
    /// - [`MeshError::NonManifoldEdge`] if a consecutive pair is already
    ///   connected by a half-edge that has a face
    /// - [`MeshError::NonManifoldVertex`] if a vertex is already surrounded by
    ///   faces or its fan cannot be re-linked
    /// - [`MeshError::CapacityExceeded`] if the new half-edges or the face
    ///   would not be addressable with `I`
    ///
    /// On error the mesh is left unchanged.
    pub fn add_face(&mut self, vertices: &[VertexId<I>]) -> Result<FaceId<I>> {
        let n = vertices.len();
        let raw = || vertices.iter().map(|v| v.index()).collect::<Vec<_>>();

        if n < 3 {
            return Err(MeshError::DegenerateFace {
                vertices: raw(),
                reason: "fewer than 3 vertices",
            });
        }
        for &v in vertices {
            self.check_vertex(v.index())?;
        }
        for i in 0..n {
            if vertices[i + 1..].contains(&vertices[i]) {
                return Err(MeshError::DegenerateFace {
                    vertices: raw(),
                    reason: "repeated vertex",
                });
            }
        }

        // Look up existing inner half-edges before touching any link.
        let mut inner: Vec<Option<HalfEdgeId<I>>> = Vec::with_capacity(n);
        for i in 0..n {
            let (v0, v1) = (vertices[i], vertices[(i + 1) % n]);
            if !self.is_open_vertex(v0) {
                return Err(MeshError::NonManifoldVertex { vertex: v0.index() });
            }
            let he = self.find_halfedge(v0, v1);
            if let Some(he) = he {
                if !self.is_boundary_halfedge(he) {
                    return Err(MeshError::NonManifoldEdge {
                        v0: v0.index(),
                        v1: v1.index(),
                    });
                }
            }
            inner.push(he);
        }

        let missing = inner.iter().filter(|he| he.is_none()).count();
        Self::check_capacity(
            self.vertices.len(),
            self.halfedges.len() + 2 * missing,
            self.faces.len() + 1,
        )?;

        // Re-link fan patches so consecutive existing half-edges follow each
        // other. This is the only step that can still fail, so keep a copy.
        let mut backup: Option<Vec<HalfEdge<I>>> = None;
        for i in 0..n {
            let ii = (i + 1) % n;
            let (Some(inner_prev), Some(inner_next)) = (inner[i], inner[ii]) else {
                continue;
            };
            if self.next(inner_prev) == inner_next {
                continue;
            }
            if backup.is_none() {
                backup = Some(self.halfedges.clone());
            }

            match self.find_free_gap(inner_prev, inner_next) {
                Some((boundary_prev, boundary_next)) => {
                    let patch_start = self.next(inner_prev);
                    let patch_end = self.prev(inner_next);
                    self.set_next(boundary_prev, patch_start);
                    self.set_next(patch_end, boundary_next);
                    self.set_next(inner_prev, inner_next);
                }
                None => {
                    if let Some(halfedges) = backup {
                        self.halfedges = halfedges;
                    }
                    return Err(MeshError::NonManifoldVertex {
                        vertex: vertices[ii].index(),
                    });
                }
            }
        }

        // Allocate missing edges.
        let mut is_new = vec![false; n];
        let inner: Vec<HalfEdgeId<I>> = inner
            .iter()
            .enumerate()
            .map(|(i, he)| {
                he.unwrap_or_else(|| {
                    is_new[i] = true;
                    self.new_edge(vertices[i], vertices[(i + 1) % n])
                })
            })
            .collect();

        let face_id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(inner[0]));

        let mut next_cache: Vec<(HalfEdgeId<I>, HalfEdgeId<I>)> = Vec::with_capacity(3 * n);
        let mut needs_adjust = vec![false; n];

        for i in 0..n {
            let ii = (i + 1) % n;
            let vh = vertices[ii];
            let inner_prev = inner[i];
            let inner_next = inner[ii];

            match (is_new[i], is_new[ii]) {
                (false, false) => {
                    needs_adjust[ii] = self.vertex(vh).halfedge == inner_next;
                }
                (true, false) => {
                    let outer_next = inner_prev.pair();
                    let boundary_prev = self.prev(inner_next);
                    next_cache.push((boundary_prev, outer_next));
                    self.vertex_mut(vh).halfedge = outer_next;
                }
                (false, true) => {
                    let outer_prev = inner_next.pair();
                    let boundary_next = self.next(inner_prev);
                    next_cache.push((outer_prev, boundary_next));
                    self.vertex_mut(vh).halfedge = boundary_next;
                }
                (true, true) => {
                    let outer_prev = inner_next.pair();
                    let outer_next = inner_prev.pair();
                    let boundary_next = self.vertex(vh).halfedge;
                    if boundary_next.is_valid() {
                        let boundary_prev = self.prev(boundary_next);
                        next_cache.push((boundary_prev, outer_next));
                        next_cache.push((outer_prev, boundary_next));
                    } else {
                        self.vertex_mut(vh).halfedge = outer_next;
                        next_cache.push((outer_prev, outer_next));
                    }
                }
            }

            if is_new[i] || is_new[ii] {
                next_cache.push((inner_prev, inner_next));
            }
            self.halfedge_mut(inner_prev).face = face_id;
        }

        for (a, b) in next_cache {
            self.set_next(a, b);
        }

        for (i, &v) in vertices.iter().enumerate() {
            if needs_adjust[i] {
                self.adjust_outgoing_halfedge(v);
            }
        }

        Ok(face_id)
    }

    /// Find the boundary gap at `dest(inner_prev)` where the patch currently
    /// between `inner_prev` and `inner_next` can be moved to.
    fn find_free_gap(
        &self,
        inner_prev: HalfEdgeId<I>,
        inner_next: HalfEdgeId<I>,
    ) -> Option<(HalfEdgeId<I>, HalfEdgeId<I>)> {
        let mut boundary_prev = inner_next.pair();
        for _ in 0..self.halfedges.len() {
            boundary_prev = self.next(boundary_prev).pair();
            if self.is_boundary_halfedge(boundary_prev) && boundary_prev != inner_prev {
                let boundary_next = self.next(boundary_prev);
                return (boundary_next != inner_next).then_some((boundary_prev, boundary_next));
            }
        }
        None
    }

    /// Push an unlinked half-edge pair and return the half-edge `from -> to`.
    fn new_edge(&mut self, from: VertexId<I>, to: VertexId<I>) -> HalfEdgeId<I> {
        let he = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge::new(from));
        self.halfedges.push(HalfEdge::new(to));
        he
    }

    /// Link `a -> b` in both directions.
    #[inline]
    pub(crate) fn set_next(&mut self, a: HalfEdgeId<I>, b: HalfEdgeId<I>) {
        self.halfedge_mut(a).next = b;
        self.halfedge_mut(b).prev = a;
    }

    /// Point a vertex at a boundary outgoing half-edge if it has one.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VertexId<I>) {
        if let Some(he) = self
            .vertex_halfedges(v)
            .find(|&he| self.is_boundary_halfedge(he))
        {
            self.vertex_mut(v).halfedge = he;
        }
    }

    // ==================== Validation ====================

    /// Whether the mesh holds no removed elements.
    pub fn is_compact(&self) -> bool {
        self.vertices.iter().all(|v| !v.removed)
            && self.halfedges.iter().all(|he| !he.removed)
            && self.faces.iter().all(|f| !f.removed)
    }

    /// Fail with [`MeshError::InvalidState`] unless the mesh is compact.
    pub(crate) fn ensure_compact(&self, operation: &str) -> Result<()> {
        if self.is_compact() {
            Ok(())
        } else {
            Err(MeshError::InvalidState(format!(
                "{} needs a compact mesh; call compact() after deleting elements",
                operation
            )))
        }
    }

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        if self.halfedges.len() % 2 != 0 {
            return false;
        }

        for (vid, v) in self.vertices() {
            if v.halfedge.is_valid() {
                let Some(he) = self.halfedges.get(v.halfedge.index()) else {
                    return false;
                };
                if he.removed || he.origin != vid {
                    return false;
                }
            }
        }

        let nh = self.halfedges.len();
        for (heid, he) in self.halfedges() {
            let pair = self.halfedge(heid.pair());
            if pair.removed || pair.origin == he.origin {
                return false;
            }
            if !he.origin.is_valid() || he.origin.index() >= self.vertices.len() {
                return false;
            }
            if he.next.index() >= nh || he.prev.index() >= nh {
                return false;
            }
            let next = self.halfedge(he.next);
            if next.removed || next.prev != heid || next.face != he.face {
                return false;
            }
            if self.halfedge(he.prev).next != heid {
                return false;
            }
            if next.origin != pair.origin {
                return false;
            }
            if he.face.is_valid()
                && (he.face.index() >= self.faces.len() || self.face(he.face).removed)
            {
                return false;
            }
        }

        for (fid, f) in self.faces_with_ids() {
            if !f.halfedge.is_valid() || f.halfedge.index() >= nh {
                return false;
            }
            let mut he = f.halfedge;
            let mut steps = 0;
            loop {
                if self.face_of(he) != fid {
                    return false;
                }
                he = self.next(he);
                steps += 1;
                if he == f.halfedge {
                    break;
                }
                if steps > nh {
                    return false;
                }
            }
            if steps < 3 {
                return false;
            }
        }

        true
    }

    /// Iterate over live half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, he)| !he.removed)
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over live faces with their IDs.
    pub fn faces_with_ids(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.removed)
            .map(|(i, f)| (FaceId::new(i), f))
    }
}

/// Iterator over outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // prev(h) ends at the vertex, so its pair leaves it again.
        self.current = self.mesh.prev(self.current).pair();

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
