//! Catmull-Clark subdivision for polygon meshes.

use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::SubdivideOptions;

/// Performs Catmull-Clark subdivision.
///
/// Returns a new mesh; the input is left untouched. With zero iterations the
/// result is a copy of the input.
///
/// # Vertex Rules
///
/// - **Face point**: center of the face vertices
/// - **Edge point**: `(p0 + p1 + fA + fB) / 4` for interior edges, the
///   midpoint for boundary edges and edges between two sharp vertices, and
///   the average of both for edges with exactly one sharp end
/// - **Vertex point**: `F / n² + R / n² + S (n - 2) / n` where:
///   - F = sum of adjacent face points
///   - R = sum of neighbour positions
///   - S = original position
///   - n = valence
///
/// Sharp vertices (boundary or pinned) keep their position.
///
/// # Errors
///
/// - an index error if a fixed vertex, edge or face does not exist
/// - [`MeshError::InvalidState`](crate::error::MeshError::InvalidState) if the
///   mesh holds deleted elements
/// - [`MeshError::CapacityExceeded`](crate::error::MeshError::CapacityExceeded)
///   if an iteration would outgrow the index type
pub fn catmull_clark<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> Result<HalfEdgeMesh<I>> {
    catmull_clark_with_progress(mesh, options, &Progress::none())
}

/// Catmull-Clark subdivision with progress reporting, once per iteration.
pub fn catmull_clark_with_progress<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<HalfEdgeMesh<I>> {
    let mut steps = CatmullClarkSteps::new(mesh, options)?;
    let total = options.iterations;

    progress.report(0, total, "Catmull-Clark subdivision");
    while steps.step()? {
        progress.report(steps.completed(), total, "Catmull-Clark subdivision");
    }

    Ok(steps.into_mesh())
}

/// Runs Catmull-Clark subdivision one iteration at a time.
///
/// As an iterator it yields the mesh after each iteration, so callers can
/// checkpoint intermediate levels or stop early. Sharp flags carry over from
/// one level to the next.
///
/// ```
/// use subdmesh::prelude::*;
/// use subdmesh::algo::subdivide::{CatmullClarkSteps, SubdivideOptions};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
///
/// let steps = CatmullClarkSteps::new(&mesh, &SubdivideOptions::new(3)).unwrap();
/// let face_counts: Vec<usize> = steps.map(|m| m.unwrap().num_faces()).collect();
/// assert_eq!(face_counts, vec![3, 12, 48]);
/// ```
#[derive(Debug, Clone)]
pub struct CatmullClarkSteps<I: MeshIndex = u32> {
    mesh: HalfEdgeMesh<I>,
    sharp: Vec<bool>,
    completed: usize,
    total: usize,
    parallel: bool,
}

impl<I: MeshIndex> CatmullClarkSteps<I> {
    /// Validate the options against the mesh and prepare the first iteration.
    pub fn new(mesh: &HalfEdgeMesh<I>, options: &SubdivideOptions) -> Result<Self> {
        mesh.ensure_compact("catmull_clark")?;

        let mut sharp: Vec<bool> = (0..mesh.num_vertices())
            .map(|i| mesh.is_boundary_vertex(VertexId::new(i)))
            .collect();

        for &vi in &options.fixed_vertices {
            let v = mesh.check_vertex(vi)?;
            sharp[v.index()] = true;
        }
        for &ei in &options.fixed_edges {
            let e = mesh.check_edge(ei)?;
            let he = e.halfedge();
            sharp[mesh.origin(he).index()] = true;
            sharp[mesh.dest(he).index()] = true;
        }
        for &fi in &options.fixed_faces {
            let f = mesh.check_face(fi)?;
            for v in mesh.face_vertices(f) {
                sharp[v.index()] = true;
            }
        }

        Ok(Self {
            mesh: mesh.clone(),
            sharp,
            completed: 0,
            total: options.iterations,
            parallel: options.parallel,
        })
    }

    /// Run the next iteration in place. Returns `false` once all are done.
    pub fn step(&mut self) -> Result<bool> {
        if self.completed >= self.total {
            return Ok(false);
        }

        let (mesh, sharp) = subdivide_once(&self.mesh, &self.sharp, self.parallel)?;
        self.mesh = mesh;
        self.sharp = sharp;
        self.completed += 1;

        debug!(
            "Catmull-Clark iteration {}/{}: {} vertices, {} faces",
            self.completed,
            self.total,
            self.mesh.num_vertices(),
            self.mesh.num_faces()
        );

        Ok(true)
    }

    /// Number of iterations run so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// The mesh after the last completed iteration.
    pub fn mesh(&self) -> &HalfEdgeMesh<I> {
        &self.mesh
    }

    /// Whether a vertex of the current mesh is kept in place.
    pub fn is_sharp(&self, v: VertexId<I>) -> bool {
        self.sharp.get(v.index()).copied().unwrap_or(false)
    }

    /// Take the mesh after the last completed iteration.
    pub fn into_mesh(self) -> HalfEdgeMesh<I> {
        self.mesh
    }
}

impl<I: MeshIndex> Iterator for CatmullClarkSteps<I> {
    type Item = Result<HalfEdgeMesh<I>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(true) => Some(Ok(self.mesh.clone())),
            Ok(false) => None,
            Err(e) => {
                // Stop after the first failure.
                self.total = self.completed;
                Some(Err(e))
            }
        }
    }
}

/// Evaluate `f` for every index, on the rayon pool when `parallel` is set.
fn map_indices<T, F>(n: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Perform one iteration. Returns the new mesh and its sharp flags.
fn subdivide_once<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    sharp: &[bool],
    parallel: bool,
) -> Result<(HalfEdgeMesh<I>, Vec<bool>)> {
    let num_vertices = mesh.num_vertices();
    let num_faces = mesh.num_faces();
    let num_edges = mesh.num_edges();

    // Every face of degree d becomes d quads with d new interior edges.
    let total_faces: usize = mesh.face_ids().map(|f| mesh.face_degree(f)).sum();
    HalfEdgeMesh::<I>::check_capacity(
        num_vertices + num_faces + num_edges,
        2 * (2 * num_edges + total_faces),
        total_faces,
    )?;

    // Step 1: face points
    let face_points: Vec<Point3<f64>> =
        map_indices(num_faces, parallel, |i| mesh.face_centroid(FaceId::new(i)));

    // Step 2: edge points with their sharp flags
    let edge_points: Vec<(Point3<f64>, bool)> = map_indices(num_edges, parallel, |i| {
        compute_edge_point(mesh, EdgeId::new(i), sharp, &face_points)
    });

    // Step 3: vertex points
    let vertex_points: Vec<Point3<f64>> = map_indices(num_vertices, parallel, |i| {
        compute_vertex_point(mesh, VertexId::new(i), sharp, &face_points)
    });

    // Step 4: connect
    let mut result =
        HalfEdgeMesh::with_capacity(num_vertices + num_faces + num_edges, total_faces);

    for &p in vertex_points.iter().chain(&face_points) {
        result.add_vertex(p);
    }
    for &(p, _) in &edge_points {
        result.add_vertex(p);
    }

    let edge_base = num_vertices + num_faces;
    let edge_vertex = |he: HalfEdgeId<I>| VertexId::new(edge_base + he.edge().index());

    let mut loop_halfedges: Vec<HalfEdgeId<I>> = Vec::new();
    for f in mesh.face_ids() {
        let center = VertexId::new(num_vertices + f.index());
        loop_halfedges.clear();
        loop_halfedges.extend(mesh.face_halfedges(f));

        let d = loop_halfedges.len();
        for j in 0..d {
            let h = loop_halfedges[j];
            let h_next = loop_halfedges[(j + 1) % d];
            result.add_face(&[
                center,
                edge_vertex(h),
                mesh.origin(h_next),
                edge_vertex(h_next),
            ])?;
        }
    }

    let mut next_sharp = Vec::with_capacity(result.num_vertices());
    next_sharp.extend_from_slice(sharp);
    next_sharp.resize(num_vertices + num_faces, false);
    next_sharp.extend(edge_points.iter().map(|&(_, s)| s));

    Ok((result, next_sharp))
}

/// Compute the edge point of an edge and whether it is sharp.
fn compute_edge_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    e: EdgeId<I>,
    sharp: &[bool],
    face_points: &[Point3<f64>],
) -> (Point3<f64>, bool) {
    let he = e.halfedge();
    let v0 = mesh.origin(he);
    let v1 = mesh.dest(he);
    let p0 = mesh.position(v0).coords;
    let p1 = mesh.position(v1).coords;
    let midpoint = (p0 + p1) * 0.5;

    let faces = (mesh.face_of(he).valid(), mesh.face_of(he.pair()).valid());
    let (Some(fa), Some(fb)) = faces else {
        return (Point3::from(midpoint), true);
    };

    let (fa, fb) = (face_points[fa.index()].coords, face_points[fb.index()].coords);
    let smooth = (p0 + p1 + fa + fb) * 0.25;

    match (sharp[v0.index()], sharp[v1.index()]) {
        (true, true) => (Point3::from(midpoint), true),
        (true, false) | (false, true) => (Point3::from(midpoint * 0.5 + smooth * 0.5), false),
        (false, false) => (Point3::from(smooth), false),
    }
}

/// Compute the updated position of an original vertex.
fn compute_vertex_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    sharp: &[bool],
    face_points: &[Point3<f64>],
) -> Point3<f64> {
    let pos = *mesh.position(v);
    if sharp[v.index()] {
        return pos;
    }

    let mut valence = 0usize;
    let mut face_sum = Vector3::zeros();
    let mut neighbour_sum = Vector3::zeros();
    for he in mesh.vertex_halfedges(v) {
        valence += 1;
        if let Some(f) = mesh.face_of(he).valid() {
            face_sum += face_points[f.index()].coords;
        }
        neighbour_sum += mesh.position(mesh.dest(he)).coords;
    }

    // Isolated vertex
    if valence == 0 {
        return pos;
    }

    let n = valence as f64;
    Point3::from((face_sum + neighbour_sum) / (n * n) + pos.coords * ((n - 2.0) / n))
}
