//! Window frames: inset rings of quads around selected faces.
//!
//! Each selected face is replaced by one quad per side, connecting the face
//! outline to an inner ring of points. The inner ring is pulled towards the
//! face center by a thickness ratio and optionally pushed along the face
//! normal. With `cap` set, the opening is closed by a copy of the face on the
//! inner ring.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// Options for [`window_frame`].
#[derive(Debug, Clone)]
pub struct FrameOptions {
    /// Indices of the faces to frame.
    pub faces: Vec<usize>,

    /// Thickness ratio per selected face, in selection order.
    /// `0` keeps the inner ring on the outline, `1` collapses it to the center.
    /// Faces past the end of the list use the last entry.
    pub thickness: Vec<f64>,

    /// Extrusion length per selected face, in selection order.
    /// Faces past the end of the list use the last entry.
    pub extrude: Vec<f64>,

    /// Whether to close the opening with an inner face.
    pub cap: bool,
}

impl FrameOptions {
    /// Frame the given faces with thickness ratio 0.2, no extrusion, no cap.
    pub fn new(faces: impl IntoIterator<Item = usize>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            thickness: vec![0.2],
            extrude: vec![0.0],
            cap: false,
        }
    }

    /// Set the thickness ratios.
    pub fn with_thickness(mut self, thickness: impl IntoIterator<Item = f64>) -> Self {
        self.thickness = thickness.into_iter().collect();
        self
    }

    /// Set the extrusion lengths.
    pub fn with_extrude(mut self, extrude: impl IntoIterator<Item = f64>) -> Self {
        self.extrude = extrude.into_iter().collect();
        self
    }

    /// Set whether to cap the opening.
    pub fn with_cap(mut self, cap: bool) -> Self {
        self.cap = cap;
        self
    }
}

/// Entry `k` of a per-face list, or the last entry past its end.
fn nth_or_last(values: &[f64], k: usize) -> f64 {
    values.get(k).or(values.last()).copied().unwrap_or_default()
}

/// Insert window frames into the selected faces.
///
/// Original vertices keep their indices; the inner rings follow, face by face
/// in face order. Unselected faces are copied unchanged.
///
/// # Errors
///
/// - an index error if a selected face does not exist
/// - [`MeshError::InvalidParameter`] if the thickness or extrude list is empty
/// - [`MeshError::InvalidState`] if the mesh holds deleted elements
/// - [`MeshError::CapacityExceeded`] if the result does not fit the index type
pub fn window_frame<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &FrameOptions,
) -> Result<HalfEdgeMesh<I>> {
    mesh.ensure_compact("window_frame")?;
    if options.thickness.is_empty() {
        return Err(MeshError::invalid_param("thickness", "[]", "needs at least one value"));
    }
    if options.extrude.is_empty() {
        return Err(MeshError::invalid_param("extrude", "[]", "needs at least one value"));
    }

    // Selection slot of each face; the first occurrence wins.
    let mut slot: Vec<Option<usize>> = vec![None; mesh.num_faces()];
    for (k, &fi) in options.faces.iter().enumerate() {
        let f = mesh.check_face(fi)?;
        slot[f.index()].get_or_insert(k);
    }

    // Each selected face of degree d adds d ring vertices, d quads and 2d
    // edges, and gives up itself unless capped.
    let (mut selected, mut ring_size) = (0, 0);
    for f in mesh.face_ids().filter(|f| slot[f.index()].is_some()) {
        selected += 1;
        ring_size += mesh.face_degree(f);
    }
    let capped = if options.cap { selected } else { 0 };
    HalfEdgeMesh::<I>::check_capacity(
        mesh.num_vertices() + ring_size,
        2 * (mesh.num_edges() + 2 * ring_size),
        mesh.num_faces() - selected + ring_size + capped,
    )?;

    let mut result = HalfEdgeMesh::with_capacity(mesh.num_vertices(), mesh.num_faces());
    for (_, v) in mesh.vertices() {
        result.add_vertex(v.position);
    }

    let mut rings: Vec<Vec<VertexId<I>>> = vec![Vec::new(); mesh.num_faces()];
    for f in mesh.face_ids() {
        let Some(k) = slot[f.index()] else {
            continue;
        };
        let thickness = nth_or_last(&options.thickness, k);
        let extrude = nth_or_last(&options.extrude, k);
        rings[f.index()] = inner_ring(mesh, f, thickness, extrude)
            .into_iter()
            .map(|p| result.add_vertex(p))
            .collect();
    }

    let mut corners: Vec<VertexId<I>> = Vec::new();
    for f in mesh.face_ids() {
        corners.clear();
        corners.extend(mesh.face_vertices(f));

        let ring = &rings[f.index()];
        if slot[f.index()].is_none() {
            result.add_face(&corners)?;
            continue;
        }

        let n = corners.len();
        for i in 0..n {
            let j = (i + 1) % n;
            result.add_face(&[corners[i], corners[j], ring[j], ring[i]])?;
        }
        if options.cap {
            result.add_face(ring)?;
        }
    }

    Ok(result)
}

/// Inner ring points of a face: `v + (center - v) * thickness + n * extrude`.
fn inner_ring<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    f: FaceId<I>,
    thickness: f64,
    extrude: f64,
) -> Vec<Point3<f64>> {
    let center = mesh.face_centroid(f);
    let points: Vec<Point3<f64>> = mesh.face_vertices(f).map(|v| *mesh.position(v)).collect();

    (0..points.len())
        .map(|i| {
            let v = points[i];
            let v_next = points[(i + 1) % points.len()];
            let to_center = center - v;
            let normal = to_center
                .cross(&(v - v_next))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
            v + to_center * thickness + normal * extrude
        })
        .collect()
}
