//! Mesh operators.
//!
//! Every operator reads a compact [`HalfEdgeMesh`](crate::mesh::HalfEdgeMesh)
//! and returns a new one; inputs are never modified.
//!
//! - **Subdivision**: Catmull-Clark with pinned vertices, edges and faces
//! - **Dual**: face/vertex swap with barycentric or circumcentric dual vertices
//! - **Truncation**: cut every corner at a fraction of its edges
//! - **Window frames**: inset quad rings around selected faces

pub mod dual;
pub mod frame;
pub mod progress;
pub mod subdivide;
pub mod truncate;

pub use progress::Progress;
