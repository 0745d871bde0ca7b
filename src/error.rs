//! Error types for subdmesh.
//!
//! All fallible operations return [`MeshError`]. [`MeshError::kind`] groups the
//! variants into the broad categories callers usually branch on.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// The kind of mesh element an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// A vertex.
    Vertex,
    /// A half-edge.
    HalfEdge,
    /// An undirected edge (a pair of half-edges).
    Edge,
    /// A face.
    Face,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Element::Vertex => "vertex",
            Element::HalfEdge => "half-edge",
            Element::Edge => "edge",
            Element::Face => "face",
        };
        f.write_str(name)
    }
}

/// Broad classification of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An index outside the current range, or pointing at a removed element.
    Index,
    /// A face insertion that is degenerate or would break manifoldness.
    Topology,
    /// The half-edge pairing was broken before compaction.
    Invariant,
    /// An invalid parameter value.
    Argument,
    /// The mesh is not in a state the operation accepts.
    State,
    /// The result would not be addressable with the mesh's index type.
    Capacity,
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// An index is outside the valid range.
    #[error("{element} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// The kind of element.
        element: Element,
        /// The offending index.
        index: usize,
        /// The number of elements of that kind.
        len: usize,
    },

    /// An index refers to an element that has been deleted.
    #[error("{element} {index} has been removed")]
    RemovedElement {
        /// The kind of element.
        element: Element,
        /// The offending index.
        index: usize,
    },

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three vertices or repeats one.
    #[error("face {vertices:?} is degenerate ({reason})")]
    DegenerateFace {
        /// The vertex loop of the rejected face.
        vertices: Vec<usize>,
        /// Why the face was rejected.
        reason: &'static str,
    },

    /// The directed edge already has a face on this side.
    #[error("edge ({v0}, {v1}) already has a face on this side")]
    NonManifoldEdge {
        /// Start vertex of the directed edge.
        v0: usize,
        /// End vertex of the directed edge.
        v1: usize,
    },

    /// Adding the face would make the vertex non-manifold.
    #[error("vertex {vertex} cannot take another face without becoming non-manifold")]
    NonManifoldVertex {
        /// The vertex.
        vertex: usize,
    },

    /// A face of an input face list could not be inserted.
    #[error("face {face} could not be inserted: {source}")]
    FaceInsertion {
        /// Position of the face in the input list.
        face: usize,
        /// The underlying insertion error.
        #[source]
        source: Box<MeshError>,
    },

    /// The half-edge structure is broken in a way compaction cannot repair.
    #[error("mesh invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// More elements are needed than the index type can address.
    #[error("{required} {element} slots needed, index type holds at most {max}")]
    CapacityExceeded {
        /// The kind of element that overflows.
        element: Element,
        /// The number of slots the operation needs.
        required: usize,
        /// The number of slots the index type can address.
        max: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(element: Element, index: usize, len: usize) -> Self {
        MeshError::IndexOutOfRange {
            element,
            index,
            len,
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::IndexOutOfRange { .. }
            | MeshError::RemovedElement { .. }
            | MeshError::InvalidVertexIndex { .. } => ErrorKind::Index,
            MeshError::DegenerateFace { .. }
            | MeshError::NonManifoldEdge { .. }
            | MeshError::NonManifoldVertex { .. } => ErrorKind::Topology,
            MeshError::FaceInsertion { source, .. } => source.kind(),
            MeshError::InvariantViolation(_) => ErrorKind::Invariant,
            MeshError::InvalidParameter { .. } => ErrorKind::Argument,
            MeshError::InvalidState(_) => ErrorKind::State,
            MeshError::CapacityExceeded { .. } => ErrorKind::Capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_wrapped_insertion_error() {
        let err = MeshError::FaceInsertion {
            face: 3,
            source: Box::new(MeshError::NonManifoldEdge { v0: 1, v1: 2 }),
        };
        assert_eq!(err.kind(), ErrorKind::Topology);
        assert_eq!(
            err.to_string(),
            "face 3 could not be inserted: edge (1, 2) already has a face on this side"
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let err = MeshError::out_of_range(Element::Face, 7, 4);
        assert_eq!(err.kind(), ErrorKind::Index);
        assert_eq!(err.to_string(), "face index 7 out of range (len 4)");
    }

    #[test]
    fn test_capacity_message() {
        let err = MeshError::CapacityExceeded {
            element: Element::HalfEdge,
            required: 70000,
            max: 65535,
        };
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(
            err.to_string(),
            "70000 half-edge slots needed, index type holds at most 65535"
        );
    }

    #[test]
    fn test_invalid_param() {
        let err = MeshError::invalid_param("t", 0.75, "must be in (0, 0.5]");
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert!(err.to_string().contains("t = 0.75"));
    }
}
