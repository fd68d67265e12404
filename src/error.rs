//! Error types for chiral.
//!
//! Build-time structural failures abort construction. Topological anomalies
//! found after construction are reported as [`Diagnostic`](crate::mesh::Diagnostic)
//! values by `Mesh::verify` instead; the variants here that describe such
//! anomalies are only returned by direct lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The flat triangle list does not hold whole triangles.
    #[error("triangle list has {len} indices, which is not a multiple of 3")]
    MalformedInput {
        /// Number of indices in the list.
        len: usize,
    },

    /// A triangle references a vertex index outside the mesh.
    #[error("triangle {triangle} references vertex {vertex}, but the mesh has {n_vertices} vertices")]
    InvalidIndex {
        /// The triangle index.
        triangle: usize,
        /// The offending vertex index.
        vertex: usize,
        /// Number of vertices in the mesh.
        n_vertices: usize,
    },

    /// A triangle repeats one of its vertices.
    #[error("triangle {triangle} is degenerate (has duplicate vertices)")]
    DegenerateTriangle {
        /// The triangle index.
        triangle: usize,
    },

    /// The mesh is too large for the chosen index type.
    #[error("{what} count {count} exceeds index capacity {capacity}")]
    IndexOverflow {
        /// Which element overflowed.
        what: &'static str,
        /// Requested element count.
        count: usize,
        /// Largest count the index type can address.
        capacity: usize,
    },

    /// Pairing was requested on an edge with three or more half-edges.
    #[error("edge {edge} has {count} half-edges; pairing is ambiguous")]
    AmbiguousPairing {
        /// The overdetermined edge index.
        edge: usize,
        /// Number of half-edges on the edge.
        count: usize,
    },

    /// A vertex has more than one outgoing half-edge on the same triangle.
    #[error("vertex {vertex} is attached {count} times to triangle {triangle}")]
    MultipleAttachment {
        /// The vertex index.
        vertex: usize,
        /// The triangle index.
        triangle: usize,
        /// Number of outgoing half-edges found on the triangle.
        count: usize,
    },

    /// Two vertices are recorded as adjacent but no half-edge joins them.
    #[error("vertices {a} and {b} are adjacent but share no half-edge")]
    Disconnected {
        /// First vertex index.
        a: usize,
        /// Second vertex index.
        b: usize,
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

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A triangle list file could not be parsed.
    #[error("failed to parse triangle list {path}: {message}")]
    Parse {
        /// The file path (empty when parsing from memory).
        path: PathBuf,
        /// Error message.
        message: String,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MeshError::MalformedInput { len: 7 };
        assert_eq!(
            err.to_string(),
            "triangle list has 7 indices, which is not a multiple of 3"
        );

        let err = MeshError::AmbiguousPairing { edge: 2, count: 3 };
        assert!(err.to_string().contains("ambiguous"));

        let err = MeshError::invalid_param("edge_lengths", 4, "expected one length per edge");
        assert_eq!(
            err.to_string(),
            "invalid parameter: edge_lengths = 4 (expected one length per edge)"
        );
    }
}
