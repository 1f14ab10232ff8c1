//! Error types for trackverts.
//!
//! This module defines all error types used throughout the library. Every
//! variant describes a validation failure detected before any point source
//! is written to, so callers can treat an `Err` as a no-op.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`VertexError`].
pub type Result<T> = std::result::Result<T, VertexError>;

/// Errors that can occur during vertex operations.
#[derive(Error, Debug)]
pub enum VertexError {
    /// The operation was given no points.
    #[error("no points to operate on")]
    EmptyInput,

    /// Not enough point-bearing sources (or points) to operate on.
    #[error("insufficient input: {sources} point-bearing source(s), {points} point(s)")]
    InsufficientInput {
        /// Number of sources that contain at least one point.
        sources: usize,
        /// Total number of points across all sources.
        points: usize,
    },

    /// The nearest-neighbor walk stopped before visiting every point.
    #[error("chain visited {visited} of {total} points (duplicate or centroid-coincident positions)")]
    DegenerateChain {
        /// Number of points placed in the chain.
        visited: usize,
        /// Number of input points.
        total: usize,
    },

    /// A vertex index is out of range for its source.
    #[error("vertex index {index} out of range for source with {len} vertices")]
    InvalidVertexIndex {
        /// The offending index.
        index: usize,
        /// Number of vertices in the source.
        len: usize,
    },

    /// A source index is out of range.
    #[error("source index {index} out of range ({len} sources)")]
    InvalidSource {
        /// The offending source index.
        index: usize,
        /// Number of sources.
        len: usize,
    },

    /// Fewer vertices than the operation requires.
    #[error("not enough vertices: {required} required, {found} found")]
    NotEnoughVertices {
        /// Minimum number of vertices.
        required: usize,
        /// Number of vertices available.
        found: usize,
    },

    /// The operation requires an exact vertex count.
    #[error("expected exactly {expected} vertices, found {found}")]
    WrongVertexCount {
        /// Required vertex count.
        expected: usize,
        /// Actual vertex count.
        found: usize,
    },

    /// The vertex is already listed or selected.
    #[error("vertex {index} appears more than once for '{object}'")]
    DuplicateVertex {
        /// Object the list belongs to.
        object: String,
        /// The duplicated vertex index.
        index: usize,
    },

    /// The per-object vertex list is at capacity.
    #[error("vertex list for '{object}' is full ({capacity} vertices)")]
    ListFull {
        /// Object the list belongs to.
        object: String,
        /// Capacity of the list.
        capacity: usize,
    },

    /// No vertices were selected.
    #[error("no vertices selected")]
    NoSelection,

    /// A path identifier does not exist in the path tree.
    #[error("path '{0}' not found")]
    PathNotFound(String),

    /// Invalid state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

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

    /// Error loading points from file.
    #[error("failed to load {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving points to file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl VertexError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        VertexError::InvalidParameter {
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
        let e = VertexError::InsufficientInput { sources: 1, points: 3 };
        assert_eq!(
            e.to_string(),
            "insufficient input: 1 point-bearing source(s), 3 point(s)"
        );

        let e = VertexError::invalid_param("threshold", -1.0, "must be non-negative");
        assert_eq!(
            e.to_string(),
            "invalid parameter: threshold = -1 (must be non-negative)"
        );
    }
}
