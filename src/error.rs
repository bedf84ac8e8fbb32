//! Error types for geofront.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction and geodesic estimation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The seed set of a geodesic run is empty or references missing elements.
    #[error("invalid seed: {reason}")]
    InvalidSeed {
        /// Why the seed set was rejected.
        reason: String,
    },

    /// A triangle has no usable area or angle where one is required.
    #[error("degenerate geometry at face {face}: {reason}")]
    DegenerateGeometry {
        /// The face index.
        face: usize,
        /// What made the geometry unusable.
        reason: &'static str,
    },

    /// A vertex was queried that the geodesic front never reached.
    #[error("vertex {vertex} was not reached by the geodesic front")]
    NotReached {
        /// The vertex index.
        vertex: usize,
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

    /// Create an invalid seed error.
    pub fn invalid_seed(reason: impl Into<String>) -> Self {
        MeshError::InvalidSeed {
            reason: reason.into(),
        }
    }

    /// Whether the error only invalidates a single front edge rather than the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MeshError::DegenerateGeometry { .. })
    }
}
