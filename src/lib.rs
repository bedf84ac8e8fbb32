//! # Geofront
//!
//! Approximate geodesic distances on triangulated surface scans.
//!
//! Geofront stores a triangle mesh as an arena of vertices and faces with
//! per-edge face adjacency, including edges shared by more than two faces,
//! and estimates along-surface distances from seed faces or vertices by
//! propagating a front of edges across the surface.
//!
//! ## Features
//!
//! - **Face adjacency graph**: O(1) neighbour queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Non-manifold aware**: Edges with three or more faces are kept apart
//!   from manifold adjacency and can optionally be crossed
//! - **Bounded runs**: An optional radius limits a run to a local patch
//! - **Parallel runs**: One independent run per seed with rayon
//!
//! ## Quick Start
//!
//! ```
//! use geofront::prelude::*;
//! use nalgebra::Point3;
//!
//! // A unit square made of two triangles
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2], [0, 2, 3]];
//! let mesh: MeshGraph = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // Distances from the first corner, at most 2 units away
//! let seeds = [SeedRef::Vertex(VertexId::new(0))];
//! let options = GeodesicOptions::default().with_radius(2.0);
//! let patch = estimate_geodesics(&mesh, &seeds, &options).unwrap();
//!
//! for (v, entry) in patch.iter() {
//!     println!("{:?}: distance={} angle={}", v, entry.distance(), entry.angle());
//! }
//! assert_eq!(patch.len(), 4);
//! ```
//!
//! ## Custom Meshes
//!
//! The propagator only reads the mesh through [`mesh::MeshTopology`].
//! Implement it for an existing mesh type to run geodesics without
//! converting to [`mesh::MeshGraph`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use geofront::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::geodesic::{
        estimate_geodesics, estimate_geodesics_per_seed, GeodesicEntry, GeodesicOptions,
        GeodesicPatch, GeodesicPropagator, PropagationState, SeedRef,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, build_with_function_values, to_face_vertex, EdgeName, Face,
        FaceId, MeshGraph, MeshIndex, MeshTopology, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
