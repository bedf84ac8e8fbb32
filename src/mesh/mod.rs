//! Core mesh data structures.
//!
//! This module provides the face-adjacency mesh used by the geodesic engine
//! and the [`MeshTopology`] trait through which the engine reads any mesh.
//!
//! # Overview
//!
//! [`MeshGraph`] stores vertices and triangular faces in arenas addressed by
//! stable integer ids. Every face knows its manifold neighbour across each of
//! its three edges (AB, BC, CA) and keeps neighbours across non-manifold
//! edges in an overflow list, so raw scan data can be loaded without repair.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a face
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use geofront::mesh::{build_from_triangles, MeshGraph};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: MeshGraph = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod graph;
mod index;
mod topology;

pub use builder::{build_from_triangles, build_with_function_values, to_face_vertex};
pub use graph::{EdgeName, Face, MeshGraph, Vertex};
pub use index::{FaceId, MeshIndex, VertexId};
pub use topology::MeshTopology;
