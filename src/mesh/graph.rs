//! Face-adjacency mesh data structure.
//!
//! This module provides an arena representation for triangle meshes that
//! tolerates the topology found in raw surface scans: border edges, edges
//! shared by more than two faces, and inconsistently oriented neighbours.
//!
//! # Structure
//!
//! - Each face stores its three vertices `[A, B, C]`
//! - Each face stores up to three **manifold neighbours**, one across each
//!   of its edges AB, BC and CA
//! - Neighbours across **non-manifold** edges are kept in a per-face overflow
//!   list instead, tagged with the local edge they share
//! - Each vertex stores a position and a scalar function value
//!
//! # Edge Naming
//!
//! Edge AB runs from corner A to corner B, BC from B to C and CA from C to A.
//! The corner opposite an edge is the one it does not touch.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// One of the three edges of a triangular face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeName {
    /// Edge from corner A to corner B.
    AB,
    /// Edge from corner B to corner C.
    BC,
    /// Edge from corner C to corner A.
    CA,
}

impl EdgeName {
    /// All three edges in face order.
    pub const ALL: [EdgeName; 3] = [EdgeName::AB, EdgeName::BC, EdgeName::CA];

    /// Local slot of this edge (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            EdgeName::AB => 0,
            EdgeName::BC => 1,
            EdgeName::CA => 2,
        }
    }

    /// Edge for a local slot, if it is in range.
    #[inline]
    pub fn from_index(index: usize) -> Option<EdgeName> {
        EdgeName::ALL.get(index).copied()
    }

    /// Local corner indices of the edge's start and end.
    #[inline]
    pub fn corners(self) -> (usize, usize) {
        match self {
            EdgeName::AB => (0, 1),
            EdgeName::BC => (1, 2),
            EdgeName::CA => (2, 0),
        }
    }

    /// Local corner index of the vertex opposite this edge.
    #[inline]
    pub fn opposite_corner(self) -> usize {
        match self {
            EdgeName::AB => 2,
            EdgeName::BC => 0,
            EdgeName::CA => 1,
        }
    }
}

/// A vertex of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Scalar function value attached to the vertex (e.g. curvature or an
    /// earlier distance field).
    pub func_value: f64,
}

impl Vertex {
    /// Create a new vertex at the given position with function value zero.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            func_value: 0.0,
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A triangular face with its adjacency.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    /// Corners A, B and C.
    pub vertices: [VertexId<I>; 3],

    /// Manifold neighbour across AB, BC and CA. Invalid on border and
    /// non-manifold edges.
    pub neighbours: [FaceId<I>; 3],

    /// Neighbours across non-manifold edges, tagged with the local edge.
    pub non_manifold: Vec<(EdgeName, FaceId<I>)>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face without any adjacency.
    pub fn new(vertices: [VertexId<I>; 3]) -> Self {
        Self {
            vertices,
            neighbours: [FaceId::invalid(); 3],
            non_manifold: Vec::new(),
        }
    }

    /// Local corner index of a vertex, if the face uses it.
    pub fn corner_of(&self, v: VertexId<I>) -> Option<usize> {
        self.vertices.iter().position(|&c| c == v)
    }
}

/// Triangle mesh stored as face and vertex arenas with face adjacency.
#[derive(Debug, Clone)]
pub struct MeshGraph<I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,

    /// Faces incident to each vertex, in ascending face order.
    pub(crate) vertex_faces: Vec<Vec<FaceId<I>>>,
}

impl<I: MeshIndex> Default for MeshGraph<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> MeshGraph<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            vertex_faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            faces: Vec::with_capacity(num_faces),
            vertex_faces: Vec::with_capacity(num_vertices),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Get the function value of a vertex.
    #[inline]
    pub fn func_value(&self, v: VertexId<I>) -> f64 {
        self.vertex(v).func_value
    }

    /// Set the function value of a vertex.
    #[inline]
    pub fn set_func_value(&mut self, v: VertexId<I>, value: f64) {
        self.vertices[v.index()].func_value = value;
    }

    /// Replace all function values at once.
    ///
    /// `values` must hold exactly one entry per vertex.
    pub fn set_function_values(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.vertices.len() {
            return Err(MeshError::invalid_param(
                "values.len()",
                values.len(),
                "must equal the number of vertices",
            ));
        }
        for (vertex, &value) in self.vertices.iter_mut().zip(values) {
            vertex.func_value = value;
        }
        Ok(())
    }

    /// Mean function value of a face's corners.
    pub fn face_func_value(&self, f: FaceId<I>) -> f64 {
        let [a, b, c] = self.face_triangle(f);
        (self.func_value(a) + self.func_value(b) + self.func_value(c)) / 3.0
    }

    // ==================== Topology Queries ====================

    /// Get the three vertices of a face.
    #[inline]
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.face(f).vertices
    }

    /// Get the start and end vertex of a face edge.
    #[inline]
    pub fn edge_vertices(&self, f: FaceId<I>, edge: EdgeName) -> (VertexId<I>, VertexId<I>) {
        let verts = self.face_triangle(f);
        let (a, b) = edge.corners();
        (verts[a], verts[b])
    }

    /// Get the vertex opposite a face edge.
    #[inline]
    pub fn opposite_vertex(&self, f: FaceId<I>, edge: EdgeName) -> VertexId<I> {
        self.face_triangle(f)[edge.opposite_corner()]
    }

    /// Manifold neighbour across an edge, `None` on border and non-manifold edges.
    #[inline]
    pub fn neighbour_face(&self, f: FaceId<I>, edge: EdgeName) -> Option<FaceId<I>> {
        let n = self.face(f).neighbours[edge.index()];
        n.is_valid().then_some(n)
    }

    /// Faces sharing a non-manifold edge with `f`.
    pub fn non_manifold_neighbours(
        &self,
        f: FaceId<I>,
        edge: EdgeName,
    ) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.face(f)
            .non_manifold
            .iter()
            .filter(move |(e, _)| *e == edge)
            .map(|&(_, n)| n)
    }

    /// Check if a face edge has no neighbour at all.
    pub fn is_border_edge(&self, f: FaceId<I>, edge: EdgeName) -> bool {
        self.neighbour_face(f, edge).is_none() && !self.is_non_manifold_edge(f, edge)
    }

    /// Check if a face edge is shared non-manifoldly.
    pub fn is_non_manifold_edge(&self, f: FaceId<I>, edge: EdgeName) -> bool {
        self.face(f).non_manifold.iter().any(|(e, _)| *e == edge)
    }

    /// Faces incident to a vertex, in ascending order.
    #[inline]
    pub fn vertex_faces(&self, v: VertexId<I>) -> &[FaceId<I>] {
        &self.vertex_faces[v.index()]
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their IDs.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the distinct undirected edges as vertex pairs (smaller id first).
    pub fn edges(&self) -> Vec<(VertexId<I>, VertexId<I>)> {
        let mut edges: Vec<_> = self
            .faces
            .iter()
            .flat_map(|face| {
                EdgeName::ALL.into_iter().map(move |e| {
                    let (a, b) = e.corners();
                    let (u, v) = (face.vertices[a], face.vertices[b]);
                    if u < v {
                        (u, v)
                    } else {
                        (v, u)
                    }
                })
            })
            .collect();
        edges.sort();
        edges.dedup();
        edges
    }

    /// Count face edges shared non-manifoldly (each face side counted once).
    pub fn num_non_manifold_sides(&self) -> usize {
        self.faces
            .iter()
            .map(|f| {
                EdgeName::ALL
                    .iter()
                    .filter(|&&e| f.non_manifold.iter().any(|(n, _)| *n == e))
                    .count()
            })
            .sum()
    }

    // ==================== Geometry ====================

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Compute the unit normal of a face, zero for degenerate faces.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the center of gravity of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Compute the length of a face edge.
    pub fn edge_length(&self, f: FaceId<I>, edge: EdgeName) -> f64 {
        let (a, b) = self.edge_vertices(f, edge);
        (self.position(b) - self.position(a)).norm()
    }

    /// Euclidean distance between two vertices.
    pub fn vertex_distance(&self, a: VertexId<I>, b: VertexId<I>) -> f64 {
        (self.position(b) - self.position(a)).norm()
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Construction ====================

    /// Add a new isolated vertex and return its ID.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        self.vertex_faces.push(Vec::new());
        id
    }

    // ==================== Validation ====================

    /// Check if the adjacency is consistent.
    ///
    /// Manifold neighbours must point back at each other and share the
    /// edge's two vertices; non-manifold links must be symmetric.
    pub fn is_valid(&self) -> bool {
        for (fid, face) in self.faces() {
            for edge in EdgeName::ALL {
                let (a, b) = self.edge_vertices(fid, edge);
                if let Some(n) = self.neighbour_face(fid, edge) {
                    let other = self.face(n);
                    if other.corner_of(a).is_none() || other.corner_of(b).is_none() {
                        return false;
                    }
                    if !other.neighbours.contains(&fid) {
                        return false;
                    }
                }
            }
            for &(_, n) in &face.non_manifold {
                if !self.face(n).non_manifold.iter().any(|&(_, back)| back == fid) {
                    return false;
                }
            }
            for &v in &face.vertices {
                if !self.vertex_faces(v).contains(&fid) {
                    return false;
                }
            }
        }
        true
    }
}
