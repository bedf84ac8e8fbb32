//! Capability interface consumed by the geodesic engine.
//!
//! Any mesh that can answer these queries can be used for geodesic
//! estimation. [`MeshGraph`] implements it; callers with their own mesh
//! representation implement it for that instead of converting.

use nalgebra::{Point3, Vector3};

use super::graph::{EdgeName, MeshGraph};
use super::index::{FaceId, MeshIndex, VertexId};

/// Read-only topology and geometry queries on a triangle mesh.
pub trait MeshTopology<I: MeshIndex = u32> {
    /// Number of vertices. Vertex ids are `0..num_vertices()`.
    fn num_vertices(&self) -> usize;

    /// Number of faces. Face ids are `0..num_faces()`.
    fn num_faces(&self) -> usize;

    /// Corners A, B and C of a face.
    fn face_vertices(&self, face: FaceId<I>) -> [VertexId<I>; 3];

    /// Manifold neighbour across an edge.
    fn neighbour_face(&self, face: FaceId<I>, edge: EdgeName) -> Option<FaceId<I>>;

    /// Faces sharing a non-manifold edge with `face`.
    fn non_manifold_neighbours(&self, face: FaceId<I>, edge: EdgeName) -> Vec<FaceId<I>>;

    /// Faces incident to a vertex.
    fn vertex_faces(&self, vertex: VertexId<I>) -> Vec<FaceId<I>>;

    /// Position of a vertex.
    fn position(&self, vertex: VertexId<I>) -> Point3<f64>;

    /// Scalar function value of a vertex.
    fn func_value(&self, vertex: VertexId<I>) -> f64;

    /// Start and end vertex of a face edge.
    fn edge_vertices(&self, face: FaceId<I>, edge: EdgeName) -> (VertexId<I>, VertexId<I>) {
        let verts = self.face_vertices(face);
        let (a, b) = edge.corners();
        (verts[a], verts[b])
    }

    /// Vertex of `face` opposite `edge`.
    fn opposite_vertex(&self, face: FaceId<I>, edge: EdgeName) -> VertexId<I> {
        self.face_vertices(face)[edge.opposite_corner()]
    }

    /// Center of gravity of a face.
    fn center_of_gravity(&self, face: FaceId<I>) -> Point3<f64> {
        let [a, b, c] = self.face_vertices(face);
        let sum = self.position(a).coords + self.position(b).coords + self.position(c).coords;
        Point3::from(sum / 3.0)
    }

    /// Unit normal of a face, zero for degenerate faces.
    fn face_normal(&self, face: FaceId<I>) -> Vector3<f64> {
        let [a, b, c] = self.face_vertices(face);
        let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
        (pb - pa)
            .cross(&(pc - pa))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Mean function value of a face's corners.
    fn face_func_value(&self, face: FaceId<I>) -> f64 {
        let [a, b, c] = self.face_vertices(face);
        (self.func_value(a) + self.func_value(b) + self.func_value(c)) / 3.0
    }
}

impl<I: MeshIndex> MeshTopology<I> for MeshGraph<I> {
    #[inline]
    fn num_vertices(&self) -> usize {
        MeshGraph::num_vertices(self)
    }

    #[inline]
    fn num_faces(&self) -> usize {
        MeshGraph::num_faces(self)
    }

    #[inline]
    fn face_vertices(&self, face: FaceId<I>) -> [VertexId<I>; 3] {
        self.face_triangle(face)
    }

    #[inline]
    fn neighbour_face(&self, face: FaceId<I>, edge: EdgeName) -> Option<FaceId<I>> {
        MeshGraph::neighbour_face(self, face, edge)
    }

    fn non_manifold_neighbours(&self, face: FaceId<I>, edge: EdgeName) -> Vec<FaceId<I>> {
        MeshGraph::non_manifold_neighbours(self, face, edge).collect()
    }

    fn vertex_faces(&self, vertex: VertexId<I>) -> Vec<FaceId<I>> {
        MeshGraph::vertex_faces(self, vertex).to_vec()
    }

    #[inline]
    fn position(&self, vertex: VertexId<I>) -> Point3<f64> {
        *MeshGraph::position(self, vertex)
    }

    #[inline]
    fn func_value(&self, vertex: VertexId<I>) -> f64 {
        MeshGraph::func_value(self, vertex)
    }

    fn center_of_gravity(&self, face: FaceId<I>) -> Point3<f64> {
        self.face_centroid(face)
    }

    fn face_normal(&self, face: FaceId<I>) -> Vector3<f64> {
        MeshGraph::face_normal(self, face)
    }

    fn face_func_value(&self, face: FaceId<I>) -> f64 {
        MeshGraph::face_func_value(self, face)
    }
}
