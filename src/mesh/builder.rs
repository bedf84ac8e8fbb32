//! Mesh construction utilities.
//!
//! This module builds a [`MeshGraph`] from face-vertex lists as produced by
//! scan readers, deriving manifold and non-manifold face adjacency.

use std::collections::HashMap;

use nalgebra::Point3;

use super::graph::{EdgeName, Face, MeshGraph};
use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// One face side incident to an undirected edge.
#[derive(Debug, Clone, Copy)]
struct EdgeUse {
    face: usize,
    edge: EdgeName,
    /// True when the face traverses the edge from the smaller vertex id.
    forward: bool,
}

/// Build a mesh from vertices and triangle faces.
///
/// Two faces that traverse an edge in opposite directions become manifold
/// neighbours. Any other sharing (three or more faces, or two faces with the
/// same orientation) is recorded as non-manifold in each face's overflow list.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Example
/// ```
/// use geofront::mesh::{build_from_triangles, MeshGraph};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: MeshGraph = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<MeshGraph<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    for (name, count) in [("vertices", vertices.len()), ("faces", faces.len())] {
        if count > I::capacity() {
            return Err(MeshError::invalid_param(
                name,
                count,
                "too many for the chosen index type",
            ));
        }
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = MeshGraph::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.add_vertex(pos);
    }

    let mut edge_uses: HashMap<(usize, usize), Vec<EdgeUse>> = HashMap::new();

    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::<I>::new(fi);
        mesh.faces.push(Face::new([
            VertexId::new(face[0]),
            VertexId::new(face[1]),
            VertexId::new(face[2]),
        ]));
        for &vi in face {
            mesh.vertex_faces[vi].push(face_id);
        }

        for edge in EdgeName::ALL {
            let (a, b) = edge.corners();
            let (u, v) = (face[a], face[b]);
            let key = if u < v { (u, v) } else { (v, u) };
            edge_uses.entry(key).or_default().push(EdgeUse {
                face: fi,
                edge,
                forward: u < v,
            });
        }
    }

    // Each group is in ascending face order, so the links do not depend on
    // the map's iteration order.
    for uses in edge_uses.values() {
        match uses.as_slice() {
            [_] => {}
            [first, second] if first.forward != second.forward => {
                mesh.faces[first.face].neighbours[first.edge.index()] = FaceId::new(second.face);
                mesh.faces[second.face].neighbours[second.edge.index()] = FaceId::new(first.face);
            }
            _ => link_non_manifold(&mut mesh, uses),
        }
    }

    for face in &mut mesh.faces {
        face.non_manifold.sort();
    }

    Ok(mesh)
}

/// Record every pair of faces on a non-manifold edge in each other's overflow list.
fn link_non_manifold<I: MeshIndex>(mesh: &mut MeshGraph<I>, uses: &[EdgeUse]) {
    for this in uses {
        for other in uses {
            if this.face != other.face {
                mesh.faces[this.face]
                    .non_manifold
                    .push((this.edge, FaceId::new(other.face)));
            }
        }
    }
}

/// Build a mesh and attach one function value per vertex.
pub fn build_with_function_values<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
    func_values: &[f64],
) -> Result<MeshGraph<I>> {
    let mut mesh = build_from_triangles(vertices, faces)?;
    mesh.set_function_values(func_values)?;
    Ok(mesh)
}

/// Convert a mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex<I: MeshIndex>(mesh: &MeshGraph<I>) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}
