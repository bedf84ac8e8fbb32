//! Approximate geodesic distances by front propagation.
//!
//! Distances are measured along the surface from one or more seeds (faces or
//! vertices). A min-queue of front edges is expanded face by face; each newly
//! entered face is unfolded into the plane of the edge it was entered
//! through, and the distance of its third vertex is estimated from the two
//! known endpoint distances.
//!
//! Besides the distance, every reached vertex records a direction angle
//! around its seed and the seed it was reached from.
//!
//! # Example
//!
//! ```
//! use geofront::prelude::*;
//! use geofront::algo::geodesic::{estimate_geodesics, GeodesicOptions, SeedRef};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: MeshGraph = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let seeds = [SeedRef::Vertex(VertexId::new(0))];
//! let patch = estimate_geodesics(&mesh, &seeds, &GeodesicOptions::default()).unwrap();
//!
//! // Distance to the opposite corner
//! let d = patch.distance(VertexId::new(2)).unwrap();
//! assert!((d - 2f64.sqrt()).abs() < 1e-9);
//!
//! // Find the farthest vertex
//! if let Some((v, d)) = patch.farthest_vertex() {
//!     println!("Farthest vertex: {:?} at distance {}", v, d);
//! }
//! ```

mod entry;
mod front;
mod propagator;
mod unfold;
mod visited;

use std::collections::HashMap;

pub use entry::{GeodesicEntry, SeedRef};
pub use front::{FrontEdge, FrontQueue, TieBreak};
pub use propagator::{
    estimate_geodesics, estimate_geodesics_per_seed, GeodesicOptions, GeodesicPropagator,
    PropagationState,
};
pub use unfold::{signed_angle, unfold_apex, FrontPoint, Unfolded};
pub use visited::VisitedSet;

use crate::error::Result;
use crate::mesh::{MeshIndex, VertexId};

/// Result of a geodesic run.
///
/// Holds an entry for every vertex reached within the radius, and the set of
/// faces the front entered.
#[derive(Debug, Clone)]
pub struct GeodesicPatch<I: MeshIndex = u32> {
    entries: HashMap<VertexId<I>, GeodesicEntry<I>>,
    visited: VisitedSet,
    state: PropagationState,
    pops: usize,
    skipped_edges: usize,
    radius: Option<f64>,
}

impl<I: MeshIndex> GeodesicPatch<I> {
    pub(crate) fn new(
        entries: HashMap<VertexId<I>, GeodesicEntry<I>>,
        visited: VisitedSet,
        state: PropagationState,
        pops: usize,
        skipped_edges: usize,
        radius: Option<f64>,
    ) -> Self {
        Self {
            entries,
            visited,
            state,
            pops,
            skipped_edges,
            radius,
        }
    }

    /// Entry of a vertex, or [`MeshError::NotReached`](crate::error::MeshError::NotReached).
    pub fn entry(&self, v: VertexId<I>) -> Result<&GeodesicEntry<I>> {
        entry::lookup(&self.entries, v)
    }

    /// Geodesic distance of a vertex.
    pub fn distance(&self, v: VertexId<I>) -> Result<f64> {
        self.entry(v).map(GeodesicEntry::distance)
    }

    /// Geodesic angle of a vertex.
    pub fn angle(&self, v: VertexId<I>) -> Result<f64> {
        self.entry(v).map(GeodesicEntry::angle)
    }

    /// Seed a vertex was reached from.
    pub fn seed(&self, v: VertexId<I>) -> Result<SeedRef<I>> {
        self.entry(v).map(GeodesicEntry::seed)
    }

    /// Check if a vertex was reached.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.entries.contains_key(&v)
    }

    /// Number of reached vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no vertex was reached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over reached vertices and their entries, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, &GeodesicEntry<I>)> + '_ {
        self.entries.iter().map(|(&v, e)| (v, e))
    }

    /// The vertex to entry map.
    #[inline]
    pub fn entries(&self) -> &HashMap<VertexId<I>, GeodesicEntry<I>> {
        &self.entries
    }

    /// Take the vertex to entry map.
    pub fn into_entries(self) -> HashMap<VertexId<I>, GeodesicEntry<I>> {
        self.entries
    }

    /// Faces entered by the front.
    #[inline]
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// How the run ended.
    #[inline]
    pub fn state(&self) -> PropagationState {
        self.state
    }

    /// Number of popped front edges.
    #[inline]
    pub fn pops(&self) -> usize {
        self.pops
    }

    /// Number of front edges skipped because of degenerate geometry.
    #[inline]
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    /// Radius the run was bounded by.
    #[inline]
    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    /// Find the reached vertex with the largest distance.
    ///
    /// Ties go to the smaller vertex id.
    pub fn farthest_vertex(&self) -> Option<(VertexId<I>, f64)> {
        self.entries
            .iter()
            .map(|(&v, e)| (v, e.distance()))
            .max_by(|(va, da), (vb, db)| da.total_cmp(db).then(vb.cmp(va)))
    }

    /// Reached vertices within `max_distance` of their seed, sorted by id.
    pub fn vertices_within(&self, max_distance: f64) -> Vec<VertexId<I>> {
        let mut vertices: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, e)| e.distance() <= max_distance)
            .map(|(&v, _)| v)
            .collect();
        vertices.sort_unstable();
        vertices
    }

    /// Per-vertex distances for a mesh with `num_vertices` vertices.
    ///
    /// Unreached vertices get `NaN`. The result can be applied with
    /// [`MeshGraph::set_function_values`](crate::mesh::MeshGraph::set_function_values).
    pub fn to_function_values(&self, num_vertices: usize) -> Vec<f64> {
        let mut values = vec![f64::NAN; num_vertices];
        for (v, e) in &self.entries {
            if let Some(slot) = values.get_mut(v.index()) {
                *slot = e.distance();
            }
        }
        values
    }

    /// Label every reached vertex with the position of its seed in `seeds`.
    ///
    /// Vertices whose seed is not in `seeds` are left out.
    pub fn seed_labels(&self, seeds: &[SeedRef<I>]) -> HashMap<VertexId<I>, usize> {
        self.entries
            .iter()
            .filter_map(|(&v, e)| {
                seeds
                    .iter()
                    .position(|&s| s == e.seed())
                    .map(|label| (v, label))
            })
            .collect()
    }
}
