//! The marching front: edges on the border of the explored region.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::mesh::{EdgeName, FaceId, MeshIndex, VertexId};

use super::entry::GeodesicEntry;

/// How front edges with equal short distance are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TieBreak {
    /// The edge with the larger long distance first.
    ///
    /// Faces are often entered through an edge facing away from the seed,
    /// so the apex falls back to a path bent around one endpoint. Distances
    /// are never below the true ones on flat and developable regions, but
    /// on regular grids they can be up to `√2 - 1` (about 41%) too long,
    /// the detour of walking two grid edges instead of the diagonal.
    #[default]
    LongerFirst,
    /// The edge with the smaller long distance first. On flat regions this
    /// enters each face through the edge facing the seed, which makes flat
    /// and developable grids exact.
    ShorterFirst,
}

/// A boundary edge of the explored region awaiting expansion.
///
/// The edge belongs to `face`, which is already visited; expanding it means
/// crossing into the face on the other side. The endpoint distances are
/// captured when the edge is created and fix its position in the queue.
#[derive(Debug, Clone, Copy)]
pub struct FrontEdge<I: MeshIndex = u32> {
    face: FaceId<I>,
    edge: EdgeName,
    vertex_a: VertexId<I>,
    vertex_b: VertexId<I>,
    short: f64,
    long: f64,
    tie_break: TieBreak,
}

impl<I: MeshIndex> FrontEdge<I> {
    /// Create a front edge from a face edge and its endpoints' entries.
    pub fn new(
        face: FaceId<I>,
        edge: EdgeName,
        (vertex_a, entry_a): (VertexId<I>, &GeodesicEntry<I>),
        (vertex_b, entry_b): (VertexId<I>, &GeodesicEntry<I>),
    ) -> Self {
        let (da, db) = (entry_a.distance(), entry_b.distance());
        Self {
            face,
            edge,
            vertex_a,
            vertex_b,
            short: da.min(db),
            long: da.max(db),
            tie_break: TieBreak::LongerFirst,
        }
    }

    /// Use a different tie-break when queued.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// The visited face this edge belongs to.
    #[inline]
    pub fn face(&self) -> FaceId<I> {
        self.face
    }

    /// Which edge of [`face`](Self::face) this is.
    #[inline]
    pub fn edge(&self) -> EdgeName {
        self.edge
    }

    /// Endpoint vertices (A, B) in face order.
    #[inline]
    pub fn vertices(&self) -> (VertexId<I>, VertexId<I>) {
        (self.vertex_a, self.vertex_b)
    }

    /// Shorter endpoint distance at creation.
    #[inline]
    pub fn short_distance(&self) -> f64 {
        self.short
    }

    /// Longer endpoint distance at creation.
    #[inline]
    pub fn long_distance(&self) -> f64 {
        self.long
    }

    /// Whether `e1` must be expanded before `e2` under
    /// [`TieBreak::LongerFirst`].
    ///
    /// Edges with the smaller short distance come first. On a tie the edge
    /// with the *larger* long distance wins, so edges closer to a fully
    /// resolved triangle are processed first.
    pub fn shorter_than(e1: &Self, e2: &Self) -> bool {
        if e1.short == e2.short {
            return e1.long > e2.long;
        }
        e1.short < e2.short
    }
}

// Ordering for BinaryHeap (a max-heap): the edge to expand next is the greatest.
impl<I: MeshIndex> Ord for FrontEdge<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        let long = match self.tie_break {
            TieBreak::LongerFirst => self.long.total_cmp(&other.long),
            TieBreak::ShorterFirst => other.long.total_cmp(&self.long),
        };
        other
            .short
            .total_cmp(&self.short)
            .then(long)
            .then_with(|| other.face.cmp(&self.face))
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

impl<I: MeshIndex> PartialOrd for FrontEdge<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: MeshIndex> PartialEq for FrontEdge<I> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I: MeshIndex> Eq for FrontEdge<I> {}

/// Min-queue of front edges: smallest short distance first, ties by the
/// edges' [`TieBreak`].
#[derive(Debug, Clone)]
pub struct FrontQueue<I: MeshIndex = u32> {
    heap: BinaryHeap<FrontEdge<I>>,
}

impl<I: MeshIndex> Default for FrontQueue<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> FrontQueue<I> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    /// Create an empty queue with room for `capacity` edges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Add an edge to the front.
    #[inline]
    pub fn push(&mut self, edge: FrontEdge<I>) {
        self.heap.push(edge);
    }

    /// Remove and return the edge to expand next.
    #[inline]
    pub fn pop_min(&mut self) -> Option<FrontEdge<I>> {
        self.heap.pop()
    }

    /// The edge that [`pop_min`](Self::pop_min) would return.
    #[inline]
    pub fn peek_min(&self) -> Option<&FrontEdge<I>> {
        self.heap.peek()
    }

    /// Check if the front is exhausted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
