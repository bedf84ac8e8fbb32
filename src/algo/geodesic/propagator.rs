//! Front propagation of geodesic distances across faces.
//!
//! The run keeps a min-queue of front edges: edges of already visited faces
//! whose other side has not been entered yet. Popping the shortest edge and
//! unfolding the face beyond it yields an estimate for that face's third
//! vertex; its two new edges join the front. Every face is entered at most
//! once, so a run is bounded by the number of faces even without a radius.
//!
//! Whenever a face is entered, distances are relaxed along the edges of the
//! reached faces, so no edge spans a distance difference longer than itself.

use std::collections::HashMap;

use log::{debug, trace, warn};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{EdgeName, FaceId, MeshIndex, MeshTopology, VertexId};

use super::entry::{lookup, GeodesicEntry, SeedRef};
use super::front::{FrontEdge, FrontQueue, TieBreak};
use super::unfold::{signed_angle, unfold_apex, FrontPoint};
use super::visited::VisitedSet;
use super::GeodesicPatch;

/// Options for geodesic front propagation.
#[derive(Debug, Clone, Default)]
pub struct GeodesicOptions {
    /// Maximum geodesic distance to explore. Edges whose nearer endpoint is
    /// farther away are not expanded and vertices beyond it are dropped from
    /// the result. `None` explores the whole connected surface.
    pub radius: Option<f64>,

    /// Scale distances by `func_value(v) - func_value(seed) + 0.5`.
    ///
    /// Unfolding and relaxation still run on unweighted surface distances;
    /// the weight of a vertex scales its own result only.
    pub weight_func_val: bool,

    /// Also propagate across edges shared by more than two faces.
    pub cross_non_manifold: bool,

    /// Upper bound on popped front edges. `None` for no limit.
    pub max_pops: Option<usize>,

    /// Order of front edges with equal short distance.
    pub tie_break: TieBreak,
}

impl GeodesicOptions {
    /// Set the radius bound.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Enable or disable function value weighting.
    pub fn with_weight_func_val(mut self, weight: bool) -> Self {
        self.weight_func_val = weight;
        self
    }

    /// Enable or disable propagation across non-manifold edges.
    pub fn with_cross_non_manifold(mut self, cross: bool) -> Self {
        self.cross_non_manifold = cross;
        self
    }

    /// Cap the number of popped front edges.
    pub fn with_max_pops(mut self, max_pops: usize) -> Self {
        self.max_pops = Some(max_pops);
        self
    }

    /// Set the front tie-break.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(r) = self.radius {
            if !r.is_finite() || r < 0.0 {
                return Err(MeshError::invalid_param(
                    "radius",
                    r,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }

    /// The radius as a bound, infinite when unset.
    #[inline]
    pub fn radius_bound(&self) -> f64 {
        self.radius.unwrap_or(f64::INFINITY)
    }
}

/// Progress of a propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagationState {
    /// Seeds are placed, nothing has been popped yet.
    Seeded,
    /// Front edges are being expanded.
    Running,
    /// The front emptied without touching the radius bound.
    Done,
    /// The front emptied, but parts of it were cut off by the radius bound
    /// (or by the pop limit).
    RadiusExceeded,
    /// There was nothing to propagate from: every seed is a vertex without
    /// incident faces.
    Exhausted,
}

impl PropagationState {
    /// Whether the run has terminated.
    #[inline]
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            PropagationState::Done | PropagationState::RadiusExceeded | PropagationState::Exhausted
        )
    }
}

/// A single geodesic estimation run over a read-only mesh.
///
/// # Example
///
/// ```
/// use geofront::prelude::*;
/// use geofront::algo::geodesic::{GeodesicOptions, GeodesicPropagator, PropagationState, SeedRef};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh: MeshGraph = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
///
/// let seeds = [SeedRef::Vertex(VertexId::new(0))];
/// let mut run = GeodesicPropagator::new(&mesh, &seeds, GeodesicOptions::default()).unwrap();
/// assert_eq!(run.state(), PropagationState::Seeded);
///
/// let patch = run.finish();
/// assert!((patch.distance(VertexId::new(2)).unwrap() - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub struct GeodesicPropagator<'a, M: MeshTopology<I> + ?Sized, I: MeshIndex = u32> {
    mesh: &'a M,
    options: GeodesicOptions,
    entries: HashMap<VertexId<I>, GeodesicEntry<I>>,
    /// Unweighted surface distance behind each entry, kept while weighting.
    surface: HashMap<VertexId<I>, f64>,
    queue: FrontQueue<I>,
    visited: VisitedSet,
    state: PropagationState,
    pruned: bool,
    pops: usize,
    skipped_edges: usize,
    relaxed: usize,
}

impl<'a, M: MeshTopology<I> + ?Sized, I: MeshIndex> GeodesicPropagator<'a, M, I> {
    /// Seed a run.
    ///
    /// Fails with [`MeshError::InvalidSeed`] when `seeds` is empty or names
    /// an element outside the mesh, and with
    /// [`MeshError::DegenerateGeometry`] when a seed face corner has a
    /// non-positive function value weight.
    pub fn new(mesh: &'a M, seeds: &[SeedRef<I>], options: GeodesicOptions) -> Result<Self> {
        options.validate()?;
        if seeds.is_empty() {
            return Err(MeshError::invalid_seed("no seeds supplied"));
        }
        for &seed in seeds {
            let (index, count, kind) = match seed {
                SeedRef::Face(f) => (f.index(), mesh.num_faces(), "face"),
                SeedRef::Vertex(v) => (v.index(), mesh.num_vertices(), "vertex"),
            };
            if index >= count {
                return Err(MeshError::invalid_seed(format!(
                    "{kind} {index} out of range (mesh has {count})"
                )));
            }
        }

        let mut run = Self {
            mesh,
            options,
            entries: HashMap::new(),
            surface: HashMap::new(),
            queue: FrontQueue::with_capacity(seeds.len() * 3),
            visited: VisitedSet::new(mesh.num_faces()),
            state: PropagationState::Seeded,
            pruned: false,
            pops: 0,
            skipped_edges: 0,
            relaxed: 0,
        };

        for &seed in seeds {
            match seed {
                SeedRef::Face(f) => run.seed_face(f)?,
                SeedRef::Vertex(v) => run.seed_vertex(v)?,
            }
        }

        if run.queue.is_empty() {
            run.state = if run.pruned {
                PropagationState::RadiusExceeded
            } else {
                PropagationState::Exhausted
            };
        }

        debug!(
            "geodesic run seeded: {} seeds, {} entries, {} front edges, {} faces visited",
            seeds.len(),
            run.entries.len(),
            run.queue.len(),
            run.visited.len()
        );

        Ok(run)
    }

    fn seed_face(&mut self, f: FaceId<I>) -> Result<()> {
        let mesh = self.mesh;
        let origin = mesh.center_of_gravity(f);
        let [a, _, _] = mesh.face_vertices(f);
        let reference = mesh.position(a) - origin;
        let normal = mesh.face_normal(f);
        self.seed_triangle(f, SeedRef::Face(f), origin, &reference, &normal, None)
    }

    fn seed_vertex(&mut self, v: VertexId<I>) -> Result<()> {
        let mesh = self.mesh;
        let faces = mesh.vertex_faces(v);
        let seed = SeedRef::Vertex(v);

        let Some(&first) = faces.first() else {
            // Isolated vertex: it is its own patch.
            if !self.entries.contains_key(&v) {
                self.entries.insert(v, GeodesicEntry::new(0.0, 0.0, seed)?);
                self.surface.insert(v, 0.0);
            }
            return Ok(());
        };

        let origin = mesh.position(v);
        // Angles are measured from the direction towards the edge opposite
        // the seed in its first face.
        let reference = mesh
            .face_vertices(first)
            .iter()
            .filter(|&&c| c != v)
            .map(|&c| mesh.position(c) - origin)
            .fold(Vector3::zeros(), |acc, d| acc + d);
        let normal = faces
            .iter()
            .map(|&f| mesh.face_normal(f))
            .fold(Vector3::zeros(), |acc, n| acc + n)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros);

        for f in faces {
            self.seed_triangle(f, seed, origin, &reference, &normal, Some(v))?;
        }
        Ok(())
    }

    /// Measure a seed triangle's corners from `origin` and push its edges.
    fn seed_triangle(
        &mut self,
        f: FaceId<I>,
        seed: SeedRef<I>,
        origin: Point3<f64>,
        reference: &Vector3<f64>,
        normal: &Vector3<f64>,
        seed_vertex: Option<VertexId<I>>,
    ) -> Result<()> {
        let mesh = self.mesh;
        for v in mesh.face_vertices(f) {
            let (surface, angle) = if seed_vertex == Some(v) {
                (0.0, 0.0)
            } else {
                let offset = mesh.position(v) - origin;
                (offset.norm(), signed_angle(reference, &offset, normal))
            };
            self.record(f, v, surface, angle, seed)?;
        }
        self.push_face_edges(f, None);
        self.visited.test_and_set(f);
        Ok(())
    }

    /// Create or improve the entry of a vertex from its unweighted surface
    /// distance. Returns whether it changed.
    ///
    /// Fails with [`MeshError::DegenerateGeometry`] on `face` when weighting
    /// is on and the vertex weight is not positive.
    fn record(
        &mut self,
        face: FaceId<I>,
        v: VertexId<I>,
        surface: f64,
        angle: f64,
        seed: SeedRef<I>,
    ) -> Result<bool> {
        let distance = if self.options.weight_func_val {
            let weight = self.weight(v, seed);
            if weight <= 0.0 {
                return Err(MeshError::DegenerateGeometry {
                    face: face.index(),
                    reason: "non-positive function value weight",
                });
            }
            surface * weight
        } else {
            surface
        };

        let changed = match self.entries.get_mut(&v) {
            Some(entry) => entry.improve_or_ignore(distance, angle, seed),
            None => {
                self.entries.insert(v, GeodesicEntry::new(distance, angle, seed)?);
                true
            }
        };
        if changed && self.options.weight_func_val {
            self.surface.insert(v, surface);
        }
        Ok(changed)
    }

    /// Weight of `v` relative to `seed`.
    fn weight(&self, v: VertexId<I>, seed: SeedRef<I>) -> f64 {
        self.mesh.func_value(v) - self.seed_func_value(seed) + 0.5
    }

    /// Unweighted surface distance behind the entry of `v`.
    fn surface_distance(&self, v: VertexId<I>, entry: &GeodesicEntry<I>) -> f64 {
        if self.options.weight_func_val {
            self.surface.get(&v).copied().unwrap_or(entry.distance())
        } else {
            entry.distance()
        }
    }

    /// Push the edges of a face (except `skip`) onto the front, pruning those
    /// that start beyond the radius.
    fn push_face_edges(&mut self, f: FaceId<I>, skip: Option<EdgeName>) {
        let radius = self.options.radius_bound();
        for edge in EdgeName::ALL {
            if skip == Some(edge) {
                continue;
            }
            let (a, b) = self.mesh.edge_vertices(f, edge);
            let (Some(entry_a), Some(entry_b)) = (self.entries.get(&a), self.entries.get(&b)) else {
                continue;
            };
            let front = FrontEdge::new(f, edge, (a, entry_a), (b, entry_b))
                .with_tie_break(self.options.tie_break);
            if front.short_distance() > radius {
                self.pruned = true;
                continue;
            }
            self.queue.push(front);
        }
    }

    /// Pop and expand one front edge. Returns `false` once the run has ended.
    pub fn step(&mut self) -> bool {
        if self.state.is_finished() {
            return false;
        }
        if let Some(max_pops) = self.options.max_pops {
            if self.pops >= max_pops {
                warn!(
                    "geodesic run stopped after {} pops with {} front edges left",
                    self.pops,
                    self.queue.len()
                );
                self.pruned = true;
                self.state = PropagationState::RadiusExceeded;
                return false;
            }
        }

        let Some(front) = self.queue.pop_min() else {
            self.state = if self.pruned {
                PropagationState::RadiusExceeded
            } else {
                PropagationState::Done
            };
            return false;
        };
        self.state = PropagationState::Running;
        self.pops += 1;
        trace!(
            "pop {:?} {:?} short={} long={}",
            front.face(),
            front.edge(),
            front.short_distance(),
            front.long_distance()
        );

        let mesh = self.mesh;
        if let Some(n) = mesh.neighbour_face(front.face(), front.edge()) {
            self.expand(&front, n);
        }
        if self.options.cross_non_manifold {
            for n in mesh.non_manifold_neighbours(front.face(), front.edge()) {
                self.expand(&front, n);
            }
        }
        true
    }

    /// Enter `neighbour` across `front` and estimate its third vertex.
    fn expand(&mut self, front: &FrontEdge<I>, neighbour: FaceId<I>) {
        if neighbour.index() >= self.visited.capacity() {
            warn!(
                "{:?} of {:?} names {:?} outside the mesh, treating it as a border",
                front.edge(),
                front.face(),
                neighbour
            );
            return;
        }
        if self.visited.test_and_set(neighbour) {
            return;
        }
        match self.estimate_apex(front, neighbour) {
            Ok((shared, apex, surface, angle, seed)) => {
                if let Err(err) = self.record(neighbour, apex, surface, angle, seed) {
                    self.skip(front, neighbour, &err);
                    return;
                }
                let (a, b) = front.vertices();
                self.relax_from(&[a, b, apex]);
                self.push_face_edges(neighbour, Some(shared));
            }
            Err(err) => self.skip(front, neighbour, &err),
        }
    }

    /// Lower entries of visited faces to `d(u) + |uw|` starting from `start`,
    /// following every vertex that improves.
    ///
    /// Lengths are added to unweighted surface distances; the candidate is
    /// weighted at `w` like any other estimate.
    fn relax_from(&mut self, start: &[VertexId<I>]) {
        let mesh = self.mesh;
        let mut work = start.to_vec();
        while let Some(u) = work.pop() {
            let Some(&from) = self.entries.get(&u) else {
                continue;
            };
            let origin = mesh.position(u);
            let surface = self.surface_distance(u, &from);
            for f in mesh.vertex_faces(u) {
                if !self.visited.contains(f) {
                    continue;
                }
                for w in mesh.face_vertices(f) {
                    if w == u || !self.entries.contains_key(&w) {
                        continue;
                    }
                    let step = (mesh.position(w) - origin).norm();
                    // A non-positive weight leaves `w` as it is.
                    if let Ok(true) = self.record(f, w, surface + step, from.angle(), from.seed()) {
                        self.relaxed += 1;
                        work.push(w);
                    }
                }
            }
        }
    }

    fn skip(&mut self, front: &FrontEdge<I>, neighbour: FaceId<I>, err: &MeshError) {
        warn!(
            "skipping front edge {:?} of {:?} into {:?}: {}",
            front.edge(),
            front.face(),
            neighbour,
            err
        );
        self.skipped_edges += 1;
    }

    /// Unfold `neighbour` across `front`.
    ///
    /// Returns the neighbour's local name for the shared edge, its apex and
    /// the unweighted apex estimate.
    #[allow(clippy::type_complexity)]
    fn estimate_apex(
        &self,
        front: &FrontEdge<I>,
        neighbour: FaceId<I>,
    ) -> Result<(EdgeName, VertexId<I>, f64, f64, SeedRef<I>)> {
        let mesh = self.mesh;
        let (a, b) = front.vertices();
        let shared = EdgeName::ALL
            .into_iter()
            .find(|&e| {
                let (u, v) = mesh.edge_vertices(neighbour, e);
                (u == a && v == b) || (u == b && v == a)
            })
            .ok_or(MeshError::DegenerateGeometry {
                face: neighbour.index(),
                reason: "neighbour does not share the front edge",
            })?;
        let apex = mesh.opposite_vertex(neighbour, shared);

        let entry_a = lookup(&self.entries, a)?;
        let entry_b = lookup(&self.entries, b)?;
        let point_a = FrontPoint {
            position: mesh.position(a),
            distance: self.surface_distance(a, entry_a),
            angle: entry_a.angle(),
        };
        let point_b = FrontPoint {
            position: mesh.position(b),
            distance: self.surface_distance(b, entry_b),
            angle: entry_b.angle(),
        };
        let unfolded = unfold_apex(neighbour.index(), &point_a, &point_b, &mesh.position(apex))?;

        let nearer = if entry_a.distance() <= entry_b.distance() {
            entry_a
        } else {
            entry_b
        };

        Ok((shared, apex, unfolded.distance, unfolded.angle, nearer.seed()))
    }

    fn seed_func_value(&self, seed: SeedRef<I>) -> f64 {
        match seed {
            SeedRef::Face(f) => self.mesh.face_func_value(f),
            SeedRef::Vertex(v) => self.mesh.func_value(v),
        }
    }

    /// Expand front edges until the run ends and return the final state.
    pub fn run(&mut self) -> PropagationState {
        while self.step() {}
        self.state
    }

    /// Run to completion and hand the result to the caller.
    ///
    /// Entries farther than the radius are dropped; if any were, the state
    /// is [`PropagationState::RadiusExceeded`].
    pub fn finish(mut self) -> GeodesicPatch<I> {
        self.run();

        let radius = self.options.radius_bound();
        let reached = self.entries.len();
        self.entries.retain(|_, e| e.distance() <= radius);
        let mut state = self.state;
        if self.entries.len() < reached && state == PropagationState::Done {
            state = PropagationState::RadiusExceeded;
        }

        debug!(
            "geodesic run finished: {:?}, {} vertices, {} faces, {} pops, {} relaxed, {} skipped edges",
            state,
            self.entries.len(),
            self.visited.len(),
            self.pops,
            self.relaxed,
            self.skipped_edges
        );

        GeodesicPatch::new(
            self.entries,
            self.visited,
            state,
            self.pops,
            self.skipped_edges,
            self.options.radius,
        )
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> PropagationState {
        self.state
    }

    /// The options the run was created with.
    #[inline]
    pub fn options(&self) -> &GeodesicOptions {
        &self.options
    }

    /// Entries reached so far, including those beyond the radius.
    #[inline]
    pub fn entries(&self) -> &HashMap<VertexId<I>, GeodesicEntry<I>> {
        &self.entries
    }

    /// Current entry of a vertex.
    pub fn entry(&self, v: VertexId<I>) -> Result<&GeodesicEntry<I>> {
        lookup(&self.entries, v)
    }

    /// Faces entered so far.
    #[inline]
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Number of queued front edges.
    #[inline]
    pub fn front_len(&self) -> usize {
        self.queue.len()
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
}

/// Estimate geodesic distances from a set of seeds.
///
/// All seeds propagate in one run; every vertex keeps the distance to its
/// nearest seed.
///
/// # Example
///
/// ```
/// use geofront::prelude::*;
/// use geofront::algo::geodesic::{estimate_geodesics, GeodesicOptions, SeedRef};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: MeshGraph = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
///
/// let seeds = [SeedRef::Face(FaceId::new(0))];
/// let patch = estimate_geodesics(&mesh, &seeds, &GeodesicOptions::default()).unwrap();
/// assert_eq!(patch.len(), 3);
/// ```
pub fn estimate_geodesics<M, I>(
    mesh: &M,
    seeds: &[SeedRef<I>],
    options: &GeodesicOptions,
) -> Result<GeodesicPatch<I>>
where
    M: MeshTopology<I> + ?Sized,
    I: MeshIndex,
{
    Ok(GeodesicPropagator::new(mesh, seeds, options.clone())?.finish())
}

/// Estimate one independent patch per seed, in parallel.
///
/// Each run owns its queue, visited set and entry map; the mesh is only read.
/// Results are in seed order.
pub fn estimate_geodesics_per_seed<M, I>(
    mesh: &M,
    seeds: &[SeedRef<I>],
    options: &GeodesicOptions,
) -> Result<Vec<GeodesicPatch<I>>>
where
    M: MeshTopology<I> + Sync + ?Sized,
    I: MeshIndex,
{
    if seeds.is_empty() {
        return Err(MeshError::invalid_seed("no seeds supplied"));
    }
    seeds
        .par_iter()
        .map(|&seed| estimate_geodesics(mesh, &[seed], options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, to_face_vertex, MeshGraph};
    use approx::assert_relative_eq;
    use std::f64::consts::SQRT_2;

    fn square(diagonal_02: bool) -> MeshGraph {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let faces = if diagonal_02 {
            vec![[0, 1, 2], [0, 2, 3]]
        } else {
            vec![[0, 1, 3], [1, 2, 3]]
        };
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_grid_mesh(n: usize) -> MeshGraph {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }

        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;

                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn strip() -> MeshGraph {
        // Four unit squares in a row, vertices 0..5 at y = 0 and 5..10 at y = 1.
        let mut vertices = Vec::new();
        for j in 0..2 {
            for i in 0..5 {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let faces: Vec<[usize; 3]> = (0..4)
            .flat_map(|i| [[i, i + 1, i + 6], [i, i + 6, i + 5]])
            .collect();
        build_from_triangles(&vertices, &faces).unwrap()
    }

    /// Grid whose columns are rolled around a cylinder of `radius`, `step`
    /// radians apart. Every cell stays planar.
    fn bent_grid(n: usize, radius: f64, step: f64) -> MeshGraph {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                let t = i as f64 * step;
                vertices.push(Point3::new(radius * t.sin(), j as f64, radius * (1.0 - t.cos())));
            }
        }
        let (_, faces) = to_face_vertex(&create_grid_mesh(n));
        build_from_triangles(&vertices, &faces).unwrap()
    }

    /// Forwards to a graph but reports `dangling` beyond every border edge.
    struct DanglingBorders {
        mesh: MeshGraph,
        dangling: FaceId,
    }

    impl MeshTopology for DanglingBorders {
        fn num_vertices(&self) -> usize {
            self.mesh.num_vertices()
        }

        fn num_faces(&self) -> usize {
            self.mesh.num_faces()
        }

        fn face_vertices(&self, face: FaceId) -> [VertexId; 3] {
            self.mesh.face_triangle(face)
        }

        fn neighbour_face(&self, face: FaceId, edge: EdgeName) -> Option<FaceId> {
            self.mesh.neighbour_face(face, edge).or(Some(self.dangling))
        }

        fn non_manifold_neighbours(&self, face: FaceId, edge: EdgeName) -> Vec<FaceId> {
            self.mesh.non_manifold_neighbours(face, edge).collect()
        }

        fn vertex_faces(&self, vertex: VertexId) -> Vec<FaceId> {
            self.mesh.vertex_faces(vertex).to_vec()
        }

        fn position(&self, vertex: VertexId) -> Point3<f64> {
            *self.mesh.position(vertex)
        }

        fn func_value(&self, vertex: VertexId) -> f64 {
            self.mesh.func_value(vertex)
        }
    }

    fn vertex_seed(i: usize) -> Vec<SeedRef> {
        vec![SeedRef::Vertex(VertexId::new(i))]
    }

    fn distance(patch: &GeodesicPatch, i: usize) -> f64 {
        patch.distance(VertexId::new(i)).unwrap()
    }

    #[test]
    fn test_square_from_corner() {
        for diagonal_02 in [true, false] {
            let mesh = square(diagonal_02);
            let patch = estimate_geodesics(&mesh, &vertex_seed(0), &GeodesicOptions::default())
                .unwrap();

            assert_relative_eq!(distance(&patch, 0), 0.0);
            assert_relative_eq!(distance(&patch, 1), 1.0, epsilon = 1e-6);
            assert_relative_eq!(distance(&patch, 3), 1.0, epsilon = 1e-6);
            assert_relative_eq!(distance(&patch, 2), SQRT_2, epsilon = 1e-6);
            assert_eq!(patch.state(), PropagationState::Done);
            assert_eq!(patch.visited().len(), 2);
        }
    }

    #[test]
    fn test_square_radius_keeps_only_seed() {
        let mesh = square(false);
        let options = GeodesicOptions::default().with_radius(0.5);
        let patch = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap();

        assert_eq!(patch.len(), 1);
        assert!(patch.contains(VertexId::new(0)));
        assert_eq!(patch.state(), PropagationState::RadiusExceeded);
        assert_eq!(
            patch.distance(VertexId::new(2)).unwrap_err(),
            MeshError::NotReached { vertex: 2 }
        );
    }

    #[test]
    fn test_face_seed_equilateral() {
        let h = 3f64.sqrt() / 2.0;
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, h, 0.0),
        ];
        let mesh: MeshGraph = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let seeds = [SeedRef::Face(FaceId::new(0))];
        let run = GeodesicPropagator::new(&mesh, &seeds, GeodesicOptions::default()).unwrap();

        assert_eq!(run.state(), PropagationState::Seeded);
        assert_eq!(run.entries().len(), 3);
        assert_eq!(run.front_len(), 3);
        assert_eq!(run.pops(), 0);
        let d0 = run.entry(VertexId::new(0)).unwrap().distance();
        for i in 1..3 {
            assert_relative_eq!(
                run.entry(VertexId::new(i)).unwrap().distance(),
                d0,
                epsilon = 1e-12
            );
        }
        // Circumradius of the unit equilateral triangle.
        assert_relative_eq!(d0, 1.0 / 3f64.sqrt(), epsilon = 1e-12);

        let patch = run.finish();
        assert_eq!(patch.state(), PropagationState::Done);
        assert_eq!(patch.pops(), 3);
    }

    #[test]
    fn test_non_manifold_edge() {
        // Three triangles hinged on edge 0-1, plus a fourth face glued to
        // the far edge of one wing.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
            Point3::new(1.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [1, 0, 4], [1, 5, 2]];
        let mesh: MeshGraph = build_from_triangles(&vertices, &faces).unwrap();
        let seeds = [SeedRef::Face(FaceId::new(0))];

        // Default: the hinge is a border.
        let patch = estimate_geodesics(&mesh, &seeds, &GeodesicOptions::default()).unwrap();
        assert!(!patch.contains(VertexId::new(3)));
        assert!(!patch.contains(VertexId::new(4)));
        assert!(patch.contains(VertexId::new(5)));
        assert_eq!(patch.visited().len(), 2);

        // Crossing enters both wings, each unfolded on its own.
        let options = GeodesicOptions::default().with_cross_non_manifold(true);
        let crossed = estimate_geodesics(&mesh, &seeds, &options).unwrap();
        assert!(crossed.contains(VertexId::new(3)));
        assert!(crossed.contains(VertexId::new(4)));
        assert_eq!(crossed.visited().len(), 4);
        assert_relative_eq!(
            crossed.distance(VertexId::new(3)).unwrap(),
            crossed.distance(VertexId::new(4)).unwrap(),
            epsilon = 1e-9
        );

        let again = estimate_geodesics(&mesh, &seeds, &options).unwrap();
        assert_eq!(crossed.entries(), again.entries());
    }

    #[test]
    fn test_degenerate_face_is_skipped() {
        // 4x2 grid with a zero-area sliver glued to its right border and a
        // face that can only be reached through the sliver.
        let mut vertices = Vec::new();
        for j in 0..3 {
            for i in 0..5 {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        vertices.push(Point3::new(5.0, 1.0, 0.0));
        let mut faces = Vec::new();
        for j in 0..2 {
            for i in 0..4 {
                let v00 = j * 5 + i;
                faces.push([v00, v00 + 1, v00 + 6]);
                faces.push([v00, v00 + 6, v00 + 5]);
            }
        }
        faces.push([4, 14, 9]);
        faces.push([4, 15, 14]);
        let mesh: MeshGraph = build_from_triangles(&vertices, &faces).unwrap();

        let options = GeodesicOptions::default().with_tie_break(TieBreak::ShorterFirst);
        let patch = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap();

        assert_eq!(patch.state(), PropagationState::Done);
        assert_eq!(patch.skipped_edges(), 1);
        for i in 0..15 {
            assert!(patch.contains(VertexId::new(i)), "vertex {} not reached", i);
        }
        assert!(!patch.contains(VertexId::new(15)));
        assert_relative_eq!(distance(&patch, 4), 4.0, epsilon = 1e-9);
        assert_relative_eq!(distance(&patch, 14), 20f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_seed_vertex_is_only_zero() {
        let mesh = create_grid_mesh(4);
        let patch = estimate_geodesics(&mesh, &vertex_seed(12), &GeodesicOptions::default())
            .unwrap();

        assert_eq!(patch.len(), mesh.num_vertices());
        for (v, entry) in patch.iter() {
            assert!(entry.distance() >= 0.0);
            assert_eq!(entry.distance() == 0.0, v.index() == 12, "vertex {:?}", v);
        }
    }

    #[test]
    fn test_flat_grid_matches_euclidean() {
        let mesh = create_grid_mesh(6);
        let options = GeodesicOptions::default().with_tie_break(TieBreak::ShorterFirst);

        for seed in [0, 24] {
            let origin = *mesh.position(VertexId::new(seed));
            let patch = estimate_geodesics(&mesh, &vertex_seed(seed), &options).unwrap();
            for v in mesh.vertex_ids() {
                let expected = (mesh.position(v) - origin).norm();
                assert_relative_eq!(patch.distance(v).unwrap(), expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_flat_grid_never_underestimates() {
        let mesh = create_grid_mesh(6);
        let origin = *mesh.position(VertexId::new(24));
        let patch = estimate_geodesics(&mesh, &vertex_seed(24), &GeodesicOptions::default())
            .unwrap();

        assert_eq!(patch.len(), mesh.num_vertices());
        for v in mesh.vertex_ids() {
            let euclidean = (mesh.position(v) - origin).norm();
            assert!(patch.distance(v).unwrap() >= euclidean - 1e-9, "{:?}", v);
        }
    }

    #[test]
    fn test_triangle_inequality_on_edges() {
        let mesh = create_grid_mesh(6);
        let patch = estimate_geodesics(&mesh, &vertex_seed(24), &GeodesicOptions::default())
            .unwrap();

        for (u, v) in mesh.edges() {
            let du = patch.distance(u).unwrap();
            let dv = patch.distance(v).unwrap();
            let len = mesh.vertex_distance(u, v);
            assert!(
                (du - dv).abs() <= len + 1e-9,
                "|{} - {}| > {} on edge {:?}-{:?}",
                du,
                dv,
                len,
                u,
                v
            );
        }
    }

    #[test]
    fn test_bent_grid_error_bound() {
        // The rolled grid is developable: true distances are planar ones in
        // the unrolled grid, whose columns are one chord apart.
        let (n, radius, step) = (10, 4.0, 0.25);
        let mesh = bent_grid(n, radius, step);
        let chord = 2.0 * radius * (step / 2.0).sin();
        let seed = (n / 2) * (n + 1) + n / 2;
        let unrolled = |v: usize| {
            let di = (v % (n + 1)) as f64 - (seed % (n + 1)) as f64;
            let dj = (v / (n + 1)) as f64 - (seed / (n + 1)) as f64;
            (di * chord).hypot(dj)
        };

        let max_relative_error = |tie_break: TieBreak| {
            let options = GeodesicOptions::default().with_tie_break(tie_break);
            let patch = estimate_geodesics(&mesh, &vertex_seed(seed), &options).unwrap();
            assert_eq!(patch.state(), PropagationState::Done);
            assert_eq!(patch.len(), mesh.num_vertices());
            (0..mesh.num_vertices())
                .filter(|&v| v != seed)
                .map(|v| {
                    let expected = unrolled(v);
                    let relative = (distance(&patch, v) - expected) / expected;
                    assert!(relative >= -1e-9, "{:?} below {} at vertex {}", tie_break, expected, v);
                    relative
                })
                .fold(0.0, f64::max)
        };

        let longer = max_relative_error(TieBreak::LongerFirst);
        assert!(longer > 0.1, "{}", longer);
        assert!(longer <= SQRT_2 - 1.0 + 1e-9, "{}", longer);
        assert!(max_relative_error(TieBreak::ShorterFirst) < 1e-9);
    }

    #[test]
    fn test_radius_bound() {
        let mesh = create_grid_mesh(8);
        let options = GeodesicOptions::default().with_radius(3.0);
        let patch = estimate_geodesics(&mesh, &vertex_seed(40), &options).unwrap();

        assert_eq!(patch.state(), PropagationState::RadiusExceeded);
        assert!(!patch.is_empty());
        assert!(patch.iter().all(|(_, e)| e.distance() <= 3.0));
        // The grid corner is far outside the radius.
        assert!(!patch.contains(VertexId::new(0)));
        assert!(patch.visited().len() < mesh.num_faces());
    }

    #[test]
    fn test_distances_never_increase() {
        let mesh = create_grid_mesh(5);
        let mut run = GeodesicPropagator::new(&mesh, &vertex_seed(7), GeodesicOptions::default())
            .unwrap();

        let mut seen: HashMap<VertexId, f64> = HashMap::new();
        loop {
            for (&v, entry) in run.entries() {
                if let Some(&before) = seen.get(&v) {
                    assert!(entry.distance() <= before);
                }
                seen.insert(v, entry.distance());
            }
            if !run.step() {
                break;
            }
        }
        assert_eq!(run.state(), PropagationState::Done);
    }

    #[test]
    fn test_deterministic() {
        let mesh = create_grid_mesh(6);
        let seeds = [
            SeedRef::Vertex(VertexId::new(3)),
            SeedRef::Face(FaceId::new(50)),
        ];
        let options = GeodesicOptions::default().with_radius(4.0);
        let first = estimate_geodesics(&mesh, &seeds, &options).unwrap();
        let second = estimate_geodesics(&mesh, &seeds, &options).unwrap();

        assert_eq!(first.entries(), second.entries());
        assert_eq!(first.visited(), second.visited());
    }

    #[test]
    fn test_multiple_seeds_take_nearest() {
        let mesh = create_grid_mesh(4);
        let seeds = [SeedRef::Vertex(VertexId::new(0)), SeedRef::Vertex(VertexId::new(24))];
        let patch = estimate_geodesics(&mesh, &seeds, &GeodesicOptions::default()).unwrap();

        assert_relative_eq!(distance(&patch, 24), 0.0);
        assert_eq!(patch.seed(VertexId::new(1)).unwrap(), seeds[0]);
        assert_eq!(patch.seed(VertexId::new(23)).unwrap(), seeds[1]);
    }

    #[test]
    fn test_invalid_seeds() {
        let mesh = square(true);
        let err = estimate_geodesics::<MeshGraph, u32>(&mesh, &[], &GeodesicOptions::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidSeed { .. }));

        let err = estimate_geodesics(&mesh, &vertex_seed(10), &GeodesicOptions::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidSeed { .. }));

        let bad_radius = GeodesicOptions::default().with_radius(-1.0);
        assert!(matches!(
            estimate_geodesics(&mesh, &vertex_seed(0), &bad_radius).unwrap_err(),
            MeshError::InvalidParameter { name: "radius", .. }
        ));
    }

    #[test]
    fn test_empty_mesh_rejects_seeds() {
        let mesh: MeshGraph = MeshGraph::new();
        let err = estimate_geodesics(&mesh, &vertex_seed(0), &GeodesicOptions::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidSeed { .. }));

        let err = estimate_geodesics(&mesh, &[SeedRef::Face(FaceId::new(0))], &GeodesicOptions::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidSeed { .. }));
    }

    #[test]
    fn test_faceless_mesh_is_exhausted() {
        let mut mesh: MeshGraph = MeshGraph::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let seeds = [SeedRef::Vertex(a), SeedRef::Vertex(b), SeedRef::Vertex(a)];
        let patch = estimate_geodesics(&mesh, &seeds, &GeodesicOptions::default()).unwrap();

        assert_eq!(patch.state(), PropagationState::Exhausted);
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.seed(b).unwrap(), seeds[1]);
        assert_eq!(patch.pops(), 0);
    }

    #[test]
    fn test_isolated_vertex_is_exhausted() {
        let mut mesh = square(true);
        let lone = mesh.add_vertex(Point3::new(5.0, 5.0, 0.0));
        let patch = estimate_geodesics(&mesh, &[SeedRef::Vertex(lone)], &GeodesicOptions::default())
            .unwrap();

        assert_eq!(patch.state(), PropagationState::Exhausted);
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.distance(lone).unwrap(), 0.0);
    }

    #[test]
    fn test_weighted_seed_rejects_non_positive() {
        let mut mesh = square(true);
        mesh.set_func_value(VertexId::new(2), -1.0);
        let options = GeodesicOptions::default().with_weight_func_val(true);

        let err = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateGeometry { .. }));
    }

    #[test]
    fn test_weighted_flat_function_halves_distances() {
        let mesh = square(true);
        let options = GeodesicOptions::default().with_weight_func_val(true);
        let patch = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap();

        assert_relative_eq!(distance(&patch, 1), 0.5, epsilon = 1e-12);
        assert_relative_eq!(distance(&patch, 2), SQRT_2 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_constant_function_scales_beyond_seed_faces() {
        // Vertices 2, 3, 4 and 9 are outside the seed's faces.
        let mesh = strip();
        let weighted = GeodesicOptions::default().with_weight_func_val(true);
        let plain = estimate_geodesics(&mesh, &vertex_seed(0), &GeodesicOptions::default()).unwrap();
        let halved = estimate_geodesics(&mesh, &vertex_seed(0), &weighted).unwrap();

        assert_eq!(halved.len(), 10);
        for v in mesh.vertex_ids() {
            assert_relative_eq!(
                halved.distance(v).unwrap(),
                plain.distance(v).unwrap() / 2.0,
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(distance(&halved, 2), 1.0, epsilon = 1e-12);
        assert_relative_eq!(distance(&halved, 4), 2.0, epsilon = 1e-12);
        assert_relative_eq!(distance(&halved, 9), 17f64.sqrt() / 2.0, epsilon = 1e-12);

        // Any constant gives a weight of 0.5, relaxation included.
        let mut grid = create_grid_mesh(6);
        grid.set_function_values(&vec![0.3; grid.num_vertices()]).unwrap();
        let plain = estimate_geodesics(&grid, &vertex_seed(24), &GeodesicOptions::default()).unwrap();
        let halved = estimate_geodesics(&grid, &vertex_seed(24), &weighted).unwrap();
        for v in grid.vertex_ids() {
            assert_relative_eq!(
                halved.distance(v).unwrap(),
                plain.distance(v).unwrap() / 2.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_weighted_non_positive_apex_is_skipped() {
        let mut mesh = strip();
        mesh.set_func_value(VertexId::new(9), -1.0);
        let options = GeodesicOptions::default().with_weight_func_val(true);
        let patch = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap();

        assert_eq!(patch.state(), PropagationState::Done);
        assert_eq!(patch.skipped_edges(), 1);
        assert!(!patch.contains(VertexId::new(9)));
        // Vertex 4 lies only behind the skipped face.
        assert!(!patch.contains(VertexId::new(4)));
        for i in [0, 1, 2, 3, 5, 6, 7, 8] {
            assert!(patch.contains(VertexId::new(i)), "vertex {} not reached", i);
        }
        assert_relative_eq!(distance(&patch, 3), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_neighbour_outside_mesh_is_a_border() {
        for dangling in [2, 5, 1000] {
            let topology = DanglingBorders {
                mesh: square(true),
                dangling: FaceId::new(dangling),
            };
            let patch = estimate_geodesics(&topology, &vertex_seed(0), &GeodesicOptions::default())
                .unwrap();

            assert_eq!(patch.state(), PropagationState::Done);
            assert_eq!(patch.len(), 4);
            assert_eq!(patch.visited().len(), 2);
            assert_eq!(patch.skipped_edges(), 0);
            assert_relative_eq!(distance(&patch, 2), SQRT_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_max_pops() {
        let mesh = create_grid_mesh(4);
        let options = GeodesicOptions::default().with_max_pops(2);
        let patch = estimate_geodesics(&mesh, &vertex_seed(0), &options).unwrap();

        assert_eq!(patch.pops(), 2);
        assert_eq!(patch.state(), PropagationState::RadiusExceeded);
    }

    #[test]
    fn test_per_seed_runs() {
        let mesh = create_grid_mesh(4);
        let seeds = [SeedRef::Vertex(VertexId::new(0)), SeedRef::Vertex(VertexId::new(24))];
        let patches = estimate_geodesics_per_seed(&mesh, &seeds, &GeodesicOptions::default())
            .unwrap();

        assert_eq!(patches.len(), 2);
        let single = estimate_geodesics(&mesh, &seeds[1..], &GeodesicOptions::default()).unwrap();
        assert_eq!(patches[1].entries(), single.entries());
        assert_relative_eq!(patches[0].distance(VertexId::new(24)).unwrap(), 4.0 * SQRT_2, epsilon = 1e-6);

        assert!(estimate_geodesics_per_seed::<MeshGraph, u32>(
            &mesh,
            &[],
            &GeodesicOptions::default()
        )
        .is_err());
    }
}
