//! Per-vertex geodesic records.

use std::f64::consts::PI;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, MeshIndex, VertexId};

/// The primitive a geodesic run measures distance from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeedRef<I: MeshIndex = u32> {
    /// A face; distances start at its center of gravity.
    Face(FaceId<I>),
    /// A vertex; distances start at its position.
    Vertex(VertexId<I>),
}

impl<I: MeshIndex> From<FaceId<I>> for SeedRef<I> {
    fn from(f: FaceId<I>) -> Self {
        SeedRef::Face(f)
    }
}

impl<I: MeshIndex> From<VertexId<I>> for SeedRef<I> {
    fn from(v: VertexId<I>) -> Self {
        SeedRef::Vertex(v)
    }
}

/// Best known geodesic distance, direction angle and originating seed of a vertex.
///
/// The distance of an entry never increases: the only mutation is
/// [`improve_or_ignore`](Self::improve_or_ignore), which accepts strictly
/// shorter distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicEntry<I: MeshIndex = u32> {
    distance: f64,
    angle: f64,
    seed: SeedRef<I>,
}

impl<I: MeshIndex> GeodesicEntry<I> {
    /// Create an entry. The distance must be finite and non-negative.
    ///
    /// The angle is wrapped into `(-π, π]`; a non-finite angle is stored as 0.
    pub fn new(distance: f64, angle: f64, seed: SeedRef<I>) -> Result<Self> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(MeshError::invalid_param(
                "distance",
                distance,
                "must be finite and non-negative",
            ));
        }
        Ok(Self {
            distance,
            angle: wrap_angle(angle),
            seed,
        })
    }

    /// Replace the stored triple iff `distance` is strictly smaller.
    ///
    /// Returns whether the entry changed. Non-finite and negative
    /// candidates are ignored.
    pub fn improve_or_ignore(&mut self, distance: f64, angle: f64, seed: SeedRef<I>) -> bool {
        if !(distance >= 0.0 && distance < self.distance) {
            return false;
        }
        self.distance = distance;
        self.angle = wrap_angle(angle);
        self.seed = seed;
        true
    }

    /// Geodesic distance.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Geodesic direction angle in radians, in `(-π, π]`.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Seed the distance is measured from.
    #[inline]
    pub fn seed(&self) -> SeedRef<I> {
        self.seed
    }
}

/// Wrap an angle into `(-π, π]`. Non-finite input maps to 0.
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

/// Fetch an entry from a run's map, or report the vertex as not reached.
pub(crate) fn lookup<I: MeshIndex>(
    entries: &std::collections::HashMap<VertexId<I>, GeodesicEntry<I>>,
    v: VertexId<I>,
) -> Result<&GeodesicEntry<I>> {
    entries
        .get(&v)
        .ok_or(MeshError::NotReached { vertex: v.index() })
}
