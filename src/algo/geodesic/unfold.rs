//! Planar unfolding of a front edge and the triangle beyond it.
//!
//! The front edge (A, B) is laid into a plane with A at the origin and B at
//! `(|AB|, 0)`. The two known geodesic distances place a virtual source S
//! below the edge (law of cosines); the apex C' of the next triangle is
//! placed above it. The apex distance is the straight line S→C' when that
//! line passes through the edge, otherwise the path bends around the nearer
//! endpoint.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector2, Vector3};

use crate::error::{MeshError, Result};

use super::entry::wrap_angle;

/// Twice-area threshold relative to the longest squared edge below which a
/// triangle counts as flat.
const FLAT_TRIANGLE_EPS: f64 = 1e-12;

/// Geodesic distance and angle known at one endpoint of a front edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontPoint {
    /// World position of the endpoint.
    pub position: Point3<f64>,
    /// Geodesic distance of the endpoint.
    pub distance: f64,
    /// Geodesic angle of the endpoint.
    pub angle: f64,
}

/// Estimated geodesic distance and angle of an unfolded apex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unfolded {
    /// Estimated geodesic distance.
    pub distance: f64,
    /// Estimated geodesic angle in `(-π, π]`.
    pub angle: f64,
    /// Whether the estimate bends around an endpoint instead of crossing the edge.
    pub bent: bool,
}

/// Estimate the apex across front edge (A, B).
///
/// `face` is only used to label errors. Fails with
/// [`MeshError::DegenerateGeometry`] when the edge has no length or the
/// triangle (A, B, apex) has no area.
pub fn unfold_apex(face: usize, a: &FrontPoint, b: &FrontPoint, apex: &Point3<f64>) -> Result<Unfolded> {
    let ab = b.position - a.position;
    let ac = apex - a.position;
    let bc = apex - b.position;
    let c = ab.norm();
    let len_ac = ac.norm();
    let len_bc = bc.norm();

    let longest = c.max(len_ac).max(len_bc);
    if !(c > f64::EPSILON * longest.max(1.0)) {
        return Err(MeshError::DegenerateGeometry {
            face,
            reason: "front edge has zero length",
        });
    }
    let double_area = ab.cross(&ac).norm();
    if !(double_area > FLAT_TRIANGLE_EPS * longest * longest) {
        return Err(MeshError::DegenerateGeometry {
            face,
            reason: "triangle has zero area",
        });
    }

    // Apex above the edge.
    let apex_2d = Vector2::new(ac.dot(&ab) / c, double_area / c);

    // Virtual source below the edge. Distances that violate the triangle
    // inequality collapse the source onto the edge line.
    let (da, db) = (a.distance, b.distance);
    let sx = (da * da - db * db + c * c) / (2.0 * c);
    let sy = -(da * da - sx * sx).max(0.0).sqrt();
    let source = Vector2::new(sx, sy);

    let to_apex = apex_2d - source;
    // Parameter where S→C' meets the edge line; the denominator is positive.
    let t = -sy / (apex_2d.y - sy);
    let cross_x = sx + t * to_apex.x;

    let via_a = da + len_ac;
    let via_b = db + len_bc;
    let straight = to_apex.norm();

    // A collapsed source can land farther than either bent path.
    if (0.0..=c).contains(&cross_x) && straight <= via_a.min(via_b) {
        let angle = straight_angle(a, b, source, Vector2::new(c, 0.0), to_apex);
        return Ok(Unfolded {
            distance: straight,
            angle,
            bent: false,
        });
    }

    let (distance, angle) = if via_a <= via_b {
        (via_a, a.angle)
    } else {
        (via_b, b.angle)
    };
    Ok(Unfolded {
        distance,
        angle: wrap_angle(angle),
        bent: true,
    })
}

/// Angle of the apex: the angle at one endpoint plus the interior angle at
/// the virtual source between that endpoint and the apex.
fn straight_angle(
    a: &FrontPoint,
    b: &FrontPoint,
    source: Vector2<f64>,
    b_2d: Vector2<f64>,
    to_apex: Vector2<f64>,
) -> f64 {
    let to_a = -source;
    let to_b = b_2d - source;
    let eps = f64::EPSILON * b_2d.x;

    // Measure from an endpoint the source does not sit on.
    let (base_angle, to_base) = if to_a.norm() > eps {
        (a.angle, to_a)
    } else {
        (b.angle, to_b)
    };
    if to_base.norm() <= eps {
        return wrap_angle(base_angle);
    }

    // The plane's rotation sense may be opposite to the one the stored
    // angles increase in.
    let planar_ab = planar_angle(to_a, to_b);
    let geodesic_ab = wrap_angle(b.angle - a.angle);
    let orientation = if planar_ab * geodesic_ab < 0.0 { -1.0 } else { 1.0 };

    wrap_angle(base_angle + orientation * planar_angle(to_base, to_apex))
}

/// Signed planar angle from `from` to `to` in `(-π, π]`.
fn planar_angle(from: Vector2<f64>, to: Vector2<f64>) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(&to);
    if cross == 0.0 && dot == 0.0 {
        return 0.0;
    }
    let angle = cross.atan2(dot);
    if angle <= -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Signed angle from `reference` to `v` around `normal`, in `(-π, π]`.
///
/// Used for the initial angles around a seed. Zero when either vector
/// vanishes.
pub fn signed_angle(reference: &Vector3<f64>, v: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    let cross = reference.cross(v);
    let sin = if normal.norm_squared() > 0.0 {
        cross.dot(normal)
    } else {
        cross.norm()
    };
    let cos = reference.dot(v);
    if sin == 0.0 && cos == 0.0 {
        return 0.0;
    }
    wrap_angle(sin.atan2(cos))
}
