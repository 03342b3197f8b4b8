use crate::core::utils::geometry::is_significant;
use nalgebra::Vector3;

/// Keeps a stored tangential overlap tangent to the current contact normal.
///
/// The component along `normal` (a unit vector) is removed and the remainder is rescaled to
/// the length the overlap had before the projection.
#[inline]
pub fn rotate_tangential_overlap(overlap: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    let projected = overlap - normal * normal.dot(overlap);
    if is_significant(&projected) {
        projected * (overlap.norm() / projected.norm())
    } else {
        projected
    }
}

/// Result of applying the Coulomb limit to a tangential spring force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipCheck {
    pub force: Vector3<f64>,
    pub overlap: Vector3<f64>,
    pub slipping: bool,
}

/// Caps the tangential force at `limit`.
///
/// When the cap applies, the returned overlap is the one that reproduces the capped force
/// under `stiffness`.
#[inline]
pub fn coulomb_cap(
    force: &Vector3<f64>,
    overlap: &Vector3<f64>,
    stiffness: f64,
    limit: f64,
) -> SlipCheck {
    let magnitude = force.norm();
    if magnitude > limit {
        let capped = force * (limit / magnitude);
        SlipCheck {
            force: capped,
            overlap: capped / stiffness,
            slipping: true,
        }
    } else {
        SlipCheck {
            force: *force,
            overlap: *overlap,
            slipping: false,
        }
    }
}

/// Rolling-friction torque opposing a particle's own angular velocity.
///
/// Zero when the angular velocity is not significant.
#[inline]
pub fn rolling_torque(
    ang_vel: &Vector3<f64>,
    rolling_friction: f64,
    normal_force: f64,
    radius: f64,
) -> Vector3<f64> {
    if is_significant(ang_vel) {
        ang_vel * (-rolling_friction * normal_force.abs() * radius / ang_vel.norm())
    } else {
        Vector3::zeros()
    }
}
