use super::parameters::ParameterSet;
use super::tangential::{coulomb_cap, rolling_torque, rotate_tangential_overlap};
use super::traits::{ContactModel, Model, ModelDescriptor, ModelFamily, StepContext};
use crate::core::interaction::resolver::InteractionProperties;
use crate::core::models::contact::ContactState;
use crate::core::models::particle::Particle;
use crate::core::utils::geometry::normalize_or_zero;
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Viscous damping prefactor, `2 sqrt(5/6)` to four decimals.
pub(crate) const DAMPING_FACTOR: f64 = 1.8257;

pub static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "JKR",
    unique_key: "8AC39F3E9D054A548CEB9CD44ACFE751",
    family: ModelFamily::ParticleParticle,
    batch_support: true,
};

/// Adhesive elastic contact after Johnson, Kendall and Roberts with a Mindlin-type
/// tangential spring, Coulomb slip and rolling friction.
#[derive(Debug, Clone)]
pub struct JkrModel {
    parameters: ParameterSet,
}

impl Default for JkrModel {
    fn default() -> Self {
        Self {
            parameters: ParameterSet::empty(),
        }
    }
}

impl JkrModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for JkrModel {
    fn descriptor(&self) -> &'static ModelDescriptor {
        &DESCRIPTOR
    }

    fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }
}

impl ContactModel for JkrModel {
    fn evaluate(
        &self,
        ctx: &StepContext,
        _params: &[f64],
        src: &Particle,
        dst: &Particle,
        props: &InteractionProperties,
        state: &mut ContactState,
    ) -> u32 {
        elastic_contact(ctx.dt, src, dst, props, state, true)
    }
}

/// Elastic contact kernel shared by the JKR and Hertz-Mindlin models.
///
/// With `adhesive` unset the surface-energy term is dropped and the normal force vanishes
/// for non-positive overlaps. Moments are built from the tangential force stored by the
/// previous evaluation.
pub(crate) fn elastic_contact(
    dt: f64,
    src: &Particle,
    dst: &Particle,
    props: &InteractionProperties,
    state: &mut ContactState,
    adhesive: bool,
) -> u32 {
    let mut skipped = 0;
    let radius_sum = src.radius + dst.radius;
    let rc_src = state.contact_vector * (src.radius / radius_sum);
    let rc_dst = state.contact_vector * (-dst.radius / radius_sum);
    let normal = normalize_or_zero(&state.contact_vector);

    let rel_vel = dst.vel + dst.ang_vel.cross(&rc_dst) - (src.vel + src.ang_vel.cross(&rc_src));
    let rel_vel_normal = normal.dot(&rel_vel);
    let rel_vel_tang = rel_vel - normal * rel_vel_normal;

    let overlap = state.normal_overlap.max(0.0);
    let contact_radius = (overlap * state.equiv_radius).sqrt();

    let young = props.equiv_young_modulus;
    let (normal_force, kn) = if young.is_nan() {
        skipped += 1;
        (0.0, 0.0)
    } else {
        let elastic = 4.0 * contact_radius.powi(3) * young / (3.0 * state.equiv_radius);
        let adhesion = if !adhesive {
            0.0
        } else if props.equiv_surface_energy.is_nan() {
            skipped += 1;
            0.0
        } else {
            (8.0 * PI * young * props.equiv_surface_energy * contact_radius.powi(3)).sqrt()
        };
        let force = if adhesive || state.normal_overlap > 0.0 {
            -(elastic - adhesion)
        } else {
            0.0
        };
        (force, 2.0 * young * contact_radius)
    };

    let alpha = if props.alpha.is_nan() {
        skipped += 1;
        0.0
    } else {
        props.alpha
    };
    let damping_force = -DAMPING_FACTOR * alpha * rel_vel_normal * (kn * state.equiv_mass).sqrt();

    let kt = 8.0 * props.equiv_shear_modulus * contact_radius;
    let damping_tang_force = rel_vel_tang * (-DAMPING_FACTOR * alpha * (kt * state.equiv_mass).sqrt());

    let rotated = rotate_tangential_overlap(&state.tang_overlap, &normal);
    state.tang_overlap = rotated + rel_vel_tang * dt;

    let tang_force = if kt.is_nan() || props.sliding_friction.is_nan() {
        skipped += 1;
        Vector3::zeros()
    } else {
        let spring = state.tang_overlap * kt;
        let check = coulomb_cap(
            &spring,
            &state.tang_overlap,
            kt,
            props.sliding_friction * normal_force.abs(),
        );
        state.tang_overlap = check.overlap;
        if check.slipping {
            check.force
        } else {
            check.force + damping_tang_force
        }
    };

    let (rolling_src, rolling_dst) = if props.rolling_friction.is_nan() {
        skipped += 1;
        (Vector3::zeros(), Vector3::zeros())
    } else {
        (
            rolling_torque(&src.ang_vel, props.rolling_friction, normal_force, src.radius),
            rolling_torque(&dst.ang_vel, props.rolling_friction, normal_force, dst.radius),
        )
    };

    let lever = normal.cross(&state.tang_force);
    state.moment_src = lever * src.radius + rolling_src;
    state.moment_dst = lever * dst.radius + rolling_dst;
    state.tang_force = tang_force;
    state.total_force = normal * (normal_force + damping_force) + tang_force;
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::resolver::damping_alpha;
    use crate::core::models::pbc::PeriodicBoundaries;

    const RADIUS: f64 = 1e-3;

    fn properties() -> InteractionProperties {
        InteractionProperties {
            equiv_young_modulus: 1e9,
            equiv_shear_modulus: 4e8,
            equiv_surface_energy: 0.5,
            equiv_thermal_conductivity: 1.0,
            equiv_yield_strength: 1e8,
            restitution: 0.6,
            alpha: damping_alpha(0.6),
            sliding_friction: 0.45,
            rolling_friction: 0.05,
        }
    }

    fn approaching_pair(overlap: f64, speed: f64) -> (Particle, Particle, ContactState) {
        let src = Particle::new(Vector3::zeros(), RADIUS, 4e-6, 0)
            .with_velocity(Vector3::new(speed / 2.0, 0.0, 0.0));
        let dst = Particle::new(Vector3::new(2.0 * RADIUS - overlap, 0.0, 0.0), RADIUS, 4e-6, 0)
            .with_velocity(Vector3::new(-speed / 2.0, 0.0, 0.0));
        let mut state = ContactState::new(&src, &dst, 0, 1);
        state.update_geometry(&src, &dst, &PeriodicBoundaries::disabled());
        (src, dst, state)
    }

    fn evaluate(src: &Particle, dst: &Particle, props: &InteractionProperties, state: &mut ContactState) -> u32 {
        JkrModel::new().evaluate(&StepContext::new(0.0, 1e-7), &[], src, dst, props, state)
    }

    #[test]
    fn large_overlap_gives_repulsive_force_opposing_approach() {
        let (src, dst, mut state) = approaching_pair(1e-5, 0.1);
        assert_eq!(evaluate(&src, &dst, &properties(), &mut state), 0);
        // Source moves along +x toward the destination; the force on it must point back.
        assert!(state.total_force.x < 0.0);
        assert!(state.total_force.y.abs() < 1e-15);
    }

    #[test]
    fn adhesive_term_dominates_near_zero_overlap() {
        let (src, dst, mut state) = approaching_pair(1e-12, 0.0);
        evaluate(&src, &dst, &properties(), &mut state);
        // Attractive: the source is pulled toward the destination.
        assert!(state.total_force.x > 0.0);

        let a = (state.normal_overlap * state.equiv_radius).sqrt();
        let elastic = 4.0 * a.powi(3) * 1e9 / (3.0 * state.equiv_radius);
        let adhesion = (8.0 * PI * 1e9 * 0.5 * a.powi(3)).sqrt();
        assert!((state.total_force.x - (adhesion - elastic)).abs() < 1e-12 * adhesion);
    }

    #[test]
    fn hertzian_part_matches_closed_form_without_surface_energy() {
        let mut props = properties();
        props.equiv_surface_energy = 0.0;
        let (src, dst, mut state) = approaching_pair(1e-5, 0.0);
        evaluate(&src, &dst, &props, &mut state);
        let a = (1e-5f64 * 5e-4).sqrt();
        let expected = 4.0 * a.powi(3) * 1e9 / (3.0 * 5e-4);
        assert!((state.total_force.x + expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn sliding_contact_is_capped_at_coulomb_limit() {
        let (mut src, dst, mut state) = approaching_pair(1e-5, 0.0);
        src.vel = Vector3::new(0.0, -50.0, 0.0);
        state.tang_overlap = Vector3::new(0.0, 1e-3, 0.0);
        evaluate(&src, &dst, &properties(), &mut state);

        let a = (1e-5f64 * 5e-4).sqrt();
        let normal_force = 4.0 * a.powi(3) * 1e9 / (3.0 * 5e-4) - (8.0 * PI * 1e9 * 0.5 * a.powi(3)).sqrt();
        let limit = 0.45 * normal_force.abs();
        assert!((state.tang_force.norm() - limit).abs() < 1e-9 * limit);
        let kt = 8.0 * 4e8 * a;
        assert!((state.tang_overlap * kt - state.tang_force).norm() < 1e-9 * limit);
    }

    #[test]
    fn moments_use_tangential_force_of_previous_evaluation() {
        let (src, dst, mut state) = approaching_pair(1e-5, 0.0);
        state.tang_force = Vector3::new(0.0, 2.0, 0.0);
        evaluate(&src, &dst, &properties(), &mut state);
        // n = +x, lever = x cross (0, 2, 0) = (0, 0, 2).
        assert!((state.moment_src - Vector3::new(0.0, 0.0, 2.0 * RADIUS)).norm() < 1e-15);
        assert!((state.moment_dst - Vector3::new(0.0, 0.0, 2.0 * RADIUS)).norm() < 1e-15);
    }

    #[test]
    fn undefined_modulus_skips_only_the_normal_term() {
        let mut props = properties();
        props.equiv_young_modulus = f64::NAN;
        let (src, dst, mut state) = approaching_pair(1e-5, 0.1);
        let skipped = evaluate(&src, &dst, &props, &mut state);
        assert_eq!(skipped, 1);
        assert!(state.total_force.iter().all(|v| v.is_finite()));
        assert_eq!(state.total_force, Vector3::zeros());
    }

    #[test]
    fn undefined_friction_keeps_advancing_the_overlap() {
        let mut props = properties();
        props.sliding_friction = f64::NAN;
        let (mut src, dst, mut state) = approaching_pair(1e-5, 0.0);
        src.vel = Vector3::new(0.0, 1.0, 0.0);
        let skipped = evaluate(&src, &dst, &props, &mut state);
        assert_eq!(skipped, 1);
        assert_eq!(state.tang_force, Vector3::zeros());
        assert!(state.tang_overlap.y < 0.0);
    }
}
