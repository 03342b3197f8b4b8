use super::jkr::elastic_contact;
use super::parameters::ParameterSet;
use super::traits::{ContactModel, Model, ModelDescriptor, ModelFamily, StepContext};
use crate::core::interaction::resolver::InteractionProperties;
use crate::core::models::contact::ContactState;
use crate::core::models::particle::Particle;

pub static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Hertz-Mindlin",
    unique_key: "B18A46C2786D4D44B925A8A04D0D1098",
    family: ModelFamily::ParticleParticle,
    batch_support: true,
};

/// Non-adhesive elastic contact; the JKR kernel without the surface-energy term.
#[derive(Debug, Clone)]
pub struct HertzMindlinModel {
    parameters: ParameterSet,
}

impl Default for HertzMindlinModel {
    fn default() -> Self {
        Self {
            parameters: ParameterSet::empty(),
        }
    }
}

impl HertzMindlinModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for HertzMindlinModel {
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

impl ContactModel for HertzMindlinModel {
    fn evaluate(
        &self,
        ctx: &StepContext,
        _params: &[f64],
        src: &Particle,
        dst: &Particle,
        props: &InteractionProperties,
        state: &mut ContactState,
    ) -> u32 {
        elastic_contact(ctx.dt, src, dst, props, state, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::resolver::damping_alpha;
    use crate::core::models::pbc::PeriodicBoundaries;
    use nalgebra::Vector3;

    fn properties() -> InteractionProperties {
        InteractionProperties {
            equiv_young_modulus: 1e9,
            equiv_shear_modulus: 4e8,
            equiv_surface_energy: f64::NAN,
            equiv_thermal_conductivity: 1.0,
            equiv_yield_strength: 1e8,
            restitution: 0.6,
            alpha: damping_alpha(0.6),
            sliding_friction: 0.45,
            rolling_friction: 0.05,
        }
    }

    fn contact(gap: f64) -> (Particle, Particle, ContactState) {
        let src = Particle::new(Vector3::zeros(), 1e-3, 4e-6, 0);
        let dst = Particle::new(Vector3::new(2e-3 + gap, 0.0, 0.0), 1e-3, 4e-6, 0);
        let mut state = ContactState::new(&src, &dst, 0, 1);
        state.update_geometry(&src, &dst, &PeriodicBoundaries::disabled());
        (src, dst, state)
    }

    #[test]
    fn overlapping_spheres_repel_without_needing_surface_energy() {
        let (src, dst, mut state) = contact(-1e-5);
        let skipped = HertzMindlinModel::new().evaluate(
            &StepContext::new(0.0, 1e-7),
            &[],
            &src,
            &dst,
            &properties(),
            &mut state,
        );
        assert_eq!(skipped, 0);
        assert!(state.total_force.x < 0.0);
    }

    #[test]
    fn separated_spheres_feel_no_force() {
        let (src, dst, mut state) = contact(1e-5);
        HertzMindlinModel::new().evaluate(
            &StepContext::new(0.0, 1e-7),
            &[],
            &src,
            &dst,
            &properties(),
            &mut state,
        );
        assert_eq!(state.total_force, Vector3::zeros());
    }
}
