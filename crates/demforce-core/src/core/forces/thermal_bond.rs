use super::parameters::{ModelParameter, ParameterSet};
use super::traits::{BondEvent, BondModel, Model, ModelDescriptor, ModelFamily, StepContext};
use crate::core::models::bond::SolidBond;
use crate::core::models::particle::Particle;
use crate::core::utils::geometry::{normalize_or_zero, small_rotation_correction};

pub static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Thermal bond",
    unique_key: "0CA458A6CCEF45C09BECD0D49306B86D",
    family: ModelFamily::SolidBond,
    batch_support: true,
};

static PARAMETERS: [ModelParameter; 2] = [
    ModelParameter {
        key: "THERM_DIFF",
        description: "Temperature difference",
        unit: "K",
        default: 800.0,
    },
    ModelParameter {
        key: "MU",
        description: "Damping factor",
        unit: "-",
        default: 1.0,
    },
];

const THERM_DIFF: usize = 0;
const MU: usize = 1;

/// Elastic-viscous beam bond whose rest length grows with time through thermal expansion.
#[derive(Debug, Clone)]
pub struct ThermalBondModel {
    parameters: ParameterSet,
}

impl Default for ThermalBondModel {
    fn default() -> Self {
        Self {
            parameters: ParameterSet::new(&PARAMETERS),
        }
    }
}

impl ThermalBondModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for ThermalBondModel {
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

impl BondModel for ThermalBondModel {
    fn evaluate(
        &self,
        ctx: &StepContext,
        params: &[f64],
        left: &Particle,
        right: &Particle,
        bond: &mut SolidBond,
    ) -> BondEvent {
        if !bond.active {
            return BondEvent::Inactive;
        }
        let delta_t = params[THERM_DIFF];
        let mu = params[MU];
        let dt = ctx.dt;

        let rel_ang_vel = left.ang_vel - right.ang_vel;
        let current_bond = ctx.pbc.bond_vector(&right.coord, &left.coord);
        let distance = current_bond.norm();
        let r_ac = current_bond * 0.5;

        let sum_ang_vel = left.ang_vel + right.ang_vel;
        let rel_vel = left.vel - right.vel - sum_ang_vel.cross(&r_ac);

        let normal = normalize_or_zero(&current_bond);
        let rotation_axis = bond.prev_bond.cross(&current_bond);
        let twist = normal * (sum_ang_vel.dot(&normal) * dt * 0.5);
        let m = small_rotation_correction(&rotation_axis, &twist);

        let normal_vel = normal * normal.dot(&rel_vel);
        let tang_vel = rel_vel - normal_vel;
        let normal_ang_vel = normal * normal.dot(&rel_ang_vel);
        let tang_ang_vel = rel_ang_vel - normal_ang_vel;

        let current_length =
            bond.initial_length * (1.0 + delta_t * bond.time_therm_exp_coeff * ctx.time);
        let strain = (distance - current_length) / current_length;

        let axial_stiffness = bond.cross_cut * bond.normal_stiffness;
        let mut normal_force = normal * (-axial_stiffness * strain);
        let mut damping = -mu * normal_vel * axial_stiffness * strain.abs();
        if damping.norm() > normal_force.norm() {
            damping *= normal_force.norm() / damping.norm();
        }
        normal_force += damping;

        let shear_stiffness = bond.tangential_stiffness * bond.cross_cut / bond.initial_length;
        bond.tangential_overlap = m * bond.tangential_overlap - tang_vel * dt;
        bond.tangential_force = bond.tangential_overlap * shear_stiffness;
        let mut tang_damping = -mu * tang_vel.cross(&bond.tangential_overlap) * shear_stiffness;
        if tang_damping.norm() > bond.tangential_force.norm() {
            tang_damping *= bond.tangential_force.norm() / tang_damping.norm();
        }
        bond.tangential_force += tang_damping;

        bond.normal_moment = m * bond.normal_moment
            - normal_ang_vel
                * (dt * 2.0 * bond.axial_moment * bond.tangential_stiffness / bond.initial_length);
        bond.tangential_moment = m * bond.tangential_moment
            - tang_ang_vel * (dt * bond.normal_stiffness * bond.axial_moment / bond.initial_length);
        bond.total_force = normal_force + bond.tangential_force;
        bond.unsym_moment = r_ac.cross(&bond.tangential_force);
        bond.prev_bond = current_bond;

        let mut force_length = normal_force.norm();
        if strain <= 0.0 {
            force_length = -force_length;
        }
        let max_stress = force_length / bond.cross_cut
            + bond.tangential_moment.norm() * bond.diameter / (2.0 * bond.axial_moment);
        let max_torque = bond.tangential_force.norm() / bond.cross_cut
            + bond.normal_moment.norm() * bond.diameter / (2.0 * 2.0 * bond.axial_moment);

        if max_stress >= bond.normal_strength || max_torque >= bond.tangential_strength {
            bond.active = false;
            bond.end_activity = ctx.time;
            BondEvent::Broken
        } else {
            BondEvent::Intact
        }
    }
}
