//! Structure-of-arrays execution path.
//!
//! Kernels gather one record per index from the buffers, evaluate it with the flat marshaled
//! parameters and return the results; nothing is written until every index of a pass has
//! been evaluated. The scatter step then stores the records and accumulates particle loads.

use super::error::EngineError;
use super::tasks::field_forces::combined_contribution;
use crate::core::forces::parameters::BatchParameters;
use crate::core::forces::tally::ForceTally;
use crate::core::forces::traits::{
    BondEvent, BondModel, ContactModel, FieldContribution, FieldModel, StepContext,
};
use crate::core::interaction::table::InteractionTable;
use crate::core::models::bond::{SolidBond, SolidBondBuffers};
use crate::core::models::contact::{ContactBuffers, ContactState};
use crate::core::models::particle::ParticleBuffers;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn unpack_context(time: f64, dt: f64, params: &BatchParameters) -> Result<StepContext, EngineError> {
    let pbc = params
        .pbc()
        .ok_or_else(|| EngineError::Internal("malformed periodic boundary block".to_string()))?;
    Ok(StepContext::new(time, dt).with_pbc(pbc))
}

fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<(), EngineError> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::BufferLength {
            buffer,
            expected,
            actual,
        })
    }
}

/// Checks that every column of the buffers has the same length as its first column.
pub fn check_buffers(
    particles: &ParticleBuffers,
    contacts: &ContactBuffers,
    bonds: &SolidBondBuffers,
) -> Result<(), EngineError> {
    let n = particles.len();
    check_len("particles.vels", n, particles.vels.len())?;
    check_len("particles.ang_vels", n, particles.ang_vels.len())?;
    check_len("particles.radii", n, particles.radii.len())?;
    check_len("particles.masses", n, particles.masses.len())?;
    check_len("particles.temperatures", n, particles.temperatures.len())?;
    check_len("particles.materials", n, particles.materials.len())?;
    check_len("particles.forces", n, particles.forces.len())?;
    check_len("particles.moments", n, particles.moments.len())?;
    check_len("particles.heat_fluxes", n, particles.heat_fluxes.len())?;

    let c = contacts.len();
    check_len("contacts.ids", c, contacts.ids.len())?;
    check_len("contacts.dst", c, contacts.dst.len())?;
    check_len("contacts.contact_vectors", c, contacts.contact_vectors.len())?;
    check_len("contacts.normal_overlaps", c, contacts.normal_overlaps.len())?;
    check_len("contacts.equiv_radii", c, contacts.equiv_radii.len())?;
    check_len("contacts.equiv_masses", c, contacts.equiv_masses.len())?;
    check_len("contacts.tang_overlaps", c, contacts.tang_overlaps.len())?;
    check_len("contacts.tang_forces", c, contacts.tang_forces.len())?;
    check_len("contacts.total_forces", c, contacts.total_forces.len())?;
    check_len("contacts.moments_src", c, contacts.moments_src.len())?;
    check_len("contacts.moments_dst", c, contacts.moments_dst.len())?;

    let b = bonds.len();
    check_len("bonds.right", b, bonds.right.len())?;
    check_len("bonds.diameters", b, bonds.diameters.len())?;
    check_len("bonds.cross_cuts", b, bonds.cross_cuts.len())?;
    check_len("bonds.axial_moments", b, bonds.axial_moments.len())?;
    check_len("bonds.initial_lengths", b, bonds.initial_lengths.len())?;
    check_len("bonds.normal_stiffnesses", b, bonds.normal_stiffnesses.len())?;
    check_len("bonds.tangential_stiffnesses", b, bonds.tangential_stiffnesses.len())?;
    check_len("bonds.normal_strengths", b, bonds.normal_strengths.len())?;
    check_len("bonds.tangential_strengths", b, bonds.tangential_strengths.len())?;
    check_len("bonds.time_therm_exp_coeffs", b, bonds.time_therm_exp_coeffs.len())?;
    check_len("bonds.prev_bonds", b, bonds.prev_bonds.len())?;
    check_len("bonds.tangential_overlaps", b, bonds.tangential_overlaps.len())?;
    check_len("bonds.normal_moments", b, bonds.normal_moments.len())?;
    check_len("bonds.tangential_moments", b, bonds.tangential_moments.len())?;
    check_len("bonds.tangential_forces", b, bonds.tangential_forces.len())?;
    check_len("bonds.total_forces", b, bonds.total_forces.len())?;
    check_len("bonds.unsym_moments", b, bonds.unsym_moments.len())?;
    check_len("bonds.active", b, bonds.active.len())?;
    check_len("bonds.end_activities", b, bonds.end_activities.len())
}

/// Evaluates every contact of the buffers and scatters the results.
#[instrument(skip_all, name = "batch_contact_kernel", fields(contacts = contacts.len()))]
pub fn contact_pass(
    model: &dyn ContactModel,
    time: f64,
    dt: f64,
    params: &BatchParameters,
    table: &InteractionTable,
    particles: &mut ParticleBuffers,
    contacts: &mut ContactBuffers,
) -> Result<ForceTally, EngineError> {
    let ctx = unpack_context(time, dt, params)?;
    let model_params = params.model();

    let gathered: &ParticleBuffers = particles;
    let records: &ContactBuffers = contacts;

    #[cfg(not(feature = "parallel"))]
    let indices = 0..records.len();

    #[cfg(feature = "parallel")]
    let indices = (0..records.len()).into_par_iter();

    let results: Vec<(ContactState, u32)> = indices
        .map(|i| {
            let mut state = records.get(i);
            let src = gathered.get(state.src);
            let dst = gathered.get(state.dst);
            state.update_geometry(&src, &dst, &ctx.pbc);
            let props = table.get_or_undefined(src.material, dst.material);
            let skipped = model.evaluate(&ctx, model_params, &src, &dst, &props, &mut state);
            (state, skipped)
        })
        .collect();

    let mut tally = ForceTally::default();
    for (i, (state, skipped)) in results.iter().enumerate() {
        contacts.set(i, state);
        particles.forces[state.src] += state.total_force;
        particles.forces[state.dst] -= state.total_force;
        particles.moments[state.src] += state.moment_src;
        particles.moments[state.dst] += state.moment_dst;
        tally += ForceTally::contact(*skipped);
    }
    Ok(tally)
}

/// Evaluates every bond of the buffers; failures are counted by reducing the kernel results.
#[instrument(skip_all, name = "batch_bond_kernel", fields(bonds = bonds.len()))]
pub fn bond_pass(
    model: &dyn BondModel,
    time: f64,
    dt: f64,
    params: &BatchParameters,
    particles: &mut ParticleBuffers,
    bonds: &mut SolidBondBuffers,
) -> Result<ForceTally, EngineError> {
    let ctx = unpack_context(time, dt, params)?;
    let model_params = params.model();

    let gathered: &ParticleBuffers = particles;
    let records: &SolidBondBuffers = bonds;

    #[cfg(not(feature = "parallel"))]
    let indices = 0..records.len();

    #[cfg(feature = "parallel")]
    let indices = (0..records.len()).into_par_iter();

    let results: Vec<(SolidBond, BondEvent)> = indices
        .map(|i| {
            let mut bond = records.get(i);
            let left = gathered.get(bond.left);
            let right = gathered.get(bond.right);
            let event = model.evaluate(&ctx, model_params, &left, &right, &mut bond);
            (bond, event)
        })
        .collect();

    let tally: ForceTally = results
        .iter()
        .map(|(_, event)| match event {
            BondEvent::Inactive => ForceTally::default(),
            BondEvent::Intact => ForceTally::bond(false),
            BondEvent::Broken => ForceTally::bond(true),
        })
        .sum();

    for (i, (bond, event)) in results.iter().enumerate() {
        if *event == BondEvent::Inactive {
            continue;
        }
        bonds.set_state(i, bond);
        if bond.active {
            apply_bond_to_buffers(bond, particles);
        }
    }
    Ok(tally)
}

fn apply_bond_to_buffers(bond: &SolidBond, particles: &mut ParticleBuffers) {
    let moment = bond.normal_moment + bond.tangential_moment;
    particles.forces[bond.left] += bond.total_force;
    particles.moments[bond.left] += moment - bond.unsym_moment;
    particles.forces[bond.right] -= bond.total_force;
    particles.moments[bond.right] -= moment + bond.unsym_moment;
}

/// Applies every field model to every particle of the buffers.
#[instrument(skip_all, name = "batch_field_kernel", fields(particles = particles.len()))]
pub fn field_pass(
    models: &[Box<dyn FieldModel>],
    time: f64,
    dt: f64,
    params: &[BatchParameters],
    particles: &mut ParticleBuffers,
) -> Result<ForceTally, EngineError> {
    let Some(first) = params.first() else {
        return Ok(ForceTally::default());
    };
    let ctx = unpack_context(time, dt, first)?;
    let model_params: Vec<&[f64]> = params.iter().map(BatchParameters::model).collect();

    let gathered: &ParticleBuffers = particles;

    #[cfg(not(feature = "parallel"))]
    let indices = 0..gathered.len();

    #[cfg(feature = "parallel")]
    let indices = (0..gathered.len()).into_par_iter();

    let results: Vec<FieldContribution> = indices
        .map(|i| combined_contribution(models, &ctx, &model_params, &gathered.get(i)))
        .collect();

    for (i, contribution) in results.iter().enumerate() {
        particles.forces[i] += contribution.force;
        particles.moments[i] += contribution.moment;
        particles.heat_fluxes[i] += contribution.heat_flux;
    }
    Ok(ForceTally {
        field_particles: results.len(),
        ..ForceTally::default()
    })
}
