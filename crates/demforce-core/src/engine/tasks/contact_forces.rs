use crate::core::forces::tally::ForceTally;
use crate::core::forces::traits::{ContactModel, StepContext};
use crate::core::interaction::table::InteractionTable;
use crate::core::models::contact::{ContactState, ContactStore};
use crate::core::models::particle::Particle;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates every contact of the store against the start-of-step particle state.
///
/// Contact geometry is refreshed from the particle positions before the model runs. Particle
/// accumulators are not touched; see [`accumulate`].
#[instrument(skip_all, name = "contact_forces_task", fields(contacts = contacts.len()))]
pub fn run(
    model: &dyn ContactModel,
    ctx: &StepContext,
    params: &[f64],
    particles: &[Particle],
    table: &InteractionTable,
    contacts: &mut ContactStore,
) -> ForceTally {
    let mut states: Vec<&mut ContactState> = contacts.values_mut().collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = states.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = states.par_iter_mut();

    iterator
        .map(|state| evaluate_one(model, ctx, params, particles, table, state))
        .sum()
}

#[inline]
fn evaluate_one(
    model: &dyn ContactModel,
    ctx: &StepContext,
    params: &[f64],
    particles: &[Particle],
    table: &InteractionTable,
    state: &mut ContactState,
) -> ForceTally {
    let src = &particles[state.src];
    let dst = &particles[state.dst];
    state.update_geometry(src, dst, &ctx.pbc);
    let props = table.get_or_undefined(src.material, dst.material);
    ForceTally::contact(model.evaluate(ctx, params, src, dst, &props, state))
}

/// Adds the evaluated contact forces and moments to the particle accumulators.
pub fn accumulate(contacts: &ContactStore, particles: &mut [Particle]) {
    for (_, state) in contacts.iter() {
        particles[state.src].force += state.total_force;
        particles[state.dst].force -= state.total_force;
        particles[state.src].moment += state.moment_src;
        particles[state.dst].moment += state.moment_dst;
    }
}
