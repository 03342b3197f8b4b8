use crate::core::forces::tally::ForceTally;
use crate::core::forces::traits::{FieldContribution, FieldModel, StepContext};
use crate::core::models::particle::Particle;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Applies every field model to every particle.
///
/// Contributions are computed for all particles first and added afterwards, so no model sees
/// another model's output of the same step.
#[instrument(skip_all, name = "field_forces_task", fields(particles = particles.len()))]
pub fn run(
    models: &[Box<dyn FieldModel>],
    ctx: &StepContext,
    params: &[&[f64]],
    particles: &mut [Particle],
) -> ForceTally {
    if models.is_empty() {
        return ForceTally::default();
    }

    #[cfg(not(feature = "parallel"))]
    let iterator = particles.iter();

    #[cfg(feature = "parallel")]
    let iterator = particles.par_iter();

    let contributions: Vec<FieldContribution> = iterator
        .map(|particle| combined_contribution(models, ctx, params, particle))
        .collect();

    for (particle, contribution) in particles.iter_mut().zip(&contributions) {
        apply_contribution(particle, contribution);
    }
    ForceTally {
        field_particles: contributions.len(),
        ..ForceTally::default()
    }
}

#[inline]
pub(crate) fn combined_contribution(
    models: &[Box<dyn FieldModel>],
    ctx: &StepContext,
    params: &[&[f64]],
    particle: &Particle,
) -> FieldContribution {
    models
        .iter()
        .zip(params)
        .fold(FieldContribution::default(), |mut acc, (model, p)| {
            let c = model.evaluate(ctx, p, particle);
            acc.force += c.force;
            acc.moment += c.moment;
            acc.heat_flux += c.heat_flux;
            acc
        })
}

#[inline]
fn apply_contribution(particle: &mut Particle, contribution: &FieldContribution) {
    particle.force += contribution.force;
    particle.moment += contribution.moment;
    particle.heat_flux += contribution.heat_flux;
}
