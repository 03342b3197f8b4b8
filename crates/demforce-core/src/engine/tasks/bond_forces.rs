use crate::core::forces::tally::ForceTally;
use crate::core::forces::traits::{BondEvent, BondModel, StepContext};
use crate::core::models::bond::SolidBond;
use crate::core::models::particle::Particle;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Evaluates every active bond; bonds that fail are counted on `broken`.
#[instrument(skip_all, name = "bond_forces_task", fields(bonds = bonds.len()))]
pub fn run(
    model: &dyn BondModel,
    ctx: &StepContext,
    params: &[f64],
    particles: &[Particle],
    bonds: &mut [SolidBond],
    broken: &AtomicU32,
) -> ForceTally {
    #[cfg(not(feature = "parallel"))]
    let iterator = bonds.iter_mut();

    #[cfg(feature = "parallel")]
    let iterator = bonds.par_iter_mut();

    let tally: ForceTally = iterator
        .map(|bond| {
            let event =
                model.evaluate(ctx, params, &particles[bond.left], &particles[bond.right], bond);
            match event {
                BondEvent::Inactive => ForceTally::default(),
                BondEvent::Intact => ForceTally::bond(false),
                BondEvent::Broken => {
                    broken.fetch_add(1, Ordering::Relaxed);
                    ForceTally::bond(true)
                }
            }
        })
        .sum();

    if tally.broken_bonds > 0 {
        debug!(broken = tally.broken_bonds, time = ctx.time, "Solid bonds failed");
    }
    tally
}

/// Adds the loads of every still-active bond to its two particles.
pub fn accumulate(bonds: &[SolidBond], particles: &mut [Particle]) {
    for bond in bonds.iter().filter(|b| b.active) {
        apply_bond(bond, particles);
    }
}

#[inline]
fn apply_bond(bond: &SolidBond, particles: &mut [Particle]) {
    let moment = bond.normal_moment + bond.tangential_moment;
    particles[bond.left].force += bond.total_force;
    particles[bond.left].moment += moment - bond.unsym_moment;
    particles[bond.right].force -= bond.total_force;
    particles[bond.right].moment -= moment + bond.unsym_moment;
}
