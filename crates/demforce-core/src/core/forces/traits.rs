use super::ModelError;
use super::parameters::{BatchParameters, ParameterSet};
use crate::core::interaction::resolver::InteractionProperties;
use crate::core::models::bond::SolidBond;
use crate::core::models::contact::ContactState;
use crate::core::models::particle::Particle;
use crate::core::models::pbc::PeriodicBoundaries;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    ParticleParticle,
    SolidBond,
    ExternalField,
}

impl ModelFamily {
    pub fn label(self) -> &'static str {
        match self {
            ModelFamily::ParticleParticle => "particle-particle",
            ModelFamily::SolidBond => "solid bond",
            ModelFamily::ExternalField => "external field",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identity of a model variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: &'static str,
    /// 32-digit hexadecimal key referenced from saved configurations.
    pub unique_key: &'static str,
    pub family: ModelFamily,
    pub batch_support: bool,
}

/// Time information and domain configuration shared by every evaluation of one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    pub time: f64,
    pub dt: f64,
    pub pbc: PeriodicBoundaries,
}

impl StepContext {
    pub fn new(time: f64, dt: f64) -> Self {
        Self {
            time,
            dt,
            pbc: PeriodicBoundaries::disabled(),
        }
    }

    pub fn with_pbc(mut self, pbc: PeriodicBoundaries) -> Self {
        self.pbc = pbc;
        self
    }
}

/// Outcome of evaluating one bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondEvent {
    /// The bond carried load and is still intact.
    Intact,
    /// The bond failed during this evaluation.
    Broken,
    /// The bond was already broken; nothing was computed.
    Inactive,
}

/// Increment a field model adds to one particle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FieldContribution {
    pub force: Vector3<f64>,
    pub moment: Vector3<f64>,
    pub heat_flux: f64,
}

/// Capabilities every force model shares: identity and named scalar parameters.
pub trait Model: fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &'static ModelDescriptor;

    fn parameters(&self) -> &ParameterSet;

    fn parameters_mut(&mut self) -> &mut ParameterSet;

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn has_batch_support(&self) -> bool {
        self.descriptor().batch_support
    }

    /// Applies named parameter values; must be called before the first step.
    fn configure(&mut self, values: &HashMap<String, f64>) -> Result<(), ModelError> {
        let name = self.descriptor().name;
        self.parameters_mut().configure(name, values)
    }

    /// Flattens the parameters and the boundary configuration for a batched evaluation.
    fn marshal(&self, pbc: &PeriodicBoundaries) -> BatchParameters {
        BatchParameters::new(self.parameters(), pbc)
    }
}

pub trait ContactModel: Model {
    /// Computes the forces of one contact and updates its persistent state.
    ///
    /// `params` holds the model parameters in definition order. Returns the number of force
    /// terms that were skipped because the interaction property they depend on is undefined.
    fn evaluate(
        &self,
        ctx: &StepContext,
        params: &[f64],
        src: &Particle,
        dst: &Particle,
        props: &InteractionProperties,
        state: &mut ContactState,
    ) -> u32;
}

pub trait BondModel: Model {
    /// Computes the forces of one bond, updates its state and checks it for failure.
    fn evaluate(
        &self,
        ctx: &StepContext,
        params: &[f64],
        left: &Particle,
        right: &Particle,
        bond: &mut SolidBond,
    ) -> BondEvent;
}

pub trait FieldModel: Model {
    fn evaluate(&self, ctx: &StepContext, params: &[f64], particle: &Particle)
    -> FieldContribution;
}
