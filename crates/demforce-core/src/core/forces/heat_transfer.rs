use super::parameters::{ModelParameter, ParameterSet};
use super::traits::{FieldContribution, FieldModel, Model, ModelDescriptor, ModelFamily, StepContext};
use crate::core::models::particle::Particle;
use std::f64::consts::PI;

/// Stefan-Boltzmann constant [W/(m2*K4)].
pub const STEFAN_BOLTZMANN: f64 = 5.670374419e-8;

pub static DESCRIPTOR: ModelDescriptor = ModelDescriptor {
    name: "Heat transfer",
    unique_key: "E2F7C3D1A9B84C6F8D5E4A3B2C1D0E9F",
    family: ModelFamily::ExternalField,
    batch_support: true,
};

static PARAMETERS: [ModelParameter; 3] = [
    ModelParameter {
        key: "ENV_TEMPERATURE",
        description: "Environment temperature",
        unit: "K",
        default: 293.15,
    },
    ModelParameter {
        key: "HEAT_TRANSFER_COEFF",
        description: "Heat transfer coefficient",
        unit: "W/(m2*K)",
        default: 10.0,
    },
    ModelParameter {
        key: "EMISSIVITY",
        description: "Surface emissivity",
        unit: "-",
        default: 0.0,
    },
];

/// Convective and radiative heat exchange between each particle and its surroundings.
#[derive(Debug, Clone)]
pub struct HeatTransferModel {
    parameters: ParameterSet,
}

impl Default for HeatTransferModel {
    fn default() -> Self {
        Self {
            parameters: ParameterSet::new(&PARAMETERS),
        }
    }
}

impl HeatTransferModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for HeatTransferModel {
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

impl FieldModel for HeatTransferModel {
    fn evaluate(&self, _ctx: &StepContext, params: &[f64], particle: &Particle) -> FieldContribution {
        let (env_temperature, coefficient, emissivity) = (params[0], params[1], params[2]);
        let area = 4.0 * PI * particle.radius * particle.radius;
        let t = particle.temperature;
        let convection = coefficient * (env_temperature - t);
        let radiation = emissivity * STEFAN_BOLTZMANN * (env_temperature.powi(4) - t.powi(4));
        FieldContribution {
            heat_flux: area * (convection + radiation),
            ..FieldContribution::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use std::collections::HashMap;

    fn particle(temperature: f64) -> Particle {
        Particle::new(Vector3::zeros(), 0.5 / PI.sqrt(), 1.0, 0).with_temperature(temperature)
    }

    #[test]
    fn particle_at_environment_temperature_exchanges_nothing() {
        let model = HeatTransferModel::new();
        let out = model.evaluate(
            &StepContext::new(0.0, 1e-3),
            model.parameters().values(),
            &particle(293.15),
        );
        assert_eq!(out.heat_flux, 0.0);
        assert_eq!(out.force, Vector3::zeros());
    }

    #[test]
    fn hot_particle_loses_heat_by_convection() {
        let model = HeatTransferModel::new();
        // Surface area of the test particle is 1 m2.
        let out = model.evaluate(
            &StepContext::new(0.0, 1e-3),
            model.parameters().values(),
            &particle(303.15),
        );
        assert!((out.heat_flux + 100.0).abs() < 1e-9);
    }

    #[test]
    fn radiation_term_follows_stefan_boltzmann_law() {
        let mut model = HeatTransferModel::new();
        model
            .configure(&HashMap::from([
                ("HEAT_TRANSFER_COEFF".to_string(), 0.0),
                ("EMISSIVITY".to_string(), 1.0),
                ("ENV_TEMPERATURE".to_string(), 0.0),
            ]))
            .unwrap();
        let out = model.evaluate(
            &StepContext::new(0.0, 1e-3),
            model.parameters().values(),
            &particle(100.0),
        );
        assert!((out.heat_flux + STEFAN_BOLTZMANN * 1e8).abs() < 1e-9);
    }
}
