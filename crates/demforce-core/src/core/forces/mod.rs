//! # Forces Module
//!
//! The family of force models and the contract they share.
//!
//! Every model owns a named list of scalar parameters and evaluates one gathered record at a
//! time through a pure `evaluate` function that takes those parameters as a flat slice. The
//! per-record (host) and structure-of-arrays (batch) execution paths in [`crate::engine`]
//! both call the same function, so both produce the same numbers.
//!
//! - [`traits`] - Model traits, descriptors and the per-step context
//! - [`parameters`] - Named parameter sets and the flat batch parameter buffer
//! - [`tangential`] - Friction-spring transport, slip cap and rolling friction
//! - [`jkr`], [`hertz_mindlin`] - Particle-particle contact models
//! - [`thermal_bond`] - Thermally expanding elastic-viscous solid bond
//! - [`heat_transfer`] - Convective and radiative exchange with the environment
//! - [`registry`] - Lookup of models by name or unique key
//! - [`tally`] - Per-step counters

use thiserror::Error;

pub mod heat_transfer;
pub mod hertz_mindlin;
pub mod jkr;
pub mod parameters;
pub mod registry;
pub mod tally;
pub mod tangential;
pub mod thermal_bond;
pub mod traits;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ModelError {
    #[error("Model '{model}' has no parameter named '{key}'")]
    UnknownParameter { model: &'static str, key: String },
    #[error("Parameter '{key}' of model '{model}' must be finite, got {value}")]
    InvalidParameterValue {
        model: &'static str,
        key: &'static str,
        value: f64,
    },
    #[error("No force model is registered under '{0}'")]
    UnknownModel(String),
    #[error("Model '{name}' is a {actual} model, expected a {expected} model")]
    WrongFamily {
        name: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}
