use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::PairError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Setup failed: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid particle pair: {source}")]
    Pair {
        #[from]
        source: PairError,
    },

    #[error("Particle {particle} refers to material {material}, but only {count} material(s) are configured")]
    UnknownMaterial {
        particle: usize,
        material: usize,
        count: usize,
    },

    #[error("Bond {bond} has an undefined {property}")]
    UndefinedBondProperty { bond: usize, property: &'static str },

    #[error("Bond {bond} has a non-positive {property} ({value})")]
    DegenerateBondGeometry {
        bond: usize,
        property: &'static str,
        value: f64,
    },

    #[error("Model '{model}' cannot run on the batch path")]
    BatchUnsupported { model: &'static str },

    #[error("Buffer '{buffer}' holds {actual} entries, expected {expected}")]
    BufferLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
