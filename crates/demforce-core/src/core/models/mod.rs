//! # Models Module
//!
//! Data holders for the state the force models read and write: particles, particle-particle
//! contacts and solid bonds. Each entity is available both as a plain record (for per-record
//! evaluation) and as a structure-of-arrays buffer (for batched evaluation), with lossless
//! conversion in both directions.

use thiserror::Error;

pub mod bond;
pub mod contact;
pub mod ids;
pub mod particle;
pub mod pbc;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PairError {
    #[error("Particle index {index} is out of range for {count} particle(s)")]
    ParticleOutOfRange { index: usize, count: usize },
    #[error("Particle {0} cannot be paired with itself")]
    SelfPair(usize),
}

pub(crate) fn check_pair(a: usize, b: usize, count: usize) -> Result<(), PairError> {
    for index in [a, b] {
        if index >= count {
            return Err(PairError::ParticleOutOfRange { index, count });
        }
    }
    if a == b {
        return Err(PairError::SelfPair(a));
    }
    Ok(())
}
