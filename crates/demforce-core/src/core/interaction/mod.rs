//! # Interaction Module
//!
//! Turns the properties of two compounds (and any explicit pairwise entry) into the derived
//! quantities a contact model consumes: equivalent moduli, surface energy, damping and
//! friction coefficients.
//!
//! [`resolver`] holds the mixing rules and a per-pair resolver; [`table`] caches the resolved
//! bundle of every material pair of a run at one temperature.

pub mod resolver;
pub mod table;
