//! # demforce
//!
//! The force-computation core of a discrete-element simulation: temperature- and
//! pressure-dependent material properties, interaction properties for particle pairs, and
//! contact, bond and field models that can run on a per-record host path or a batched
//! structure-of-arrays path with identical results.
//!
//! ## Architectural Philosophy
//!
//! The library has three layers:
//!
//! - **[`core`]: The Foundation.** Stateless data and pure physics: the materials database
//!   and its correlations, the interaction property resolver, the particle/contact/bond data
//!   holders, and the force models with their parameter sets.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer that runs one force step. It owns the
//!   configured models and the per-temperature interaction table, and drives the host and
//!   batch execution paths in the same pass order.
//!
//! - **[`workflows`]: The Public API.** Evaluates a described snapshot end to end, on either
//!   path, and compares the two.

pub mod core;
pub mod engine;
pub mod workflows;
