//! # Core Module
//!
//! Stateless building blocks of the force computation.
//!
//! ## Architecture
//!
//! - **Materials** ([`materials`]) - property catalogue, piecewise temperature/pressure
//!   correlations, compounds, pair interactions and their loaders
//! - **Interaction Properties** ([`interaction`]) - equivalent properties of a material pair
//!   and the per-step interaction table
//! - **Data Holders** ([`models`]) - particles, contact states, solid bonds and periodic
//!   boundaries, as records and as structure-of-arrays buffers
//! - **Force Models** ([`forces`]) - parameter sets, model traits, the concrete contact, bond
//!   and field models and their registry
//! - **Utilities** ([`utils`]) - vector guards and small-angle rotations
//!
//! ## Units
//!
//! All quantities are SI: metres, kilograms, seconds, kelvin and pascal.

pub mod forces;
pub mod interaction;
pub mod materials;
pub mod models;
pub mod utils;
