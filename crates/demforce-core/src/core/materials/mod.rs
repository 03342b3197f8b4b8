//! # Materials Module
//!
//! Temperature- and pressure-dependent material data for the force models.
//!
//! Every property of a compound (and every explicit property of a pair of compounds) is an
//! ordered set of non-overlapping temperature/pressure intervals, each carrying one
//! correlation formula. Evaluation picks the interval that contains the requested state and
//! reports NaN when none does, so callers can tell "unavailable" apart from a computed zero.
//!
//! - [`properties`] - Property catalogue with identifiers, units and defaults
//! - [`correlation`] - Intervals, correlation formulas and single-property lookup
//! - [`database`] - Compounds, pairwise interactions and file loading

pub mod correlation;
pub mod database;
pub mod properties;
