//! # Workflows Module
//!
//! High-level entry points that tie [`crate::core`] and [`crate::engine`] together.
//!
//! - **Snapshot Evaluation** ([`snapshot`]) - reads a described particle configuration,
//!   builds its contacts and bonds, runs a number of force steps on either execution path
//!   and compares the two paths.

pub mod snapshot;
