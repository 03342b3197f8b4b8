//! # Engine Module
//!
//! Runs force steps over the data holders of [`crate::core::models`] with the models of
//! [`crate::core::forces`].
//!
//! ## Overview
//!
//! A step has three passes in a fixed order: particle-particle contacts, solid bonds, and
//! external fields. Every pass evaluates against the particle state at the start of the step,
//! then accumulates forces, moments and heat fluxes into the particles. The same step can run
//! on two paths that produce the same numbers:
//!
//! - **Host path** ([`tasks`]) - per-record evaluation over particle records, the contact arena
//!   and the bond list, parallel with `rayon` when the `parallel` feature is on.
//! - **Batch path** ([`batch`]) - structure-of-arrays buffers with model parameters marshaled
//!   into flat slices; results are collected for every index before anything is written back.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - model selection and run-wide settings
//! - **Step Orchestration** ([`context`]) - [`context::ForceEngine`], the interaction table
//!   cache and per-step reports
//! - **Error Handling** ([`error`]) - engine-specific error types

pub mod batch;
pub mod config;
pub mod context;
pub mod error;
pub mod tasks;
