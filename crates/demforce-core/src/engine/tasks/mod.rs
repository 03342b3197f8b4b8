//! Per-record force tasks of the host execution path.
//!
//! Each task evaluates one model family over individually addressed records, in parallel when
//! the `parallel` feature is enabled, and leaves particle accumulation to a separate pass so
//! that every evaluation reads only start-of-step state.

pub mod bond_forces;
pub mod contact_forces;
pub mod field_forces;
