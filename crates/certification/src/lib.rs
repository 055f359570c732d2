//! Certification pipeline (Layer 4)
//!
//! Resolves which certification gate a student has reached.

#![warn(missing_docs)]

pub mod gate;

pub use gate::{current_gate, resolve_gates, GateState, GateStatus};
