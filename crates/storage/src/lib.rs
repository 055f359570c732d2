//! Storage collaborators for qualtrack.
//!
//! Signoff and enrollment traits, an in-memory implementation and the
//! role visibility filter applied at the data-access boundary.

#![warn(missing_docs)]

pub mod trait_;
pub mod access;
pub mod memory;

pub use trait_::{EnrollmentStore, Result, SignoffStore, StorageError};
pub use access::{Actor, Role, VisibilityFilter};
pub use memory::{MemoryStore, Roster, RosterSignoff};
