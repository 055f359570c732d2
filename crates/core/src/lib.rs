//! qualtrack core data models.
//!
//! Curriculum schedule, enrollment records, identifiers and the error
//! taxonomy shared by the progress and certification crates.

#![warn(missing_docs)]

mod id;
mod error;
mod schedule;
mod curriculum;
mod enrollment;
mod clock;

pub use id::*;
pub use error::{CoreError, Result};
pub use schedule::{
    Category, Gate, GateKind, Program, Schedule, ScheduleDef, Task, DAYS_PER_MONTH,
    MAX_TIME_LIMIT_MONTHS,
};
pub use curriculum::STANDARD_TIME_LIMIT_MONTHS;
pub use enrollment::{Attempt, Enrollment, Signoff, SignoffStatus};
pub use clock::{Clock, FixedClock, SystemClock};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
