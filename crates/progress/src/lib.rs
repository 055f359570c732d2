//! Progress Tracking (Layer 3)
//!
//! Category completion, pace against the program window, and the
//! student and program reports built on them.

#![warn(missing_docs)]

pub mod calculator;
pub mod pace;
pub mod tracker;

pub use calculator::{calculate_progress, percent, CategoryProgress, OverallProgress, ProgressReport};
pub use pace::{analyze_pace, Pace, PaceAnalysis, PaceInput, Projection};
pub use tracker::{
    build_report, CategoryAverage, ProgramOverview, QualificationTracker, Standing, StudentIssue,
    StudentReport, StudentSummary, TrackerConfig, TrackerError,
};
