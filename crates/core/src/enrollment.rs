//! Enrollment and signoff records owned by the storage collaborators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{ActorId, SignoffId, StudentId, TaskId};
use crate::Time;

/// A student's enrollment in the program.
///
/// Created once at program entry; exam and certificate fields are filled in
/// by administrative actions as the student advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Enrolled student
    pub student_id: StudentId,

    /// First day of the program window
    pub start_date: NaiveDate,

    /// When the written exam was passed
    #[serde(default)]
    pub written_exam_date: Option<NaiveDate>,

    /// When the oral board was passed
    #[serde(default)]
    pub oral_board_date: Option<NaiveDate>,

    /// Issued certificate number
    #[serde(default)]
    pub certificate_number: Option<String>,
}

impl Enrollment {
    /// Create a fresh enrollment.
    pub fn new(student_id: StudentId, start_date: NaiveDate) -> Self {
        Self {
            student_id,
            start_date,
            written_exam_date: None,
            oral_board_date: None,
            certificate_number: None,
        }
    }

    /// Set the written exam date.
    pub fn with_written_exam(mut self, date: NaiveDate) -> Self {
        self.written_exam_date = Some(date);
        self
    }

    /// Set the oral board date.
    pub fn with_oral_board(mut self, date: NaiveDate) -> Self {
        self.oral_board_date = Some(date);
        self
    }

    /// Set the certificate number.
    pub fn with_certificate(mut self, number: impl Into<String>) -> Self {
        self.certificate_number = Some(number.into());
        self
    }
}

/// Signoff status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignoffStatus {
    /// Counts toward completion
    Active,
    /// Withdrawn by an evaluator or admin
    Reversed,
}

/// An evaluator's confirmation that a student demonstrated a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signoff {
    /// Unique identifier
    pub id: SignoffId,

    /// Task signed off
    pub task_id: TaskId,

    /// Student who demonstrated it
    pub student_id: StudentId,

    /// Evaluator who observed it
    pub evaluator_id: ActorId,

    /// When it was recorded
    pub signed_at: Time,

    /// Current status
    pub status: SignoffStatus,
}

impl Signoff {
    /// Create an active signoff.
    pub fn new(task_id: TaskId, student_id: StudentId, evaluator_id: ActorId, signed_at: Time) -> Self {
        Self {
            id: SignoffId::new(),
            task_id,
            student_id,
            evaluator_id,
            signed_at,
            status: SignoffStatus::Active,
        }
    }

    /// Whether the signoff counts toward completion.
    pub fn is_active(&self) -> bool {
        self.status == SignoffStatus::Active
    }
}

/// A not-yet-qualified attempt. Never counts toward completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Task attempted
    pub task_id: TaskId,

    /// Student who attempted it
    pub student_id: StudentId,

    /// Evaluator who observed it
    pub evaluator_id: ActorId,

    /// When it was recorded
    pub recorded_at: Time,

    /// Evaluator's note
    #[serde(default)]
    pub note: String,
}
