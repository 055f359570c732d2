//! Storage collaborator traits.

use std::collections::HashSet;

use async_trait::async_trait;
use qualtrack_core::{Enrollment, StudentId, TaskId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Item already exists
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Mutation conflicts with the current record state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Actor is not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Read access to signoffs.
#[async_trait]
pub trait SignoffStore: Send + Sync {
    /// Task ids with an active signoff for the student.
    async fn active_completed_task_ids(&self, student: &StudentId) -> Result<HashSet<TaskId>>;
}

/// Read access to enrollments.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Load one student's enrollment.
    async fn enrollment(&self, student: &StudentId) -> Result<Option<Enrollment>>;

    /// List every enrollment.
    async fn list_enrollments(&self) -> Result<Vec<Enrollment>>;
}
