//! In-memory storage implementation.
//!
//! Holds enrollments, signoffs and not-yet-qualified attempts for one
//! process. Every mutation checks the actor against [`VisibilityFilter`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use qualtrack_core::{
    ActorId, Attempt, Enrollment, Signoff, SignoffId, SignoffStatus, StudentId, TaskId, Time,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::access::{Actor, VisibilityFilter};
use crate::trait_::{EnrollmentStore, Result, SignoffStore, StorageError};

/// A signoff as written in a roster document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSignoff {
    /// Task signed off
    pub task_id: TaskId,
    /// Student
    pub student_id: StudentId,
    /// Evaluator
    pub evaluator_id: ActorId,
    /// When it was recorded
    pub signed_at: Time,
    /// Defaults to active
    #[serde(default = "active")]
    pub status: SignoffStatus,
}

fn active() -> SignoffStatus {
    SignoffStatus::Active
}

/// Seed document for a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Enrolled students
    pub enrollments: Vec<Enrollment>,
    /// Recorded signoffs
    #[serde(default)]
    pub signoffs: Vec<RosterSignoff>,
    /// Recorded not-yet-qualified attempts
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Default)]
struct Records {
    enrollments: BTreeMap<StudentId, Enrollment>,
    signoffs: Vec<Signoff>,
    attempts: Vec<Attempt>,
}

impl Records {
    fn enrollment_mut(&mut self, student: &StudentId) -> Result<&mut Enrollment> {
        self.enrollments
            .get_mut(student)
            .ok_or_else(|| StorageError::NotFound(format!("enrollment for {}", student)))
    }

    fn require_enrolled(&self, student: &StudentId) -> Result<()> {
        if self.enrollments.contains_key(student) {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("enrollment for {}", student)))
        }
    }

    fn push_signoff(&mut self, signoff: Signoff) -> Result<SignoffId> {
        self.require_enrolled(&signoff.student_id)?;
        if signoff.is_active()
            && self.signoffs.iter().any(|s| {
                s.is_active() && s.student_id == signoff.student_id && s.task_id == signoff.task_id
            })
        {
            return Err(StorageError::Duplicate(format!(
                "active signoff for {} on task {}",
                signoff.student_id, signoff.task_id
            )));
        }
        let id = signoff.id;
        self.signoffs.push(signoff);
        Ok(id)
    }
}

/// Process-local store for enrollments and signoffs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
    filter: VisibilityFilter,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a roster document.
    pub fn from_roster(roster: Roster) -> Result<Self> {
        let mut records = Records::default();

        for enrollment in roster.enrollments {
            let student = enrollment.student_id.clone();
            if records.enrollments.insert(student.clone(), enrollment).is_some() {
                return Err(StorageError::Duplicate(format!("enrollment for {}", student)));
            }
        }
        for entry in roster.signoffs {
            let mut signoff = Signoff::new(entry.task_id, entry.student_id, entry.evaluator_id, entry.signed_at);
            signoff.status = entry.status;
            records.push_signoff(signoff)?;
        }
        for attempt in roster.attempts {
            records.require_enrolled(&attempt.student_id)?;
            records.attempts.push(attempt);
        }

        info!(
            enrollments = records.enrollments.len(),
            signoffs = records.signoffs.len(),
            "Loaded roster"
        );

        Ok(Self {
            records: RwLock::new(records),
            filter: VisibilityFilter,
        })
    }

    /// Read a JSON roster file.
    pub async fn load_roster(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let roster: Roster = serde_json::from_str(&raw)?;
        Self::from_roster(roster)
    }

    fn forbid(actor: &Actor, action: &str) -> StorageError {
        warn!(actor = %actor.id, role = ?actor.role, action, "Refused mutation");
        StorageError::Forbidden(format!("{} may not {}", actor.id, action))
    }

    /// Enroll a student.
    pub async fn enroll(&self, actor: &Actor, enrollment: Enrollment) -> Result<()> {
        if !self.filter.can_administer(actor) {
            return Err(Self::forbid(actor, "enroll students"));
        }
        let mut records = self.records.write().await;
        if records.enrollments.contains_key(&enrollment.student_id) {
            return Err(StorageError::Duplicate(format!(
                "enrollment for {}",
                enrollment.student_id
            )));
        }
        info!(student = %enrollment.student_id, start = %enrollment.start_date, "Enrolled student");
        records.enrollments.insert(enrollment.student_id.clone(), enrollment);
        Ok(())
    }

    /// Record an active signoff. A task can carry at most one active signoff
    /// per student.
    pub async fn add_signoff(
        &self,
        actor: &Actor,
        student: &StudentId,
        task: TaskId,
        signed_at: Time,
    ) -> Result<SignoffId> {
        if !self.filter.can_sign_off(actor, student) {
            return Err(Self::forbid(actor, "sign off tasks"));
        }
        let signoff = Signoff::new(task, student.clone(), actor.id.clone(), signed_at);
        let task = signoff.task_id.clone();
        let id = self.records.write().await.push_signoff(signoff)?;
        info!(student = %student, task = %task, evaluator = %actor.id, "Signed off task");
        Ok(id)
    }

    /// Reverse a signoff.
    pub async fn reverse_signoff(&self, actor: &Actor, id: SignoffId) -> Result<()> {
        let mut records = self.records.write().await;
        let signoff = records
            .signoffs
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("signoff {}", id)))?;

        if !self.filter.can_reverse(actor, signoff) {
            return Err(Self::forbid(actor, "reverse this signoff"));
        }
        if !signoff.is_active() {
            return Err(StorageError::Conflict(format!("signoff {} is already reversed", id)));
        }
        signoff.status = SignoffStatus::Reversed;
        info!(signoff = %id, student = %signoff.student_id, task = %signoff.task_id, "Reversed signoff");
        Ok(())
    }

    /// Record a not-yet-qualified attempt.
    pub async fn record_attempt(
        &self,
        actor: &Actor,
        student: &StudentId,
        task: TaskId,
        recorded_at: Time,
        note: impl Into<String>,
    ) -> Result<()> {
        if !self.filter.can_sign_off(actor, student) {
            return Err(Self::forbid(actor, "record attempts"));
        }
        let mut records = self.records.write().await;
        records.require_enrolled(student)?;
        records.attempts.push(Attempt {
            task_id: task,
            student_id: student.clone(),
            evaluator_id: actor.id.clone(),
            recorded_at,
            note: note.into(),
        });
        Ok(())
    }

    /// Record the written exam pass date.
    pub async fn record_written_exam(&self, actor: &Actor, student: &StudentId, date: NaiveDate) -> Result<()> {
        if !self.filter.can_administer(actor) {
            return Err(Self::forbid(actor, "record exams"));
        }
        self.records.write().await.enrollment_mut(student)?.written_exam_date = Some(date);
        info!(student = %student, %date, "Recorded written exam");
        Ok(())
    }

    /// Record the oral board pass date.
    pub async fn record_oral_board(&self, actor: &Actor, student: &StudentId, date: NaiveDate) -> Result<()> {
        if !self.filter.can_administer(actor) {
            return Err(Self::forbid(actor, "record oral boards"));
        }
        self.records.write().await.enrollment_mut(student)?.oral_board_date = Some(date);
        info!(student = %student, %date, "Recorded oral board");
        Ok(())
    }

    /// Issue the certificate. A certificate is issued once.
    pub async fn issue_certificate(&self, actor: &Actor, student: &StudentId, number: impl Into<String>) -> Result<()> {
        if !self.filter.can_administer(actor) {
            return Err(Self::forbid(actor, "issue certificates"));
        }
        let mut records = self.records.write().await;
        let enrollment = records.enrollment_mut(student)?;
        if let Some(existing) = &enrollment.certificate_number {
            return Err(StorageError::Conflict(format!(
                "{} already holds certificate {}",
                student, existing
            )));
        }
        let number = number.into();
        info!(student = %student, certificate = %number, "Issued certificate");
        enrollment.certificate_number = Some(number);
        Ok(())
    }

    /// Every signoff for a student, active and reversed, visible to the actor.
    pub async fn signoffs_for(&self, actor: &Actor, student: &StudentId) -> Result<Vec<Signoff>> {
        if !self.filter.can_view_student(actor, student) {
            return Err(Self::forbid(actor, "view this student"));
        }
        let records = self.records.read().await;
        Ok(self
            .filter
            .visible_signoffs(actor, &records.signoffs)
            .into_iter()
            .filter(|s| &s.student_id == student)
            .cloned()
            .collect())
    }

    /// Not-yet-qualified attempts for a student, visible to the actor.
    pub async fn attempts_for(&self, actor: &Actor, student: &StudentId) -> Result<Vec<Attempt>> {
        if !self.filter.can_view_student(actor, student) {
            return Err(Self::forbid(actor, "view this student"));
        }
        let records = self.records.read().await;
        Ok(records
            .attempts
            .iter()
            .filter(|a| &a.student_id == student)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SignoffStore for MemoryStore {
    async fn active_completed_task_ids(&self, student: &StudentId) -> Result<HashSet<TaskId>> {
        let records = self.records.read().await;
        Ok(records
            .signoffs
            .iter()
            .filter(|s| s.is_active() && &s.student_id == student)
            .map(|s| s.task_id.clone())
            .collect())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn enrollment(&self, student: &StudentId) -> Result<Option<Enrollment>> {
        Ok(self.records.read().await.enrollments.get(student).cloned())
    }

    async fn list_enrollments(&self) -> Result<Vec<Enrollment>> {
        Ok(self.records.read().await.enrollments.values().cloned().collect())
    }
}
