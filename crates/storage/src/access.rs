//! Role-based visibility.
//!
//! All role checks live here and run at the data-access boundary, so the
//! calculators never see roles.

use qualtrack_core::{ActorId, Enrollment, Signoff, StudentId};
use serde::{Deserialize, Serialize};

/// Role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolled student
    Student,
    /// Shop evaluator who signs off tasks
    Evaluator,
    /// Program administrator
    Admin,
}

/// Someone acting on the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor id; for students this equals the student id
    pub id: ActorId,

    /// Actor role
    pub role: Role,
}

impl Actor {
    /// Create an actor.
    pub fn new(id: impl Into<ActorId>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    fn is_student(&self, student: &StudentId) -> bool {
        self.role == Role::Student && self.id.as_str() == student.as_str()
    }
}

/// Decides what each role may see and do.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter;

impl VisibilityFilter {
    /// Enrollments the actor may see. Students see only their own.
    pub fn visible_students<'a>(&self, actor: &Actor, enrollments: &'a [Enrollment]) -> Vec<&'a Enrollment> {
        enrollments
            .iter()
            .filter(|e| self.can_view_student(actor, &e.student_id))
            .collect()
    }

    /// Signoffs the actor may see.
    pub fn visible_signoffs<'a>(&self, actor: &Actor, signoffs: &'a [Signoff]) -> Vec<&'a Signoff> {
        signoffs
            .iter()
            .filter(|s| self.can_view_student(actor, &s.student_id))
            .collect()
    }

    /// Whether the actor may see a student's records.
    pub fn can_view_student(&self, actor: &Actor, student: &StudentId) -> bool {
        match actor.role {
            Role::Student => actor.is_student(student),
            Role::Evaluator | Role::Admin => true,
        }
    }

    /// Whether the actor may record a signoff or attempt for the student.
    pub fn can_sign_off(&self, actor: &Actor, student: &StudentId) -> bool {
        match actor.role {
            Role::Student => false,
            Role::Evaluator | Role::Admin => actor.id.as_str() != student.as_str(),
        }
    }

    /// Whether the actor may reverse the signoff. Evaluators may reverse only
    /// their own.
    pub fn can_reverse(&self, actor: &Actor, signoff: &Signoff) -> bool {
        match actor.role {
            Role::Student => false,
            Role::Evaluator => signoff.evaluator_id == actor.id,
            Role::Admin => true,
        }
    }

    /// Whether the actor may record exams, boards and certificates.
    pub fn can_administer(&self, actor: &Actor) -> bool {
        actor.role == Role::Admin
    }

    /// Whether the actor may see the program-wide overview.
    pub fn can_view_overview(&self, actor: &Actor) -> bool {
        actor.role == Role::Admin
    }
}
