//! Student reports and the program-wide overview.

use std::collections::HashSet;
use std::sync::Arc;

use qualtrack_certification::{current_gate, resolve_gates, GateStatus};
use qualtrack_core::{
    CategoryId, Clock, CoreError, Enrollment, GateKind, Schedule, StudentId, TaskId, Time,
};
use qualtrack_storage::{Actor, EnrollmentStore, SignoffStore, StorageError, VisibilityFilter};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculator::{calculate_progress, ProgressReport};
use crate::pace::{analyze_pace, PaceAnalysis, PaceInput};

/// Error type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors returned by [`QualificationTracker`].
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A calculator rejected its input
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage collaborator failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The student has no enrollment
    #[error("student {0} is not enrolled")]
    NotEnrolled(StudentId),

    /// The actor may not see the requested report
    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Students on track with less slack than this are flagged as tight
    pub at_risk_margin_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            at_risk_margin_days: 30,
        }
    }
}

impl TrackerConfig {
    /// Set the slack margin.
    pub fn with_at_risk_margin(mut self, days: i64) -> Self {
        self.at_risk_margin_days = days;
        self
    }
}

/// Where a student stands in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Every gate passed
    Certified,
    /// Practical tasks done, exams outstanding
    Complete,
    /// Projected to finish inside the window
    OnTrack,
    /// On track, but with less slack than the configured margin
    Tight,
    /// Projected to overrun, or no observed pace yet
    AtRisk,
}

impl Standing {
    /// Classify a student from pace and gate state.
    pub fn classify(pace: &PaceAnalysis, gates: &[GateStatus], margin_days: i64) -> Self {
        if current_gate(gates).is_none() {
            Standing::Certified
        } else if pace.complete {
            Standing::Complete
        } else if !pace.on_track {
            Standing::AtRisk
        } else if pace.slack_days().is_some_and(|slack| slack < margin_days) {
            Standing::Tight
        } else {
            Standing::OnTrack
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Certified => "certified",
            Standing::Complete => "complete",
            Standing::OnTrack => "on_track",
            Standing::Tight => "tight",
            Standing::AtRisk => "at_risk",
        }
    }
}

/// Everything presentation needs for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
    /// Student
    pub student_id: StudentId,

    /// Enrollment start date
    pub start_date: chrono::NaiveDate,

    /// Category and overall completion
    pub progress: ProgressReport,

    /// Pace against the program window
    pub pace: PaceAnalysis,

    /// Certification gates in order
    pub gates: Vec<GateStatus>,

    /// The active gate, if any
    pub current_gate: Option<GateKind>,
}

/// Build a student report from already-fetched inputs.
pub fn build_report(
    schedule: &Schedule,
    enrollment: &Enrollment,
    completed: &HashSet<TaskId>,
    now: Time,
) -> std::result::Result<StudentReport, CoreError> {
    let progress = calculate_progress(schedule, completed)?;
    let pace = analyze_pace(&PaceInput::for_schedule(
        schedule,
        progress.overall.total_done,
        enrollment.start_date,
        now,
    ))?;
    let gates = resolve_gates(schedule.program(), pace.complete, enrollment)?;

    Ok(StudentReport {
        student_id: enrollment.student_id.clone(),
        start_date: enrollment.start_date,
        current_gate: current_gate(&gates),
        progress,
        pace,
        gates,
    })
}

/// One row of the program overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSummary {
    /// Student
    pub student_id: StudentId,

    /// Tasks signed off
    pub tasks_done: usize,

    /// Overall percentage
    pub percent: u8,

    /// Standing
    pub standing: Standing,

    /// Active gate
    pub current_gate: Option<GateKind>,

    /// Projected finish date
    pub projected_completion: Option<chrono::NaiveDate>,

    /// End of the program window
    pub deadline: chrono::NaiveDate,
}

/// Mean completion of one category across students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    /// Category id
    pub id: CategoryId,

    /// Category title
    pub title: String,

    /// Mean percentage, one decimal
    pub average_percent: f64,
}

/// A student left out of the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentIssue {
    /// Student
    pub student_id: StudentId,

    /// Why the report could not be built
    pub reason: String,
}

/// Program-wide view for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramOverview {
    /// When it was computed
    pub generated_at: Time,

    /// One row per student with a valid report
    pub students: Vec<StudentSummary>,

    /// Students holding a certificate
    pub certified: usize,

    /// Students with practical tasks done
    pub complete: usize,

    /// Students on track
    pub on_track: usize,

    /// Students on track with little slack
    pub tight: usize,

    /// Students at risk
    pub at_risk: usize,

    /// Mean overall percentage, one decimal
    pub average_percent: f64,

    /// Mean completion per category
    pub categories: Vec<CategoryAverage>,

    /// Students whose records could not be evaluated
    pub issues: Vec<StudentIssue>,
}

fn mean1(values: impl Iterator<Item = u8>) -> f64 {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + u64::from(v), n + 1));
    if n == 0 {
        return 0.0;
    }
    (sum as f64 / n as f64 * 10.0).round() / 10.0
}

/// Computes reports from the storage collaborators.
///
/// Nothing is cached; every call reads the stores and recomputes.
pub struct QualificationTracker<S, C> {
    store: Arc<S>,
    schedule: Arc<Schedule>,
    clock: C,
    config: TrackerConfig,
    filter: VisibilityFilter,
}

impl<S, C> QualificationTracker<S, C>
where
    S: SignoffStore + EnrollmentStore,
    C: Clock,
{
    /// Create a tracker.
    pub fn new(store: Arc<S>, schedule: Arc<Schedule>, clock: C) -> Self {
        Self {
            store,
            schedule,
            clock,
            config: TrackerConfig::default(),
            filter: VisibilityFilter,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// The schedule in use.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Report for one student.
    pub async fn student_report(&self, student: &StudentId) -> Result<StudentReport> {
        let enrollment = self
            .store
            .enrollment(student)
            .await?
            .ok_or_else(|| TrackerError::NotEnrolled(student.clone()))?;
        let completed = self.store.active_completed_task_ids(student).await?;

        debug!(student = %student, completed = completed.len(), "Computing student report");
        Ok(build_report(&self.schedule, &enrollment, &completed, self.clock.now())?)
    }

    /// Report for one student, if the actor may see that student.
    pub async fn student_report_as(&self, actor: &Actor, student: &StudentId) -> Result<StudentReport> {
        if !self.filter.can_view_student(actor, student) {
            return Err(TrackerError::Forbidden(format!(
                "{} may not view {}",
                actor.id, student
            )));
        }
        self.student_report(student).await
    }

    /// Reports for every student visible to the actor.
    pub async fn visible_reports(&self, actor: &Actor) -> Result<Vec<StudentReport>> {
        let now = self.clock.now();
        let enrollments = self.store.list_enrollments().await?;
        let mut reports = Vec::new();

        for enrollment in self.filter.visible_students(actor, &enrollments) {
            let completed = self
                .store
                .active_completed_task_ids(&enrollment.student_id)
                .await?;
            reports.push(build_report(&self.schedule, enrollment, &completed, now)?);
        }
        Ok(reports)
    }

    /// Program-wide overview, for actors allowed to see it.
    pub async fn program_overview_as(&self, actor: &Actor) -> Result<ProgramOverview> {
        if !self.filter.can_view_overview(actor) {
            return Err(TrackerError::Forbidden(format!(
                "{} may not view the program overview",
                actor.id
            )));
        }
        self.program_overview().await
    }

    /// Program-wide overview.
    ///
    /// Students whose records are inconsistent are listed under `issues`
    /// rather than failing the whole overview.
    pub async fn program_overview(&self) -> Result<ProgramOverview> {
        let now = self.clock.now();
        let margin = self.config.at_risk_margin_days;
        let mut reports = Vec::new();
        let mut issues = Vec::new();

        for enrollment in self.store.list_enrollments().await? {
            let completed = self
                .store
                .active_completed_task_ids(&enrollment.student_id)
                .await?;
            match build_report(&self.schedule, &enrollment, &completed, now) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(student = %enrollment.student_id, error = %e, "Skipping student in overview");
                    issues.push(StudentIssue {
                        student_id: enrollment.student_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let students: Vec<StudentSummary> = reports
            .iter()
            .map(|r| StudentSummary {
                student_id: r.student_id.clone(),
                tasks_done: r.progress.overall.total_done,
                percent: r.progress.overall.percent,
                standing: Standing::classify(&r.pace, &r.gates, margin),
                current_gate: r.current_gate,
                projected_completion: r.pace.projected_completion,
                deadline: r.pace.deadline,
            })
            .collect();

        let count = |standing: Standing| students.iter().filter(|s| s.standing == standing).count();

        let categories = self
            .schedule
            .categories()
            .iter()
            .enumerate()
            .map(|(i, c)| CategoryAverage {
                id: c.id,
                title: c.title.clone(),
                average_percent: mean1(reports.iter().map(|r| r.progress.categories[i].percent)),
            })
            .collect();

        Ok(ProgramOverview {
            generated_at: now,
            certified: count(Standing::Certified),
            complete: count(Standing::Complete),
            on_track: count(Standing::OnTrack),
            tight: count(Standing::Tight),
            at_risk: count(Standing::AtRisk),
            average_percent: mean1(students.iter().map(|s| s.percent)),
            students,
            categories,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use qualtrack_certification::GateState;
    use qualtrack_core::FixedClock;
    use qualtrack_storage::{Actor, MemoryStore, Role};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::at_date(today())
    }

    fn admin() -> Actor {
        Actor::new("root", Role::Admin)
    }

    fn evaluator() -> Actor {
        Actor::new("eve", Role::Evaluator)
    }

    async fn enroll_with(store: &MemoryStore, student: &str, days_ago: i64, tasks: usize) {
        let schedule = Schedule::standard();
        let id: StudentId = student.into();
        store
            .enroll(&admin(), Enrollment::new(id.clone(), today() - Duration::days(days_ago)))
            .await
            .unwrap();
        for task in schedule.task_ids().take(tasks) {
            store
                .add_signoff(&evaluator(), &id, task.clone(), clock().now())
                .await
                .unwrap();
        }
    }

    fn tracker(store: Arc<MemoryStore>) -> QualificationTracker<MemoryStore, FixedClock> {
        QualificationTracker::new(store, Arc::new(Schedule::standard()), clock())
    }

    #[tokio::test]
    async fn test_student_report_on_pace() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "alice", 100, 42).await;

        let report = tracker(store).student_report(&"alice".into()).await.unwrap();
        assert_eq!(report.progress.overall.total_done, 42);
        assert_eq!(report.pace.elapsed_days, 100);
        assert_eq!(report.pace.remaining_days, 980);
        assert!(report.pace.on_track);
        assert_eq!(report.current_gate, Some(GateKind::PracticalTasks));
    }

    #[tokio::test]
    async fn test_all_tasks_done_opens_written_exam() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "bob", 500, 65).await;

        let report = tracker(store).student_report(&"bob".into()).await.unwrap();
        assert_eq!(report.progress.overall.percent, 100);
        assert!(report.pace.complete);
        assert_eq!(report.gates[0].state, GateState::Done);
        assert_eq!(report.gates[1].state, GateState::Active);
        assert_eq!(report.current_gate, Some(GateKind::WrittenExam));
    }

    #[tokio::test]
    async fn test_reversal_is_seen_on_next_read() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "carol", 50, 0).await;
        let carol: StudentId = "carol".into();
        let id = store
            .add_signoff(&evaluator(), &carol, "1-1".into(), clock().now())
            .await
            .unwrap();

        let t = tracker(store.clone());
        assert_eq!(t.student_report(&carol).await.unwrap().progress.overall.total_done, 1);

        store.reverse_signoff(&evaluator(), id).await.unwrap();
        let report = t.student_report(&carol).await.unwrap();
        assert_eq!(report.progress.overall.total_done, 0);
        assert!(!report.pace.on_track);
    }

    #[tokio::test]
    async fn test_not_enrolled() {
        let t = tracker(Arc::new(MemoryStore::new()));
        let err = t.student_report(&"ghost".into()).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotEnrolled(_)));
    }

    #[tokio::test]
    async fn test_program_overview_counts() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "alice", 100, 42).await; // on track
        enroll_with(&store, "bob", 200, 3).await; // at risk
        enroll_with(&store, "carol", 10, 0).await; // no pace yet
        enroll_with(&store, "dave", 700, 65).await; // practical done
        enroll_with(&store, "erin", 900, 65).await;
        let erin: StudentId = "erin".into();
        store.record_written_exam(&admin(), &erin, today()).await.unwrap();
        store.record_oral_board(&admin(), &erin, today()).await.unwrap();
        store.issue_certificate(&admin(), &erin, "QC-1").await.unwrap();

        let overview = tracker(store).program_overview().await.unwrap();
        assert_eq!(overview.students.len(), 5);
        assert_eq!(overview.on_track, 1);
        assert_eq!(overview.at_risk, 2);
        assert_eq!(overview.complete, 1);
        assert_eq!(overview.certified, 1);
        assert_eq!(overview.tight, 0);
        assert!(overview.issues.is_empty());
        assert_eq!(overview.categories.len(), 8);
        // (65 + 5 + 0 + 100 + 100) / 5
        assert_eq!(overview.average_percent, 54.0);
        assert_eq!(overview.generated_at, clock().now());
    }

    #[tokio::test]
    async fn test_overview_reports_inconsistent_students() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "alice", 100, 10).await;
        store
            .record_written_exam(&admin(), &"alice".into(), today())
            .await
            .unwrap();

        let overview = tracker(store).program_overview().await.unwrap();
        assert!(overview.students.is_empty());
        assert_eq!(overview.issues.len(), 1);
        assert_eq!(overview.issues[0].student_id.as_str(), "alice");
        assert_eq!(overview.average_percent, 0.0);
    }

    #[tokio::test]
    async fn test_tight_margin() {
        let store = Arc::new(MemoryStore::new());
        // 40 tasks in 600 days: pace 15.0, 25 left -> 375 needed, 480 remaining
        enroll_with(&store, "frank", 600, 40).await;

        let t = tracker(store.clone()).with_config(TrackerConfig::default().with_at_risk_margin(120));
        let overview = t.program_overview().await.unwrap();
        assert_eq!(overview.students[0].standing, Standing::Tight);

        let t = tracker(store).with_config(TrackerConfig::default().with_at_risk_margin(30));
        let overview = t.program_overview().await.unwrap();
        assert_eq!(overview.students[0].standing, Standing::OnTrack);
    }

    #[tokio::test]
    async fn test_overview_requires_admin() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "alice", 100, 42).await;
        let t = tracker(store);

        let overview = t.program_overview_as(&admin()).await.unwrap();
        assert_eq!(overview.students.len(), 1);

        let err = t.program_overview_as(&evaluator()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden(_)));
        let student = Actor::new("alice", Role::Student);
        assert!(matches!(t.program_overview_as(&student).await, Err(TrackerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reports_follow_visibility() {
        let store = Arc::new(MemoryStore::new());
        enroll_with(&store, "alice", 100, 42).await;
        enroll_with(&store, "bob", 200, 3).await;
        let t = tracker(store);
        let alice = Actor::new("alice", Role::Student);

        let own = t.visible_reports(&alice).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].student_id.as_str(), "alice");
        assert_eq!(t.visible_reports(&evaluator()).await.unwrap().len(), 2);

        assert!(t.student_report_as(&alice, &"alice".into()).await.is_ok());
        let err = t.student_report_as(&alice, &"bob".into()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Forbidden(_)));
    }

    #[test]
    fn test_build_report_is_pure() {
        let schedule = Schedule::standard();
        let enrollment = Enrollment::new("s".into(), today() - Duration::days(30));
        let done: HashSet<TaskId> = schedule.task_ids().take(5).cloned().collect();
        let a = build_report(&schedule, &enrollment, &done, clock().now()).unwrap();
        let b = build_report(&schedule, &enrollment, &done, clock().now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(Standing::classify(&a.pace, &a.gates, 30).as_str(), "on_track");
    }
}
