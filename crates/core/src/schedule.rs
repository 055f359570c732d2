//! Schedule store - the immutable curriculum and program definition.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::id::{CategoryId, TaskId};

/// Fixed month length used for program windows.
///
/// Not calendar-accurate; pace and on-track results depend on this exact value.
pub const DAYS_PER_MONTH: i64 = 30;

/// Longest accepted program window.
pub const MAX_TIME_LIMIT_MONTHS: u32 = 1200;

/// A practical task a student must demonstrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task id, `<category>-<seq>`
    pub id: TaskId,

    /// What the student has to demonstrate
    pub description: String,
}

impl Task {
    /// Create a task.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// A curriculum category with its ordered tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id, embedded as the prefix of every task id
    pub id: CategoryId,

    /// Display title
    pub title: String,

    /// Ordered tasks
    pub tasks: Vec<Task>,
}

/// A stage of the certification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// All practical tasks signed off
    PracticalTasks,
    /// Written exam passed
    WrittenExam,
    /// Oral board passed
    OralBoard,
    /// Certificate issued
    CertificateIssued,
}

impl GateKind {
    /// Every gate in pipeline order.
    pub const ALL: [GateKind; 4] = [
        GateKind::PracticalTasks,
        GateKind::WrittenExam,
        GateKind::OralBoard,
        GateKind::CertificateIssued,
    ];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GateKind::PracticalTasks => "practical_tasks",
            GateKind::WrittenExam => "written_exam",
            GateKind::OralBoard => "oral_board",
            GateKind::CertificateIssued => "certificate_issued",
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One step of the certification flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// 1-based position in the flow
    pub step: u32,

    /// Which gate this is
    pub name: GateKind,
}

/// Program-wide parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Window for completing the program, in months
    pub time_limit_months: u32,

    /// Ordered certification gates
    pub certification_flow: Vec<Gate>,
}

impl Program {
    /// A program with the canonical four-gate flow.
    pub fn new(time_limit_months: u32) -> Self {
        let certification_flow = GateKind::ALL
            .iter()
            .zip(1..)
            .map(|(&name, step)| Gate { step, name })
            .collect();
        Self {
            time_limit_months,
            certification_flow,
        }
    }

    /// Program window in days, using [`DAYS_PER_MONTH`].
    pub fn target_days(&self) -> i64 {
        i64::from(self.time_limit_months) * DAYS_PER_MONTH
    }
}

/// Unvalidated schedule document, as read from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDef {
    /// Categories in display order
    pub categories: Vec<Category>,

    /// Program parameters
    pub program: Program,
}

/// The validated, immutable curriculum.
///
/// Every instance upholds the schedule invariants: at least one category,
/// at least one task per category, unique ids, task ids prefixed by their
/// category id, a non-zero time limit and the canonical gate flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleDef", into = "ScheduleDef")]
pub struct Schedule {
    categories: Vec<Category>,
    program: Program,
    index: HashMap<TaskId, CategoryId>,
}

impl Schedule {
    /// Validate and build a schedule.
    pub fn new(categories: Vec<Category>, program: Program) -> Result<Self> {
        validate(&categories, &program)?;

        let index = categories
            .iter()
            .flat_map(|c| c.tasks.iter().map(move |t| (t.id.clone(), c.id)))
            .collect::<HashMap<_, _>>();

        debug!(
            categories = categories.len(),
            tasks = index.len(),
            "Schedule validated"
        );

        Ok(Self {
            categories,
            program,
            index,
        })
    }

    /// Parse and validate a JSON schedule document.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: ScheduleDef = serde_json::from_str(json)
            .map_err(|e| CoreError::config(format!("unreadable schedule: {}", e)))?;
        Self::try_from(def)
    }

    /// Categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Program parameters.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Total task count across all categories.
    pub fn total_tasks(&self) -> usize {
        self.index.len()
    }

    /// Whether the task belongs to this schedule.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// Category owning the task, if known.
    pub fn category_of(&self, id: &TaskId) -> Option<CategoryId> {
        self.index.get(id).copied()
    }

    /// Look up a category.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a task.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        let category = self.category(self.category_of(id)?)?;
        category.tasks.iter().find(|t| &t.id == id)
    }

    /// Iterate every task id in curriculum order.
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.categories
            .iter()
            .flat_map(|c| c.tasks.iter().map(|t| &t.id))
    }

    /// Program window in days.
    pub fn target_days(&self) -> i64 {
        self.program.target_days()
    }
}

impl TryFrom<ScheduleDef> for Schedule {
    type Error = CoreError;

    fn try_from(def: ScheduleDef) -> Result<Self> {
        Self::new(def.categories, def.program)
    }
}

impl From<Schedule> for ScheduleDef {
    fn from(schedule: Schedule) -> Self {
        Self {
            categories: schedule.categories,
            program: schedule.program,
        }
    }
}

fn validate(categories: &[Category], program: &Program) -> Result<()> {
    if categories.is_empty() {
        return Err(CoreError::config("schedule has no categories"));
    }

    let id_format = Regex::new(r"^([1-9][0-9]*)-([1-9][0-9]*)$")
        .map_err(|e| CoreError::config(e.to_string()))?;

    let mut category_ids = HashSet::new();
    let mut task_ids = HashSet::new();

    for category in categories {
        if !category_ids.insert(category.id) {
            return Err(CoreError::config(format!(
                "duplicate category id {}",
                category.id
            )));
        }
        if category.tasks.is_empty() {
            return Err(CoreError::config(format!(
                "category {} ({}) has no tasks",
                category.id, category.title
            )));
        }

        for task in &category.tasks {
            let Some(caps) = id_format.captures(task.id.as_str()) else {
                return Err(CoreError::config(format!(
                    "task id '{}' is not of the form <category>-<seq>",
                    task.id
                )));
            };
            if caps[1] != category.id.to_string() {
                return Err(CoreError::config(format!(
                    "task '{}' is listed under category {}",
                    task.id, category.id
                )));
            }
            if !task_ids.insert(task.id.clone()) {
                return Err(CoreError::config(format!("duplicate task id '{}'", task.id)));
            }
        }
    }

    if program.time_limit_months == 0 {
        return Err(CoreError::config("time limit must be at least one month"));
    }
    if program.time_limit_months > MAX_TIME_LIMIT_MONTHS {
        return Err(CoreError::config(format!(
            "time limit of {} months exceeds {}",
            program.time_limit_months, MAX_TIME_LIMIT_MONTHS
        )));
    }

    let canonical = GateKind::ALL
        .iter()
        .zip(1..)
        .all(|(&kind, step)| {
            program
                .certification_flow
                .get(step as usize - 1)
                .is_some_and(|g| g.step == step && g.name == kind)
        });
    if !canonical || program.certification_flow.len() != GateKind::ALL.len() {
        return Err(CoreError::config(
            "certification flow must be practical_tasks, written_exam, oral_board, certificate_issued at steps 1-4",
        ));
    }

    Ok(())
}
