//! Per-category and overall completion.

use std::collections::HashSet;

use qualtrack_core::{CategoryId, CoreError, Result, Schedule, TaskId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Completion of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    /// Category id
    pub id: CategoryId,

    /// Category title
    pub title: String,

    /// Tasks defined in the category
    pub total_tasks: usize,

    /// Tasks signed off
    pub done_count: usize,

    /// Rounded percentage (0-100)
    pub percent: u8,
}

/// Completion across the whole curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallProgress {
    /// Tasks signed off
    pub total_done: usize,

    /// Tasks in the curriculum
    pub total_tasks: usize,

    /// Rounded percentage (0-100)
    pub percent: u8,
}

impl OverallProgress {
    /// Whether every task is signed off.
    pub fn is_complete(&self) -> bool {
        self.total_done == self.total_tasks
    }
}

/// Progress for one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// One entry per category, in schedule order
    pub categories: Vec<CategoryProgress>,

    /// Aggregate over all categories
    pub overall: OverallProgress,
}

/// Rounded percentage of `done` over `total`, half rounding up.
///
/// Fails when `total` is zero or `done` exceeds it.
pub fn percent(done: usize, total: usize) -> Result<u8> {
    if total == 0 {
        return Err(CoreError::Configuration(
            "cannot compute a percentage over zero tasks".to_string(),
        ));
    }
    if done > total {
        return Err(CoreError::invalid(format!(
            "{} done exceeds {} total",
            done, total
        )));
    }
    // (100 * done / total) rounded half-up, in integers
    let value = (200 * done + total) / (2 * total);
    Ok(value as u8)
}

/// Compute category and overall completion from a student's active signoffs.
///
/// Task ids that do not belong to the schedule are skipped.
pub fn calculate_progress(schedule: &Schedule, completed: &HashSet<TaskId>) -> Result<ProgressReport> {
    let unknown = completed.iter().filter(|id| !schedule.contains(id)).count();
    if unknown > 0 {
        debug!(unknown, "Ignoring task ids not in the schedule");
    }

    let mut categories = Vec::with_capacity(schedule.categories().len());
    let mut total_done = 0;
    let mut total_tasks = 0;

    for category in schedule.categories() {
        let total = category.tasks.len();
        let done = category
            .tasks
            .iter()
            .filter(|t| completed.contains(&t.id))
            .count();

        if total == 0 {
            return Err(CoreError::Configuration(format!(
                "category {} ({}) has no tasks",
                category.id, category.title
            )));
        }

        categories.push(CategoryProgress {
            id: category.id,
            title: category.title.clone(),
            total_tasks: total,
            done_count: done,
            percent: percent(done, total)?,
        });
        total_done += done;
        total_tasks += total;
    }

    Ok(ProgressReport {
        categories,
        overall: OverallProgress {
            total_done,
            total_tasks,
            percent: percent(total_done, total_tasks)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qualtrack_core::{Category, Program, Task};

    fn ids(list: &[&str]) -> HashSet<TaskId> {
        list.iter().map(|s| TaskId::new(*s)).collect()
    }

    fn ten_task_schedule() -> Schedule {
        let category = Category {
            id: CategoryId(1),
            title: "Safety".to_string(),
            tasks: (1..=10)
                .map(|seq| Task::new(TaskId::for_category(CategoryId(1), seq), "task"))
                .collect(),
        };
        Schedule::new(vec![category], Program::new(36)).unwrap()
    }

    #[test]
    fn test_percent_rounds_to_nearest() {
        assert_eq!(percent(0, 7).unwrap(), 0);
        assert_eq!(percent(7, 7).unwrap(), 100);
        assert_eq!(percent(1, 3).unwrap(), 33);
        assert_eq!(percent(2, 3).unwrap(), 67);
        assert_eq!(percent(1, 8).unwrap(), 13); // 12.5 rounds up
        assert_eq!(percent(42, 65).unwrap(), 65);
    }

    #[test]
    fn test_percent_zero_total_is_configuration_error() {
        assert!(matches!(percent(0, 0), Err(CoreError::Configuration(_))));
        assert!(matches!(percent(3, 2), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_percent_bounds() {
        for total in 1..=65 {
            for done in 0..=total {
                let p = percent(done, total).unwrap();
                assert!(p <= 100);
            }
        }
    }

    #[test]
    fn test_empty_set_is_zero() {
        let report = calculate_progress(&ten_task_schedule(), &HashSet::new()).unwrap();
        assert_eq!(report.categories[0].total_tasks, 10);
        assert_eq!(report.categories[0].done_count, 0);
        assert_eq!(report.categories[0].percent, 0);
        assert_eq!(report.overall.percent, 0);
    }

    #[test]
    fn test_all_tasks_is_hundred() {
        let schedule = Schedule::standard();
        let all: HashSet<TaskId> = schedule.task_ids().cloned().collect();
        let report = calculate_progress(&schedule, &all).unwrap();
        assert_eq!(report.overall.total_done, 65);
        assert_eq!(report.overall.percent, 100);
        assert!(report.overall.is_complete());
        assert!(report.categories.iter().all(|c| c.percent == 100));
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let schedule = ten_task_schedule();
        let report = calculate_progress(&schedule, &ids(&["1-1", "1-2", "9-9", "bogus"])).unwrap();
        assert_eq!(report.categories[0].done_count, 2);
        assert_eq!(report.categories[0].percent, 20);
        assert_eq!(report.overall.total_done, 2);
    }

    #[test]
    fn test_counts_per_category() {
        let schedule = Schedule::standard();
        let report = calculate_progress(&schedule, &ids(&["1-1", "1-2", "2-1", "8-7"])).unwrap();
        assert_eq!(report.categories.len(), 8);
        assert_eq!(report.categories[0].done_count, 2);
        assert_eq!(report.categories[0].percent, 25);
        assert_eq!(report.categories[1].done_count, 1);
        assert_eq!(report.categories[7].done_count, 1);
        assert_eq!(report.overall.total_done, 4);
        assert_eq!(report.overall.percent, 6);
    }

    #[test]
    fn test_idempotent() {
        let schedule = Schedule::standard();
        let done = ids(&["3-1", "3-2", "5-9"]);
        let first = calculate_progress(&schedule, &done).unwrap();
        let second = calculate_progress(&schedule, &done).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_percent_monotone_as_signoffs_grow() {
        let schedule = Schedule::standard();
        let mut done = HashSet::new();
        let mut last = 0;
        for id in schedule.task_ids() {
            done.insert(id.clone());
            let report = calculate_progress(&schedule, &done).unwrap();
            assert!(report.overall.percent >= last);
            last = report.overall.percent;
        }
        assert_eq!(last, 100);
    }
}
