//! Pace analysis against the program window.
//!
//! The window is `time_limit_months * 30` days. Months are a fixed 30 days,
//! not calendar months; downstream on-track results depend on that constant.

use chrono::{Duration, NaiveDate, NaiveTime};
use qualtrack_core::{CoreError, Result, Schedule, Time, DAYS_PER_MONTH};
use serde::{Deserialize, Serialize};

/// Observed days per completed task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    /// Days per task, rounded to one decimal
    Known(f64),
    /// No task completed yet, so there is no observed pace
    Unknown,
}

impl Pace {
    /// Days per task, if observed.
    pub fn days_per_task(&self) -> Option<f64> {
        match self {
            Pace::Known(days) => Some(*days),
            Pace::Unknown => None,
        }
    }
}

/// Projected days needed to finish the remaining tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Whole days at the current pace
    Days(i64),
    /// Pace unknown, so no projection
    Unknown,
}

impl Projection {
    /// Projected days, if known.
    pub fn days(&self) -> Option<i64> {
        match self {
            Projection::Days(days) => Some(*days),
            Projection::Unknown => None,
        }
    }
}

/// Inputs to [`analyze_pace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceInput {
    /// Tasks signed off
    pub completed_count: usize,

    /// Tasks in the curriculum
    pub total_tasks: usize,

    /// Program window in months
    pub time_limit_months: u32,

    /// Enrollment start date
    pub start_date: NaiveDate,

    /// Evaluation instant
    pub now: Time,
}

impl PaceInput {
    /// Take total tasks and time limit from a schedule.
    pub fn for_schedule(schedule: &Schedule, completed_count: usize, start_date: NaiveDate, now: Time) -> Self {
        Self {
            completed_count,
            total_tasks: schedule.total_tasks(),
            time_limit_months: schedule.program().time_limit_months,
            start_date,
            now,
        }
    }
}

/// Result of pace analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceAnalysis {
    /// Whole days since enrollment, at least 1
    pub elapsed_days: i64,

    /// Program window in days
    pub target_days: i64,

    /// Days left in the window; negative once overrun
    pub remaining_days: i64,

    /// Tasks not yet signed off
    pub tasks_left: usize,

    /// Observed days per task
    pub pace_per_task: Pace,

    /// Days needed for the remaining tasks at the observed pace
    pub projected_days_needed: Projection,

    /// Last day of the program window
    pub deadline: NaiveDate,

    /// Projected finish date
    pub projected_completion: Option<NaiveDate>,

    /// Projected finish within the window, or already complete
    pub on_track: bool,

    /// Every task signed off
    pub complete: bool,
}

impl PaceAnalysis {
    /// Remaining days minus projected days; `None` when the pace is unknown.
    pub fn slack_days(&self) -> Option<i64> {
        self.projected_days_needed
            .days()
            .map(|needed| self.remaining_days - needed)
    }
}

/// `date + days`, or `None` when the result leaves chrono's date range.
fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Analyze a student's pace.
///
/// Rejects `completed_count > total_tasks`, an empty curriculum and a zero
/// month window with [`CoreError::InvalidArgument`]; nothing is clamped.
pub fn analyze_pace(input: &PaceInput) -> Result<PaceAnalysis> {
    if input.total_tasks == 0 {
        return Err(CoreError::invalid("total tasks must be at least 1"));
    }
    if input.completed_count > input.total_tasks {
        return Err(CoreError::invalid(format!(
            "completed count {} exceeds total tasks {}",
            input.completed_count, input.total_tasks
        )));
    }
    if input.time_limit_months == 0 {
        return Err(CoreError::invalid("time limit must be at least one month"));
    }

    let start = input.start_date.and_time(NaiveTime::default()).and_utc();
    let elapsed_days = (input.now - start).num_days().max(1);
    let target_days = i64::from(input.time_limit_months) * DAYS_PER_MONTH;
    let remaining_days = target_days - elapsed_days;
    let tasks_left = input.total_tasks - input.completed_count;
    let complete = tasks_left == 0;

    let pace_per_task = if input.completed_count > 0 {
        Pace::Known(round1(elapsed_days as f64 / input.completed_count as f64))
    } else {
        Pace::Unknown
    };

    let projected_days_needed = match pace_per_task {
        Pace::Known(pace) => Projection::Days((pace * tasks_left as f64).round() as i64),
        Pace::Unknown => Projection::Unknown,
    };

    let on_track = complete
        || matches!(projected_days_needed, Projection::Days(needed) if needed <= remaining_days);

    let today = input.now.date_naive();
    let projected_completion = match projected_days_needed.days() {
        Some(days) => Some(add_days(today, days).ok_or_else(|| {
            CoreError::invalid(format!(
                "projected completion {} days after {} is out of date range",
                days, today
            ))
        })?),
        None => None,
    };
    let deadline = add_days(input.start_date, target_days).ok_or_else(|| {
        CoreError::invalid(format!(
            "deadline {} days after {} is out of date range",
            target_days, input.start_date
        ))
    })?;

    Ok(PaceAnalysis {
        elapsed_days,
        target_days,
        remaining_days,
        tasks_left,
        pace_per_task,
        projected_days_needed,
        deadline,
        projected_completion,
        on_track,
        complete,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Time {
        NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
            .and_utc()
    }

    fn input(completed: usize, days_ago: i64) -> PaceInput {
        PaceInput {
            completed_count: completed,
            total_tasks: 65,
            time_limit_months: 36,
            start_date: now().date_naive() - Duration::days(days_ago),
            now: now(),
        }
    }

    #[test]
    fn test_on_pace_student() {
        let pace = analyze_pace(&input(42, 100)).unwrap();
        assert_eq!(pace.elapsed_days, 100);
        assert_eq!(pace.target_days, 1080);
        assert_eq!(pace.pace_per_task, Pace::Known(2.4));
        assert_eq!(pace.tasks_left, 23);
        assert_eq!(pace.projected_days_needed, Projection::Days(55));
        assert_eq!(pace.remaining_days, 980);
        assert!(pace.on_track);
        assert!(!pace.complete);
        assert_eq!(pace.slack_days(), Some(925));
        assert_eq!(
            pace.projected_completion,
            Some(NaiveDate::from_ymd_opt(2026, 7, 26).unwrap())
        );
    }

    #[test]
    fn test_behind_pace_student() {
        let pace = analyze_pace(&input(3, 200)).unwrap();
        assert_eq!(pace.pace_per_task, Pace::Known(66.7));
        assert_eq!(pace.tasks_left, 62);
        assert_eq!(pace.projected_days_needed, Projection::Days(4135));
        assert_eq!(pace.remaining_days, 880);
        assert!(!pace.on_track);
    }

    #[test]
    fn test_zero_completions_has_unknown_pace() {
        let pace = analyze_pace(&input(0, 30)).unwrap();
        assert_eq!(pace.pace_per_task, Pace::Unknown);
        assert_eq!(pace.projected_days_needed, Projection::Unknown);
        assert_eq!(pace.projected_completion, None);
        assert_eq!(pace.slack_days(), None);
        assert!(!pace.on_track);
        assert!(!pace.complete);
    }

    #[test]
    fn test_enrollment_day_floors_at_one() {
        let pace = analyze_pace(&input(1, 0)).unwrap();
        assert_eq!(pace.elapsed_days, 1);
        assert_eq!(pace.pace_per_task, Pace::Known(1.0));

        // a start date in the future is not an error
        let pace = analyze_pace(&input(0, -10)).unwrap();
        assert_eq!(pace.elapsed_days, 1);
    }

    #[test]
    fn test_partial_day_is_floored() {
        let mut i = input(10, 0);
        i.now = i.now + Duration::days(5) + Duration::hours(23);
        assert_eq!(analyze_pace(&i).unwrap().elapsed_days, 6);
    }

    #[test]
    fn test_complete_is_on_track_even_when_overrun() {
        let pace = analyze_pace(&input(65, 1200)).unwrap();
        assert!(pace.complete);
        assert!(pace.on_track);
        assert_eq!(pace.tasks_left, 0);
        assert_eq!(pace.remaining_days, -120);
        assert_eq!(pace.projected_days_needed, Projection::Days(0));
    }

    #[test]
    fn test_overrun_window_is_negative_remaining() {
        let pace = analyze_pace(&input(60, 1100)).unwrap();
        assert_eq!(pace.remaining_days, -20);
        assert!(!pace.on_track);
    }

    #[test]
    fn test_deadline_uses_thirty_day_months() {
        let pace = analyze_pace(&input(1, 10)).unwrap();
        let start = now().date_naive() - Duration::days(10);
        assert_eq!(pace.deadline, start + Duration::days(1080));
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(matches!(analyze_pace(&input(66, 10)), Err(CoreError::InvalidArgument(_))));

        let mut empty = input(0, 10);
        empty.total_tasks = 0;
        assert!(matches!(analyze_pace(&empty), Err(CoreError::InvalidArgument(_))));

        let mut no_window = input(1, 10);
        no_window.time_limit_months = 0;
        assert!(matches!(analyze_pace(&no_window), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_window_past_date_range_is_rejected() {
        let mut i = input(0, 10);
        i.time_limit_months = 4_000_000;
        assert!(matches!(analyze_pace(&i), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_projection_past_date_range_is_rejected() {
        let mut i = input(1, 0);
        i.start_date = NaiveDate::MIN;
        assert!(matches!(analyze_pace(&i), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_idempotent() {
        let i = input(17, 250);
        assert_eq!(analyze_pace(&i).unwrap(), analyze_pace(&i).unwrap());
    }

    #[test]
    fn test_complete_only_transitions_forward() {
        let mut was_complete = false;
        for completed in 0..=65 {
            let pace = analyze_pace(&input(completed, 400)).unwrap();
            assert!(!(was_complete && !pace.complete));
            was_complete = pace.complete;
        }
        assert!(was_complete);
    }

    #[test]
    fn test_for_schedule_reads_program() {
        let schedule = Schedule::standard();
        let i = PaceInput::for_schedule(&schedule, 5, now().date_naive(), now());
        assert_eq!(i.total_tasks, 65);
        assert_eq!(i.time_limit_months, 36);
    }
}
