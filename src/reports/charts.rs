//! Chart series for the reports page.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{active_employee_count, active_employees, percentage, scoped_tasks, StatusTally};
use crate::models::{Task, TaskStatus, User};

/// Calendar months covered by the completion trend, current month included.
pub const TREND_MONTHS: u32 = 6;

/// Stacked-bar entry: one active employee's tasks by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadEntry {
    pub name: String,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub total: usize,
}

/// Workload of every active employee, in user order.
pub fn workload(users: &[User], tasks: &[Task]) -> Vec<WorkloadEntry> {
    active_employees(users)
        .into_iter()
        .map(|employee| {
            let tally = StatusTally::from_tasks(
                tasks.iter().filter(|task| task.is_assigned_to(&employee.id)),
            );
            WorkloadEntry {
                name: employee.name.clone(),
                completed: tally.completed,
                in_progress: tally.in_progress,
                pending: tally.pending,
                total: tally.total(),
            }
        })
        .collect()
}

/// Pie-chart slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSlice {
    pub name: String,
    pub value: usize,
    pub color: String,
}

fn status_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "#10B981",
        TaskStatus::InProgress => "#3B82F6",
        TaskStatus::Pending => "#F59E0B",
    }
}

/// Status breakdown of the tasks visible to `viewer`: completed, in progress, pending.
pub fn work_status(tasks: &[Task], viewer: &User) -> Vec<StatusSlice> {
    let tally = StatusTally::from_tasks(scoped_tasks(tasks, viewer));
    [
        TaskStatus::Completed,
        TaskStatus::InProgress,
        TaskStatus::Pending,
    ]
    .into_iter()
    .map(|status| StatusSlice {
        name: status.label().to_string(),
        value: tally.get(status),
        color: status_color(status).to_string(),
    })
    .collect()
}

/// Completion rate of the tasks created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRatePoint {
    /// e.g. `Oct 2026`
    pub month: String,
    pub completion_rate: u32,
    pub total_tasks: usize,
    pub completed_tasks: usize,
}

/// First day of the month `back` months before the month containing `now`.
fn month_start(now: DateTime<Utc>, back: u32) -> NaiveDate {
    let index = now.year() * 12 + now.month0() as i32 - back as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_else(|| now.date_naive())
}

/// Six points, oldest first, ending with the month containing `now`.
///
/// Tasks are bucketed by the calendar month (UTC) of `created_at`; a month without tasks
/// reports a rate of 0.
pub fn completion_trend(tasks: &[Task], now: DateTime<Utc>) -> Vec<CompletionRatePoint> {
    (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let start = month_start(now, back);
            let in_month = tasks.iter().filter(|task| {
                task.created_at.year() == start.year() && task.created_at.month() == start.month()
            });
            let tally = StatusTally::from_tasks(in_month);

            CompletionRatePoint {
                month: start.format("%b %Y").to_string(),
                completion_rate: percentage(tally.completed, tally.total()),
                total_tasks: tally.total(),
                completed_tasks: tally.completed,
            }
        })
        .collect()
}

/// Headline numbers on the reports page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    pub active_employees: usize,
    pub avg_tasks_per_employee: usize,
}

impl ReportSummary {
    pub fn build(tasks: &[Task], users: &[User], viewer: &User) -> Self {
        let tally = StatusTally::from_tasks(scoped_tasks(tasks, viewer));
        let active = active_employee_count(users);
        let avg = if active == 0 {
            0
        } else {
            (tally.total() as f64 / active as f64).round() as usize
        };

        Self {
            total_tasks: tally.total(),
            completed_tasks: tally.completed,
            completion_rate: tally.completion_rate(),
            active_employees: active,
            avg_tasks_per_employee: avg,
        }
    }
}
