//! Dashboard widgets, task lists and the employee directory.

use serde::{Deserialize, Serialize};

use super::{percentage, UNKNOWN_USER};
use crate::models::{Task, TaskFilter, TaskPriority, TaskStatus, User};

/// Number of tasks shown in the dashboard overview.
pub const RECENT_TASK_LIMIT: usize = 5;

/// Tasks visible to `viewer`: everything for admins, own assignments for employees.
pub fn scoped_tasks<'a>(tasks: &'a [Task], viewer: &User) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| viewer.is_admin() || task.is_assigned_to(&viewer.id))
        .collect()
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTally {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl StatusTally {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut tally, task| {
            match task.status {
                TaskStatus::Pending => tally.pending += 1,
                TaskStatus::InProgress => tally.in_progress += 1,
                TaskStatus::Completed => tally.completed += 1,
            }
            tally
        })
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed
    }

    pub fn completion_rate(&self) -> u32 {
        percentage(self.completed, self.total())
    }
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTally {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityTally {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut tally, task| {
            match task.priority {
                TaskPriority::Low => tally.low += 1,
                TaskPriority::Medium => tally.medium += 1,
                TaskPriority::High => tally.high += 1,
            }
            tally
        })
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

pub fn active_employees(users: &[User]) -> Vec<&User> {
    users.iter().filter(|user| user.is_active_employee()).collect()
}

pub fn active_employee_count(users: &[User]) -> usize {
    users.iter().filter(|user| user.is_active_employee()).count()
}

/// Name of the user with `user_id`, or the unknown-user label for a dangling reference.
pub fn assignee_name<'a>(users: &'a [User], user_id: &str) -> &'a str {
    users
        .iter()
        .find(|user| user.id == user_id)
        .map(|user| user.name.as_str())
        .unwrap_or(UNKNOWN_USER)
}

/// Widgets on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub status: StatusTally,
    /// Only shown to admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_employees: Option<usize>,
    pub recent_tasks: Vec<Task>,
}

impl Dashboard {
    pub fn build(tasks: &[Task], users: &[User], viewer: &User) -> Self {
        let visible = scoped_tasks(tasks, viewer);

        Self {
            status: StatusTally::from_tasks(visible.iter().copied()),
            active_employees: viewer.is_admin().then(|| active_employee_count(users)),
            recent_tasks: visible
                .into_iter()
                .take(RECENT_TASK_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

/// Role-scoped tasks narrowed by `filter`, in stored order.
pub fn filter_tasks<'a>(tasks: &'a [Task], viewer: &User, filter: &TaskFilter) -> Vec<&'a Task> {
    scoped_tasks(tasks, viewer)
        .into_iter()
        .filter(|task| filter.matches(task))
        .collect()
}

/// One kanban column.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Group tasks into pending, in-progress and completed columns.
pub fn kanban_board<'a>(tasks: &[&'a Task]) -> Vec<BoardColumn<'a>> {
    TaskStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            tasks: tasks
                .iter()
                .copied()
                .filter(|task| task.status == status)
                .collect(),
        })
        .collect()
}

/// Completed versus total assigned tasks for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
}

impl TaskProgress {
    pub fn for_user(tasks: &[Task], user_id: &str) -> Self {
        let assigned = tasks.iter().filter(|task| task.is_assigned_to(user_id));
        assigned.fold(Self::default(), |mut progress, task| {
            progress.total += 1;
            if task.status == TaskStatus::Completed {
                progress.completed += 1;
            }
            progress
        })
    }

    pub fn percent(&self) -> u32 {
        percentage(self.completed, self.total)
    }
}

/// Filters for the employee directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    /// Case-insensitive substring matched against name and email
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !user.name.to_lowercase().contains(&term)
                && !user.email.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        match &self.department {
            Some(department) => user.department.as_ref() == Some(department),
            None => true,
        }
    }
}

pub fn filter_users<'a>(users: &'a [User], filter: &UserFilter) -> Vec<&'a User> {
    users.iter().filter(|user| filter.matches(user)).collect()
}

/// Distinct non-empty departments in first-seen order.
pub fn departments(users: &[User]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for department in users.iter().filter_map(|user| user.department.as_deref()) {
        if !department.is_empty() && !seen.iter().any(|d| d == department) {
            seen.push(department.to_string());
        }
    }
    seen
}
