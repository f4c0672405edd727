//! Downloadable JSON report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    active_employee_count, completion_trend, work_status, workload, CompletionRatePoint,
    StatusSlice, WorkloadEntry,
};
use crate::errors::AppError;
use crate::models::{Task, User};

/// The exported report document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportExport {
    pub generated_at: DateTime<Utc>,
    /// Name of the user who requested the export
    pub user: String,
    pub workload_data: Vec<WorkloadEntry>,
    /// Scoped to the requesting user
    pub work_status_data: Vec<StatusSlice>,
    pub completion_rate_data: Vec<CompletionRatePoint>,
    pub total_tasks: usize,
    pub total_employees: usize,
}

impl ReportExport {
    pub fn build(tasks: &[Task], users: &[User], viewer: &User, now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            user: viewer.name.clone(),
            workload_data: workload(users, tasks),
            work_status_data: work_status(tasks, viewer),
            completion_rate_data: completion_trend(tasks, now),
            total_tasks: tasks.len(),
            total_employees: active_employee_count(users),
        }
    }

    /// `intellotask-report-<YYYY-MM-DD>.json`, dated by `generated_at`.
    pub fn file_name(&self) -> String {
        format!(
            "intellotask-report-{}.json",
            self.generated_at.format("%Y-%m-%d")
        )
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report into `dir`, creating it if needed, and return the file path.
    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_json_pretty()?).await?;

        tracing::info!("Report exported to {}", path.display());
        Ok(path)
    }
}
