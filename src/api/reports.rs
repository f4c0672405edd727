//! Dashboard and report operations.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::User;
use crate::reports::{Dashboard, ReportExport, ReportSummary};

pub async fn dashboard<S: Storage>(
    store: &DataService<S>,
    actor: &User,
) -> Result<Dashboard, AppError> {
    let tasks = store.list_tasks().await?;
    let users = store.list_users().await?;
    Ok(Dashboard::build(&tasks, &users, actor))
}

pub async fn report_summary<S: Storage>(
    store: &DataService<S>,
    actor: &User,
) -> Result<ReportSummary, AppError> {
    let tasks = store.list_tasks().await?;
    let users = store.list_users().await?;
    Ok(ReportSummary::build(&tasks, &users, actor))
}

/// Build the report document from fresh snapshots.
pub async fn build_report<S: Storage>(
    store: &DataService<S>,
    actor: &User,
) -> Result<ReportExport, AppError> {
    let tasks = store.list_tasks().await?;
    let users = store.list_users().await?;
    Ok(ReportExport::build(&tasks, &users, actor, Utc::now()))
}

/// Build the report and write it into `dir`.
pub async fn export_report<S: Storage>(
    store: &DataService<S>,
    actor: &User,
    dir: &Path,
) -> Result<PathBuf, AppError> {
    let report = build_report(store, actor).await?;
    tracing::info!("User {} exporting report", actor.id);
    report.write_to_dir(dir).await
}
