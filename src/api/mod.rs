//! Application operations called by the presentation layer.
//!
//! Each operation takes the acting user, applies the role rules and delegates to the data
//! layer. Outcomes the user should see are turned into short-lived [`Notice`]s.

mod comments;
mod reports;
mod settings;
mod tasks;
mod users;

pub use comments::*;
pub use reports::*;
pub use settings::*;
pub use tasks::*;
pub use users::*;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::errors::{AppError, ErrorDetails};

/// How long a notice stays on screen.
pub const NOTICE_TTL_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message shown after an operation and dismissed automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message.into(), Utc::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message.into(), Utc::now())
    }

    fn new(kind: NoticeKind, message: String, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            message,
            expires_at: now + Duration::seconds(NOTICE_TTL_SECS),
        }
    }

    /// Notice for a failed operation. Internal failures get a generic message; the details
    /// go to the log.
    pub fn from_error(error: &AppError) -> Self {
        if error.is_user_facing() {
            return Self::error(error.message());
        }
        let details = ErrorDetails::from(error);
        tracing::error!("Operation failed: {} {}", details.code, details.message);
        Self::error("Something went wrong, please try again.")
    }

    /// Notice for any operation result: `success_message` on `Ok`, the error otherwise.
    pub fn from_result<T>(result: &Result<T, AppError>, success_message: &str) -> Self {
        match result {
            Ok(_) => Self::success(success_message),
            Err(error) => Self::from_error(error),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
