//! Demo data written on first run.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Role, Task, TaskPriority, TaskStatus, User, UserStatus};

pub const DEMO_ADMIN_ID: &str = "1";

/// One admin and two employees.
pub fn demo_users(now: DateTime<Utc>) -> Vec<User> {
    vec![
        User {
            id: DEMO_ADMIN_ID.to_string(),
            name: "Admin User".to_string(),
            email: "admin@intellotask.com".to_string(),
            password: "admin123".to_string(),
            role: Role::Admin,
            department: Some("Management".to_string()),
            status: UserStatus::Active,
            created_at: now,
        },
        User {
            id: "2".to_string(),
            name: "John Smith".to_string(),
            email: "john@intellotask.com".to_string(),
            password: "emp123".to_string(),
            role: Role::Employee,
            department: Some("Development".to_string()),
            status: UserStatus::Active,
            created_at: now,
        },
        User {
            id: "3".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah@intellotask.com".to_string(),
            password: "emp123".to_string(),
            role: Role::Employee,
            department: Some("Design".to_string()),
            status: UserStatus::Active,
            created_at: now,
        },
    ]
}

/// Three tasks, one per status, spread over both employees.
pub fn demo_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let task = |id: &str,
                title: &str,
                description: &str,
                assigned_to: &str,
                status: TaskStatus,
                priority: TaskPriority,
                due_date: Option<NaiveDate>| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        assigned_to: assigned_to.to_string(),
        assigned_by: DEMO_ADMIN_ID.to_string(),
        status,
        priority,
        due_date: due_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
        attachments: None,
        comments: None,
    };

    vec![
        task(
            "1",
            "Website Redesign",
            "Complete redesign of company website with modern UI/UX",
            "2",
            TaskStatus::InProgress,
            TaskPriority::High,
            NaiveDate::from_ymd_opt(2024, 2, 15),
        ),
        task(
            "2",
            "Mobile App Testing",
            "Comprehensive testing of mobile application features",
            "3",
            TaskStatus::Pending,
            TaskPriority::Medium,
            NaiveDate::from_ymd_opt(2024, 2, 20),
        ),
        task(
            "3",
            "Database Optimization",
            "Optimize database queries for better performance",
            "2",
            TaskStatus::Completed,
            TaskPriority::High,
            NaiveDate::from_ymd_opt(2024, 1, 30),
        ),
    ]
}
