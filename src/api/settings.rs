//! Profile and password settings for the signed-in user.

use serde::Deserialize;

use crate::auth::{constant_time_compare, Session};
use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::User;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Store `updated` as the current user and refresh the session copy.
async fn save_current_user<S: Storage>(
    store: &DataService<S>,
    session: &mut Session,
    updated: User,
) -> Result<User, AppError> {
    if !store.update_user(&updated).await? {
        session.logout();
        return Err(AppError::Unauthorized(
            "Your account no longer exists".to_string(),
        ));
    }
    session.set_user(updated.clone());
    Ok(updated)
}

/// Update name, email and department of the signed-in user.
pub async fn update_profile<S: Storage>(
    store: &DataService<S>,
    session: &mut Session,
    profile: &ProfileUpdate,
) -> Result<User, AppError> {
    let current = session.require_user()?.clone();

    if profile.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if profile.email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    let updated = User {
        name: profile.name.clone(),
        email: profile.email.clone(),
        department: profile.department.clone().filter(|d| !d.is_empty()),
        ..current
    };

    save_current_user(store, session, updated).await
}

/// Change the signed-in user's password.
pub async fn change_password<S: Storage>(
    store: &DataService<S>,
    session: &mut Session,
    change: &PasswordChange,
) -> Result<(), AppError> {
    let current = session.require_user()?.clone();

    if change.new_password != change.confirm_password {
        return Err(AppError::Validation(
            "New passwords do not match!".to_string(),
        ));
    }
    if !constant_time_compare(&change.current_password, &current.password) {
        return Err(AppError::Validation(
            "Current password is incorrect!".to_string(),
        ));
    }

    let updated = User {
        password: change.new_password.clone(),
        ..current
    };
    save_current_user(store, session, updated).await?;

    tracing::info!("Password changed for user {}", session.require_user()?.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authenticate;
    use crate::db::MemoryStorage;

    async fn signed_in(email: &str, password: &str) -> (DataService<MemoryStorage>, Session) {
        let store = DataService::new(MemoryStorage::new());
        store.initialize().await.unwrap();
        let mut session = Session::new();
        session.login(&store, email, password).await.unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (store, mut session) = signed_in("john@intellotask.com", "emp123").await;
        let profile = ProfileUpdate {
            name: "John A. Smith".to_string(),
            email: "john.smith@intellotask.com".to_string(),
            department: Some("Platform".to_string()),
        };

        let user = update_profile(&store, &mut session, &profile).await.unwrap();
        assert_eq!(user.name, "John A. Smith");
        assert_eq!(session.current_user().unwrap().email, profile.email);
        assert_eq!(store.get_user("2").await.unwrap().unwrap(), user);
    }

    #[tokio::test]
    async fn test_change_password_mismatch() {
        let (store, mut session) = signed_in("john@intellotask.com", "emp123").await;
        let change = PasswordChange {
            current_password: "emp123".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "new-secre".to_string(),
        };
        let err = change_password(&store, &mut session, &change)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "New passwords do not match!");
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let (store, mut session) = signed_in("john@intellotask.com", "emp123").await;
        let change = PasswordChange {
            current_password: "guess".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        };
        let err = change_password(&store, &mut session, &change)
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Current password is incorrect!");
        assert!(authenticate(&store, "john@intellotask.com", "emp123")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_change_password() {
        let (store, mut session) = signed_in("sarah@intellotask.com", "emp123").await;
        let change = PasswordChange {
            current_password: "emp123".to_string(),
            new_password: "s3cure!".to_string(),
            confirm_password: "s3cure!".to_string(),
        };
        change_password(&store, &mut session, &change).await.unwrap();

        assert!(authenticate(&store, "sarah@intellotask.com", "emp123")
            .await
            .is_err());
        assert!(authenticate(&store, "sarah@intellotask.com", "s3cure!")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_settings_require_session() {
        let store = DataService::new(MemoryStorage::new());
        let mut session = Session::new();
        let profile = ProfileUpdate {
            name: "X".to_string(),
            email: "x@intellotask.com".to_string(),
            department: None,
        };
        let err = update_profile(&store, &mut session, &profile)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_profile_of_deleted_user_ends_session() {
        let (store, mut session) = signed_in("sarah@intellotask.com", "emp123").await;
        store.delete_user("3").await.unwrap();

        let profile = ProfileUpdate {
            name: "Sarah J.".to_string(),
            email: "sarah@intellotask.com".to_string(),
            department: None,
        };
        assert!(update_profile(&store, &mut session, &profile).await.is_err());
        assert!(!session.is_authenticated());
        assert!(store.list_users().await.unwrap().iter().all(|u| u.id != "3"));
    }
}
