//! Email/password authentication and the signed-in session.
//!
//! Passwords are stored and compared in plaintext to stay compatible with existing data; the
//! comparison itself is constant-time to mitigate timing attacks.

use subtle::ConstantTimeEq;

use crate::db::{DataService, Storage};
use crate::errors::AppError;
use crate::models::User;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Check `email` and `password` against the stored users.
///
/// The email must match the stored value exactly. The first user registered under it is the
/// one checked.
pub async fn authenticate<S: Storage>(
    store: &DataService<S>,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let Some(user) = store.get_user_by_email(email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !constant_time_compare(password, &user.password) {
        tracing::debug!("Login attempt with wrong password for user {}", user.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    tracing::info!("User {} signed in", user.id);
    Ok(user)
}

/// Fail unless `user` carries the admin role.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "This action requires an administrator".to_string(),
        ))
    }
}

/// Perform constant-time string comparison.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

/// The currently signed-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate and, on success, make the user current.
    pub async fn login<S: Storage>(
        &mut self,
        store: &DataService<S>,
        email: &str,
        password: &str,
    ) -> Result<&User, AppError> {
        let user = authenticate(store, email, password).await?;
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("User {} signed out", user.id);
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The current user, or `Unauthorized` when nobody is signed in.
    pub fn require_user(&self) -> Result<&User, AppError> {
        self.current_user()
            .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))
    }

    /// Re-read the current user from the store. A user deleted meanwhile ends the session.
    pub async fn refresh<S: Storage>(
        &mut self,
        store: &DataService<S>,
    ) -> Result<Option<&User>, AppError> {
        let Some(id) = self.user.as_ref().map(|user| user.id.clone()) else {
            return Ok(None);
        };

        self.user = store.get_user(&id).await?;
        if self.user.is_none() {
            tracing::info!("User {} no longer exists, session ended", id);
        }
        Ok(self.user.as_ref())
    }

    /// Replace the cached user after the caller has written a new version of it.
    pub(crate) fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }
}
