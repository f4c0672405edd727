//! Data models for IntelloTask.
//!
//! Field names serialize in camelCase so the persisted collections keep the layout the web
//! client has always written to local storage.

mod comment;
mod task;
mod user;

pub use comment::*;
pub use task::*;
pub use user::*;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The three independently stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tasks,
    Comments,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Tasks, Collection::Comments];

    /// Key suffix under the configured namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tasks => "tasks",
            Collection::Comments => "comments",
        }
    }
}

/// A record stored as one element of a collection.
pub trait Entity: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Called on every update, with the record being replaced, before it is written back.
    fn touch(&mut self, _stored: &Self, _now: DateTime<Utc>) {}
}

/// Generate a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
