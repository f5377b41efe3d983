//! Profile aggregate - The identity that owns narratives and progress

use chrono::{DateTime, Utc};

use crate::ids::ProfileId;
use crate::value_objects::Username;

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    id: ProfileId,
    username: Username,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(username: Username, now: DateTime<Utc>) -> Self {
        Self {
            id: ProfileId::new(),
            username,
            display_name: None,
            created_at: now,
        }
    }

    #[inline]
    pub fn id(&self) -> ProfileId {
        self.id
    }

    #[inline]
    pub fn username(&self) -> &Username {
        &self.username
    }

    #[inline]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set a display name. Blank names are dropped.
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self
    }

    /// Set the ID (used when loading from storage).
    pub fn with_id(mut self, id: ProfileId) -> Self {
        self.id = id;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
