//! Progress aggregate - A profile's position within one story
//!
//! The current-narrative pointer is a plain id, never an owning reference. The path is an
//! opaque document; when it is an array each advance appends one entry.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::aggregates::Narrative;
use crate::error::DomainError;
use crate::ids::{NarrativeId, ProfileId, ProgressId, StoryId};
use crate::value_objects::Document;

/// At most one per (profile, story); the store enforces uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    id: ProgressId,
    profile_id: ProfileId,
    story_id: StoryId,
    current_narrative_id: Option<NarrativeId>,
    path: Document,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Progress {
    pub fn new(profile_id: ProfileId, story_id: StoryId, now: DateTime<Utc>) -> Self {
        Self {
            id: ProgressId::new(),
            profile_id,
            story_id,
            current_narrative_id: None,
            path: Document::empty_array(),
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ProgressId {
        self.id
    }

    #[inline]
    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    #[inline]
    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    #[inline]
    pub fn current_narrative_id(&self) -> Option<NarrativeId> {
        self.current_narrative_id
    }

    #[inline]
    pub fn path(&self) -> &Document {
        &self.path
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Builder Methods (for loading from storage)
    // =========================================================================

    pub fn with_id(mut self, id: ProgressId) -> Self {
        self.id = id;
        self
    }

    pub fn with_current_narrative_id(mut self, narrative_id: Option<NarrativeId>) -> Self {
        self.current_narrative_id = narrative_id;
        self
    }

    pub fn with_path(mut self, path: Document) -> Self {
        self.path = path;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }

    // =========================================================================
    // Mutation Methods
    // =========================================================================

    /// Move the pointer to `narrative` and record the step in the path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if `narrative` belongs to another story.
    pub fn advance_to(
        &mut self,
        narrative: &Narrative,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if narrative.story_id() != self.story_id {
            return Err(DomainError::constraint(format!(
                "Narrative {} is not part of story {}",
                narrative.id(),
                self.story_id
            )));
        }

        self.current_narrative_id = Some(narrative.id());
        if let Some(steps) = self.path.as_array_mut() {
            steps.push(json!({
                "narrativeId": narrative.id().to_string(),
                "choice": narrative.choice_text().as_str(),
                "at": now.to_rfc3339(),
            }));
        }
        self.updated_at = now;
        Ok(())
    }

    /// Back to the start of the story: no pointer, empty path.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.current_narrative_id = None;
        self.path = Document::empty_array();
        self.updated_at = now;
    }
}
