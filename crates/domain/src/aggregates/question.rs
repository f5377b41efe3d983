//! Question aggregate - A branch point inside a story
//!
//! The payload is generator-defined (content, question text, candidate actions with follow-up
//! prompts) and is kept as an opaque [`Document`].

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::ids::{QuestionId, StoryId};
use crate::tree::ParentLinked;
use crate::value_objects::{Document, QuestionType};

/// A question belonging to exactly one story
///
/// # Invariants
///
/// - `story_id` never changes after construction
/// - a parent, when set, belongs to the same story and is not the question itself
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    story_id: StoryId,
    parent_id: Option<QuestionId>,
    question_type: QuestionType,
    payload: Document,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Question {
    /// Create a root question for `story_id`.
    pub fn new(
        story_id: StoryId,
        question_type: QuestionType,
        payload: Document,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: QuestionId::new(),
            story_id,
            parent_id: None,
            question_type,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[inline]
    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    #[inline]
    pub fn parent_id(&self) -> Option<QuestionId> {
        self.parent_id
    }

    /// True when the question has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    #[inline]
    pub fn question_type(&self) -> &QuestionType {
        &self.question_type
    }

    #[inline]
    pub fn payload(&self) -> &Document {
        &self.payload
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
    // Builder Methods
    // =========================================================================

    /// Hang this question under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if `parent` belongs to another story or is this
    /// question.
    pub fn with_parent(mut self, parent: &Question) -> Result<Self, DomainError> {
        if parent.story_id != self.story_id {
            return Err(DomainError::constraint(format!(
                "Question {} cannot have parent {} from another story",
                self.id, parent.id
            )));
        }
        if parent.id == self.id {
            return Err(DomainError::constraint(format!(
                "Question {} cannot be its own parent",
                self.id
            )));
        }
        self.parent_id = Some(parent.id);
        Ok(self)
    }

    /// Set the ID (used when loading from storage).
    pub fn with_id(mut self, id: QuestionId) -> Self {
        self.id = id;
        self
    }

    /// Set the raw parent link (used when loading from storage; the owning story re-checks it).
    pub fn with_parent_id(mut self, parent_id: Option<QuestionId>) -> Self {
        self.parent_id = parent_id;
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

    /// Replace the payload.
    pub fn set_payload(&mut self, payload: Document, now: DateTime<Utc>) {
        self.payload = payload;
        self.updated_at = now;
    }
}

impl ParentLinked for Question {
    type Id = QuestionId;

    fn node_id(&self) -> QuestionId {
        self.id
    }

    fn parent_id(&self) -> Option<QuestionId> {
        self.parent_id
    }
}
