//! Narrative aggregate - One concrete step a user took through a story
//!
//! A user's play-through is a tree, not a line: revisiting a branch point and choosing
//! differently adds a sibling under the same parent.

use chrono::{DateTime, Utc};

use crate::aggregates::Question;
use crate::error::DomainError;
use crate::ids::{NarrativeId, ProfileId, QuestionId, StoryId};
use crate::tree::ParentLinked;
use crate::value_objects::{ChoiceText, Document, ResponseText};

/// A single narrative node authored by one profile
///
/// # Invariants
///
/// - `choice_text` and `response_text` are always non-blank (enforced by their newtypes)
/// - a parent, when set, belongs to the same story
/// - a root narrative answers a root question of the same story (see [`Narrative::check_anchor`])
/// - a chain from a root down to any node holds at most [`Narrative::MAX_DEPTH`] nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    id: NarrativeId,
    story_id: StoryId,
    user_id: ProfileId,
    parent_id: Option<NarrativeId>,
    question_id: Option<QuestionId>,
    choice_text: ChoiceText,
    response_text: ResponseText,
    next_narrative: Document,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Narrative {
    /// Longest allowed root-to-node chain, the root included.
    pub const MAX_DEPTH: usize = 128;

    pub fn new(
        story_id: StoryId,
        user_id: ProfileId,
        choice_text: ChoiceText,
        response_text: ResponseText,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NarrativeId::new(),
            story_id,
            user_id,
            parent_id: None,
            question_id: None,
            choice_text,
            response_text,
            next_narrative: Document::empty_object(),
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> NarrativeId {
        self.id
    }

    #[inline]
    pub fn story_id(&self) -> StoryId {
        self.story_id
    }

    /// The profile that authored this step.
    #[inline]
    pub fn user_id(&self) -> ProfileId {
        self.user_id
    }

    #[inline]
    pub fn parent_id(&self) -> Option<NarrativeId> {
        self.parent_id
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    #[inline]
    pub fn question_id(&self) -> Option<QuestionId> {
        self.question_id
    }

    #[inline]
    pub fn choice_text(&self) -> &ChoiceText {
        &self.choice_text
    }

    #[inline]
    pub fn response_text(&self) -> &ResponseText {
        &self.response_text
    }

    #[inline]
    pub fn next_narrative(&self) -> &Document {
        &self.next_narrative
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

    /// Link under `parent`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if `parent` belongs to another story or is this node.
    pub fn with_parent(mut self, parent: &Narrative) -> Result<Self, DomainError> {
        if parent.story_id != self.story_id {
            return Err(DomainError::constraint(format!(
                "Narrative {} cannot have parent {} from another story",
                self.id, parent.id
            )));
        }
        if parent.id == self.id {
            return Err(DomainError::constraint(format!(
                "Narrative {} cannot be its own parent",
                self.id
            )));
        }
        self.parent_id = Some(parent.id);
        Ok(self)
    }

    /// Record which question this step answers.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if `question` belongs to another story.
    pub fn answering(mut self, question: &Question) -> Result<Self, DomainError> {
        if question.story_id() != self.story_id {
            return Err(DomainError::constraint(format!(
                "Narrative {} cannot answer question {} from another story",
                self.id,
                question.id()
            )));
        }
        self.question_id = Some(question.id());
        Ok(self)
    }

    pub fn with_next_narrative(mut self, next_narrative: Document) -> Self {
        self.next_narrative = next_narrative;
        self
    }

    /// Set the ID (used when loading from storage).
    pub fn with_id(mut self, id: NarrativeId) -> Self {
        self.id = id;
        self
    }

    /// Set the raw parent link (used when loading from storage).
    pub fn with_parent_id(mut self, parent_id: Option<NarrativeId>) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the raw question link (used when loading from storage).
    pub fn with_question_id(mut self, question_id: Option<QuestionId>) -> Self {
        self.question_id = question_id;
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
    // Invariants
    // =========================================================================

    /// Check that this node is anchored correctly on `question`.
    ///
    /// `question` must be the one this node answers. A root narrative must answer a root
    /// question; non-root narratives may answer any question of the story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` when the anchor rule is broken.
    pub fn check_anchor(&self, question: &Question) -> Result<(), DomainError> {
        if self.question_id != Some(question.id()) || question.story_id() != self.story_id {
            return Err(DomainError::constraint(format!(
                "Narrative {} does not answer question {}",
                self.id,
                question.id()
            )));
        }
        if self.is_root() && !question.is_root() {
            return Err(DomainError::constraint(format!(
                "Root narrative {} must answer a root question, but {} has a parent",
                self.id,
                question.id()
            )));
        }
        Ok(())
    }
}

impl ParentLinked for Narrative {
    type Id = NarrativeId;

    fn node_id(&self) -> NarrativeId {
        self.id
    }

    fn parent_id(&self) -> Option<NarrativeId> {
        self.parent_id
    }
}
