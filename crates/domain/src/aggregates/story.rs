//! Story aggregate - A generated work and the question tree it owns
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: the question list can only grow through [`Story::add_question`]
//! - **Newtypes**: `StoryTitle`, `PromptText` and `Description` for validated strings
//! - **Flat tree**: questions are kept in insertion order and linked by parent id

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::aggregates::Question;
use crate::error::DomainError;
use crate::ids::{ProfileId, QuestionId, StoryId};
use crate::tree::{self, ParentLinked};
use crate::value_objects::{Description, PromptText, StoryTitle};

/// A story with its questions
///
/// # Invariants
///
/// - `title` and `initial_prompt` are always present and non-blank
/// - every question's `story_id` equals this story's id
/// - question ids are unique and every parent link points at an earlier question of this story,
///   so parent chains always terminate at a root
///
/// A story with zero questions is only expected while it is being authored.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    id: StoryId,
    title: StoryTitle,
    description: Description,
    initial_prompt: PromptText,
    author_id: Option<ProfileId>,
    questions: Vec<Question>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Story {
    // =========================================================================
    // Constructor
    // =========================================================================

    pub fn new(title: StoryTitle, initial_prompt: PromptText, now: DateTime<Utc>) -> Self {
        Self {
            id: StoryId::new(),
            title,
            description: Description::empty(),
            initial_prompt,
            author_id: None,
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> StoryId {
        self.id
    }

    #[inline]
    pub fn title(&self) -> &StoryTitle {
        &self.title
    }

    #[inline]
    pub fn description(&self) -> &Description {
        &self.description
    }

    #[inline]
    pub fn initial_prompt(&self) -> &PromptText {
        &self.initial_prompt
    }

    #[inline]
    pub fn author_id(&self) -> Option<ProfileId> {
        self.author_id
    }

    /// All questions in insertion order.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Questions without a parent, in insertion order.
    pub fn root_questions(&self) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.is_root()).collect()
    }

    /// The first root question, if any.
    pub fn first_question(&self) -> Option<&Question> {
        self.questions.iter().find(|q| q.is_root())
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    pub fn children_of(&self, id: QuestionId) -> Vec<&Question> {
        tree::children_of(&self.questions, id)
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_author(mut self, author_id: Option<ProfileId>) -> Self {
        self.author_id = author_id;
        self
    }

    /// Set the ID (used when loading from storage).
    ///
    /// Only valid before questions are attached.
    pub fn with_id(mut self, id: StoryId) -> Self {
        self.id = id;
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

    /// Attach questions loaded from storage, in any order, re-checking the tree.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` when a question belongs to another story, an id is
    /// duplicated, a parent is missing from the set, or parent links form a cycle.
    pub fn restore(mut self, questions: Vec<Question>) -> Result<Self, DomainError> {
        let mut ids = HashSet::with_capacity(questions.len());
        for question in &questions {
            self.check_ownership(question)?;
            if !ids.insert(question.id()) {
                return Err(DomainError::constraint(format!(
                    "Question {} appears twice in story {}",
                    question.id(),
                    self.id
                )));
            }
        }
        for question in &questions {
            if let Some(parent) = question.parent_id() {
                if !ids.contains(&parent) {
                    return Err(DomainError::constraint(format!(
                        "Question {} points at parent {} outside story {}",
                        question.id(),
                        parent,
                        self.id
                    )));
                }
            }
        }
        tree::check_acyclic(&questions)?;

        self.questions = questions;
        Ok(self)
    }

    // =========================================================================
    // Mutation Methods
    // =========================================================================

    /// Append a question.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if the question belongs to another story, is already
    /// present, or names a parent that has not been added yet.
    pub fn add_question(&mut self, question: Question) -> Result<(), DomainError> {
        self.check_ownership(&question)?;
        if self.question(question.id()).is_some() {
            return Err(DomainError::constraint(format!(
                "Question {} is already part of story {}",
                question.id(),
                self.id
            )));
        }
        if let Some(parent) = question.parent_id() {
            if self.question(parent).is_none() {
                return Err(DomainError::constraint(format!(
                    "Parent question {} must be added to story {} first",
                    parent, self.id
                )));
            }
        }
        self.questions.push(question);
        Ok(())
    }

    fn check_ownership(&self, question: &Question) -> Result<(), DomainError> {
        if question.story_id() != self.id {
            return Err(DomainError::constraint(format!(
                "Question {} belongs to story {}, not {}",
                question.node_id(),
                question.story_id(),
                self.id
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
