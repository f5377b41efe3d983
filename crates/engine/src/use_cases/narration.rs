//! Narration: grow a user's narrative tree by one node per choice.

use std::sync::Arc;

use questionspark_domain::{
    ancestry, ChoiceText, Document, Narrative, NarrativeId, ProfileId, QuestionId, ResponseText,
    StoryId,
};

use crate::infrastructure::ports::{ClockPort, NarrativeRepo, ProfileRepo, RepoError, StoryRepo};
use crate::use_cases::validation::{require_max_length, require_non_empty, ValidationError};

const SERVICE_CONTEXT: &str = "Error creating narration";

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("Question {question_id} not found in story {story_id}")]
    QuestionNotFound {
        story_id: StoryId,
        question_id: QuestionId,
    },
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<RepoError> for NarrationError {
    fn from(err: RepoError) -> Self {
        Self::Service {
            context: SERVICE_CONTEXT,
            source: Box::new(err),
        }
    }
}

/// Container for narration use cases.
pub struct NarrationUseCases {
    pub create: Arc<CreateNarration>,
}

impl NarrationUseCases {
    pub fn new(create: Arc<CreateNarration>) -> Self {
        Self { create }
    }
}

/// One user choice against a story question.
#[derive(Debug, Clone)]
pub struct CreateNarrationInput {
    pub parent_narrative_id: Option<NarrativeId>,
    pub question_id: QuestionId,
    /// The choice label shown to the user.
    pub question_text: String,
    /// The narrative consequence of the choice.
    pub response: String,
    pub action: String,
    /// Required; `None` is rejected like a blank text field.
    pub next_narrative: Option<Document>,
    pub profile_id: ProfileId,
}

/// Create a narrative node and link it into the story's existing trees.
pub struct CreateNarration {
    stories: Arc<dyn StoryRepo>,
    narratives: Arc<dyn NarrativeRepo>,
    profiles: Arc<dyn ProfileRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CreateNarration {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        narratives: Arc<dyn NarrativeRepo>,
        profiles: Arc<dyn ProfileRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            narratives,
            profiles,
            clock,
        }
    }

    pub async fn execute(
        &self,
        story_id: StoryId,
        input: CreateNarrationInput,
    ) -> Result<Narrative, NarrationError> {
        require_non_empty(&input.question_text, "questionText")?;
        require_non_empty(&input.response, "response")?;
        require_non_empty(&input.action, "action")?;
        require_max_length(&input.action, ChoiceText::MAX_LENGTH, "action")?;
        let choice_text = ChoiceText::new(input.question_text).map_err(ValidationError::from)?;
        let response_text = ResponseText::new(input.response).map_err(ValidationError::from)?;
        let next_narrative = input.next_narrative.ok_or(ValidationError::Empty {
            field_name: "nextNarrative",
        })?;

        let story = self
            .stories
            .get(story_id)
            .await?
            .ok_or(NarrationError::StoryNotFound(story_id))?;

        let parent = match input.parent_narrative_id {
            Some(parent_id) => match self.narratives.get(parent_id).await? {
                Some(parent) if parent.story_id() == story_id => Some(parent),
                Some(_) => {
                    tracing::warn!(
                        %story_id,
                        %parent_id,
                        "Parent narrative is in another story, creating narrative without parent"
                    );
                    None
                }
                None => {
                    tracing::warn!(
                        %story_id,
                        %parent_id,
                        "Parent narrative not found, creating narrative without parent"
                    );
                    None
                }
            },
            None => None,
        };

        let question = story
            .question(input.question_id)
            .ok_or(NarrationError::QuestionNotFound {
                story_id,
                question_id: input.question_id,
            })?;

        if self.profiles.get(input.profile_id).await?.is_none() {
            return Err(NarrationError::ProfileNotFound(input.profile_id));
        }

        if let Some(parent) = &parent {
            let story_nodes = self.narratives.list_for_story(story_id).await?;
            if ancestry(&story_nodes, parent.id()).len() >= Narrative::MAX_DEPTH {
                return Err(ValidationError::Invalid {
                    field_name: "parentNarrativeId",
                    reason: format!(
                        "narrative chains are limited to {} steps",
                        Narrative::MAX_DEPTH
                    ),
                }
                .into());
            }
        }

        let now = self.clock.now();
        let mut narrative = Narrative::new(
            story_id,
            input.profile_id,
            choice_text,
            response_text,
            now,
        )
        .with_next_narrative(next_narrative);
        if let Some(parent) = &parent {
            narrative = narrative.with_parent(parent).map_err(ValidationError::from)?;
        }
        let narrative = narrative.answering(question).map_err(ValidationError::from)?;
        narrative
            .check_anchor(question)
            .map_err(ValidationError::from)?;

        self.narratives.save(&narrative).await.map_err(|e| {
            tracing::error!(%story_id, error = %e, "{}", SERVICE_CONTEXT);
            NarrationError::from(e)
        })?;

        tracing::info!(
            narrative_id = %narrative.id(),
            %story_id,
            question_id = %question.id(),
            profile_id = %input.profile_id,
            parent_id = ?narrative.parent_id(),
            action = %input.action.trim(),
            "Narrative created"
        );
        Ok(narrative)
    }
}
