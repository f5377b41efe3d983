//! Story authoring: prompt -> generated content -> persisted story.

use std::sync::Arc;

use questionspark_domain::{
    Description, Document, ProfileId, PromptText, Question, QuestionType, Story, StoryTitle,
};

use crate::infrastructure::ports::{
    ClockPort, GeneratedStory, GenerationError, ProfileRepo, RepoError, StoryGeneratorPort,
    StoryRepo,
};
use crate::use_cases::validation::{require_max_length, require_non_empty, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Error creating story: {0}")]
    Repo(#[from] RepoError),
}

/// Container for authoring use cases.
pub struct AuthoringUseCases {
    pub create_story: Arc<CreateStory>,
}

impl AuthoringUseCases {
    pub fn new(create_story: Arc<CreateStory>) -> Self {
        Self { create_story }
    }
}

/// Generate a story from a free-text prompt and persist it with its root question.
pub struct CreateStory {
    stories: Arc<dyn StoryRepo>,
    profiles: Arc<dyn ProfileRepo>,
    generator: Arc<dyn StoryGeneratorPort>,
    clock: Arc<dyn ClockPort>,
}

impl CreateStory {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        profiles: Arc<dyn ProfileRepo>,
        generator: Arc<dyn StoryGeneratorPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            profiles,
            generator,
            clock,
        }
    }

    pub async fn execute(
        &self,
        initial_prompt: &str,
        author_id: Option<ProfileId>,
    ) -> Result<Story, AuthoringError> {
        require_non_empty(initial_prompt, "initialPrompt")?;
        require_max_length(initial_prompt, PromptText::MAX_LENGTH, "initialPrompt")?;
        let prompt = initial_prompt.trim();

        if let Some(author_id) = author_id {
            if self.profiles.get(author_id).await?.is_none() {
                return Err(AuthoringError::ProfileNotFound(author_id));
            }
        }

        let generated = self.generator.generate(prompt).await.map_err(|e| {
            tracing::error!(error = %e, "Story generation failed");
            e
        })?;

        let story = build_story(generated, prompt, author_id, self.clock.now())?;
        self.stories.save_with_questions(&story).await?;

        tracing::info!(
            story_id = %story.id(),
            title = %story.title(),
            questions = story.questions().len(),
            "Story created"
        );
        Ok(story)
    }
}

/// Everything the generator produced ends up in one root question of type `text`.
fn build_story(
    generated: GeneratedStory,
    fallback_prompt: &str,
    author_id: Option<ProfileId>,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Story, GenerationError> {
    let malformed =
        |e: questionspark_domain::DomainError| GenerationError::Malformed(e.to_string());

    let title = StoryTitle::new(generated.title).map_err(malformed)?;
    let description = Description::new(generated.description).map_err(malformed)?;
    let initial_prompt = if generated.initial_prompt.trim().is_empty() {
        tracing::warn!("Generator returned no initial prompt, keeping the caller's");
        PromptText::new(fallback_prompt)
    } else {
        PromptText::new(generated.initial_prompt)
    }
    .map_err(malformed)?;

    let payload = serde_json::to_value(&generated.questions)
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let mut story = Story::new(title, initial_prompt, now)
        .with_description(description)
        .with_author(author_id);
    let question = Question::new(story.id(), QuestionType::text(), Document::new(payload), now);
    story.add_question(question).map_err(malformed)?;
    Ok(story)
}
