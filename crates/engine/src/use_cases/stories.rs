//! Read paths over stories and their question trees.

use std::sync::Arc;

use questionspark_domain::{ProfileId, Question, QuestionId, Story, StoryId};

use crate::infrastructure::ports::{QuestionRepo, RepoError, StoryRepo};

#[derive(Debug, thiserror::Error)]
pub enum StoryQueryError {
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("Question not found: {0}")]
    QuestionNotFound(QuestionId),
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: RepoError,
    },
}

impl StoryQueryError {
    fn service(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| {
            tracing::error!(error = %source, "{}", context);
            Self::Service { context, source }
        }
    }
}

pub struct StoryQueries {
    stories: Arc<dyn StoryRepo>,
    questions: Arc<dyn QuestionRepo>,
}

impl StoryQueries {
    pub fn new(stories: Arc<dyn StoryRepo>, questions: Arc<dyn QuestionRepo>) -> Self {
        Self { stories, questions }
    }

    /// All stories in storage order. An empty store is an empty list.
    pub async fn list(&self) -> Result<Vec<Story>, StoryQueryError> {
        self.stories
            .list_all()
            .await
            .map_err(StoryQueryError::service("Error fetching stories"))
    }

    pub async fn get_with_questions(&self, id: StoryId) -> Result<Story, StoryQueryError> {
        self.stories
            .get(id)
            .await
            .map_err(StoryQueryError::service("Error fetching story"))?
            .ok_or(StoryQueryError::StoryNotFound(id))
    }

    pub async fn list_by_author(
        &self,
        author_id: ProfileId,
    ) -> Result<Vec<Story>, StoryQueryError> {
        self.stories
            .list_by_author(author_id)
            .await
            .map_err(StoryQueryError::service("Error fetching stories"))
    }

    pub async fn question(&self, id: QuestionId) -> Result<Question, StoryQueryError> {
        self.questions
            .get(id)
            .await
            .map_err(StoryQueryError::service("Error fetching question"))?
            .ok_or(StoryQueryError::QuestionNotFound(id))
    }

    /// Direct follow-up questions of `id`.
    pub async fn question_children(
        &self,
        id: QuestionId,
    ) -> Result<Vec<Question>, StoryQueryError> {
        // Distinguish "no children" from "no such question".
        self.question(id).await?;
        self.questions
            .list_children(id)
            .await
            .map_err(StoryQueryError::service("Error fetching questions"))
    }

    /// Remove the story with its questions, narratives and progress records.
    pub async fn delete(&self, id: StoryId) -> Result<(), StoryQueryError> {
        match self.stories.delete(id).await {
            Ok(()) => {
                tracing::info!(story_id = %id, "Story deleted");
                Ok(())
            }
            Err(RepoError::NotFound { .. }) => Err(StoryQueryError::StoryNotFound(id)),
            Err(e) => Err(StoryQueryError::service("Error deleting story")(e)),
        }
    }
}
