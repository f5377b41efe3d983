//! Read access to single questions and their children.

use async_trait::async_trait;
use questionspark_domain::{Question, QuestionId, StoryId};
use sqlx::SqlitePool;

use super::rows::QuestionRow;
use super::story_repo::QUESTION_COLUMNS;
use crate::infrastructure::ports::{QuestionRepo, RepoError};

pub struct SqliteQuestionRepo {
    pool: SqlitePool,
}

impl SqliteQuestionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        operation: &'static str,
        clause: &str,
        value: String,
    ) -> Result<Vec<Question>, RepoError> {
        sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM story_questions WHERE {} = ? ORDER BY rowid",
            QUESTION_COLUMNS, clause
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database(operation, e))?
        .into_iter()
        .map(Question::try_from)
        .collect()
    }
}

#[async_trait]
impl QuestionRepo for SqliteQuestionRepo {
    async fn get(&self, id: QuestionId) -> Result<Option<Question>, RepoError> {
        Ok(self
            .fetch_where("question_get", "id", id.to_string())
            .await?
            .into_iter()
            .next())
    }

    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Question>, RepoError> {
        self.fetch_where("question_list_for_story", "story_id", story_id.to_string())
            .await
    }

    async fn list_children(&self, parent_id: QuestionId) -> Result<Vec<Question>, RepoError> {
        self.fetch_where("question_list_children", "parent_question_id", parent_id.to_string())
            .await
    }
}
