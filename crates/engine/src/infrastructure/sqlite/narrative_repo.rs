//! Narrative persistence. Narratives are append-only apart from guarded deletes.

use async_trait::async_trait;
use questionspark_domain::{Narrative, NarrativeId, StoryId};
use sqlx::SqlitePool;

use super::rows::{format_time, NarrativeRow};
use super::write_error;
use crate::infrastructure::ports::{NarrativeRepo, RepoError};

const NARRATIVE_COLUMNS: &str = "id, story_id, user_id, parent_narrative_id, question_id, \
     choice_text, response_text, next_narrative, created_at, updated_at";

pub struct SqliteNarrativeRepo {
    pool: SqlitePool,
}

impl SqliteNarrativeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        operation: &'static str,
        clause: &str,
        value: String,
    ) -> Result<Vec<Narrative>, RepoError> {
        sqlx::query_as::<_, NarrativeRow>(&format!(
            "SELECT {} FROM story_narratives WHERE {} = ? ORDER BY rowid",
            NARRATIVE_COLUMNS, clause
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database(operation, e))?
        .into_iter()
        .map(Narrative::try_from)
        .collect()
    }
}

#[async_trait]
impl NarrativeRepo for SqliteNarrativeRepo {
    async fn get(&self, id: NarrativeId) -> Result<Option<Narrative>, RepoError> {
        Ok(self
            .fetch_where("narrative_get", "id", id.to_string())
            .await?
            .into_iter()
            .next())
    }

    async fn save(&self, narrative: &Narrative) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO story_narratives
                (id, story_id, user_id, parent_narrative_id, question_id,
                 choice_text, response_text, next_narrative, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(narrative.id().to_string())
        .bind(narrative.story_id().to_string())
        .bind(narrative.user_id().to_string())
        .bind(narrative.parent_id().map(|id| id.to_string()))
        .bind(narrative.question_id().map(|id| id.to_string()))
        .bind(narrative.choice_text().as_str())
        .bind(narrative.response_text().as_str())
        .bind(narrative.next_narrative().to_json_string())
        .bind(format_time(narrative.created_at()))
        .bind(format_time(narrative.updated_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("narrative_save", e))?;
        Ok(())
    }

    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Narrative>, RepoError> {
        self.fetch_where("narrative_list_for_story", "story_id", story_id.to_string())
            .await
    }

    async fn list_children(&self, parent_id: NarrativeId) -> Result<Vec<Narrative>, RepoError> {
        self.fetch_where(
            "narrative_list_children",
            "parent_narrative_id",
            parent_id.to_string(),
        )
        .await
    }

    async fn delete(&self, id: NarrativeId) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("narrative_delete", e))?;

        let pointers: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_story_progress WHERE current_narrative_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepoError::database("narrative_delete", e))?;
        if pointers > 0 {
            return Err(RepoError::constraint(format!(
                "Narrative {} is the current position of {} progress record(s)",
                id, pointers
            )));
        }

        let children: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM story_narratives WHERE parent_narrative_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepoError::database("narrative_delete", e))?;
        if children > 0 {
            return Err(RepoError::constraint(format!(
                "Narrative {} still has {} child narrative(s)",
                id, children
            )));
        }

        let result = sqlx::query("DELETE FROM story_narratives WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("narrative_delete", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Narrative", id));
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("narrative_delete", e))?;
        Ok(())
    }
}
