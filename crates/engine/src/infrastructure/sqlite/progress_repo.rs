//! Progress persistence, one row per (profile, story).

use async_trait::async_trait;
use questionspark_domain::{ProfileId, Progress, StoryId};
use sqlx::SqlitePool;

use super::rows::{format_time, ProgressRow};
use super::write_error;
use crate::infrastructure::ports::{ProgressRepo, RepoError};

const PROGRESS_COLUMNS: &str =
    "id, user_id, story_id, current_narrative_id, progress_path, created_at, updated_at";

pub struct SqliteProgressRepo {
    pool: SqlitePool,
}

impl SqliteProgressRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepo for SqliteProgressRepo {
    async fn get_for_profile_and_story(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
    ) -> Result<Option<Progress>, RepoError> {
        sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {} FROM user_story_progress WHERE user_id = ? AND story_id = ?",
            PROGRESS_COLUMNS
        ))
        .bind(profile_id.to_string())
        .bind(story_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("progress_get", e))?
        .map(Progress::try_from)
        .transpose()
    }

    async fn list_for_profile(&self, profile_id: ProfileId) -> Result<Vec<Progress>, RepoError> {
        sqlx::query_as::<_, ProgressRow>(&format!(
            "SELECT {} FROM user_story_progress WHERE user_id = ? ORDER BY rowid",
            PROGRESS_COLUMNS
        ))
        .bind(profile_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("progress_list_for_profile", e))?
        .into_iter()
        .map(Progress::try_from)
        .collect()
    }

    async fn save(&self, progress: &Progress) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO user_story_progress
                (id, user_id, story_id, current_narrative_id, progress_path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, story_id) DO UPDATE SET
                current_narrative_id = excluded.current_narrative_id,
                progress_path = excluded.progress_path,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(progress.id().to_string())
        .bind(progress.profile_id().to_string())
        .bind(progress.story_id().to_string())
        .bind(progress.current_narrative_id().map(|id| id.to_string()))
        .bind(progress.path().to_json_string())
        .bind(format_time(progress.created_at()))
        .bind(format_time(progress.updated_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("progress_save", e))?;
        Ok(())
    }

    async fn record_step(&self, started: &Progress) -> Result<Progress, RepoError> {
        // The append happens inside the upsert, so the read and the write are one statement.
        let row = sqlx::query_as::<_, ProgressRow>(&format!(
            r#"
            INSERT INTO user_story_progress
                (id, user_id, story_id, current_narrative_id, progress_path, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, story_id) DO UPDATE SET
                current_narrative_id = excluded.current_narrative_id,
                progress_path = CASE
                    WHEN json_type(user_story_progress.progress_path) = 'array'
                    THEN json_insert(
                        user_story_progress.progress_path,
                        '$[#]',
                        json(json_extract(excluded.progress_path, '$[0]'))
                    )
                    ELSE user_story_progress.progress_path
                END,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            PROGRESS_COLUMNS
        ))
        .bind(started.id().to_string())
        .bind(started.profile_id().to_string())
        .bind(started.story_id().to_string())
        .bind(started.current_narrative_id().map(|id| id.to_string()))
        .bind(started.path().to_json_string())
        .bind(format_time(started.created_at()))
        .bind(format_time(started.updated_at()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error("progress_record_step", e))?;

        Progress::try_from(row)
    }

    async fn delete(&self, profile_id: ProfileId, story_id: StoryId) -> Result<(), RepoError> {
        let result =
            sqlx::query("DELETE FROM user_story_progress WHERE user_id = ? AND story_id = ?")
                .bind(profile_id.to_string())
                .bind(story_id.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("progress_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found(
                "Progress",
                format!("{}/{}", profile_id, story_id),
            ));
        }
        Ok(())
    }
}
