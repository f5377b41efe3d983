//! Profile persistence.

use async_trait::async_trait;
use questionspark_domain::{Profile, ProfileId};
use sqlx::SqlitePool;

use super::rows::{format_time, ProfileRow};
use super::write_error;
use crate::infrastructure::ports::{ProfileRepo, RepoError};

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepo for SqliteProfileRepo {
    async fn get(&self, id: ProfileId) -> Result<Option<Profile>, RepoError> {
        sqlx::query_as::<_, ProfileRow>(
            "SELECT id, username, display_name, created_at FROM profiles WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("profile_get", e))?
        .map(Profile::try_from)
        .transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError> {
        sqlx::query_as::<_, ProfileRow>(
            "SELECT id, username, display_name, created_at FROM profiles WHERE username = ?",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("profile_get_by_username", e))?
        .map(Profile::try_from)
        .transpose()
    }

    async fn save(&self, profile: &Profile) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, username, display_name, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                display_name = excluded.display_name
            "#,
        )
        .bind(profile.id().to_string())
        .bind(profile.username().as_str())
        .bind(profile.display_name())
        .bind(format_time(profile.created_at()))
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("profile_save", e))?;
        Ok(())
    }
}
