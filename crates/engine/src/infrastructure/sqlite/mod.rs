//! SQLite-backed story store.
//!
//! One pool is shared by every repository. Ids and timestamps (RFC 3339) are stored as text and
//! opaque documents as JSON text. Foreign keys are switched on for every connection.

mod narrative_repo;
mod profile_repo;
mod progress_repo;
mod question_repo;
mod rows;
mod story_repo;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

pub use narrative_repo::SqliteNarrativeRepo;
pub use profile_repo::SqliteProfileRepo;
pub use progress_repo::SqliteProgressRepo;
pub use question_repo::SqliteQuestionRepo;
pub use story_repo::SqliteStoryRepo;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        display_name TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stories (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        initial_prompt TEXT NOT NULL,
        author_id TEXT REFERENCES profiles(id) ON DELETE SET NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS story_questions (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        parent_question_id TEXT REFERENCES story_questions(id) ON DELETE CASCADE,
        question_type TEXT NOT NULL,
        question_text TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS story_narratives (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        parent_narrative_id TEXT REFERENCES story_narratives(id) ON DELETE CASCADE,
        question_id TEXT REFERENCES story_questions(id) ON DELETE SET NULL,
        choice_text TEXT NOT NULL,
        response_text TEXT NOT NULL,
        next_narrative TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_story_progress (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        current_narrative_id TEXT REFERENCES story_narratives(id) ON DELETE SET NULL,
        progress_path TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (user_id, story_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_stories_author ON stories(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_questions_story ON story_questions(story_id)",
    "CREATE INDEX IF NOT EXISTS idx_questions_parent ON story_questions(parent_question_id)",
    "CREATE INDEX IF NOT EXISTS idx_narratives_story ON story_narratives(story_id)",
    "CREATE INDEX IF NOT EXISTS idx_narratives_user ON story_narratives(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_narratives_parent ON story_narratives(parent_narrative_id)",
    "CREATE INDEX IF NOT EXISTS idx_narratives_question ON story_narratives(question_id)",
    "CREATE INDEX IF NOT EXISTS idx_progress_story ON user_story_progress(story_id)",
    "CREATE INDEX IF NOT EXISTS idx_progress_narrative
        ON user_story_progress(current_narrative_id)",
];

/// Open (creating if needed) the database at `database_url` and apply the schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| RepoError::database("connect", e))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `:memory:` is its own database.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))?;

    migrate(&pool).await?;
    Ok(pool)
}

/// All repositories over one shared pool.
pub struct SqliteRepositories {
    pub story: Arc<SqliteStoryRepo>,
    pub question: Arc<SqliteQuestionRepo>,
    pub narrative: Arc<SqliteNarrativeRepo>,
    pub profile: Arc<SqliteProfileRepo>,
    pub progress: Arc<SqliteProgressRepo>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            story: Arc::new(SqliteStoryRepo::new(pool.clone())),
            question: Arc::new(SqliteQuestionRepo::new(pool.clone())),
            narrative: Arc::new(SqliteNarrativeRepo::new(pool.clone())),
            profile: Arc::new(SqliteProfileRepo::new(pool.clone())),
            progress: Arc::new(SqliteProgressRepo::new(pool)),
        }
    }
}

/// Create tables and indexes if they are missing.
pub async fn migrate(pool: &SqlitePool) -> Result<(), RepoError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("migrate", e))?;
    }
    Ok(())
}

/// Map an insert/update failure, keeping unique and foreign-key violations distinguishable.
fn write_error(operation: &'static str, err: sqlx::Error) -> RepoError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
            return RepoError::constraint(db_err.message());
        }
    }
    RepoError::database(operation, err)
}
