//! Story persistence. A story is always loaded and written together with its questions.

use std::collections::HashMap;

use async_trait::async_trait;
use questionspark_domain::{ProfileId, Question, Story, StoryId};
use sqlx::SqlitePool;

use super::rows::{format_time, QuestionRow, StoryRow};
use super::write_error;
use crate::infrastructure::ports::{RepoError, StoryRepo};

const STORY_COLUMNS: &str =
    "id, title, description, initial_prompt, author_id, created_at, updated_at";
pub(super) const QUESTION_COLUMNS: &str =
    "id, story_id, parent_question_id, question_type, question_text, created_at, updated_at";

pub struct SqliteStoryRepo {
    pool: SqlitePool,
}

impl SqliteStoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach questions to their stories, keeping storage order on both sides.
    fn assemble(rows: Vec<StoryRow>, questions: Vec<QuestionRow>) -> Result<Vec<Story>, RepoError> {
        let mut by_story: HashMap<String, Vec<Question>> = HashMap::new();
        for row in questions {
            let story_id = row.story_id.clone();
            by_story
                .entry(story_id)
                .or_default()
                .push(Question::try_from(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let questions = by_story.remove(&row.id).unwrap_or_default();
                row.into_story(questions)
            })
            .collect()
    }
}

#[async_trait]
impl StoryRepo for SqliteStoryRepo {
    async fn get(&self, id: StoryId) -> Result<Option<Story>, RepoError> {
        let row = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {} FROM stories WHERE id = ?",
            STORY_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_get", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM story_questions WHERE story_id = ? ORDER BY rowid",
            QUESTION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_get", e))?;

        let questions = questions
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        row.into_story(questions).map(Some)
    }

    async fn list_all(&self) -> Result<Vec<Story>, RepoError> {
        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {} FROM stories ORDER BY rowid",
            STORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_list", e))?;

        let questions = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {} FROM story_questions ORDER BY rowid",
            QUESTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_list", e))?;

        Self::assemble(rows, questions)
    }

    async fn list_by_author(&self, author_id: ProfileId) -> Result<Vec<Story>, RepoError> {
        let rows = sqlx::query_as::<_, StoryRow>(&format!(
            "SELECT {} FROM stories WHERE author_id = ? ORDER BY rowid",
            STORY_COLUMNS
        ))
        .bind(author_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_list_by_author", e))?;

        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT q.id, q.story_id, q.parent_question_id, q.question_type, q.question_text,
                   q.created_at, q.updated_at
            FROM story_questions q
            JOIN stories s ON s.id = q.story_id
            WHERE s.author_id = ?
            ORDER BY q.rowid
            "#,
        )
        .bind(author_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("story_list_by_author", e))?;

        Self::assemble(rows, questions)
    }

    async fn save_with_questions(&self, story: &Story) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("story_save", e))?;

        sqlx::query(
            r#"
            INSERT INTO stories
                (id, title, description, initial_prompt, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                initial_prompt = excluded.initial_prompt,
                author_id = excluded.author_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(story.id().to_string())
        .bind(story.title().as_str())
        .bind(story.description().as_str())
        .bind(story.initial_prompt().as_str())
        .bind(story.author_id().map(|id| id.to_string()))
        .bind(format_time(story.created_at()))
        .bind(format_time(story.updated_at()))
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error("story_save", e))?;

        // Insertion order puts parents before children.
        for question in story.questions() {
            let written = sqlx::query(
                r#"
                INSERT INTO story_questions
                    (id, story_id, parent_question_id, question_type, question_text,
                     created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    parent_question_id = excluded.parent_question_id,
                    question_type = excluded.question_type,
                    question_text = excluded.question_text,
                    updated_at = excluded.updated_at
                WHERE story_questions.story_id = excluded.story_id
                "#,
            )
            .bind(question.id().to_string())
            .bind(question.story_id().to_string())
            .bind(question.parent_id().map(|id| id.to_string()))
            .bind(question.question_type().as_str())
            .bind(question.payload().to_json_string())
            .bind(format_time(question.created_at()))
            .bind(format_time(question.updated_at()))
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error("story_save", e))?;

            // Dropping `tx` on this path rolls the story back.
            if written.rows_affected() == 0 {
                return Err(RepoError::constraint(format!(
                    "Question {} belongs to another story",
                    question.id()
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("story_save", e))?;
        Ok(())
    }

    async fn delete(&self, id: StoryId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("story_delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Story", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{NarrativeRepo, ProgressRepo, QuestionRepo};
    use crate::infrastructure::sqlite::test_support::{
        fixed_time, narrative_for, seed_profile, seed_story, test_pool,
    };
    use crate::infrastructure::sqlite::{
        SqliteNarrativeRepo, SqliteProgressRepo, SqliteQuestionRepo,
    };
    use questionspark_domain::{Document, Progress, PromptText, QuestionType, StoryTitle};

    #[tokio::test]
    async fn list_all_on_empty_store_is_empty() {
        let (_dir, pool) = test_pool().await;
        let stories = SqliteStoryRepo::new(pool).list_all().await.unwrap();
        assert!(stories.is_empty());
    }

    #[tokio::test]
    async fn saved_story_reloads_with_its_questions() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteStoryRepo::new(pool.clone());

        let mut story = Story::new(
            StoryTitle::new("Lost and Found").unwrap(),
            PromptText::new("A robot finds a puppy").unwrap(),
            fixed_time(),
        );
        let root = Question::new(
            story.id(),
            QuestionType::text(),
            Document::new(serde_json::json!({"actions": ["a", "b"]})),
            fixed_time(),
        );
        let child = Question::new(
            story.id(),
            QuestionType::text(),
            Document::empty_object(),
            fixed_time(),
        )
        .with_parent(&root)
        .unwrap();
        story.add_question(root).unwrap();
        story.add_question(child).unwrap();

        repo.save_with_questions(&story).await.unwrap();
        let loaded = repo.get(story.id()).await.unwrap().expect("story");

        assert_eq!(loaded, story);
        assert!(loaded.questions().iter().all(|q| q.story_id() == story.id()));
    }

    #[tokio::test]
    async fn list_all_keeps_insertion_order() {
        let (_dir, pool) = test_pool().await;
        let first = seed_story(&pool, "First").await;
        let second = seed_story(&pool, "Second").await;

        let stories = SqliteStoryRepo::new(pool).list_all().await.unwrap();
        let ids: Vec<StoryId> = stories.iter().map(Story::id).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
        assert_eq!(stories[0].questions().len(), 1);
    }

    #[tokio::test]
    async fn list_by_author_filters() {
        let (_dir, pool) = test_pool().await;
        let author = seed_profile(&pool, "writer").await;
        let repo = SqliteStoryRepo::new(pool.clone());

        let _other = seed_story(&pool, "Anonymous").await;
        let mine = Story::new(
            StoryTitle::new("Mine").unwrap(),
            PromptText::new("prompt").unwrap(),
            fixed_time(),
        )
        .with_author(Some(author.id()));
        repo.save_with_questions(&mine).await.unwrap();

        let stories = repo.list_by_author(author.id()).await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id(), mine.id());
    }

    #[tokio::test]
    async fn question_owned_by_another_story_rolls_back_the_save() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteStoryRepo::new(pool.clone());
        let existing = seed_story(&pool, "Existing").await;
        let taken_id = existing.first_question().unwrap().id();

        let mut story = Story::new(
            StoryTitle::new("Doomed").unwrap(),
            PromptText::new("prompt").unwrap(),
            fixed_time(),
        );
        let clash = Question::new(
            story.id(),
            QuestionType::text(),
            Document::empty_array(),
            fixed_time(),
        )
        .with_id(taken_id);
        story.add_question(clash).unwrap();

        let err = repo.save_with_questions(&story).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
        assert!(repo.get(story.id()).await.unwrap().is_none());

        let untouched = repo.get(existing.id()).await.unwrap().expect("existing story");
        assert_eq!(untouched.questions().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_questions_narratives_and_progress() {
        let (_dir, pool) = test_pool().await;
        let profile = seed_profile(&pool, "reader").await;
        let story = seed_story(&pool, "Doomed").await;
        let question_id = story.first_question().unwrap().id();

        let narrative = narrative_for(&story, &profile, "run");
        SqliteNarrativeRepo::new(pool.clone()).save(&narrative).await.unwrap();
        let mut progress = Progress::new(profile.id(), story.id(), fixed_time());
        progress.advance_to(&narrative, fixed_time()).unwrap();
        SqliteProgressRepo::new(pool.clone()).save(&progress).await.unwrap();

        let repo = SqliteStoryRepo::new(pool.clone());
        repo.delete(story.id()).await.unwrap();

        assert!(repo.get(story.id()).await.unwrap().is_none());
        assert!(SqliteQuestionRepo::new(pool.clone())
            .get(question_id)
            .await
            .unwrap()
            .is_none());
        assert!(SqliteNarrativeRepo::new(pool.clone())
            .get(narrative.id())
            .await
            .unwrap()
            .is_none());
        assert!(SqliteProgressRepo::new(pool)
            .get_for_profile_and_story(profile.id(), story.id())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_missing_story_is_not_found() {
        let (_dir, pool) = test_pool().await;
        let err = SqliteStoryRepo::new(pool).delete(StoryId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
