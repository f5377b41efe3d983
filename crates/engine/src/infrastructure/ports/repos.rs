//! Repository port traits for database access.

use async_trait::async_trait;
use questionspark_domain::{
    Narrative, NarrativeId, Profile, ProfileId, Progress, Question, QuestionId, Story, StoryId,
};

use super::error::RepoError;

// =============================================================================
// Database Ports (one per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepo: Send + Sync {
    /// Story with all of its questions, or `None`.
    async fn get(&self, id: StoryId) -> Result<Option<Story>, RepoError>;
    /// Every story in storage order, questions included.
    async fn list_all(&self) -> Result<Vec<Story>, RepoError>;
    async fn list_by_author(&self, author_id: ProfileId) -> Result<Vec<Story>, RepoError>;
    /// Write the story and all of its questions in one transaction.
    async fn save_with_questions(&self, story: &Story) -> Result<(), RepoError>;
    /// Remove the story together with its questions, narratives and progress records.
    async fn delete(&self, id: StoryId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepo: Send + Sync {
    async fn get(&self, id: QuestionId) -> Result<Option<Question>, RepoError>;
    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Question>, RepoError>;
    async fn list_children(&self, parent_id: QuestionId) -> Result<Vec<Question>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeRepo: Send + Sync {
    async fn get(&self, id: NarrativeId) -> Result<Option<Narrative>, RepoError>;
    async fn save(&self, narrative: &Narrative) -> Result<(), RepoError>;
    async fn list_for_story(&self, story_id: StoryId) -> Result<Vec<Narrative>, RepoError>;
    async fn list_children(&self, parent_id: NarrativeId) -> Result<Vec<Narrative>, RepoError>;
    /// Refused with `ConstraintViolation` while a progress record points at the node or it
    /// still has children.
    async fn delete(&self, id: NarrativeId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get(&self, id: ProfileId) -> Result<Option<Profile>, RepoError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError>;
    async fn save(&self, profile: &Profile) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepo: Send + Sync {
    async fn get_for_profile_and_story(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
    ) -> Result<Option<Progress>, RepoError>;
    async fn list_for_profile(&self, profile_id: ProfileId) -> Result<Vec<Progress>, RepoError>;
    /// Insert or update; (profile, story) is unique.
    async fn save(&self, progress: &Progress) -> Result<(), RepoError>;
    /// Move the pair's record to `started`'s current narrative and append the single step in
    /// `started`'s path, inserting `started` itself when the pair has no record yet.
    ///
    /// One atomic write, so concurrent steps never drop each other. Returns the stored record.
    async fn record_step(&self, started: &Progress) -> Result<Progress, RepoError>;
    async fn delete(&self, profile_id: ProfileId, story_id: StoryId) -> Result<(), RepoError>;
}
