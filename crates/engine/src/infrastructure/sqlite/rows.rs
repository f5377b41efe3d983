//! Row types and conversions between SQLite text columns and domain values.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use questionspark_domain::{
    ChoiceText, Description, Document, DomainError, Narrative, Profile, Progress, PromptText,
    Question, QuestionType, ResponseText, Story, StoryTitle, Username,
};
use sqlx::FromRow;

use crate::infrastructure::ports::RepoError;

pub(super) fn parse_id<T>(raw: &str) -> Result<T, RepoError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse().map_err(RepoError::serialization)
}

fn parse_optional_id<T>(raw: Option<&str>) -> Result<Option<T>, RepoError>
where
    T: FromStr<Err = DomainError>,
{
    raw.map(parse_id).transpose()
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(format!("Invalid timestamp '{}': {}", raw, e)))
}

fn parse_document(raw: &str) -> Result<Document, RepoError> {
    Document::parse(raw).map_err(RepoError::serialization)
}

pub(super) fn format_time(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// =============================================================================
// Stories
// =============================================================================

#[derive(Debug, FromRow)]
pub(super) struct StoryRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub initial_prompt: String,
    pub author_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoryRow {
    /// Rebuild the story and attach its questions, re-checking the question tree.
    pub fn into_story(self, questions: Vec<Question>) -> Result<Story, RepoError> {
        let title = StoryTitle::new(self.title).map_err(RepoError::serialization)?;
        let prompt = PromptText::new(self.initial_prompt).map_err(RepoError::serialization)?;
        let description = Description::new(self.description).map_err(RepoError::serialization)?;

        Story::new(title, prompt, parse_time(&self.created_at)?)
            .with_id(parse_id(&self.id)?)
            .with_description(description)
            .with_author(parse_optional_id(self.author_id.as_deref())?)
            .with_updated_at(parse_time(&self.updated_at)?)
            .restore(questions)
            .map_err(RepoError::serialization)
    }
}

// =============================================================================
// Questions
// =============================================================================

#[derive(Debug, FromRow)]
pub(super) struct QuestionRow {
    pub id: String,
    pub story_id: String,
    pub parent_question_id: Option<String>,
    pub question_type: String,
    pub question_text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = RepoError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let question_type = QuestionType::new(row.question_type).map_err(RepoError::serialization)?;

        Ok(Question::new(
            parse_id(&row.story_id)?,
            question_type,
            parse_document(&row.question_text)?,
            parse_time(&row.created_at)?,
        )
        .with_id(parse_id(&row.id)?)
        .with_parent_id(parse_optional_id(row.parent_question_id.as_deref())?)
        .with_updated_at(parse_time(&row.updated_at)?))
    }
}

// =============================================================================
// Narratives
// =============================================================================

#[derive(Debug, FromRow)]
pub(super) struct NarrativeRow {
    pub id: String,
    pub story_id: String,
    pub user_id: String,
    pub parent_narrative_id: Option<String>,
    pub question_id: Option<String>,
    pub choice_text: String,
    pub response_text: String,
    pub next_narrative: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<NarrativeRow> for Narrative {
    type Error = RepoError;

    fn try_from(row: NarrativeRow) -> Result<Self, Self::Error> {
        let choice = ChoiceText::new(row.choice_text).map_err(RepoError::serialization)?;
        let response = ResponseText::new(row.response_text).map_err(RepoError::serialization)?;

        Ok(Narrative::new(
            parse_id(&row.story_id)?,
            parse_id(&row.user_id)?,
            choice,
            response,
            parse_time(&row.created_at)?,
        )
        .with_id(parse_id(&row.id)?)
        .with_parent_id(parse_optional_id(row.parent_narrative_id.as_deref())?)
        .with_question_id(parse_optional_id(row.question_id.as_deref())?)
        .with_next_narrative(parse_document(&row.next_narrative)?)
        .with_updated_at(parse_time(&row.updated_at)?))
    }
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, FromRow)]
pub(super) struct ProfileRow {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepoError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username).map_err(RepoError::serialization)?;

        Ok(Profile::new(username, parse_time(&row.created_at)?)
            .with_id(parse_id(&row.id)?)
            .with_display_name(row.display_name))
    }
}

// =============================================================================
// Progress
// =============================================================================

#[derive(Debug, FromRow)]
pub(super) struct ProgressRow {
    pub id: String,
    pub user_id: String,
    pub story_id: String,
    pub current_narrative_id: Option<String>,
    pub progress_path: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ProgressRow> for Progress {
    type Error = RepoError;

    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        Ok(Progress::new(
            parse_id(&row.user_id)?,
            parse_id(&row.story_id)?,
            parse_time(&row.created_at)?,
        )
        .with_id(parse_id(&row.id)?)
        .with_current_narrative_id(parse_optional_id(row.current_narrative_id.as_deref())?)
        .with_path(parse_document(&row.progress_path)?)
        .with_updated_at(parse_time(&row.updated_at)?))
    }
}
