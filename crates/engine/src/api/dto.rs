//! JSON request and response bodies. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use questionspark_domain::{Narrative, Profile, Progress, Question, Story, TreeNode};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    pub initial_prompt: String,
    #[serde(default)]
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNarrationRequest {
    #[serde(default)]
    pub parent_narrative_id: Option<Uuid>,
    pub question_id: Uuid,
    pub question_text: String,
    pub response: String,
    pub action: String,
    #[serde(default)]
    pub next_narrative: Option<Value>,
    pub profile_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceProgressRequest {
    pub narrative_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeListQuery {
    pub profile_id: Option<String>,
    #[serde(default)]
    pub tree: bool,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Story> for StoryDto {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id().to_uuid(),
            title: story.title().to_string(),
            description: story.description().to_string(),
            created_at: story.created_at(),
        }
    }
}

/// A story with its first question, which is what a reader starts from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDetailDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub initial_prompt: String,
    pub author_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
    pub questions: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&Story> for StoryDetailDto {
    fn from(story: &Story) -> Self {
        let first = story.first_question();
        Self {
            id: story.id().to_uuid(),
            title: story.title().to_string(),
            description: story.description().to_string(),
            initial_prompt: story.initial_prompt().to_string(),
            author_id: story.author_id().map(|id| id.to_uuid()),
            question_id: first.map(|q| q.id().to_uuid()),
            questions: first.map(|q| q.payload().as_value().clone()),
            created_at: story.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStoryDto {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: Uuid,
    pub story_id: Uuid,
    pub parent_question_id: Option<Uuid>,
    pub question_type: String,
    pub question_text: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id().to_uuid(),
            story_id: question.story_id().to_uuid(),
            parent_question_id: question.parent_id().map(|id| id.to_uuid()),
            question_type: question.question_type().to_string(),
            question_text: question.payload().as_value().clone(),
            created_at: question.created_at(),
            updated_at: question.updated_at(),
        }
    }
}

/// Summary returned when a narration is created.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationDto {
    pub id: Uuid,
    pub story_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Narrative> for NarrationDto {
    fn from(narrative: &Narrative) -> Self {
        Self {
            id: narrative.id().to_uuid(),
            story_id: narrative.story_id().to_uuid(),
            content: narrative.response_text().to_string(),
            created_at: narrative.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeDto {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub parent_narrative_id: Option<Uuid>,
    pub question_id: Option<Uuid>,
    pub choice_text: String,
    pub response_text: String,
    pub next_narrative: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Narrative> for NarrativeDto {
    fn from(narrative: &Narrative) -> Self {
        Self {
            id: narrative.id().to_uuid(),
            story_id: narrative.story_id().to_uuid(),
            user_id: narrative.user_id().to_uuid(),
            parent_narrative_id: narrative.parent_id().map(|id| id.to_uuid()),
            question_id: narrative.question_id().map(|id| id.to_uuid()),
            choice_text: narrative.choice_text().to_string(),
            response_text: narrative.response_text().to_string(),
            next_narrative: narrative.next_narrative().as_value().clone(),
            created_at: narrative.created_at(),
            updated_at: narrative.updated_at(),
        }
    }
}

/// Flat or nested narrative listing, depending on the `tree` query flag.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NarrativeListing {
    Flat(Vec<NarrativeDto>),
    Tree(Vec<TreeNode<NarrativeDto>>),
}

impl NarrativeListing {
    pub fn flat(narratives: &[Narrative]) -> Self {
        Self::Flat(narratives.iter().map(NarrativeDto::from).collect())
    }

    pub fn tree(forest: Vec<TreeNode<Narrative>>) -> Self {
        Self::Tree(
            forest
                .into_iter()
                .map(|node| node.map(&|n: Narrative| NarrativeDto::from(&n)))
                .collect(),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub story_id: Uuid,
    pub current_narrative_id: Option<Uuid>,
    pub path: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Progress> for ProgressDto {
    fn from(progress: &Progress) -> Self {
        Self {
            id: progress.id().to_uuid(),
            profile_id: progress.profile_id().to_uuid(),
            story_id: progress.story_id().to_uuid(),
            current_narrative_id: progress.current_narrative_id().map(|id| id.to_uuid()),
            path: progress.path().as_value().clone(),
            created_at: progress.created_at(),
            updated_at: progress.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id().to_uuid(),
            username: profile.username().to_string(),
            display_name: profile.display_name().map(str::to_string),
            created_at: profile.created_at(),
        }
    }
}
