//! HTTP routes.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;

use questionspark_domain::{Document, NarrativeId, ProfileId, QuestionId, StoryId};

use crate::api::dto::{
    AdvanceProgressRequest, CreateNarrationRequest, CreateProfileRequest, CreateStoryRequest,
    CreatedStoryDto, NarrationDto, NarrativeDto, NarrativeListQuery, NarrativeListing,
    ProfileDto, ProgressDto, QuestionDto, StoryDetailDto, StoryDto,
};
use crate::api::error::ApiError;
use crate::app::App;
use crate::use_cases::CreateNarrationInput;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    let api = Router::new()
        .route("/health", get(health))
        .route("/stories", get(list_stories).post(create_story))
        .route("/stories/{id}", get(get_story).delete(delete_story))
        .route("/stories/{id}/narration", post(create_narration))
        .route("/stories/{id}/narratives", get(list_story_narratives))
        .route(
            "/stories/{id}/progress/{profile_id}",
            get(get_progress).put(advance_progress).delete(delete_progress),
        )
        .route(
            "/stories/{id}/progress/{profile_id}/reset",
            post(reset_progress),
        )
        .route("/questions/{id}", get(get_question))
        .route("/questions/{id}/children", get(list_question_children))
        .route("/narratives/{id}", axum::routing::delete(delete_narrative))
        .route("/narratives/{id}/children", get(list_narrative_children))
        .route("/narratives/{id}/path", get(narrative_path))
        .route("/profiles", post(create_profile))
        .route("/profiles/{id}", get(get_profile))
        .route("/profiles/{id}/stories", get(list_profile_stories))
        .route("/profiles/{id}/progress", get(list_profile_progress));

    Router::new().nest("/api/v1", api)
}

/// JSON body extractor that reports rejections in the API error format.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query-string extractor that reports rejections in the API error format.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid UUID format: {}", raw)))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Stories
// =============================================================================

async fn list_stories(State(app): State<Arc<App>>) -> Result<Json<Vec<StoryDto>>, ApiError> {
    let stories = app.use_cases.stories.list().await?;
    Ok(Json(stories.iter().map(StoryDto::from).collect()))
}

async fn create_story(
    State(app): State<Arc<App>>,
    ApiJson(request): ApiJson<CreateStoryRequest>,
) -> Result<Json<CreatedStoryDto>, ApiError> {
    let story = app
        .use_cases
        .authoring
        .create_story
        .execute(&request.initial_prompt, request.author_id.map(ProfileId::from))
        .await?;
    Ok(Json(CreatedStoryDto {
        id: story.id().to_uuid(),
    }))
}

async fn get_story(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<StoryDetailDto>, ApiError> {
    let story_id: StoryId = parse_id(&id)?;
    let story = app.use_cases.stories.get_with_questions(story_id).await?;
    Ok(Json(StoryDetailDto::from(&story)))
}

async fn delete_story(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.use_cases.stories.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_narration(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<CreateNarrationRequest>,
) -> Result<Json<NarrationDto>, ApiError> {
    let story_id: StoryId = parse_id(&id)?;
    let input = CreateNarrationInput {
        parent_narrative_id: request.parent_narrative_id.map(NarrativeId::from),
        question_id: QuestionId::from(request.question_id),
        question_text: request.question_text,
        response: request.response,
        action: request.action,
        next_narrative: request.next_narrative.map(Document::new),
        profile_id: ProfileId::from(request.profile_id),
    };

    let narrative = app
        .use_cases
        .narration
        .create
        .execute(story_id, input)
        .await?;
    Ok(Json(NarrationDto::from(&narrative)))
}

// =============================================================================
// Questions
// =============================================================================

async fn get_question(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<QuestionDto>, ApiError> {
    let question = app.use_cases.stories.question(parse_id(&id)?).await?;
    Ok(Json(QuestionDto::from(&question)))
}

async fn list_question_children(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<QuestionDto>>, ApiError> {
    let children = app
        .use_cases
        .stories
        .question_children(parse_id(&id)?)
        .await?;
    Ok(Json(children.iter().map(QuestionDto::from).collect()))
}

// =============================================================================
// Narratives
// =============================================================================

async fn list_story_narratives(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<NarrativeListQuery>,
) -> Result<Json<NarrativeListing>, ApiError> {
    let story_id: StoryId = parse_id(&id)?;
    let profile_id: Option<ProfileId> = query
        .profile_id
        .as_deref()
        .map(parse_id)
        .transpose()?;

    let listing = if query.tree {
        let forest = app
            .use_cases
            .narratives
            .tree_for_story(story_id, profile_id)
            .await?;
        NarrativeListing::tree(forest)
    } else {
        let mut narratives = app.use_cases.narratives.list_for_story(story_id).await?;
        if let Some(profile_id) = profile_id {
            narratives.retain(|n| n.user_id() == profile_id);
        }
        NarrativeListing::flat(&narratives)
    };
    Ok(Json(listing))
}

async fn list_narrative_children(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NarrativeDto>>, ApiError> {
    let children = app
        .use_cases
        .narratives
        .list_children(parse_id(&id)?)
        .await?;
    Ok(Json(children.iter().map(NarrativeDto::from).collect()))
}

async fn narrative_path(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NarrativeDto>>, ApiError> {
    let path = app.use_cases.narratives.path_to(parse_id(&id)?).await?;
    Ok(Json(path.iter().map(NarrativeDto::from).collect()))
}

async fn delete_narrative(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.use_cases.narratives.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Progress
// =============================================================================

fn parse_progress_key(story_id: &str, profile_id: &str) -> Result<(ProfileId, StoryId), ApiError> {
    Ok((parse_id(profile_id)?, parse_id(story_id)?))
}

async fn get_progress(
    State(app): State<Arc<App>>,
    Path((story_id, profile_id)): Path<(String, String)>,
) -> Result<Json<ProgressDto>, ApiError> {
    let (profile_id, story_id) = parse_progress_key(&story_id, &profile_id)?;
    let progress = app
        .use_cases
        .progress
        .find(profile_id, story_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No progress for profile {} in story {}",
                profile_id, story_id
            ))
        })?;
    Ok(Json(ProgressDto::from(&progress)))
}

async fn advance_progress(
    State(app): State<Arc<App>>,
    Path((story_id, profile_id)): Path<(String, String)>,
    ApiJson(request): ApiJson<AdvanceProgressRequest>,
) -> Result<Json<ProgressDto>, ApiError> {
    let (profile_id, story_id) = parse_progress_key(&story_id, &profile_id)?;
    let progress = app
        .use_cases
        .progress
        .advance(profile_id, story_id, NarrativeId::from(request.narrative_id))
        .await?;
    Ok(Json(ProgressDto::from(&progress)))
}

async fn reset_progress(
    State(app): State<Arc<App>>,
    Path((story_id, profile_id)): Path<(String, String)>,
) -> Result<Json<ProgressDto>, ApiError> {
    let (profile_id, story_id) = parse_progress_key(&story_id, &profile_id)?;
    let progress = app.use_cases.progress.reset(profile_id, story_id).await?;
    Ok(Json(ProgressDto::from(&progress)))
}

async fn delete_progress(
    State(app): State<Arc<App>>,
    Path((story_id, profile_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (profile_id, story_id) = parse_progress_key(&story_id, &profile_id)?;
    app.use_cases.progress.delete(profile_id, story_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Profiles
// =============================================================================

async fn create_profile(
    State(app): State<Arc<App>>,
    ApiJson(request): ApiJson<CreateProfileRequest>,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = app
        .use_cases
        .profiles
        .create(&request.username, request.display_name)
        .await?;
    Ok(Json(ProfileDto::from(&profile)))
}

async fn get_profile(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = app.use_cases.profiles.get(parse_id(&id)?).await?;
    Ok(Json(ProfileDto::from(&profile)))
}

async fn list_profile_stories(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StoryDto>>, ApiError> {
    let stories = app
        .use_cases
        .stories
        .list_by_author(parse_id(&id)?)
        .await?;
    Ok(Json(stories.iter().map(StoryDto::from).collect()))
}

async fn list_profile_progress(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProgressDto>>, ApiError> {
    let records = app
        .use_cases
        .progress
        .list_for_profile(parse_id(&id)?)
        .await?;
    Ok(Json(records.iter().map(ProgressDto::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        GeneratedAction, GeneratedQuestion, GeneratedStory, MockStoryGeneratorPort,
    };
    use crate::infrastructure::sqlite::test_support::{fixed_time, test_pool};
    use crate::infrastructure::sqlite::SqliteRepositories;

    fn lost_and_found() -> GeneratedStory {
        GeneratedStory {
            title: "Lost and Found".to_string(),
            description: "A robot and a puppy".to_string(),
            initial_prompt: "A robot finds a puppy".to_string(),
            questions: vec![GeneratedQuestion {
                content: "The alley".to_string(),
                question_text: "What does the robot do?".to_string(),
                actions: vec![
                    GeneratedAction {
                        action_text: "Pick up the puppy".to_string(),
                        follow_up_prompt: "The robot carries it home".to_string(),
                    },
                    GeneratedAction {
                        action_text: "Walk away".to_string(),
                        follow_up_prompt: "The puppy follows".to_string(),
                    },
                ],
            }],
        }
    }

    async fn router() -> (TempDir, Router) {
        let (dir, pool) = test_pool().await;
        let mut generator = MockStoryGeneratorPort::new();
        generator
            .expect_generate()
            .returning(|_| Ok(lost_and_found()));
        let app = App::with_clock(
            SqliteRepositories::new(pool),
            Arc::new(generator),
            Arc::new(FixedClock(fixed_time())),
        );
        (dir, routes().with_state(Arc::new(app)))
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = axum::http::Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn create_profile(router: &Router, username: &str) -> String {
        let (status, body) = send(
            router,
            Method::POST,
            "/api/v1/profiles",
            Some(json!({"username": username})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    async fn create_story(router: &Router) -> (String, String) {
        let (status, body) = send(
            router,
            Method::POST,
            "/api/v1/stories",
            Some(json!({"initialPrompt": "A robot finds a puppy"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let story_id = body["id"].as_str().unwrap().to_string();

        let detail_uri = format!("/api/v1/stories/{}", story_id);
        let (_, detail) = send(router, Method::GET, &detail_uri, None).await;
        let question_id = detail["questionId"].as_str().unwrap().to_string();
        (story_id, question_id)
    }

    async fn narrate(
        router: &Router,
        story_id: &str,
        question_id: &str,
        profile_id: &str,
        parent: Option<&str>,
    ) -> (StatusCode, Value) {
        send(
            router,
            Method::POST,
            &format!("/api/v1/stories/{}/narration", story_id),
            Some(json!({
                "parentNarrativeId": parent,
                "questionId": question_id,
                "questionText": "pick up puppy",
                "response": "The puppy licks the robot's hand.",
                "action": "pick up",
                "nextNarrative": {"prompt": "The robot walks home"},
                "profileId": profile_id,
            })),
        )
        .await
    }

    #[tokio::test]
    async fn empty_store_lists_no_stories() {
        let (_dir, router) = router().await;
        let (status, body) = send(&router, Method::GET, "/api/v1/stories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn created_story_is_readable_with_its_question() {
        let (_dir, router) = router().await;
        let (story_id, question_id) = create_story(&router).await;

        let (status, detail) =
            send(&router, Method::GET, &format!("/api/v1/stories/{}", story_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "Lost and Found");
        assert_eq!(detail["questionId"], question_id.as_str());
        assert_eq!(detail["questions"][0]["actions"].as_array().map(Vec::len), Some(2));

        let (_, listed) = send(&router, Method::GET, "/api/v1/stories", None).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["title"], "Lost and Found");

        let (status, question) =
            send(&router, Method::GET, &format!("/api/v1/questions/{}", question_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(question["storyId"], story_id.as_str());
        assert_eq!(question["questionType"], "text");
    }

    #[tokio::test]
    async fn blank_prompt_is_bad_request() {
        let (_dir, router) = router().await;
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/stories",
            Some(json!({"initialPrompt": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "400");
    }

    #[tokio::test]
    async fn malformed_story_id_is_bad_request() {
        let (_dir, router) = router().await;
        let (status, body) = send(&router, Method::GET, "/api/v1/stories/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "400");
        assert_eq!(body["message"], "Invalid UUID format: not-a-uuid");
    }

    #[tokio::test]
    async fn unknown_story_is_not_found() {
        let (_dir, router) = router().await;
        let uri = format!("/api/v1/stories/{}", StoryId::new());
        let (status, body) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "404");
    }

    #[tokio::test]
    async fn narration_returns_the_created_node() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, question_id) = create_story(&router).await;

        let (status, body) = narrate(&router, &story_id, &question_id, &profile_id, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["id"].is_string());
        assert_eq!(body["storyId"], story_id.as_str());
        assert_eq!(body["content"], "The puppy licks the robot's hand.");
        assert!(body["createdAt"].is_string());
    }

    #[tokio::test]
    async fn narration_for_unknown_question_is_not_found() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, _) = create_story(&router).await;

        let (status, _) = narrate(
            &router,
            &story_id,
            &QuestionId::new().to_string(),
            &profile_id,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let uri = format!("/api/v1/stories/{}/narratives", story_id);
        let (_, listed) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn narration_with_missing_fields_is_bad_request() {
        let (_dir, router) = router().await;
        let uri = format!("/api/v1/stories/{}/narration", StoryId::new());
        let (status, body) =
            send(&router, Method::POST, &uri, Some(json!({"invalid": "json"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "400");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn narration_without_json_content_type_is_unsupported() {
        let (_dir, router) = router().await;
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/stories/{}/narration", StoryId::new()))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn progress_follows_the_narrative_tree() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, question_id) = create_story(&router).await;

        let (_, root) = narrate(&router, &story_id, &question_id, &profile_id, None).await;
        let root_id = root["id"].as_str().unwrap().to_string();
        let (_, child) =
            narrate(&router, &story_id, &question_id, &profile_id, Some(&root_id)).await;
        let child_id = child["id"].as_str().unwrap().to_string();

        let progress_uri = format!("/api/v1/stories/{}/progress/{}", story_id, profile_id);
        let (status, _) = send(&router, Method::GET, &progress_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, progress) = send(
            &router,
            Method::PUT,
            &progress_uri,
            Some(json!({"narrativeId": child_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progress["currentNarrativeId"], child_id.as_str());
        assert_eq!(progress["path"].as_array().map(Vec::len), Some(1));

        // The current position cannot be deleted out from under the progress record.
        let (status, _) = send(
            &router,
            Method::DELETE,
            &format!("/api/v1/narratives/{}", child_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let tree_uri = format!(
            "/api/v1/stories/{}/narratives?tree=true&profileId={}",
            story_id, profile_id
        );
        let (_, tree) = send(&router, Method::GET, &tree_uri, None).await;
        assert_eq!(tree.as_array().map(Vec::len), Some(1));
        assert_eq!(tree[0]["node"]["id"], root_id.as_str());
        assert_eq!(tree[0]["children"][0]["node"]["id"], child_id.as_str());

        let (status, reset) =
            send(&router, Method::POST, &format!("{}/reset", progress_uri), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["currentNarrativeId"], Value::Null);
        assert_eq!(reset["path"], json!([]));

        let (status, _) = send(&router, Method::DELETE, &progress_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn duplicate_username_is_bad_request() {
        let (_dir, router) = router().await;
        create_profile(&router, "ada").await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/profiles",
            Some(json!({"username": "ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("already taken"));
    }

    #[tokio::test]
    async fn narration_without_next_narrative_is_bad_request() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, question_id) = create_story(&router).await;

        let (status, body) = send(
            &router,
            Method::POST,
            &format!("/api/v1/stories/{}/narration", story_id),
            Some(json!({
                "questionId": question_id,
                "questionText": "pick up puppy",
                "response": "The puppy licks the robot's hand.",
                "action": "pick up",
                "nextNarrative": null,
                "profileId": profile_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "nextNarrative cannot be empty");
    }

    #[tokio::test]
    async fn bad_query_string_uses_the_error_body() {
        let (_dir, router) = router().await;
        let (story_id, _) = create_story(&router).await;

        let uri = format!("/api/v1/stories/{}/narratives?tree=yes", story_id);
        let (status, body) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "400");
        assert!(body["message"].is_string());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn narrative_path_runs_from_the_root() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, question_id) = create_story(&router).await;

        let (_, root) = narrate(&router, &story_id, &question_id, &profile_id, None).await;
        let root_id = root["id"].as_str().unwrap().to_string();
        let (_, child) =
            narrate(&router, &story_id, &question_id, &profile_id, Some(&root_id)).await;
        let child_id = child["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/narratives/{}/path", child_id);
        let (status, path) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(path.as_array().map(Vec::len), Some(2));
        assert_eq!(path[0]["id"], root_id.as_str());
        assert_eq!(path[1]["id"], child_id.as_str());

        let uri = format!("/api/v1/narratives/{}/path", NarrativeId::new());
        let (status, _) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_a_story_removes_its_narratives() {
        let (_dir, router) = router().await;
        let profile_id = create_profile(&router, "ada").await;
        let (story_id, question_id) = create_story(&router).await;
        let (_, root) = narrate(&router, &story_id, &question_id, &profile_id, None).await;
        let root_id = root["id"].as_str().unwrap().to_string();

        let story_uri = format!("/api/v1/stories/{}", story_id);
        let (status, _) = send(&router, Method::DELETE, &story_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&router, Method::GET, &story_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let uri = format!("/api/v1/narratives/{}/path", root_id);
        let (status, _) = send(&router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, Method::DELETE, &story_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
