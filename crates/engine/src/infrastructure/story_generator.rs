//! Story generation over an LLM chat endpoint.
//!
//! The model is asked for a JSON document; anything that does not parse into a titled story with
//! at least one question is rejected, so authoring never persists half a story.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::ports::{
    ChatMessage, GeneratedStory, GenerationError, LlmPort, LlmRequest, StoryGeneratorPort,
};

const SYSTEM_PROMPT: &str = r#"Generate a story with the following format:
1. A title
2. A description
3. An initial prompt
4. Three questions, each containing:
   - Content the question relates to
   - Question text
   - Three possible actions, each with:
     - Action text
     - Follow-up prompt
Return as JSON with exactly these keys:
{"title": "", "description": "", "initialPrompt": "",
 "questions": [{"content": "", "questionText": "",
   "actions": [{"actionText": "", "followUpPrompt": ""}]}]}
Return only the JSON document."#;

pub struct LlmStoryGenerator {
    llm: Arc<dyn LlmPort>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmStoryGenerator {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        temperature: f32,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            temperature,
            max_tokens,
            timeout,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmPort>, config: &LlmConfig) -> Self {
        Self::new(
            llm,
            config.temperature,
            config.max_tokens,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl StoryGeneratorPort for LlmStoryGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedStory, GenerationError> {
        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(self.temperature)
            .with_max_tokens(Some(self.max_tokens));

        let response = tokio::time::timeout(self.timeout, self.llm.generate(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        tracing::debug!(
            finish_reason = ?response.finish_reason,
            chars = response.content.len(),
            "Story generator responded"
        );

        parse_generated_story(&response.content)
    }
}

/// Parse model output into a story, tolerating a surrounding markdown code fence.
pub fn parse_generated_story(content: &str) -> Result<GeneratedStory, GenerationError> {
    let body = strip_code_fences(content);
    if body.is_empty() {
        return Err(GenerationError::Empty);
    }

    let story: GeneratedStory =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if story.title.trim().is_empty() {
        return Err(GenerationError::Malformed("story has no title".to_string()));
    }
    if story.questions.is_empty() {
        return Err(GenerationError::Malformed("story has no questions".to_string()));
    }
    Ok(story)
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag line, e.g. ```json
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{FinishReason, LlmError, LlmResponse, MockLlmPort};

    const STORY_JSON: &str = r#"{
        "title": "Lost and Found",
        "description": "A robot and a puppy",
        "initialPrompt": "A robot finds a puppy",
        "questions": [{
            "content": "The alley",
            "questionText": "What does the robot do?",
            "actions": [
                {"actionText": "Pick up the puppy", "followUpPrompt": "The robot carries it home"},
                {"actionText": "Walk away", "followUpPrompt": "The puppy follows"}
            ]
        }]
    }"#;

    fn response(content: &str) -> LlmResponse {
        LlmResponse {
            content: content.to_string(),
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }

    fn generator(llm: impl LlmPort + 'static, timeout: Duration) -> LlmStoryGenerator {
        LlmStoryGenerator::new(Arc::new(llm), 0.7, 2000, timeout)
    }

    #[tokio::test]
    async fn sends_prompt_with_system_instructions() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|request| {
                request.messages.len() == 1
                    && request.messages[0].content == "A robot finds a puppy"
                    && request
                        .system_prompt
                        .as_deref()
                        .is_some_and(|p| p.contains("Return as JSON"))
                    && request.max_tokens == Some(2000)
            })
            .returning(|_| Ok(response(STORY_JSON)));

        let story = generator(llm, Duration::from_secs(5))
            .generate("A robot finds a puppy")
            .await
            .unwrap();

        assert_eq!(story.title, "Lost and Found");
        assert_eq!(story.questions.len(), 1);
        assert_eq!(story.questions[0].actions.len(), 2);
        assert_eq!(story.questions[0].actions[1].action_text, "Walk away");
    }

    #[tokio::test]
    async fn transport_failure_is_request_failed() {
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .returning(|_| Err(LlmError::RequestFailed("connection refused".to_string())));

        let err = generator(llm, Duration::from_secs(5))
            .generate("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        struct SlowLlm;

        #[async_trait]
        impl LlmPort for SlowLlm {
            async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(response(STORY_JSON))
            }
        }

        let err = generator(SlowLlm, Duration::from_millis(20))
            .generate("prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)));
    }

    #[test]
    fn fenced_output_is_accepted() {
        let fenced = format!("```json\n{}\n```", STORY_JSON);
        assert_eq!(parse_generated_story(&fenced).unwrap().title, "Lost and Found");
    }

    #[test]
    fn snake_case_keys_are_accepted() {
        let raw = r#"{"title": "T", "initial_prompt": "P",
            "questions": [{"question_text": "Q",
                "actions": [{"action_text": "A", "follow_up_prompt": "F"}]}]}"#;
        let story = parse_generated_story(raw).unwrap();
        assert_eq!(story.initial_prompt, "P");
        assert_eq!(story.questions[0].question_text, "Q");
        assert_eq!(story.questions[0].actions[0].follow_up_prompt, "F");
    }

    #[test]
    fn blank_output_is_empty() {
        assert!(matches!(
            parse_generated_story("  \n "),
            Err(GenerationError::Empty)
        ));
        assert!(matches!(
            parse_generated_story("```json\n```"),
            Err(GenerationError::Empty)
        ));
    }

    #[test]
    fn unusable_output_is_malformed() {
        assert!(matches!(
            parse_generated_story("Once upon a time"),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_generated_story(r#"{"title": "  ", "questions": [{}]}"#),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_generated_story(r#"{"title": "T", "questions": []}"#),
            Err(GenerationError::Malformed(_))
        ));
    }
}
