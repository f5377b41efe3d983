//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (could swap SQLite -> Postgres)
//! - LLM calls and story generation (could swap Ollama -> hosted OpenAI)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{NarrativeRepo, ProfileRepo, ProgressRepo, QuestionRepo, StoryRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, GeneratedAction, GeneratedQuestion, GeneratedStory, LlmPort,
    LlmRequest, LlmResponse, MessageRole, StoryGeneratorPort, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockNarrativeRepo, MockProfileRepo, MockProgressRepo, MockQuestionRepo, MockStoryRepo,
};

#[cfg(test)]
pub use external::{MockLlmPort, MockStoryGeneratorPort};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{GenerationError, LlmError, RepoError};
