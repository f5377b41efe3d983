//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area of the story graph.
//! Use cases orchestrate across repository ports to fulfill user stories.

pub mod authoring;
pub mod narration;
pub mod narratives;
pub mod profiles;
pub mod progress;
pub mod stories;
pub mod validation;

pub use authoring::{AuthoringError, AuthoringUseCases, CreateStory};
pub use narration::{CreateNarration, CreateNarrationInput, NarrationError, NarrationUseCases};
pub use narratives::{NarrativeQueries, NarrativeQueryError};
pub use profiles::{ProfileError, ProfileOps};
pub use progress::{ProgressError, ProgressOps};
pub use stories::{StoryQueries, StoryQueryError};
