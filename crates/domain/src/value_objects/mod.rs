//! Value objects - Immutable objects defined by their attributes

mod document;
mod text;

pub use document::Document;
pub use text::{
    ChoiceText, Description, PromptText, QuestionType, ResponseText, StoryTitle, Username,
};
