extern crate self as questionspark_domain;

pub mod aggregates;
pub mod error;
pub mod ids;
pub mod tree;
pub mod value_objects;

pub use aggregates::{Narrative, Profile, Progress, Question, Story};
pub use error::DomainError;
pub use ids::{NarrativeId, ProfileId, ProgressId, QuestionId, StoryId};
pub use tree::{ancestry, build_forest, check_acyclic, children_of, roots, ParentLinked, TreeNode};
pub use value_objects::{
    ChoiceText, Description, Document, PromptText, QuestionType, ResponseText, StoryTitle,
    Username,
};
