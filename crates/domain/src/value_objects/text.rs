//! Validated text newtypes for story graph entities
//!
//! These newtypes ensure that required text is valid by construction:
//! - Non-blank (except Description)
//! - Within length limits (counted in characters)
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for description fields
const MAX_DESCRIPTION_LENGTH: usize = 5000;

macro_rules! define_required_text {
    ($(#[$meta:meta])* $name:ident, $label:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum accepted length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Create a new validated value.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::Validation` if the text is blank after trimming
            /// or exceeds [`Self::MAX_LENGTH`] characters.
            pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
                let text = text.into();
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($label, " cannot be empty")));
                }
                if trimmed.chars().count() > Self::MAX_LENGTH {
                    return Err(DomainError::validation(format!(
                        "{} cannot exceed {} characters",
                        $label,
                        Self::MAX_LENGTH
                    )));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the text as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

define_required_text!(
    /// A story title (non-blank, <=255 chars, trimmed)
    StoryTitle,
    "Story title",
    255
);

define_required_text!(
    /// Free text that seeds story generation (non-blank, <=10000 chars)
    PromptText,
    "Initial prompt",
    10_000
);

define_required_text!(
    /// The choice label a user picked at a branch point
    ChoiceText,
    "Choice text",
    2_000
);

define_required_text!(
    /// The narrative consequence of a choice
    ResponseText,
    "Response text",
    20_000
);

define_required_text!(
    /// A profile's login handle
    Username,
    "Username",
    64
);

define_required_text!(
    /// Free-form question type tag, e.g. `text`
    QuestionType,
    "Question type",
    64
);

impl QuestionType {
    /// Tag used for generator-authored root questions.
    pub fn text() -> Self {
        Self("text".to_string())
    }
}

impl Default for QuestionType {
    fn default() -> Self {
        Self::text()
    }
}

// ============================================================================
// Description
// ============================================================================

/// A validated description (<=5000 chars, empty is valid)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Create a new validated description.
    ///
    /// Empty strings are valid for descriptions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the description exceeds 5000 characters.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(DomainError::validation(format!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
        Ok(Self(text.trim().to_string()))
    }

    /// Create an empty description.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the description as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the description is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Description {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Description {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Description> for String {
    fn from(desc: Description) -> String {
        desc.0
    }
}
