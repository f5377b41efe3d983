//! Opaque structured payloads
//!
//! Question content, a narrative's "next narrative" branch and a progress path are all
//! generator-controlled JSON. The core only guarantees they are well-formed; their inner shape
//! is never inspected here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::DomainError;

/// A well-formed JSON document with no schema attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Value);

impl Document {
    /// Wrap an already-parsed value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse JSON text, checking only that it is well-formed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Parse` when the text is not valid JSON.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(|e| DomainError::parse(format!("Malformed JSON document: {}", e)))
    }

    /// `{}`
    pub fn empty_object() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    /// `[]`
    pub fn empty_array() -> Self {
        Self(Value::Array(Vec::new()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Mutable access to the elements when the document is an array.
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.0.as_array_mut()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Compact JSON text, the storage representation.
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Value {
        doc.0
    }
}
