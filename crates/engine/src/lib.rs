//! QuestionSpark engine library.
//!
//! This crate contains all server-side code for the interactive-fiction backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Authoring, narration and read paths over the story graph
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
