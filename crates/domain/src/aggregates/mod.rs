//! Aggregates - The story graph and the users moving through it
//!
//! A [`Story`] owns its [`Question`] tree. [`Narrative`] nodes form a per-profile tree anchored
//! on those questions, and a [`Progress`] record points into that tree by id.

pub mod narrative;
pub mod profile;
pub mod progress;
pub mod question;
pub mod story;

pub use narrative::Narrative;
pub use profile::Profile;
pub use progress::Progress;
pub use question::Question;
pub use story::Story;
