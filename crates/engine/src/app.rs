//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    ports::{
        ClockPort, NarrativeRepo, ProfileRepo, ProgressRepo, QuestionRepo, StoryGeneratorPort,
        StoryRepo,
    },
    sqlite::SqliteRepositories,
};
use crate::use_cases::{
    AuthoringUseCases, CreateNarration, CreateStory, NarrationUseCases, NarrativeQueries,
    ProfileOps, ProgressOps, StoryQueries,
};

/// Main application state.
///
/// Holds all use cases. Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Port traits the use cases are wired against.
pub struct Repositories {
    pub story: Arc<dyn StoryRepo>,
    pub question: Arc<dyn QuestionRepo>,
    pub narrative: Arc<dyn NarrativeRepo>,
    pub profile: Arc<dyn ProfileRepo>,
    pub progress: Arc<dyn ProgressRepo>,
}

impl From<SqliteRepositories> for Repositories {
    fn from(repos: SqliteRepositories) -> Self {
        Self {
            story: repos.story,
            question: repos.question,
            narrative: repos.narrative,
            profile: repos.profile,
            progress: repos.progress,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub authoring: AuthoringUseCases,
    pub narration: NarrationUseCases,
    pub stories: Arc<StoryQueries>,
    pub narratives: Arc<NarrativeQueries>,
    pub progress: Arc<ProgressOps>,
    pub profiles: Arc<ProfileOps>,
}

impl App {
    /// Create a new App with all dependencies wired up, on the system clock.
    pub fn new(repos: impl Into<Repositories>, generator: Arc<dyn StoryGeneratorPort>) -> Self {
        Self::with_clock(repos, generator, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        repos: impl Into<Repositories>,
        generator: Arc<dyn StoryGeneratorPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let repos = repos.into();

        let create_story = Arc::new(CreateStory::new(
            repos.story.clone(),
            repos.profile.clone(),
            generator,
            clock.clone(),
        ));
        let create_narration = Arc::new(CreateNarration::new(
            repos.story.clone(),
            repos.narrative.clone(),
            repos.profile.clone(),
            clock.clone(),
        ));

        let use_cases = UseCases {
            authoring: AuthoringUseCases::new(create_story),
            narration: NarrationUseCases::new(create_narration),
            stories: Arc::new(StoryQueries::new(repos.story.clone(), repos.question.clone())),
            narratives: Arc::new(NarrativeQueries::new(
                repos.story.clone(),
                repos.narrative.clone(),
            )),
            progress: Arc::new(ProgressOps::new(
                repos.story.clone(),
                repos.narrative.clone(),
                repos.profile.clone(),
                repos.progress.clone(),
                clock.clone(),
            )),
            profiles: Arc::new(ProfileOps::new(repos.profile, clock)),
        };

        Self { use_cases }
    }
}
