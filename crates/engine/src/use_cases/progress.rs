//! A profile's position within a story's narrative tree.

use std::sync::Arc;

use questionspark_domain::{DomainError, NarrativeId, ProfileId, Progress, StoryId};

use crate::infrastructure::ports::{
    ClockPort, NarrativeRepo, ProfileRepo, ProgressRepo, RepoError, StoryRepo,
};
use crate::use_cases::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("Profile not found: {0}")]
    ProfileNotFound(ProfileId),
    #[error("Narrative not found: {0}")]
    NarrativeNotFound(NarrativeId),
    #[error("No progress for profile {profile_id} in story {story_id}")]
    ProgressNotFound {
        profile_id: ProfileId,
        story_id: StoryId,
    },
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: RepoError,
    },
}

impl ProgressError {
    fn service(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| {
            tracing::error!(error = %source, "{}", context);
            Self::Service { context, source }
        }
    }
}

impl From<DomainError> for ProgressError {
    fn from(err: DomainError) -> Self {
        Self::Validation(ValidationError::Domain(err))
    }
}

pub struct ProgressOps {
    stories: Arc<dyn StoryRepo>,
    narratives: Arc<dyn NarrativeRepo>,
    profiles: Arc<dyn ProfileRepo>,
    progress: Arc<dyn ProgressRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ProgressOps {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        narratives: Arc<dyn NarrativeRepo>,
        profiles: Arc<dyn ProfileRepo>,
        progress: Arc<dyn ProgressRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            narratives,
            profiles,
            progress,
            clock,
        }
    }

    pub async fn find(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
    ) -> Result<Option<Progress>, ProgressError> {
        self.progress
            .get_for_profile_and_story(profile_id, story_id)
            .await
            .map_err(ProgressError::service("Error fetching progress"))
    }

    pub async fn list_for_profile(
        &self,
        profile_id: ProfileId,
    ) -> Result<Vec<Progress>, ProgressError> {
        self.progress
            .list_for_profile(profile_id)
            .await
            .map_err(ProgressError::service("Error fetching progress"))
    }

    /// Move the profile to `narrative_id`, creating the progress record on first use.
    ///
    /// The narrative must be part of the story and authored by the profile.
    pub async fn advance(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
        narrative_id: NarrativeId,
    ) -> Result<Progress, ProgressError> {
        let context = "Error updating progress";

        if self
            .stories
            .get(story_id)
            .await
            .map_err(ProgressError::service(context))?
            .is_none()
        {
            return Err(ProgressError::StoryNotFound(story_id));
        }
        if self
            .profiles
            .get(profile_id)
            .await
            .map_err(ProgressError::service(context))?
            .is_none()
        {
            return Err(ProgressError::ProfileNotFound(profile_id));
        }
        let narrative = self
            .narratives
            .get(narrative_id)
            .await
            .map_err(ProgressError::service(context))?
            .ok_or(ProgressError::NarrativeNotFound(narrative_id))?;

        if narrative.user_id() != profile_id {
            return Err(ValidationError::Invalid {
                field_name: "narrativeId",
                reason: format!("narrative {} was authored by another profile", narrative_id),
            }
            .into());
        }

        let now = self.clock.now();
        let mut step = Progress::new(profile_id, story_id, now);
        step.advance_to(&narrative, now)?;

        let progress = self
            .progress
            .record_step(&step)
            .await
            .map_err(ProgressError::service(context))?;

        tracing::info!(
            %profile_id,
            %story_id,
            %narrative_id,
            "Progress advanced"
        );
        Ok(progress)
    }

    /// Clear the current position and the recorded path.
    pub async fn reset(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
    ) -> Result<Progress, ProgressError> {
        let mut progress = self
            .find(profile_id, story_id)
            .await?
            .ok_or(ProgressError::ProgressNotFound {
                profile_id,
                story_id,
            })?;
        progress.reset(self.clock.now());

        self.progress
            .save(&progress)
            .await
            .map_err(ProgressError::service("Error updating progress"))?;

        tracing::info!(%profile_id, %story_id, "Progress reset");
        Ok(progress)
    }

    pub async fn delete(
        &self,
        profile_id: ProfileId,
        story_id: StoryId,
    ) -> Result<(), ProgressError> {
        match self.progress.delete(profile_id, story_id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound { .. }) => Err(ProgressError::ProgressNotFound {
                profile_id,
                story_id,
            }),
            Err(e) => Err(ProgressError::service("Error deleting progress")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;
    use questionspark_domain::{
        ChoiceText, Document, Narrative, Profile, PromptText, ResponseText, Story, StoryTitle,
        Username,
    };

    use std::collections::HashSet;

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        MockClockPort, MockNarrativeRepo, MockProfileRepo, MockProgressRepo, MockStoryRepo,
    };
    use crate::infrastructure::sqlite::test_support::{
        narrative_for, seed_profile, seed_story, test_pool,
    };
    use crate::infrastructure::sqlite::SqliteRepositories;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    struct Fixture {
        story: Story,
        profile: Profile,
        narrative: Narrative,
    }

    impl Fixture {
        fn new() -> Self {
            let story = Story::new(
                StoryTitle::new("Lost and Found").unwrap(),
                PromptText::new("A robot finds a puppy").unwrap(),
                fixed_time(),
            );
            let profile = Profile::new(Username::new("ada").unwrap(), fixed_time());
            let narrative = Narrative::new(
                story.id(),
                profile.id(),
                ChoiceText::new("pick up puppy").unwrap(),
                ResponseText::new("The puppy is warm").unwrap(),
                fixed_time(),
            );
            Self {
                story,
                profile,
                narrative,
            }
        }

        fn ops(&self, progress: MockProgressRepo) -> ProgressOps {
            let mut stories = MockStoryRepo::new();
            let story = self.story.clone();
            stories
                .expect_get()
                .with(eq(story.id()))
                .returning(move |_| Ok(Some(story.clone())));

            let mut profiles = MockProfileRepo::new();
            let profile = self.profile.clone();
            profiles
                .expect_get()
                .with(eq(profile.id()))
                .returning(move |_| Ok(Some(profile.clone())));

            let mut narratives = MockNarrativeRepo::new();
            let narrative = self.narrative.clone();
            narratives
                .expect_get()
                .with(eq(narrative.id()))
                .returning(move |_| Ok(Some(narrative.clone())));

            let mut clock = MockClockPort::new();
            clock.expect_now().returning(fixed_time);

            ProgressOps::new(
                Arc::new(stories),
                Arc::new(narratives),
                Arc::new(profiles),
                Arc::new(progress),
                Arc::new(clock),
            )
        }
    }

    #[tokio::test]
    async fn first_advance_creates_the_record() {
        let fx = Fixture::new();
        let narrative_id = fx.narrative.id();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_record_step()
            .withf(move |p: &Progress| p.current_narrative_id() == Some(narrative_id))
            .times(1)
            .returning(|p| Ok(p.clone()));

        let saved = fx
            .ops(progress)
            .advance(fx.profile.id(), fx.story.id(), narrative_id)
            .await
            .unwrap();

        assert_eq!(saved.story_id(), fx.story.id());
        let path = saved.path().as_value().as_array().cloned().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0]["choice"], "pick up puppy");
    }

    #[tokio::test]
    async fn advance_to_another_story_is_rejected() {
        let mut fx = Fixture::new();
        fx.narrative = Narrative::new(
            questionspark_domain::StoryId::new(),
            fx.profile.id(),
            ChoiceText::new("elsewhere").unwrap(),
            ResponseText::new("Another story").unwrap(),
            fixed_time(),
        );

        let mut progress = MockProgressRepo::new();
        progress.expect_record_step().never();

        let err = fx
            .ops(progress)
            .advance(fx.profile.id(), fx.story.id(), fx.narrative.id())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressError::Validation(ValidationError::Domain(_))
        ));
    }

    #[tokio::test]
    async fn advance_to_someone_elses_narrative_is_rejected() {
        let mut fx = Fixture::new();
        fx.narrative = Narrative::new(
            fx.story.id(),
            ProfileId::new(),
            ChoiceText::new("walk away").unwrap(),
            ResponseText::new("The puppy follows").unwrap(),
            fixed_time(),
        );

        let mut progress = MockProgressRepo::new();
        progress.expect_record_step().never();

        let err = fx
            .ops(progress)
            .advance(fx.profile.id(), fx.story.id(), fx.narrative.id())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressError::Validation(ValidationError::Invalid { .. })
        ));
    }

    #[tokio::test]
    async fn later_advance_returns_the_stored_record() {
        let fx = Fixture::new();
        let mut stored = Progress::new(fx.profile.id(), fx.story.id(), fixed_time());
        stored.advance_to(&fx.narrative, fixed_time()).unwrap();
        stored.advance_to(&fx.narrative, fixed_time()).unwrap();
        let stored_id = stored.id();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_record_step()
            .times(1)
            .returning(move |_| Ok(stored.clone()));

        let advanced = fx
            .ops(progress)
            .advance(fx.profile.id(), fx.story.id(), fx.narrative.id())
            .await
            .unwrap();

        assert_eq!(advanced.id(), stored_id);
        assert_eq!(advanced.path().as_value().as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn reset_clears_pointer_and_path() {
        let fx = Fixture::new();
        let mut existing = Progress::new(fx.profile.id(), fx.story.id(), fixed_time());
        existing.advance_to(&fx.narrative, fixed_time()).unwrap();

        let mut progress = MockProgressRepo::new();
        progress
            .expect_get_for_profile_and_story()
            .with(eq(fx.profile.id()), eq(fx.story.id()))
            .returning(move |_, _| Ok(Some(existing.clone())));
        progress.expect_save().times(1).returning(|_| Ok(()));

        let reset = fx
            .ops(progress)
            .reset(fx.profile.id(), fx.story.id())
            .await
            .unwrap();

        assert_eq!(reset.current_narrative_id(), None);
        assert_eq!(reset.path(), &Document::empty_array());
    }

    #[tokio::test]
    async fn reset_without_progress_is_not_found() {
        let fx = Fixture::new();
        let mut progress = MockProgressRepo::new();
        progress
            .expect_get_for_profile_and_story()
            .returning(|_, _| Ok(None));

        let err = fx
            .ops(progress)
            .reset(fx.profile.id(), fx.story.id())
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::ProgressNotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_advances_keep_every_step() {
        let (_dir, pool) = test_pool().await;
        let profile = seed_profile(&pool, "ada").await;
        let story = seed_story(&pool, "Lost and Found").await;
        let repos = SqliteRepositories::new(pool);
        let ops = Arc::new(ProgressOps::new(
            repos.story,
            repos.narrative.clone(),
            repos.profile,
            repos.progress,
            Arc::new(FixedClock(fixed_time())),
        ));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let narrative = narrative_for(&story, &profile, &format!("choice {}", i));
            repos.narrative.save(&narrative).await.unwrap();
            let ops = Arc::clone(&ops);
            let (profile_id, story_id) = (profile.id(), story.id());
            tasks.push(tokio::spawn(async move {
                ops.advance(profile_id, story_id, narrative.id()).await
            }));
        }

        let mut returned_ids = HashSet::new();
        for task in tasks {
            returned_ids.insert(task.await.unwrap().unwrap().id());
        }

        let stored = ops.find(profile.id(), story.id()).await.unwrap().unwrap();
        assert_eq!(stored.path().as_value().as_array().map(Vec::len), Some(8));
        assert_eq!(returned_ids, HashSet::from([stored.id()]));
    }

    #[tokio::test]
    async fn find_without_record_is_none() {
        let fx = Fixture::new();
        let mut progress = MockProgressRepo::new();
        progress
            .expect_get_for_profile_and_story()
            .returning(|_, _| Ok(None));

        let found = fx
            .ops(progress)
            .find(fx.profile.id(), fx.story.id())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
