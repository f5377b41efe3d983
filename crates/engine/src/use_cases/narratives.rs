//! Narrative lookups, tree reconstruction and guarded deletion.

use std::sync::Arc;

use questionspark_domain::{
    ancestry, build_forest, Narrative, NarrativeId, ProfileId, StoryId, TreeNode,
};

use crate::infrastructure::ports::{NarrativeRepo, RepoError, StoryRepo};

#[derive(Debug, thiserror::Error)]
pub enum NarrativeQueryError {
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("Narrative not found: {0}")]
    NarrativeNotFound(NarrativeId),
    /// A progress record or a child node still references the narrative.
    #[error("Narrative is still in use: {0}")]
    InUse(String),
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: RepoError,
    },
}

impl NarrativeQueryError {
    fn service(context: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| {
            tracing::error!(error = %source, "{}", context);
            Self::Service { context, source }
        }
    }
}

pub struct NarrativeQueries {
    stories: Arc<dyn StoryRepo>,
    narratives: Arc<dyn NarrativeRepo>,
}

impl NarrativeQueries {
    pub fn new(stories: Arc<dyn StoryRepo>, narratives: Arc<dyn NarrativeRepo>) -> Self {
        Self { stories, narratives }
    }

    /// Flat list of every narrative node in the story, oldest first.
    pub async fn list_for_story(
        &self,
        story_id: StoryId,
    ) -> Result<Vec<Narrative>, NarrativeQueryError> {
        let story = self
            .stories
            .get(story_id)
            .await
            .map_err(NarrativeQueryError::service("Error fetching story"))?;
        if story.is_none() {
            return Err(NarrativeQueryError::StoryNotFound(story_id));
        }

        self.narratives
            .list_for_story(story_id)
            .await
            .map_err(NarrativeQueryError::service("Error fetching narratives"))
    }

    /// Direct children of `parent_id`; empty when it has none or does not exist.
    pub async fn list_children(
        &self,
        parent_id: NarrativeId,
    ) -> Result<Vec<Narrative>, NarrativeQueryError> {
        self.narratives
            .list_children(parent_id)
            .await
            .map_err(NarrativeQueryError::service("Error fetching narratives"))
    }

    /// Nested narrative trees of the story, optionally restricted to one profile's nodes.
    pub async fn tree_for_story(
        &self,
        story_id: StoryId,
        profile_id: Option<ProfileId>,
    ) -> Result<Vec<TreeNode<Narrative>>, NarrativeQueryError> {
        let mut nodes = self.list_for_story(story_id).await?;
        if let Some(profile_id) = profile_id {
            nodes.retain(|n| n.user_id() == profile_id);
        }
        Ok(build_forest(nodes))
    }

    /// The steps that led to `id`, starting at its root and ending with the node itself.
    pub async fn path_to(&self, id: NarrativeId) -> Result<Vec<Narrative>, NarrativeQueryError> {
        let context = "Error fetching narratives";
        let narrative = self
            .narratives
            .get(id)
            .await
            .map_err(NarrativeQueryError::service(context))?
            .ok_or(NarrativeQueryError::NarrativeNotFound(id))?;

        let nodes = self
            .narratives
            .list_for_story(narrative.story_id())
            .await
            .map_err(NarrativeQueryError::service(context))?;

        let mut path: Vec<Narrative> = ancestry(&nodes, id).into_iter().cloned().collect();
        path.reverse();
        Ok(path)
    }

    pub async fn delete(&self, id: NarrativeId) -> Result<(), NarrativeQueryError> {
        match self.narratives.delete(id).await {
            Ok(()) => {
                tracing::info!(narrative_id = %id, "Narrative deleted");
                Ok(())
            }
            Err(RepoError::NotFound { .. }) => Err(NarrativeQueryError::NarrativeNotFound(id)),
            Err(RepoError::ConstraintViolation(reason)) => {
                Err(NarrativeQueryError::InUse(reason))
            }
            Err(e) => Err(NarrativeQueryError::service("Error deleting narrative")(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use questionspark_domain::{ChoiceText, PromptText, ResponseText, Story, StoryTitle};

    use crate::infrastructure::ports::{MockNarrativeRepo, MockStoryRepo};

    fn story() -> Story {
        Story::new(
            StoryTitle::new("Lost and Found").unwrap(),
            PromptText::new("A robot finds a puppy").unwrap(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    fn narrative(story_id: StoryId, user_id: ProfileId, choice: &str) -> Narrative {
        Narrative::new(
            story_id,
            user_id,
            ChoiceText::new(choice).unwrap(),
            ResponseText::new("Something happens").unwrap(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        )
    }

    fn stories_with(story: Story) -> MockStoryRepo {
        let story_id = story.id();
        let mut stories = MockStoryRepo::new();
        stories
            .expect_get()
            .with(eq(story_id))
            .returning(move |_| Ok(Some(story.clone())));
        stories
    }

    #[tokio::test]
    async fn unknown_story_is_story_not_found() {
        let mut stories = MockStoryRepo::new();
        stories.expect_get().returning(|_| Ok(None));
        let mut narratives = MockNarrativeRepo::new();
        narratives.expect_list_for_story().never();

        let queries = NarrativeQueries::new(Arc::new(stories), Arc::new(narratives));
        let err = queries.list_for_story(StoryId::new()).await.unwrap_err();
        assert!(matches!(err, NarrativeQueryError::StoryNotFound(_)));
    }

    #[tokio::test]
    async fn childless_parent_lists_nothing() {
        let mut narratives = MockNarrativeRepo::new();
        narratives.expect_list_children().returning(|_| Ok(vec![]));

        let queries = NarrativeQueries::new(Arc::new(MockStoryRepo::new()), Arc::new(narratives));
        assert!(queries
            .list_children(NarrativeId::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn tree_is_rebuilt_per_profile() {
        let story = story();
        let story_id = story.id();
        let ada = ProfileId::new();
        let bob = ProfileId::new();

        let root = narrative(story_id, ada, "pick up puppy");
        let left = narrative(story_id, ada, "go home")
            .with_parent(&root)
            .unwrap();
        let right = narrative(story_id, ada, "find the owner")
            .with_parent(&root)
            .unwrap();
        let other = narrative(story_id, bob, "walk away");
        let root_id = root.id();
        let all = vec![root, left, right, other];

        let mut narratives = MockNarrativeRepo::new();
        narratives
            .expect_list_for_story()
            .with(eq(story_id))
            .returning(move |_| Ok(all.clone()));

        let queries = NarrativeQueries::new(Arc::new(stories_with(story)), Arc::new(narratives));
        let forest = queries.tree_for_story(story_id, Some(ada)).await.unwrap();

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node.id(), root_id);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].node.choice_text().as_str(), "go home");
    }

    #[tokio::test]
    async fn path_runs_from_root_to_node() {
        let story_id = StoryId::new();
        let ada = ProfileId::new();
        let root = narrative(story_id, ada, "pick up puppy");
        let middle = narrative(story_id, ada, "go home")
            .with_parent(&root)
            .unwrap();
        let leaf = narrative(story_id, ada, "feed the puppy")
            .with_parent(&middle)
            .unwrap();
        let sibling = narrative(story_id, ada, "find the owner")
            .with_parent(&root)
            .unwrap();
        let expected = vec![root.id(), middle.id(), leaf.id()];
        let leaf_id = leaf.id();
        let found = leaf.clone();
        let all = vec![root, middle, leaf, sibling];

        let mut narratives = MockNarrativeRepo::new();
        narratives
            .expect_get()
            .with(eq(leaf_id))
            .returning(move |_| Ok(Some(found.clone())));
        narratives
            .expect_list_for_story()
            .with(eq(story_id))
            .returning(move |_| Ok(all.clone()));

        let queries = NarrativeQueries::new(Arc::new(MockStoryRepo::new()), Arc::new(narratives));
        let path = queries.path_to(leaf_id).await.unwrap();

        let ids: Vec<NarrativeId> = path.iter().map(Narrative::id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn path_to_missing_narrative_is_not_found() {
        let mut narratives = MockNarrativeRepo::new();
        narratives.expect_get().returning(|_| Ok(None));
        narratives.expect_list_for_story().never();

        let queries = NarrativeQueries::new(Arc::new(MockStoryRepo::new()), Arc::new(narratives));
        let err = queries.path_to(NarrativeId::new()).await.unwrap_err();
        assert!(matches!(err, NarrativeQueryError::NarrativeNotFound(_)));
    }

    #[tokio::test]
    async fn delete_referenced_narrative_is_in_use() {
        let mut narratives = MockNarrativeRepo::new();
        narratives.expect_delete().returning(|_| {
            Err(RepoError::constraint(
                "narrative is the current position of a progress record",
            ))
        });

        let queries = NarrativeQueries::new(Arc::new(MockStoryRepo::new()), Arc::new(narratives));
        let err = queries.delete(NarrativeId::new()).await.unwrap_err();
        assert!(matches!(err, NarrativeQueryError::InUse(_)));
    }

    #[tokio::test]
    async fn delete_missing_narrative_is_not_found() {
        let id = NarrativeId::new();
        let mut narratives = MockNarrativeRepo::new();
        narratives
            .expect_delete()
            .with(eq(id))
            .returning(|id| Err(RepoError::not_found("Narrative", id)));

        let queries = NarrativeQueries::new(Arc::new(MockStoryRepo::new()), Arc::new(narratives));
        let err = queries.delete(id).await.unwrap_err();
        assert!(matches!(err, NarrativeQueryError::NarrativeNotFound(found) if found == id));
    }
}
