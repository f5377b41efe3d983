//! Profiles anchor ownership of stories, narratives and progress.

use std::sync::Arc;

use questionspark_domain::{Profile, ProfileId, Username};

use crate::infrastructure::ports::{ClockPort, ProfileRepo, RepoError};
use crate::use_cases::validation::{
    require_length_range, require_non_empty_if_present, ValidationError,
};

const MIN_USERNAME_LENGTH: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Profile not found: {0}")]
    NotFound(ProfileId),
    #[error("{context}: {source}")]
    Service {
        context: &'static str,
        #[source]
        source: RepoError,
    },
}

pub struct ProfileOps {
    profiles: Arc<dyn ProfileRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ProfileOps {
    pub fn new(profiles: Arc<dyn ProfileRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { profiles, clock }
    }

    pub async fn create(
        &self,
        username: &str,
        display_name: Option<String>,
    ) -> Result<Profile, ProfileError> {
        require_length_range(username, MIN_USERNAME_LENGTH, Username::MAX_LENGTH, "username")?;
        require_non_empty_if_present(&display_name, "displayName")?;
        let username = Username::new(username).map_err(ValidationError::from)?;

        let taken = self
            .profiles
            .get_by_username(username.as_str())
            .await
            .map_err(|source| ProfileError::Service {
                context: "Error creating profile",
                source,
            })?;
        if taken.is_some() {
            return Err(username_taken(&username));
        }

        let profile = Profile::new(username, self.clock.now()).with_display_name(display_name);
        match self.profiles.save(&profile).await {
            Ok(()) => {}
            // Lost a race with a concurrent create of the same name.
            Err(RepoError::ConstraintViolation(_)) => {
                return Err(username_taken(profile.username()))
            }
            Err(source) => {
                tracing::error!(error = %source, "Error creating profile");
                return Err(ProfileError::Service {
                    context: "Error creating profile",
                    source,
                });
            }
        }

        tracing::info!(
            profile_id = %profile.id(),
            username = %profile.username(),
            "Profile created"
        );
        Ok(profile)
    }

    pub async fn get(&self, id: ProfileId) -> Result<Profile, ProfileError> {
        self.profiles
            .get(id)
            .await
            .map_err(|source| ProfileError::Service {
                context: "Error fetching profile",
                source,
            })?
            .ok_or(ProfileError::NotFound(id))
    }
}

fn username_taken(username: &Username) -> ProfileError {
    ValidationError::Invalid {
        field_name: "username",
        reason: format!("'{}' is already taken", username),
    }
    .into()
}
