use uuid::Uuid;

use crate::models::profile::{Profile, ProfileInsert, Role};
use crate::services::backend::{AuthUser, Backend, BackendError};
use crate::services::query::{profile_query, PROFILES_TABLE, PROFILE_KEY};

/// The signed-in user, passed explicitly to every view that cares who is
/// looking.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: String,
    pub profile: Option<Profile>,
}

impl Session {
    /// Resolve a bearer token into a session. `Ok(None)` for unknown tokens.
    ///
    /// A user whose `profiles` row is missing gets it recreated from the
    /// details recorded at sign-up.
    pub async fn resolve<B: Backend>(
        backend: &B,
        access_token: &str,
    ) -> Result<Option<Self>, BackendError> {
        let Some(user) = backend.current_user(access_token).await? else {
            return Ok(None);
        };
        let mut profile = fetch_profile(backend, user.id, Some(access_token)).await?;
        if profile.is_none() {
            profile = match ensure_profile(backend, &user, access_token).await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(error = %e, user_id = %user.id, "Could not restore missing profile");
                    None
                }
            };
        }
        Ok(Some(Self {
            user,
            access_token: access_token.to_string(),
            profile,
        }))
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_candidate(&self) -> bool {
        self.role() == Some(Role::Candidate)
    }
}

pub async fn fetch_profile<B: Backend>(
    backend: &B,
    user_id: Uuid,
    access_token: Option<&str>,
) -> Result<Option<Profile>, BackendError> {
    let rows = backend.select(&profile_query(user_id), access_token).await?;
    Ok(rows.decode::<Profile>()?.into_iter().next())
}

/// Write the user's `profiles` row from their sign-up metadata. Safe to
/// repeat: the write is an upsert keyed on `user_id`.
///
/// `Ok(None)` when the user carries no role, so there is nothing to write.
pub async fn ensure_profile<B: Backend>(
    backend: &B,
    user: &AuthUser,
    access_token: &str,
) -> Result<Option<Profile>, BackendError> {
    let metadata = &user.user_metadata;
    let Some(role) = metadata.role else {
        return Ok(None);
    };

    let profile = ProfileInsert {
        user_id: user.id,
        email: user.email.as_deref().unwrap_or_default(),
        full_name: metadata.full_name.as_deref(),
        role,
        company_name: match role {
            Role::Employer => metadata.company_name.as_deref(),
            Role::Candidate => None,
        },
    };
    let row = serde_json::to_value(profile)?;
    let stored = backend
        .upsert(PROFILES_TABLE, row, PROFILE_KEY, Some(access_token))
        .await?;
    tracing::info!(user_id = %user.id, %role, "Profile written");
    Ok(Some(serde_json::from_value(stored)?))
}
