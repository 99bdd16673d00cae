use garde::Validate;
use serde::Deserialize;

use crate::models::profile::Role;
use crate::services::backend::{AuthSession, Backend, BackendError, Credentials, UserMetadata};
use crate::services::session::{ensure_profile, Session};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[garde(dive)]
    #[serde(flatten)]
    pub credentials: Credentials,

    #[garde(length(min = 1, max = 200))]
    pub full_name: String,

    #[garde(skip)]
    pub role: Role,

    #[garde(length(max = 200))]
    #[serde(default)]
    pub company_name: Option<String>,
}

pub async fn sign_in<B: Backend>(
    backend: &B,
    credentials: &Credentials,
) -> Result<AuthSession, AccountError> {
    credentials.validate()?;
    match backend.sign_in(credentials).await {
        Ok(session) => Ok(session),
        Err(e) if matches!(e.status(), Some(400) | Some(401)) => {
            Err(AccountError::InvalidCredentials)
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the auth user, then its `profiles` row.
///
/// Role, name and company are also stored as auth metadata. When the profile
/// cannot be written yet (no token because email confirmation is pending, or
/// the write failed) the account is still created and [`Session::resolve`]
/// writes the profile on the first authenticated request.
pub async fn sign_up<B: Backend>(
    backend: &B,
    request: &SignUpRequest,
) -> Result<AuthSession, AccountError> {
    request.validate()?;

    let company_name = request
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if request.role == Role::Employer && company_name.is_none() {
        return Err(AccountError::CompanyRequired);
    }

    let metadata = UserMetadata {
        full_name: Some(request.full_name.trim().to_string()),
        role: Some(request.role),
        company_name: company_name
            .filter(|_| request.role == Role::Employer)
            .map(str::to_string),
    };
    let session = match backend.sign_up(&request.credentials, &metadata).await {
        Ok(session) => session,
        Err(e) if e.status() == Some(422) => return Err(AccountError::AlreadyRegistered),
        Err(e) => return Err(e.into()),
    };

    match session.access_token.as_deref() {
        Some(token) => {
            if let Err(e) = ensure_profile(backend, &session.user, token).await {
                tracing::warn!(error = %e, user_id = %session.user.id, "Profile write deferred to first sign-in");
            }
        }
        None => {
            tracing::info!(user_id = %session.user.id, "Awaiting email confirmation, profile deferred");
        }
    }

    tracing::info!(user_id = %session.user.id, role = %request.role, "Account created");
    Ok(session)
}

/// Revoke the caller's session.
pub async fn sign_out<B: Backend>(backend: &B, session: &Session) -> Result<(), AccountError> {
    backend.sign_out(&session.access_token).await?;
    tracing::info!(user_id = %session.user_id(), "Signed out");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    AlreadyRegistered,

    #[error("Employers must provide a company name")]
    CompanyRequired,

    #[error("Invalid request: {0}")]
    Invalid(#[from] garde::Report),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
