//! Authentication extractors
//!
//! The session token is read from the session cookie, or from an
//! `Authorization: Bearer` header for API clients.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization, Cookie},
    TypedHeader,
};
use clan_core::Snowflake;
use clan_service::services::{AuthService, Caller};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub Caller);

impl AuthUser {
    pub fn id(&self) -> Snowflake {
        self.0.id
    }
}

async fn session_token<S>(parts: &mut Parts, state: &S, cookie_name: &str) -> Option<String>
where
    S: Send + Sync,
{
    if let Ok(TypedHeader(cookies)) = TypedHeader::<Cookie>::from_request_parts(parts, state).await {
        if let Some(token) = cookies.get(cookie_name).filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }
    }

    TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = session_token(parts, state, app_state.session_cookie())
            .await
            .ok_or(ApiError::MissingAuth)?;

        let caller = AuthService::new(app_state.service_context())
            .authenticate(&token)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected session token");
                ApiError::MissingAuth
            })?;

        Ok(AuthUser(caller))
    }
}

/// Authenticated caller holding the staff role.
///
/// The role is checked against the live guild on every request.
#[derive(Debug, Clone)]
pub struct StaffUser(pub Caller);

impl StaffUser {
    pub fn id(&self) -> Snowflake {
        self.0.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(caller) = AuthUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);

        AuthService::new(app_state.service_context())
            .require_staff(caller.id)
            .await?;

        Ok(StaffUser(caller))
    }
}
