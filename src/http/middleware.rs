use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::domain::User;
use crate::error::AppError;
use crate::http::AppState;

/// Resolves `X-API-KEY` against the user subsystem. Any handler that takes
/// this as an argument is authenticated before its body runs; a missing or
/// unrecognized key short-circuits with `AppError::Unauthorized`.
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let key = parts
            .headers
            .get("X-API-KEY")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let user = app_state.users.authenticate(key).await?;
        Ok(AuthenticatedUser(user))
    }
}
