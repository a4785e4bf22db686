use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::session::resolve_user;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// The logged-in user. Anonymous requests are redirected to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser).ok_or(AppError::LoginRequired)
    }
}

/// Optional user extractor; `None` for anonymous visitors.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    /// Name shown in the navigation bar.
    pub fn name(&self) -> Option<String> {
        self.0.as_ref().map(|u| u.name.clone())
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Resolved once per request and cached for later extractors.
        if let Some(cached) = parts.extensions.get::<MaybeUser>() {
            return Ok(cached.clone());
        }

        let user = resolve_user(
            &parts.headers,
            &state.config.auth.cookie_name,
            &state.signer,
            state.store.as_ref(),
        )?;

        let resolved = MaybeUser(user);
        parts.extensions.insert(resolved.clone());
        Ok(resolved)
    }
}
