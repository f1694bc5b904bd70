use super::current_session;
use crate::auth::{bearer_token, is_admin, OAuthProvider, Session, User};
use crate::error::{AppError, Result};
use crate::forms::{Credentials, Validate};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthQuery {
    pub redirect_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OAuthResponse {
    pub provider: OAuthProvider,
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub expires_at: i64,
    pub is_admin: bool,
}

/// POST /auth/sign-up
///
/// The confirmation token only leaves the process through the confirmation
/// email, never in the response.
pub async fn sign_up_handler(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<User>)> {
    credentials.validate()?;
    let outcome = state
        .auth
        .sign_up(&credentials.email, &credentials.password)
        .await?;
    tracing::debug!(
        user_id = %outcome.user.id,
        confirmation_token = %outcome.confirmation_token,
        "Confirmation email queued"
    );
    Ok((StatusCode::CREATED, Json(outcome.user)))
}

/// POST /auth/confirm - redeem the emailed confirmation token
pub async fn confirm_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<User>> {
    let user = state.auth.confirm_email(request.token.trim()).await?;
    Ok(Json(user))
}

/// POST /auth/sign-in
pub async fn sign_in_handler(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Session>> {
    let session = state
        .auth
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await?;
    Ok(Json(session))
}

/// POST /auth/sign-out
pub async fn sign_out_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::UnauthorizedError)?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/oauth/:provider - where to send the browser for provider sign-in
pub async fn oauth_handler(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthQuery>,
) -> Result<Json<OAuthResponse>> {
    let provider: OAuthProvider = provider.parse().map_err(AppError::ValidationError)?;
    let url = state
        .auth
        .oauth_authorize_url(provider, query.redirect_to.as_deref())?;
    Ok(Json(OAuthResponse { provider, url }))
}

/// GET /auth/session - the caller's session and admin flag
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>> {
    let session = current_session(&state, &headers)?;
    let is_admin = is_admin(state.store.as_ref(), &session.user.email).await?;
    Ok(Json(SessionResponse {
        user: session.user,
        expires_at: session.expires_at,
        is_admin,
    }))
}
