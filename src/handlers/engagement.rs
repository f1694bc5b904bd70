//! Signed-in dashboard and community endpoints.

use super::current_session;
use crate::catalog::Tool;
use crate::error::Result;
use crate::files::StoredObject;
use crate::forms::{AvatarUpload, CommentForm, ReviewForm};
use crate::services::engagement::{self, Comment, Review};
use crate::services::intake;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

/// GET /me/saved
pub async fn saved_tools_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Tool>>> {
    let session = current_session(&state, &headers)?;
    let tools = engagement::list_saved_tools(state.store.as_ref(), &session.user.id).await?;
    Ok(Json(tools))
}

/// PUT /me/saved/:tool_id - 201 when newly saved, 200 when already saved
pub async fn save_tool_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tool_id): Path<String>,
) -> Result<StatusCode> {
    let session = current_session(&state, &headers)?;
    let created = engagement::save_tool(state.store.as_ref(), &session.user, &tool_id).await?;
    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

/// DELETE /me/saved/:tool_id
pub async fn remove_saved_tool_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tool_id): Path<String>,
) -> Result<StatusCode> {
    let session = current_session(&state, &headers)?;
    engagement::remove_saved_tool(state.store.as_ref(), &session.user.id, &tool_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /me/reviews
pub async fn my_reviews_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Review>>> {
    let session = current_session(&state, &headers)?;
    let reviews = engagement::list_user_reviews(state.store.as_ref(), &session.user.id).await?;
    Ok(Json(reviews))
}

/// POST /me/avatar
pub async fn avatar_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(upload): Json<AvatarUpload>,
) -> Result<(StatusCode, Json<StoredObject>)> {
    let session = current_session(&state, &headers)?;
    let stored = intake::upload_avatar(
        state.files.as_ref(),
        &session.user,
        upload,
        state.config.max_upload_bytes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /tools/:id/reviews
pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<String>,
) -> Result<Json<Vec<Review>>> {
    Ok(Json(
        engagement::list_reviews(state.store.as_ref(), &tool_id).await?,
    ))
}

/// POST /tools/:id/reviews
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tool_id): Path<String>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>)> {
    let session = current_session(&state, &headers)?;
    let review =
        engagement::create_review(state.store.as_ref(), &session.user, &tool_id, form).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /tools/:id/comments
pub async fn list_comments_handler(
    State(state): State<Arc<AppState>>,
    Path(tool_id): Path<String>,
) -> Result<Json<Vec<Comment>>> {
    Ok(Json(
        engagement::list_comments(state.store.as_ref(), &tool_id).await?,
    ))
}

/// POST /tools/:id/comments
pub async fn create_comment_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tool_id): Path<String>,
    Json(form): Json<CommentForm>,
) -> Result<(StatusCode, Json<Comment>)> {
    let session = current_session(&state, &headers)?;
    let comment =
        engagement::create_comment(state.store.as_ref(), &session.user, &tool_id, form).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
