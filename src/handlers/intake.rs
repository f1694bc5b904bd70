use crate::error::Result;
use crate::forms::{CareerApplication, NewsletterSignup, ToolSubmission};
use crate::services::intake::{self, ApplicationReceipt, Receipt};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// POST /submissions - public "submit a tool" form
pub async fn submit_tool_handler(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ToolSubmission>,
) -> Result<(StatusCode, Json<Receipt>)> {
    let receipt = intake::submit_tool(
        state.store.as_ref(),
        state.files.as_ref(),
        submission,
        state.config.max_upload_bytes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /newsletter - 409 when the address is already subscribed
pub async fn newsletter_handler(
    State(state): State<Arc<AppState>>,
    Json(signup): Json<NewsletterSignup>,
) -> Result<(StatusCode, Json<Receipt>)> {
    let receipt = intake::subscribe_newsletter(state.store.as_ref(), signup).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /careers - résumé upload followed by the application record
pub async fn careers_handler(
    State(state): State<Arc<AppState>>,
    Json(application): Json<CareerApplication>,
) -> Result<(StatusCode, Json<ApplicationReceipt>)> {
    let receipt = intake::apply_for_career(
        state.store.as_ref(),
        state.files.as_ref(),
        application,
        state.config.max_upload_bytes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
