use crate::config::BackendMode;
use crate::handlers::{
    admin, auth, catalog, compare, engagement, health_handler, intake, ready_handler,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Request body limit for routes carrying a base64 upload.
pub fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes / 3 * 4 + 64 * 1024
}

/// Assembles every route. `/metrics` is only mounted when a recorder handle
/// is supplied.
pub fn build_router(state: Arc<AppState>, metrics: Option<PrometheusHandle>) -> Router {
    let upload_limit = DefaultBodyLimit::max(upload_body_limit(state.config.max_upload_bytes));
    let cors_origin = state.config.cors_allow_origin.clone();

    let mut app = Router::new()
        // Catalog
        .route("/tools", get(catalog::list_tools_handler))
        .route("/tools/:id", get(catalog::tool_detail_handler))
        .route("/categories", get(catalog::categories_handler))
        .route("/categories/:name", get(catalog::category_tools_handler))
        // Comparison
        .route("/compare", get(compare::compare_handler))
        .route("/compare/candidates", get(compare::candidates_handler))
        .route("/compare/replace", post(compare::replace_handler))
        // Auth
        .route("/auth/sign-up", post(auth::sign_up_handler))
        .route("/auth/confirm", post(auth::confirm_handler))
        .route("/auth/sign-in", post(auth::sign_in_handler))
        .route("/auth/sign-out", post(auth::sign_out_handler))
        .route("/auth/oauth/:provider", get(auth::oauth_handler))
        .route("/auth/session", get(auth::session_handler))
        // Dashboard
        .route("/me/saved", get(engagement::saved_tools_handler))
        .route(
            "/me/saved/:tool_id",
            put(engagement::save_tool_handler).delete(engagement::remove_saved_tool_handler),
        )
        .route("/me/reviews", get(engagement::my_reviews_handler))
        .route(
            "/me/avatar",
            post(engagement::avatar_handler).layer(upload_limit.clone()),
        )
        // Community
        .route(
            "/tools/:id/reviews",
            get(engagement::list_reviews_handler).post(engagement::create_review_handler),
        )
        .route(
            "/tools/:id/comments",
            get(engagement::list_comments_handler).post(engagement::create_comment_handler),
        )
        // Intake forms
        .route(
            "/submissions",
            post(intake::submit_tool_handler).layer(upload_limit.clone()),
        )
        .route("/newsletter", post(intake::newsletter_handler))
        .route(
            "/careers",
            post(intake::careers_handler).layer(upload_limit),
        )
        // Admin
        .route("/admin/tools", post(admin::create_tools_handler))
        .route(
            "/admin/tools/:id",
            put(admin::update_tool_handler).delete(admin::delete_tool_handler),
        )
        .route("/admin/submissions", get(admin::submissions_handler))
        .route(
            "/admin/submissions/:id/approve",
            post(admin::approve_submission_handler),
        )
        // Health endpoints
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    // Local uploads are served back under the URLs `LocalFileStorage` hands out.
    if state.config.backend == BackendMode::Memory {
        app = app.nest_service("/files", ServeDir::new(&state.config.upload_dir));
    }

    if let Some(handle) = metrics {
        app = app.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    if let Some(origin) = cors_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                app = app.layer(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_methods(Any)
                        .allow_headers(Any),
                );
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring invalid CORS_ALLOW_ORIGIN"),
        }
    }

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_body_limit_covers_base64_overhead() {
        let limit = upload_body_limit(5 * 1024 * 1024);
        assert!(limit > 5 * 1024 * 1024 * 4 / 3);
    }
}
