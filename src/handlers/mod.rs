pub mod admin;
pub mod auth;
pub mod catalog;
pub mod compare;
pub mod engagement;
pub mod health;
pub mod intake;

pub use health::{health_handler, ready_handler};

use crate::auth::{bearer_token, Session};
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// The live session named by the request's bearer token.
pub(crate) fn current_session(state: &AppState, headers: &HeaderMap) -> Result<Session> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AppError::UnauthorizedError)?;
    state.auth.session(token).ok_or(AppError::UnauthorizedError)
}

/// Splits a comma-separated id list, dropping blanks.
pub(crate) fn split_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ids() {
        assert_eq!(split_ids(" a, ,b,"), vec!["a", "b"]);
        assert!(split_ids("").is_empty());
    }
}
