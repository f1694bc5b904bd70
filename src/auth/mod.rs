//! Authentication collaborator.
//!
//! `AuthProvider` is the seam to the identity backend. Active sessions live
//! in an explicit `SessionContext` owned by the application state; nothing
//! here is global.

pub mod provider;
pub mod session;

pub use provider::{AuthProvider, LocalAuthProvider, SignUpOutcome};
pub use session::{AuthEvent, SessionContext, SubscriptionId};

use crate::store::{DataStore, RowFilter, StoreResult, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address has not been confirmed")]
    EmailNotConfirmed,

    #[error("an account with this email already exists")]
    AlreadyRegistered,

    #[error("confirmation token is invalid or already used")]
    InvalidConfirmation,

    #[error("session is missing or expired")]
    InvalidSession,

    #[error("OAuth sign-in is not configured")]
    OAuthUnavailable,

    #[error("auth provider failure: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    /// Unix milliseconds.
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            other => Err(format!("unsupported OAuth provider '{}'", other)),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// True when `email` is on the admin allow-list table.
pub async fn is_admin(store: &dyn DataStore, email: &str) -> StoreResult<bool> {
    let email = email.trim().to_lowercase();
    let rows = store
        .select(Table::Admins, &RowFilter::all().eq("email", email))
        .await?;
    Ok(!rows.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use serde_json::json;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_oauth_provider_parsing() {
        assert_eq!("GitHub".parse::<OAuthProvider>().unwrap(), OAuthProvider::Github);
        assert!("myspace".parse::<OAuthProvider>().is_err());
    }

    #[tokio::test]
    async fn test_admin_lookup_is_case_insensitive() {
        let store = InMemoryStore::new();
        store
            .insert_one(
                Table::Admins,
                json!({"email": "root@example.com"}).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
        assert!(is_admin(&store, "Root@Example.com").await.unwrap());
        assert!(!is_admin(&store, "guest@example.com").await.unwrap());
    }
}
