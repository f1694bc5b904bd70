//! Identity provider seam and the built-in local implementation.

use super::session::{AuthEvent, SessionContext};
use super::{AuthError, OAuthProvider, Session, User};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Result of a sign-up. The confirmation token is what the confirmation
/// email carries. Not `Serialize`: clients only ever see `user`.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: User,
    pub confirmation_token: String,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    async fn confirm_email(&self, token: &str) -> Result<User, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// URL the client is sent to for a provider-hosted sign-in.
    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<String, AuthError>;

    async fn sign_out(&self, token: &str) -> Result<(), AuthError>;

    /// The live session for `token`, if any.
    fn session(&self, token: &str) -> Option<Session>;
}

/// How long an emailed confirmation token stays redeemable.
pub const CONFIRMATION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

struct PendingConfirmation {
    email: String,
    expires_at: i64,
}

struct UserRecord {
    user: User,
    salt: String,
    password_hash: String,
    confirmed: bool,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn poisoned() -> AuthError {
    AuthError::Provider("credential store lock poisoned".to_string())
}

/// In-process identity provider with salted SHA-256 password hashes.
///
/// Sessions are published to the shared [`SessionContext`].
pub struct LocalAuthProvider {
    users: RwLock<HashMap<String, UserRecord>>,
    confirmations: RwLock<HashMap<String, PendingConfirmation>>,
    sessions: Arc<SessionContext>,
    session_ttl_ms: i64,
    oauth_authorize_url: Option<String>,
}

impl LocalAuthProvider {
    pub fn new(
        sessions: Arc<SessionContext>,
        session_ttl_secs: u64,
        oauth_authorize_url: Option<String>,
    ) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            confirmations: RwLock::new(HashMap::new()),
            sessions,
            session_ttl_ms: (session_ttl_secs as i64).saturating_mul(1000),
            oauth_authorize_url,
        }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Drops confirmation tokens that expired at `now_ms`; returns how many.
    pub fn prune_confirmations(&self, now_ms: i64) -> usize {
        match self.confirmations.write() {
            Ok(mut pending) => {
                let before = pending.len();
                pending.retain(|_, p| p.expires_at > now_ms);
                before - pending.len()
            }
            Err(_) => 0,
        }
    }

    pub fn pending_confirmations(&self) -> usize {
        self.confirmations.read().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let email = Self::normalize(email);
        let mut users = self.users.write().map_err(|_| poisoned())?;
        if users.contains_key(&email) {
            return Err(AuthError::AlreadyRegistered);
        }

        let salt = uuid::Uuid::new_v4().to_string();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
        };
        users.insert(
            email.clone(),
            UserRecord {
                user: user.clone(),
                password_hash: hash_password(&salt, password),
                salt,
                confirmed: false,
            },
        );
        drop(users);

        let now = now_ms();
        self.prune_confirmations(now);
        let confirmation_token = uuid::Uuid::new_v4().to_string();
        self.confirmations.write().map_err(|_| poisoned())?.insert(
            confirmation_token.clone(),
            PendingConfirmation {
                email,
                expires_at: now.saturating_add(CONFIRMATION_TTL_MS),
            },
        );
        metrics::gauge!("pending_email_confirmations").set(self.pending_confirmations() as f64);

        tracing::info!(user_id = %user.id, "User signed up, awaiting email confirmation");
        Ok(SignUpOutcome {
            user,
            confirmation_token,
        })
    }

    async fn confirm_email(&self, token: &str) -> Result<User, AuthError> {
        let pending = self
            .confirmations
            .write()
            .map_err(|_| poisoned())?
            .remove(token)
            .ok_or(AuthError::InvalidConfirmation)?;
        if pending.expires_at <= now_ms() {
            return Err(AuthError::InvalidConfirmation);
        }
        let email = pending.email;

        let mut users = self.users.write().map_err(|_| poisoned())?;
        let record = users
            .get_mut(&email)
            .ok_or(AuthError::InvalidConfirmation)?;
        record.confirmed = true;
        Ok(record.user.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let email = Self::normalize(email);
        let user = {
            let users = self.users.read().map_err(|_| poisoned())?;
            let record = users.get(&email).ok_or(AuthError::InvalidCredentials)?;
            if hash_password(&record.salt, password) != record.password_hash {
                return Err(AuthError::InvalidCredentials);
            }
            if !record.confirmed {
                return Err(AuthError::EmailNotConfirmed);
            }
            record.user.clone()
        };

        let now = now_ms();
        self.sessions.prune_expired(now);
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user,
            expires_at: now.saturating_add(self.session_ttl_ms),
        };
        self.sessions.publish(AuthEvent::SignedIn(session.clone()));
        metrics::gauge!("active_sessions").set(self.sessions.active_count() as f64);
        Ok(session)
    }

    fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
    ) -> Result<String, AuthError> {
        let base = self
            .oauth_authorize_url
            .as_deref()
            .ok_or(AuthError::OAuthUnavailable)?;
        let mut url = format!("{}?provider={}", base, provider.as_str());
        if let Some(redirect) = redirect_to {
            url.push_str("&redirect_to=");
            url.push_str(&urlencoding::encode(redirect));
        }
        Ok(url)
    }

    async fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let session = self
            .sessions
            .get(token, now_ms())
            .ok_or(AuthError::InvalidSession)?;
        self.sessions.publish(AuthEvent::SignedOut {
            token: session.token,
            user_id: session.user.id,
        });
        metrics::gauge!("active_sessions").set(self.sessions.active_count() as f64);
        Ok(())
    }

    fn session(&self, token: &str) -> Option<Session> {
        self.sessions.get(token, now_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalAuthProvider {
        LocalAuthProvider::new(
            Arc::new(SessionContext::new()),
            3600,
            Some("https://auth.example.com/authorize".to_string()),
        )
    }

    #[tokio::test]
    async fn test_sign_in_requires_confirmation() {
        let auth = provider();
        let outcome = auth.sign_up("Ada@Example.com", "correct horse").await.unwrap();
        assert_eq!(outcome.user.email, "ada@example.com");

        assert_eq!(
            auth.sign_in_with_password("ada@example.com", "correct horse").await,
            Err(AuthError::EmailNotConfirmed)
        );

        auth.confirm_email(&outcome.confirmation_token).await.unwrap();
        assert_eq!(
            auth.confirm_email(&outcome.confirmation_token).await,
            Err(AuthError::InvalidConfirmation)
        );

        let session = auth
            .sign_in_with_password("ada@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(auth.session(&session.token), Some(session.clone()));

        auth.sign_out(&session.token).await.unwrap();
        assert_eq!(auth.session(&session.token), None);
        assert_eq!(auth.sign_out(&session.token).await, Err(AuthError::InvalidSession));
    }

    #[tokio::test]
    async fn test_bad_credentials_and_duplicates() {
        let auth = provider();
        let outcome = auth.sign_up("ada@example.com", "correct horse").await.unwrap();
        auth.confirm_email(&outcome.confirmation_token).await.unwrap();

        assert_eq!(
            auth.sign_in_with_password("ada@example.com", "wrong horse").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            auth.sign_in_with_password("bob@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(matches!(
            auth.sign_up("ADA@example.com", "another one").await,
            Err(AuthError::AlreadyRegistered)
        ));
    }

    #[tokio::test]
    async fn test_stale_entries_are_swept() {
        let sessions = Arc::new(SessionContext::new());
        let auth = LocalAuthProvider::new(Arc::clone(&sessions), 0, None);

        let ada = auth.sign_up("ada@example.com", "correct horse").await.unwrap();
        auth.sign_up("bob@example.com", "correct horse").await.unwrap();
        assert_eq!(auth.pending_confirmations(), 2);
        assert_eq!(auth.prune_confirmations(now_ms()), 0);
        assert_eq!(auth.prune_confirmations(now_ms() + CONFIRMATION_TTL_MS), 2);
        assert_eq!(
            auth.confirm_email(&ada.confirmation_token).await,
            Err(AuthError::InvalidConfirmation)
        );

        // A zero TTL makes every session stale as soon as it is issued.
        let carol = auth.sign_up("carol@example.com", "correct horse").await.unwrap();
        auth.confirm_email(&carol.confirmation_token).await.unwrap();
        for _ in 0..3 {
            auth.sign_in_with_password("carol@example.com", "correct horse")
                .await
                .unwrap();
        }
        let remaining = sessions.active_count();
        assert!(remaining <= 1);
        assert_eq!(sessions.prune_expired(now_ms()), remaining);
        assert_eq!(sessions.active_count(), 0);
    }

    #[test]
    fn test_oauth_url() {
        let auth = provider();
        let url = auth
            .oauth_authorize_url(OAuthProvider::Github, Some("https://app.example.com/dashboard"))
            .unwrap();
        assert_eq!(
            url,
            "https://auth.example.com/authorize?provider=github&redirect_to=https%3A%2F%2Fapp.example.com%2Fdashboard"
        );

        let unconfigured = LocalAuthProvider::new(Arc::new(SessionContext::new()), 60, None);
        assert_eq!(
            unconfigured.oauth_authorize_url(OAuthProvider::Google, None),
            Err(AuthError::OAuthUnavailable)
        );
    }
}
