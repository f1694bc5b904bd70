use crate::auth::{AuthEvent, AuthProvider, LocalAuthProvider, SessionContext};
use crate::config::{BackendMode, Config};
use crate::files::{FileStorage, LocalFileStorage, RestFileStorage};
use crate::ingestion::load_seed_rows;
use crate::store::{DataStore, InMemoryStore, RestStore, Row, RowFilter, Table};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// Every collaborator sits behind a trait object so tests can swap in
/// in-memory implementations.
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub files: Arc<dyn FileStorage>,
    pub auth: Arc<dyn AuthProvider>,
    pub sessions: Arc<SessionContext>,
    /// Flag indicating the service is ready (collaborators built and seeded)
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the collaborators selected by `config.backend`.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let sessions = Arc::new(SessionContext::new());

        let (store, files): (Arc<dyn DataStore>, Arc<dyn FileStorage>) = match config.backend {
            BackendMode::Memory => (
                Arc::new(InMemoryStore::new()),
                Arc::new(LocalFileStorage::new(
                    &config.upload_dir,
                    &config.public_base_url,
                    config.max_upload_bytes,
                )),
            ),
            BackendMode::Hosted => {
                let url = config
                    .backend_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("BACKEND_URL is not set"))?;
                let key = config
                    .backend_key
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("BACKEND_KEY is not set"))?;
                (
                    Arc::new(RestStore::new(url, key)?),
                    Arc::new(RestFileStorage::new(url, key, config.max_upload_bytes)?),
                )
            }
        };

        let auth = Arc::new(LocalAuthProvider::new(
            Arc::clone(&sessions),
            config.session_ttl_secs,
            config.oauth_authorize_url.clone(),
        ));

        tracing::info!(backend = ?config.backend, "Collaborators initialized");

        Ok(Self::from_parts(store, files, auth, sessions, config))
    }

    /// Assembles state from ready-made collaborators. Not yet marked ready.
    pub fn from_parts(
        store: Arc<dyn DataStore>,
        files: Arc<dyn FileStorage>,
        auth: Arc<dyn AuthProvider>,
        sessions: Arc<SessionContext>,
        config: Config,
    ) -> Self {
        sessions.subscribe(|event| match event {
            AuthEvent::SignedIn(session) => {
                metrics::counter!("auth_sign_ins_total").increment(1);
                tracing::info!(user_id = %session.user.id, "User signed in");
            }
            AuthEvent::SignedOut { user_id, .. } => {
                tracing::info!(user_id = %user_id, "User signed out");
            }
            AuthEvent::Expired { user_id, .. } => {
                tracing::debug!(user_id = %user_id, "Session expired");
            }
        });

        Self {
            store,
            files,
            auth,
            sessions,
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        }
    }

    /// Loads seed data (memory mode only) and marks the service ready.
    pub async fn seed(&self) -> anyhow::Result<()> {
        if self.config.backend == BackendMode::Memory {
            if let Some(path) = &self.config.seed_path {
                let rows = load_seed_rows(path)?;
                let inserted = self.store.insert_many(Table::Tools, rows).await?;
                tracing::info!(tools = inserted.len(), "Catalog seeded");
            }

            for email in &self.config.admin_emails {
                let existing = self
                    .store
                    .select(Table::Admins, &RowFilter::all().eq("email", email.as_str()))
                    .await?;
                if existing.is_empty() {
                    let mut row = Row::new();
                    row.insert("email".to_string(), Value::from(email.as_str()));
                    self.store.insert_one(Table::Admins, row).await?;
                }
            }
        }

        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
