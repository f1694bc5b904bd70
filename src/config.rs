use crate::catalog::DEFAULT_PAGE_SIZE;
use std::env;
use std::path::PathBuf;

/// Which collaborators back the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// In-process data store, local disk for uploads, local auth.
    /// Optionally seeded from `SEED_PATH` and `ADMIN_EMAILS`.
    Memory,
    /// Hosted relational backend and object storage at `BACKEND_URL`.
    Hosted,
}

impl BackendMode {
    pub fn from_env() -> Self {
        Self::parse(&env::var("TOOLSHELF_BACKEND").unwrap_or_default())
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "hosted" | "remote" | "rest" => Self::Hosted,
            _ => Self::Memory,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Tools per catalog page.
    pub page_size: usize,
    pub backend: BackendMode,
    /// Base URL of the hosted backend (required in hosted mode).
    pub backend_url: Option<String>,
    /// API key of the hosted backend (required in hosted mode).
    pub backend_key: Option<String>,
    /// JSON array of tool rows loaded into the memory store at startup.
    pub seed_path: Option<PathBuf>,
    /// Emails seeded into the admin allow-list in memory mode.
    pub admin_emails: Vec<String>,
    /// Root directory for local uploads.
    pub upload_dir: PathBuf,
    /// Public origin used when building URLs for local uploads.
    pub public_base_url: String,
    pub max_upload_bytes: usize,
    pub session_ttl_secs: u64,
    /// Provider-hosted sign-in endpoint; OAuth is disabled when unset.
    pub oauth_authorize_url: Option<String>,
    pub cors_allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
            page_size: DEFAULT_PAGE_SIZE,
            backend: BackendMode::Memory,
            backend_url: None,
            backend_key: None,
            seed_path: None,
            admin_emails: Vec::new(),
            upload_dir: PathBuf::from("./uploads"),
            public_base_url: "http://localhost:8080".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            session_ttl_secs: 7 * 24 * 60 * 60,
            oauth_authorize_url: None,
            cors_allow_origin: None,
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `TOOLSHELF_BACKEND=hosted` switches to the hosted collaborators and
    /// makes `BACKEND_URL` and `BACKEND_KEY` mandatory.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let backend = BackendMode::from_env();

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| defaults.shutdown_timeout_secs.to_string())
                .parse()?,
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| defaults.page_size.to_string())
                .parse()?,
            backend,
            backend_url: non_empty("BACKEND_URL"),
            backend_key: non_empty("BACKEND_KEY"),
            seed_path: non_empty("SEED_PATH").map(PathBuf::from),
            admin_emails: env::var("ADMIN_EMAILS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            upload_dir: non_empty("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_base_url: non_empty("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| defaults.max_upload_bytes.to_string())
                .parse()?,
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| defaults.session_ttl_secs.to_string())
                .parse()?,
            oauth_authorize_url: non_empty("OAUTH_AUTHORIZE_URL"),
            cors_allow_origin: non_empty("CORS_ALLOW_ORIGIN"),
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("PAGE_SIZE must be at least 1");
        }
        if self.backend == BackendMode::Hosted
            && (self.backend_url.is_none() || self.backend_key.is_none())
        {
            anyhow::bail!("BACKEND_URL and BACKEND_KEY are required when TOOLSHELF_BACKEND=hosted");
        }
        Ok(())
    }
}

/// Splits a comma-separated list, dropping blanks and lowercasing.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_mode_parsing() {
        assert_eq!(BackendMode::parse("hosted"), BackendMode::Hosted);
        assert_eq!(BackendMode::parse(" REST "), BackendMode::Hosted);
        assert_eq!(BackendMode::parse(""), BackendMode::Memory);
        assert_eq!(BackendMode::parse("anything"), BackendMode::Memory);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" Root@Example.com, ,ops@example.com"),
            vec!["root@example.com", "ops@example.com"]
        );
    }

    #[test]
    fn test_hosted_requires_credentials() {
        let config = Config {
            backend: BackendMode::Hosted,
            ..Config::default()
        };
        assert!(config.check().is_err());

        let config = Config {
            backend: BackendMode::Hosted,
            backend_url: Some("https://db.example.com".into()),
            backend_key: Some("key".into()),
            ..Config::default()
        };
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_default_page_size() {
        assert_eq!(Config::default().page_size, 18);
    }
}
