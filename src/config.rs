//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. In production the
//! Firebase API key and JWT signing key are injected as environment
//! variables by the deployment's secret bindings.

use std::env;

/// Default cap on folders per folder type per user.
pub const DEFAULT_MAX_FOLDERS: usize = 10;

/// Which storage/identity backends the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Firestore + Firebase Authentication.
    Firebase,
    /// In-process stores; data is lost on restart.
    Memory,
}

impl Backend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firebase" | "firestore" => Ok(Backend::Firebase),
            "memory" => Ok(Backend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Storage/identity backend selection
    pub backend: Backend,
    /// Maximum folders per folder type per user
    pub max_folders_per_kind: usize,

    // --- Secrets ---
    /// Firebase Web API key for the Identity Toolkit REST API
    pub firebase_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests: memory backends and a fixed signing key.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            backend: Backend::Memory,
            max_folders_per_kind: DEFAULT_MAX_FOLDERS,
            firebase_api_key: "test_api_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => Backend::parse(&raw)?,
            Err(_) => Backend::Firebase,
        };

        // The memory backend never calls Firebase, so the key is optional there.
        let firebase_api_key = match (env::var("FIREBASE_API_KEY"), backend) {
            (Ok(key), _) => key.trim().to_string(),
            (Err(_), Backend::Memory) => String::new(),
            (Err(_), Backend::Firebase) => return Err(ConfigError::Missing("FIREBASE_API_KEY")),
        };

        let max_folders_per_kind = match env::var("MAX_FOLDERS_PER_KIND") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("MAX_FOLDERS_PER_KIND", raw))?,
            Err(_) => DEFAULT_MAX_FOLDERS,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend,
            max_folders_per_kind,
            firebase_api_key,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Whether session cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
